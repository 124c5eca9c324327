//! SVG renderer: converts a `Drawing` into a standalone SVG string.

use std::fmt::Write;

use genoview_protocol::{Drawing, RenderCommand, Size, TextAlign, ThemeToken};

/// Render `drawing` as an SVG document of `size`.
///
/// `dark` selects the color palette. Transforms become nested groups and
/// each `SetClip` opens a group clipped to its rectangle.
pub fn render_svg(drawing: &Drawing, size: Size, dark: bool) -> String {
    let (width, height) = (size.width, size.height);
    let mut svg = String::with_capacity(drawing.len() * 120 + 256);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif">"#,
    );
    let bg = resolve_color(ThemeToken::Background, dark);
    let _ = write!(svg, r#"<rect width="{width}" height="{height}" fill="{bg}"/>"#);

    let mut transforms = 0usize;
    let mut clip_open = false;
    let mut clips = 0usize;

    for cmd in drawing.commands() {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
            } => {
                let fill = resolve_color(*color, dark);
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{fill}""#,
                    rect.x, rect.y, rect.w, rect.h,
                );
                if let Some(border) = border_color {
                    let _ = write!(svg, r#" stroke="{}" stroke-width="1""#, resolve_color(*border, dark));
                }
                svg.push_str("/>");
            }
            RenderCommand::DrawCircle { center, radius, color } => {
                let _ = write!(
                    svg,
                    r#"<circle cx="{}" cy="{}" r="{radius}" fill="{}"/>"#,
                    center.x,
                    center.y,
                    resolve_color(*color, dark),
                );
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => {
                let _ = write!(
                    svg,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{line_width}"/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    resolve_color(*color, dark),
                );
            }
            RenderCommand::DrawPath {
                points,
                color,
                width: line_width,
            } => {
                let coords: Vec<String> = points.iter().map(|p| format!("{},{}", p.x, p.y)).collect();
                let _ = write!(
                    svg,
                    r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{line_width}"/>"#,
                    coords.join(" "),
                    resolve_color(*color, dark),
                );
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" fill="{}" font-size="{font_size}" text-anchor="{anchor}" dominant-baseline="middle">{}</text>"#,
                    position.x,
                    position.y,
                    resolve_color(*color, dark),
                    escape_xml(text),
                );
            }
            RenderCommand::SetClip { rect } => {
                if clip_open {
                    svg.push_str("</g>");
                }
                clips += 1;
                let _ = write!(
                    svg,
                    r#"<clipPath id="clip{clips}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath><g clip-path="url(#clip{clips})">"#,
                    rect.x, rect.y, rect.w, rect.h,
                );
                clip_open = true;
            }
            RenderCommand::ClearClip => {
                if clip_open {
                    svg.push_str("</g>");
                    clip_open = false;
                }
            }
            RenderCommand::PushTransform { translate } => {
                transforms += 1;
                let _ = write!(svg, r#"<g transform="translate({},{})">"#, translate.x, translate.y);
            }
            RenderCommand::PopTransform => {
                if transforms > 0 {
                    transforms -= 1;
                    svg.push_str("</g>");
                }
            }
        }
    }

    if clip_open {
        svg.push_str("</g>");
    }
    for _ in 0..transforms {
        svg.push_str("</g>");
    }
    svg.push_str("</svg>");
    svg
}

fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    if dark {
        match token {
            ThemeToken::Background => "#181818",
            ThemeToken::Border | ThemeToken::SegmentBorder => "#303030",
            ThemeToken::SegmentBandEven => "#202020",
            ThemeToken::SegmentBandOdd => "#2a2a2a",
            ThemeToken::SnpPoint => "#42a5f5",
            ThemeToken::SnpSignificant => "#f44336",
            ThemeToken::SignificanceLine => "#ffd600",
            ThemeToken::GeneFill => "#4caf50",
            ThemeToken::GeneBorder => "#2e7d32",
            ThemeToken::Highlight => "#448aff",
            ThemeToken::TextPrimary
            | ThemeToken::SegmentLabel
            | ThemeToken::GeneLabel
            | ThemeToken::AxisText => "#ececec",
            ThemeToken::TextMuted | ThemeToken::AxisLine | ThemeToken::AxisTick => "#9e9e9e",
        }
    } else {
        match token {
            ThemeToken::Background => "#f8f9fa",
            ThemeToken::Border | ThemeToken::SegmentBorder => "#dee2e6",
            ThemeToken::SegmentBandEven => "#ffffff",
            ThemeToken::SegmentBandOdd => "#eef1f4",
            ThemeToken::SnpPoint => "#457b9d",
            ThemeToken::SnpSignificant => "#e63946",
            ThemeToken::SignificanceLine => "#e67e22",
            ThemeToken::GeneFill => "#27ae60",
            ThemeToken::GeneBorder => "#1e8449",
            ThemeToken::Highlight => "#ffd60a",
            ThemeToken::TextPrimary
            | ThemeToken::SegmentLabel
            | ThemeToken::GeneLabel
            | ThemeToken::AxisText => "#1a1a2e",
            ThemeToken::TextMuted | ThemeToken::AxisLine | ThemeToken::AxisTick => "#666677",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
