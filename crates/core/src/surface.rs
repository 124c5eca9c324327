//! Raster surfaces the track container draws into.
//!
//! [`Surface`] is the seam to the presenting platform. [`RasterSurface`] is a
//! software implementation on a grid of character cells: one cell per
//! pixel. It backs the terminal front end and lets everything above it run
//! headless in tests.

use genoview_protocol::{Drawing, Point, Rect, RenderCommand, Size, TextAlign, ThemeToken};

use crate::slot::Clip;

/// A 2D raster target.
///
/// Coordinates passed to [`clear`](Surface::clear) and
/// [`blit`](Surface::blit) are device pixels: the translation does not
/// apply, the clip does (for `blit`). [`draw`](Surface::draw) honours both.
pub trait Surface: Sized {
    fn new(size: Size) -> Self;

    fn size(&self) -> Size;

    /// Reallocate at `size`. Content is discarded.
    fn resize(&mut self, size: Size);

    fn clear(&mut self, region: Rect);

    fn set_translation(&mut self, offset: Point);

    fn set_clip(&mut self, clip: Option<Clip>);

    fn draw(&mut self, drawing: &Drawing);

    /// Copy `src` of `from` onto `dst`, scaling when the sizes differ.
    /// Blank source pixels leave the destination untouched.
    fn blit(&mut self, from: &Self, src: Rect, dst: Rect);

    /// Rendered width of `text`, if the surface can tell.
    fn measure_text(&self, _text: &str, _font_size: f64) -> Option<f64> {
        None
    }

    fn bounds(&self) -> Rect {
        Rect::from_size(self.size())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub color: ThemeToken,
}

/// Operation counters, for tests and frame statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    pub draws: usize,
    pub blits: usize,
    pub clears: usize,
}

#[derive(Debug, Clone)]
pub struct RasterSurface {
    width: usize,
    height: usize,
    cells: Vec<Option<Cell>>,
    translation: Point,
    clip: Option<Clip>,
    stats: SurfaceStats,
}

impl RasterSurface {
    pub fn stats(&self) -> SurfaceStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SurfaceStats::default();
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            None
        }
    }

    /// Row `y` as text, blanks as spaces.
    pub fn row_text(&self, y: usize) -> String {
        (0..self.width)
            .map(|x| self.cell(x, y).map_or(' ', |c| c.ch))
            .collect()
    }

    pub fn filled_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    fn put(&mut self, x: i64, y: i64, ch: char, color: ThemeToken, clip: Option<Rect>) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let p = Point::new(x as f64, y as f64);
        if self.clip.is_some_and(|c| !c.contains(p)) || clip.is_some_and(|c| !c.contains(p)) {
            return;
        }
        self.cells[y as usize * self.width + x as usize] = Some(Cell { ch, color });
    }

    fn clamp_x(&self, lo: i64, hi: i64) -> (i64, i64) {
        (lo.max(0), hi.min(self.width as i64))
    }

    fn clamp_y(&self, lo: i64, hi: i64) -> (i64, i64) {
        (lo.max(0), hi.min(self.height as i64))
    }

    fn fill_rect(&mut self, r: Rect, ch: char, color: ThemeToken, clip: Option<Rect>) {
        let x0 = r.x.round() as i64;
        let y0 = r.y.round() as i64;
        let (x0, x1) = self.clamp_x(x0, (r.right().round() as i64).max(x0 + 1));
        let (y0, y1) = self.clamp_y(y0, (r.bottom().round() as i64).max(y0 + 1));
        for y in y0..y1 {
            for x in x0..x1 {
                self.put(x, y, ch, color, clip);
            }
        }
    }

    fn stroke_rect(&mut self, r: Rect, color: ThemeToken, clip: Option<Rect>) {
        let x0 = r.x.round() as i64;
        let y0 = r.y.round() as i64;
        let x1 = (r.right().round() as i64).max(x0 + 1) - 1;
        let y1 = (r.bottom().round() as i64).max(y0 + 1) - 1;
        let (cx0, cx1) = self.clamp_x(x0, x1 + 1);
        for x in cx0..cx1 {
            self.put(x, y0, '▀', color, clip);
            self.put(x, y1, '▄', color, clip);
        }
        let (cy0, cy1) = self.clamp_y(y0, y1 + 1);
        for y in cy0..cy1 {
            self.put(x0, y, '▌', color, clip);
            self.put(x1, y, '▐', color, clip);
        }
    }

    fn line(&mut self, from: Point, to: Point, color: ThemeToken, clip: Option<Rect>) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let ch = if dy.abs() < 0.5 {
            '─'
        } else if dx.abs() < 0.5 {
            '│'
        } else {
            '·'
        };
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i64;
        // Only the steps that can land on the surface.
        let (mut first, mut last) = (0, steps);
        let mut limit = |d: f64, start: f64, extent: usize| {
            if d.abs() >= 0.5 {
                let a = (-1.0 - start) / d * steps as f64;
                let b = (extent as f64 + 1.0 - start) / d * steps as f64;
                first = first.max(a.min(b).floor() as i64);
                last = last.min(a.max(b).ceil() as i64);
            }
        };
        limit(dx, from.x, self.width);
        limit(dy, from.y, self.height);
        for i in first..=last {
            let t = i as f64 / steps as f64;
            let x = (from.x + dx * t).floor() as i64;
            let y = (from.y + dy * t).floor() as i64;
            self.put(x, y, ch, color, clip);
        }
    }

    fn circle(&mut self, center: Point, radius: f64, color: ThemeToken, clip: Option<Rect>) {
        let r = radius.max(0.0);
        let cx = center.x.floor() as i64;
        let cy = center.y.floor() as i64;
        let reach = r.ceil() as i64;
        for y in (cy - reach)..=(cy + reach) {
            for x in (cx - reach)..=(cx + reach) {
                let d = Point::new(x as f64, y as f64).distance(Point::new(cx as f64, cy as f64));
                if d <= r {
                    self.put(x, y, '●', color, clip);
                }
            }
        }
    }

    fn text(&mut self, at: Point, text: &str, color: ThemeToken, align: TextAlign, clip: Option<Rect>) {
        let len = text.chars().count() as f64;
        let start = match align {
            TextAlign::Left => at.x,
            TextAlign::Center => at.x - len / 2.0,
            TextAlign::Right => at.x - len,
        };
        let x0 = start.round() as i64;
        let y = at.y.floor() as i64;
        for (i, ch) in text.chars().enumerate() {
            self.put(x0 + i as i64, y, ch, color, clip);
        }
    }
}

/// Cell grid for `size`. Empty when the cell count does not fit a `usize`.
fn grid(size: Size) -> (usize, usize) {
    let width = size.width.max(0.0) as usize;
    let height = size.height.max(0.0) as usize;
    match width.checked_mul(height) {
        Some(_) => (width, height),
        None => (0, 0),
    }
}

impl Surface for RasterSurface {
    fn new(size: Size) -> Self {
        let (width, height) = grid(size);
        Self {
            width,
            height,
            cells: vec![None; width * height],
            translation: Point::default(),
            clip: None,
            stats: SurfaceStats::default(),
        }
    }

    fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    fn resize(&mut self, size: Size) {
        (self.width, self.height) = grid(size);
        self.cells = vec![None; self.width * self.height];
    }

    fn clear(&mut self, region: Rect) {
        self.stats.clears += 1;
        let Some(r) = region.intersection(&self.bounds()) else {
            return;
        };
        let (x0, y0) = (r.x.floor() as usize, r.y.floor() as usize);
        let x1 = (r.right().ceil() as usize).min(self.width);
        let y1 = (r.bottom().ceil() as usize).min(self.height);
        for y in y0..y1 {
            self.cells[y * self.width + x0..y * self.width + x1].fill(None);
        }
    }

    fn set_translation(&mut self, offset: Point) {
        self.translation = offset;
    }

    fn set_clip(&mut self, clip: Option<Clip>) {
        self.clip = clip;
    }

    fn draw(&mut self, drawing: &Drawing) {
        self.stats.draws += 1;
        let mut offsets = vec![self.translation];
        let mut clip: Option<Rect> = None;
        for cmd in drawing.commands() {
            let o = offsets.last().copied().unwrap_or(self.translation);
            match cmd {
                RenderCommand::DrawRect {
                    rect,
                    color,
                    border_color,
                } => {
                    let r = rect.translate(o.x, o.y);
                    self.fill_rect(r, '█', *color, clip);
                    if let Some(border) = border_color {
                        self.stroke_rect(r, *border, clip);
                    }
                }
                RenderCommand::DrawCircle {
                    center,
                    radius,
                    color,
                } => self.circle(center.offset(o.x, o.y), *radius, *color, clip),
                RenderCommand::DrawText {
                    position,
                    text,
                    color,
                    align,
                    ..
                } => self.text(position.offset(o.x, o.y), text, *color, *align, clip),
                RenderCommand::DrawLine {
                    from, to, color, ..
                } => self.line(from.offset(o.x, o.y), to.offset(o.x, o.y), *color, clip),
                RenderCommand::DrawPath { points, color, .. } => {
                    for pair in points.windows(2) {
                        self.line(pair[0].offset(o.x, o.y), pair[1].offset(o.x, o.y), *color, clip);
                    }
                }
                RenderCommand::SetClip { rect } => clip = Some(rect.translate(o.x, o.y)),
                RenderCommand::ClearClip => clip = None,
                RenderCommand::PushTransform { translate } => {
                    offsets.push(o.offset(translate.x, translate.y));
                }
                RenderCommand::PopTransform => {
                    if offsets.len() > 1 {
                        offsets.pop();
                    }
                }
            }
        }
    }

    fn blit(&mut self, from: &Self, src: Rect, dst: Rect) {
        self.stats.blits += 1;
        if src.is_empty() || dst.is_empty() {
            return;
        }
        let sx = src.w / dst.w;
        let sy = src.h / dst.h;
        let (x0, x1) = self.clamp_x(dst.x.floor() as i64, dst.right().ceil() as i64);
        let (y0, y1) = self.clamp_y(dst.y.floor() as i64, dst.bottom().ceil() as i64);
        for y in y0..y1 {
            for x in x0..x1 {
                let fx = src.x + (x as f64 - dst.x) * sx;
                let fy = src.y + (y as f64 - dst.y) * sy;
                if fx < 0.0 || fy < 0.0 {
                    continue;
                }
                if let Some(cell) = from.cell(fx.floor() as usize, fy.floor() as usize) {
                    self.put(x, y, cell.ch, cell.color, None);
                }
            }
        }
    }

    fn measure_text(&self, text: &str, _font_size: f64) -> Option<f64> {
        Some(text.chars().count() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_rect_cells() {
        let mut s = RasterSurface::new(Size::new(10.0, 4.0));
        s.draw(&Drawing::rect(Rect::new(2.0, 1.0, 3.0, 2.0), ThemeToken::GeneFill, None));
        assert_eq!(s.filled_cells(), 6);
        assert_eq!(s.cell(2, 1).map(|c| c.color), Some(ThemeToken::GeneFill));
        assert_eq!(s.cell(5, 1), None);
        assert_eq!(s.stats().draws, 1);
    }

    #[test]
    fn translation_and_transform_stack_apply() {
        let mut s = RasterSurface::new(Size::new(10.0, 4.0));
        s.set_translation(Point::new(1.0, 1.0));
        let d = Drawing::circle(Point::new(0.0, 0.0), 0.0, ThemeToken::SnpPoint).translated(2.0, 0.0);
        s.draw(&d);
        assert!(s.cell(3, 1).is_some());
        assert_eq!(s.filled_cells(), 1);
    }

    #[test]
    fn clip_limits_drawing() {
        let mut s = RasterSurface::new(Size::new(10.0, 2.0));
        s.set_clip(Some(Clip::Rect(Rect::new(0.0, 0.0, 4.0, 2.0))));
        s.draw(&Drawing::rect(Rect::new(0.0, 0.0, 10.0, 1.0), ThemeToken::GeneFill, None));
        assert_eq!(s.filled_cells(), 4);
    }

    #[test]
    fn text_alignment() {
        let mut s = RasterSurface::new(Size::new(10.0, 1.0));
        s.draw(&Drawing::text(
            Point::new(5.0, 0.0),
            "abcd",
            ThemeToken::TextPrimary,
            11.0,
            TextAlign::Center,
        ));
        assert_eq!(s.row_text(0), "   abcd   ");
    }

    #[test]
    fn blit_copies_and_skips_blank_cells() {
        let mut glyph = RasterSurface::new(Size::new(3.0, 3.0));
        glyph.draw(&Drawing::circle(Point::new(1.0, 1.0), 0.0, ThemeToken::SnpPoint));
        let mut target = RasterSurface::new(Size::new(8.0, 3.0));
        target.draw(&Drawing::rect(Rect::new(0.0, 0.0, 8.0, 3.0), ThemeToken::Background, None));
        target.blit(&glyph, glyph.bounds(), Rect::new(4.0, 0.0, 3.0, 3.0));
        assert_eq!(target.cell(5, 1).map(|c| c.color), Some(ThemeToken::SnpPoint));
        assert_eq!(target.cell(4, 0).map(|c| c.color), Some(ThemeToken::Background));
        assert_eq!(target.stats().blits, 1);
    }

    #[test]
    fn blit_scales() {
        let mut src = RasterSurface::new(Size::new(4.0, 1.0));
        src.draw(&Drawing::rect(Rect::new(1.0, 0.0, 1.0, 1.0), ThemeToken::GeneFill, None));
        let mut dst = RasterSurface::new(Size::new(8.0, 1.0));
        dst.blit(&src, src.bounds(), dst.bounds());
        assert_eq!(dst.row_text(0), "  ██    ");
    }

    #[test]
    fn resize_blanks() {
        let mut s = RasterSurface::new(Size::new(4.0, 4.0));
        s.draw(&Drawing::rect(Rect::new(0.0, 0.0, 4.0, 4.0), ThemeToken::GeneFill, None));
        s.resize(Size::new(6.0, 2.0));
        assert_eq!(s.filled_cells(), 0);
        assert_eq!(s.size(), Size::new(6.0, 2.0));
    }

    #[test]
    fn overflowing_cell_count_gives_an_empty_grid() {
        let mut s = RasterSurface::new(Size::new(1e12, 1e12));
        assert_eq!(s.size(), Size::new(0.0, 0.0));
        s.resize(Size::new(3.0, 2.0));
        s.resize(Size::new(f64::MAX, 2e10));
        assert_eq!(s.size(), Size::new(0.0, 0.0));
    }

    #[test]
    fn huge_shapes_are_clamped_to_the_surface() {
        let mut s = RasterSurface::new(Size::new(6.0, 3.0));
        s.draw(&Drawing::rect(Rect::new(-1e12, 1.0, 2e12, 1.0), ThemeToken::SegmentBandEven, None));
        s.draw(&Drawing::line(Point::new(-1e12, 0.0), Point::new(1e12, 0.0), ThemeToken::AxisLine, 1.0));
        assert_eq!(s.row_text(0), "──────");
        assert_eq!(s.row_text(1), "██████");
        assert_eq!(s.row_text(2), "      ");
    }
}
