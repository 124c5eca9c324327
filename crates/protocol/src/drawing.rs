use serde::{Deserialize, Serialize};

use crate::commands::{RenderCommand, TextAlign};
use crate::ident::Ident;
use crate::theme::ThemeToken;
use crate::types::{Point, Rect};

/// A composable vector drawing.
///
/// Drawings are values: composing two drawings overlays the second on top
/// of the first, and positioning one wraps it in a transform. Nothing is
/// rasterized until a surface consumes the command list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    commands: Vec<RenderCommand>,
}

impl Drawing {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_commands(commands: Vec<RenderCommand>) -> Self {
        Self { commands }
    }

    pub fn rect(rect: Rect, color: ThemeToken, border_color: Option<ThemeToken>) -> Self {
        Self::from_commands(vec![RenderCommand::DrawRect {
            rect,
            color,
            border_color,
        }])
    }

    pub fn circle(center: Point, radius: f64, color: ThemeToken) -> Self {
        Self::from_commands(vec![RenderCommand::DrawCircle {
            center,
            radius,
            color,
        }])
    }

    pub fn line(from: Point, to: Point, color: ThemeToken, width: f64) -> Self {
        Self::from_commands(vec![RenderCommand::DrawLine {
            from,
            to,
            color,
            width,
        }])
    }

    pub fn path(points: Vec<Point>, color: ThemeToken, width: f64) -> Self {
        Self::from_commands(vec![RenderCommand::DrawPath {
            points,
            color,
            width,
        }])
    }

    pub fn text(
        position: Point,
        text: impl Into<Ident>,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    ) -> Self {
        Self::from_commands(vec![RenderCommand::DrawText {
            position,
            text: text.into(),
            color,
            font_size,
            align,
        }])
    }

    /// `other` drawn on top of `self`.
    pub fn overlay(mut self, other: Drawing) -> Self {
        self.commands.extend(other.commands);
        self
    }

    pub fn push(&mut self, other: Drawing) {
        self.commands.extend(other.commands);
    }

    pub fn translated(self, dx: f64, dy: f64) -> Self {
        if self.commands.is_empty() {
            return self;
        }
        let mut commands = Vec::with_capacity(self.commands.len() + 2);
        commands.push(RenderCommand::PushTransform {
            translate: Point::new(dx, dy),
        });
        commands.extend(self.commands);
        commands.push(RenderCommand::PopTransform);
        Self { commands }
    }

    pub fn clipped(self, rect: Rect) -> Self {
        let mut commands = Vec::with_capacity(self.commands.len() + 2);
        commands.push(RenderCommand::SetClip { rect });
        commands.extend(self.commands);
        commands.push(RenderCommand::ClearClip);
        Self { commands }
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

impl FromIterator<Drawing> for Drawing {
    fn from_iter<I: IntoIterator<Item = Drawing>>(iter: I) -> Self {
        iter.into_iter().fold(Drawing::empty(), Drawing::overlay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_keeps_order() {
        let a = Drawing::circle(Point::new(0.0, 0.0), 2.0, ThemeToken::SnpPoint);
        let b = Drawing::rect(Rect::new(0.0, 0.0, 1.0, 1.0), ThemeToken::GeneFill, None);
        let both = a.overlay(b);
        assert_eq!(both.len(), 2);
        assert!(matches!(both.commands()[0], RenderCommand::DrawCircle { .. }));
        assert!(matches!(both.commands()[1], RenderCommand::DrawRect { .. }));
    }

    #[test]
    fn translated_wraps_in_transform() {
        let d = Drawing::circle(Point::new(0.0, 0.0), 2.0, ThemeToken::SnpPoint).translated(5.0, 1.0);
        assert_eq!(d.len(), 3);
        assert!(matches!(
            d.commands()[0],
            RenderCommand::PushTransform { translate } if translate == Point::new(5.0, 1.0)
        ));
        assert!(matches!(d.commands()[2], RenderCommand::PopTransform));
    }

    #[test]
    fn translating_empty_stays_empty() {
        assert!(Drawing::empty().translated(3.0, 3.0).is_empty());
    }

    #[test]
    fn collects_into_one_drawing() {
        let d: Drawing = (0..3)
            .map(|i| Drawing::circle(Point::new(f64::from(i), 0.0), 1.0, ThemeToken::SnpPoint))
            .collect();
        assert_eq!(d.len(), 3);
    }
}
