// SPDX-License-Identifier: MPL-2.0
//! Buffering spinner drawn on a Canvas.
//!
//! The widget is stateless: the player advances the rotation on each tick
//! while it is waiting on the buffer, and the view rebuilds the spinner.

use crate::ui::design_tokens::sizing;
use iced::widget::canvas::{self, Cache, Canvas, Frame, Geometry, Path, Stroke};
use iced::{mouse, Color, Length, Point, Rectangle, Renderer, Theme};
use std::f32::consts::PI;

/// Arc segments used to approximate the rotating half circle.
const ARC_SEGMENTS: u16 = 30;

pub struct AnimatedSpinner {
    cache: Cache,
    rotation: f32, // Rotation angle in radians
    color: Color,
    size: f32,
}

impl AnimatedSpinner {
    #[must_use]
    pub fn new(color: Color, rotation: f32) -> Self {
        Self {
            cache: Cache::default(),
            rotation,
            color,
            size: sizing::ICON_XXL,
        }
    }

    #[must_use]
    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn into_element<Message: 'static>(self) -> iced::Element<'static, Message> {
        let size = self.size;
        Canvas::new(self)
            .width(Length::Fixed(size))
            .height(Length::Fixed(size))
            .into()
    }
}

impl<Message> canvas::Program<Message> for AnimatedSpinner {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let geometry = self
            .cache
            .draw(renderer, bounds.size(), |frame: &mut Frame| {
                let center = frame.center();
                let radius = frame.width().min(frame.height()) / 2.0 - 4.0;

                // Faint full ring
                frame.stroke(
                    &Path::circle(center, radius),
                    Stroke::default().with_width(4.0).with_color(Color {
                        a: 0.25,
                        ..self.color
                    }),
                );

                // Half circle starting at the top, offset by the rotation
                let start_angle = self.rotation - PI / 2.0;
                let mut arc_path = canvas::path::Builder::new();
                arc_path.move_to(point_on_circle(center, radius, start_angle));
                for i in 1..=ARC_SEGMENTS {
                    let t = f32::from(i) / f32::from(ARC_SEGMENTS);
                    arc_path.line_to(point_on_circle(center, radius, start_angle + PI * t));
                }

                frame.stroke(
                    &arc_path.build(),
                    Stroke::default()
                        .with_width(4.0)
                        .with_color(self.color)
                        .with_line_cap(canvas::LineCap::Round),
                );
            });

        vec![geometry]
    }
}

fn point_on_circle(center: Point, radius: f32, angle: f32) -> Point {
    Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_starts_at_top_without_rotation() {
        let center = Point::new(10.0, 10.0);
        let top = point_on_circle(center, 5.0, -PI / 2.0);
        assert!((top.x - 10.0).abs() < 1e-5);
        assert!((top.y - 5.0).abs() < 1e-5);
    }

    #[test]
    fn size_overrides_default() {
        let spinner = AnimatedSpinner::new(Color::WHITE, 0.0).size(24.0);
        assert_eq!(spinner.size, 24.0);
    }
}
