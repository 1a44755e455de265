// SPDX-License-Identifier: MPL-2.0
//! Progress bar with buffered range and hover tracking.
//!
//! The bar reports pointer positions together with its own width, so the
//! player can map them to media time without knowing the layout.

use crate::player::Message;
use crate::ui::design_tokens::{opacity, sizing};
use iced::widget::canvas::{self, Canvas, Frame, Geometry, Path};
use iced::widget::Action;
use iced::{mouse, Color, Event, Length, Point, Rectangle, Renderer, Size, Theme};

/// Snapshot of the values the bar draws.
#[derive(Debug, Clone, Copy)]
pub struct ProgressBar {
    /// Played fraction (0.0 to 1.0).
    pub played: f32,
    /// Buffered fraction (0.0 to 1.0).
    pub buffered: f32,
    pub accent: Color,
    pub rail: Color,
}

impl ProgressBar {
    pub fn into_element(self) -> iced::Element<'static, Message> {
        Canvas::new(self)
            .width(Length::Fill)
            .height(Length::Fixed(sizing::PROGRESS_HEIGHT))
            .into()
    }
}

/// Whether the pointer is over the bar.
#[derive(Debug, Default)]
pub struct Hovering(Option<f32>);

impl canvas::Program<Message> for ProgressBar {
    type State = Hovering;

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<Action<Message>> {
        match event {
            Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if let Some(position) = cursor.position_in(bounds) {
                    state.0 = Some(position.x);
                    return Some(Action::publish(Message::ProgressHovered {
                        x: position.x,
                        width: bounds.width,
                    }));
                }
                if state.0.take().is_some() {
                    return Some(Action::publish(Message::ProgressLeft));
                }
            }
            Event::Mouse(mouse::Event::CursorLeft) => {
                if state.0.take().is_some() {
                    return Some(Action::publish(Message::ProgressLeft));
                }
            }
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(position) = cursor.position_in(bounds) {
                    return Some(
                        Action::publish(Message::ProgressPressed {
                            x: position.x,
                            width: bounds.width,
                        })
                        .and_capture(),
                    );
                }
            }
            _ => {}
        }
        None
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let track = if state.0.is_some() {
            sizing::PROGRESS_TRACK_HOVER
        } else {
            sizing::PROGRESS_TRACK
        };
        let top = (bounds.height - track) / 2.0;
        let segment = |fraction: f32| {
            Path::rectangle(
                Point::new(0.0, top),
                Size::new(bounds.width * fraction.clamp(0.0, 1.0), track),
            )
        };

        frame.fill(
            &segment(1.0),
            Color {
                a: opacity::OVERLAY_SUBTLE,
                ..self.rail
            },
        );
        frame.fill(
            &segment(self.buffered),
            Color {
                a: opacity::BUFFERED,
                ..self.rail
            },
        );
        frame.fill(&segment(self.played), self.accent);

        if let Some(x) = state.0 {
            frame.fill(
                &Path::rectangle(Point::new(x - 1.0, top), Size::new(2.0, track)),
                self.rail,
            );
        }

        let thumb_x = bounds.width * self.played.clamp(0.0, 1.0);
        frame.fill(
            &Path::circle(
                Point::new(thumb_x, bounds.height / 2.0),
                sizing::SCRUBBER_THUMB / 2.0,
            ),
            self.accent,
        );

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }
}

/// Fraction of `total` covered by `value`, 0 for unknown totals.
#[must_use]
pub fn fraction(value: f64, total: f64) -> f32 {
    if total.is_finite() && total > 0.0 {
        #[allow(clippy::cast_possible_truncation)]
        let fraction = (value / total).clamp(0.0, 1.0) as f32;
        fraction
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_is_clamped() {
        assert_eq!(fraction(50.0, 100.0), 0.5);
        assert_eq!(fraction(150.0, 100.0), 1.0);
        assert_eq!(fraction(-1.0, 100.0), 0.0);
    }

    #[test]
    fn unknown_total_is_empty() {
        assert_eq!(fraction(10.0, 0.0), 0.0);
        assert_eq!(fraction(10.0, f64::NAN), 0.0);
    }
}
