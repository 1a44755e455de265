// SPDX-License-Identifier: MPL-2.0
//! Slider style for the volume control.

use crate::ui::design_tokens::opacity;
use iced::widget::slider;
use iced::{Background, Border, Color, Theme};

/// Filled part in the accent color, remainder in faded text color.
pub fn volume(accent: Color, rail: Color) -> impl Fn(&Theme, slider::Status) -> slider::Style {
    move |_theme: &Theme, status: slider::Status| {
        let handle_radius = match status {
            slider::Status::Hovered | slider::Status::Dragged => 7.0,
            slider::Status::Active => 5.0,
        };

        slider::Style {
            rail: slider::Rail {
                backgrounds: (
                    Background::Color(accent),
                    Background::Color(Color {
                        a: opacity::OVERLAY_SUBTLE,
                        ..rail
                    }),
                ),
                width: 4.0,
                border: Border {
                    color: Color::TRANSPARENT,
                    width: 0.0,
                    radius: 2.0.into(),
                },
            },
            handle: slider::Handle {
                shape: slider::HandleShape::Circle {
                    radius: handle_radius,
                },
                background: Background::Color(accent),
                border_width: 0.0,
                border_color: Color::TRANSPARENT,
            },
        }
    }
}
