// SPDX-License-Identifier: MPL-2.0
//! Overlay styles for the control bar, the paused-info scrim and indicators.

use crate::ui::design_tokens::{
    opacity,
    palette::{BLACK, WHITE},
};
use iced::widget::{container, svg};
use iced::{gradient, Background, Border, Color, Radians, Theme};

fn container_background() -> Color {
    Color {
        a: opacity::OVERLAY_STRONG,
        ..BLACK
    }
}

fn container_border() -> Color {
    Color {
        a: opacity::OVERLAY_SUBTLE,
        ..WHITE
    }
}

/// Generic style for indicators like the volume overlay and preview tooltip.
pub fn indicator(rad: f32, text_color: Color) -> impl Fn(&Theme) -> container::Style {
    move |_theme: &Theme| container::Style {
        background: Some(Background::Color(container_background())),
        text_color: Some(text_color),
        border: Border {
            color: container_border(),
            width: 1.0,
            radius: rad.into(),
        },
        ..Default::default()
    }
}

/// Bottom control bar, fading from transparent to dark.
pub fn controls_container(text_color: Color) -> impl Fn(&Theme) -> container::Style {
    move |_theme: &Theme| {
        let fade = gradient::Linear::new(Radians(std::f32::consts::PI))
            .add_stop(0.0, Color::TRANSPARENT)
            .add_stop(1.0, container_background());
        container::Style {
            background: Some(Background::Gradient(fade.into())),
            text_color: Some(text_color),
            ..Default::default()
        }
    }
}

/// Top bar with the title and the back button.
pub fn title_bar(text_color: Color) -> impl Fn(&Theme) -> container::Style {
    move |_theme: &Theme| {
        let fade = gradient::Linear::new(Radians(0.0))
            .add_stop(0.0, Color::TRANSPARENT)
            .add_stop(1.0, container_background());
        container::Style {
            background: Some(Background::Gradient(fade.into())),
            text_color: Some(text_color),
            ..Default::default()
        }
    }
}

/// Full-surface scrim behind the paused-info and error overlays.
pub fn scrim(text_color: Color) -> impl Fn(&Theme) -> container::Style {
    move |_theme: &Theme| container::Style {
        background: Some(Background::Color(Color {
            a: opacity::OVERLAY_MEDIUM,
            ..BLACK
        })),
        text_color: Some(text_color),
        ..Default::default()
    }
}

/// Tints overlay SVG icons.
pub fn icon(color: Color) -> impl Fn(&Theme, svg::Status) -> svg::Style {
    move |_theme: &Theme, _status: svg::Status| svg::Style { color: Some(color) }
}
