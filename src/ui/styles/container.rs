// SPDX-License-Identifier: MPL-2.0
//! Container styles.

use crate::ui::design_tokens::{opacity, palette::BLACK, radius};
use iced::widget::container;
use iced::{Background, Border, Color, Theme};

/// Black letterbox surface behind the video.
pub fn video_surface(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(BLACK)),
        ..Default::default()
    }
}

/// Popover panel floating above the control bar.
pub fn popover(text_color: Color) -> impl Fn(&Theme) -> container::Style {
    move |_theme: &Theme| container::Style {
        background: Some(Background::Color(Color {
            a: opacity::OVERLAY_PRESSED,
            ..crate::ui::design_tokens::palette::GRAY_900
        })),
        text_color: Some(text_color),
        border: Border {
            radius: radius::MD.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}
