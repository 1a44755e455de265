// SPDX-License-Identifier: MPL-2.0
//! Tooltip bubble shown over the control bar buttons.

use crate::ui::design_tokens::{opacity, palette, radius, shadow, spacing, typography};
use iced::widget::{container, tooltip, Container, Text};
use iced::{Background, Border, Color, Element, Font, Theme};

/// Dark bubble with the player's text color, readable over video.
pub fn bubble(text_color: Color) -> impl Fn(&Theme) -> container::Style {
    move |_theme: &Theme| container::Style {
        background: Some(Background::Color(Color {
            a: opacity::OVERLAY_PRESSED,
            ..palette::GRAY_900
        })),
        border: Border {
            radius: radius::SM.into(),
            width: 1.0,
            color: Color {
                a: opacity::OVERLAY_SUBTLE,
                ..palette::WHITE
            },
        },
        shadow: shadow::MD,
        text_color: Some(text_color),
        ..Default::default()
    }
}

/// Wraps `content` in a tooltip placed above it.
pub fn above<'a, Message: 'a>(
    content: impl Into<Element<'a, Message>>,
    tip: String,
    text_color: Color,
    font: Font,
) -> Element<'a, Message> {
    let bubble_content = Container::new(Text::new(tip).size(typography::CAPTION).font(font))
        .padding([spacing::XXS, spacing::XS])
        .style(bubble(text_color));

    tooltip(content, bubble_content, tooltip::Position::Top)
        .gap(spacing::XXS)
        .into()
}
