// SPDX-License-Identifier: MPL-2.0
//! Centralized button styles.

use crate::ui::design_tokens::{
    opacity,
    palette::{BLACK, WHITE},
    radius, shadow,
};
use iced::widget::button;
use iced::{Background, Border, Color, Theme};

/// Transparent control-bar button; only the hover state shows a backdrop.
pub fn control(text_color: Color) -> impl Fn(&Theme, button::Status) -> button::Style {
    move |_theme: &Theme, status: button::Status| {
        let background = match status {
            button::Status::Hovered => Some(Background::Color(Color {
                a: opacity::OVERLAY_SUBTLE,
                ..WHITE
            })),
            button::Status::Pressed => Some(Background::Color(Color {
                a: opacity::OVERLAY_MEDIUM,
                ..WHITE
            })),
            _ => None,
        };
        let text_color = match status {
            button::Status::Disabled => Color {
                a: opacity::OVERLAY_MEDIUM,
                ..text_color
            },
            _ => text_color,
        };

        button::Style {
            background,
            text_color,
            border: Border {
                radius: radius::SM.into(),
                ..Default::default()
            },
            shadow: shadow::NONE,
            snap: true,
        }
    }
}

/// Round button over the video (autoplay recovery, center play).
pub fn video_play_overlay() -> impl Fn(&Theme, button::Status) -> button::Style {
    move |_theme: &Theme, status: button::Status| {
        let alpha = match status {
            button::Status::Hovered => opacity::OVERLAY_HOVER,
            button::Status::Pressed => opacity::OVERLAY_STRONG,
            _ => opacity::OVERLAY_MEDIUM,
        };

        button::Style {
            background: Some(Background::Color(Color { a: alpha, ..BLACK })),
            text_color: WHITE,
            border: Border {
                radius: radius::FULL.into(),
                ..Default::default()
            },
            shadow: shadow::MD,
            snap: true,
        }
    }
}

/// Popover entry; the selected one is drawn in the accent color.
pub fn popover_entry(
    accent: Color,
    text_color: Color,
    selected: bool,
) -> impl Fn(&Theme, button::Status) -> button::Style {
    move |_theme: &Theme, status: button::Status| {
        let background = match status {
            button::Status::Hovered | button::Status::Pressed => {
                Some(Background::Color(Color {
                    a: opacity::OVERLAY_SUBTLE,
                    ..WHITE
                }))
            }
            _ => None,
        };

        button::Style {
            background,
            text_color: if selected { accent } else { text_color },
            border: Border {
                radius: radius::SM.into(),
                ..Default::default()
            },
            shadow: shadow::NONE,
            snap: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_button_only_has_backdrop_on_hover() {
        let theme = Theme::Dark;
        let style_fn = control(WHITE);

        assert!(style_fn(&theme, button::Status::Active).background.is_none());
        assert!(style_fn(&theme, button::Status::Hovered).background.is_some());
    }

    #[test]
    fn overlay_button_alpha_changes_on_hover() {
        let theme = Theme::Dark;
        let style_fn = video_play_overlay();

        let normal = style_fn(&theme, button::Status::Active);
        let hover = style_fn(&theme, button::Status::Hovered);

        assert_ne!(normal.background, hover.background);
    }

    #[test]
    fn selected_entry_uses_accent() {
        let accent = Color::from_rgb(1.0, 0.0, 0.0);
        let style = popover_entry(accent, WHITE, true)(&Theme::Dark, button::Status::Active);
        assert_eq!(style.text_color, accent);
    }
}
