// SPDX-License-Identifier: MPL-2.0
//! Integration tests to validate style and design token coherence.

#[cfg(test)]
mod tests {
    use iced::Theme;
    use iced_reel::config::PlayerConfig;
    use iced_reel::ui::design_tokens::{opacity, palette, sizing, spacing};
    use iced_reel::ui::styles::{button, container, overlay, slider};
    use iced_reel::ui::theme::PlayerTheme;

    #[test]
    fn all_player_styles_are_callable() {
        let theme = Theme::Dark;
        let status = iced::widget::button::Status::Active;

        let _ = button::control(palette::WHITE)(&theme, status);
        let _ = button::video_play_overlay()(&theme, status);
        let _ = button::popover_entry(palette::ACCENT, palette::WHITE, true)(&theme, status);
        let _ = container::video_surface(&theme);
        let _ = container::popover(palette::WHITE)(&theme);
        let _ = overlay::controls_container(palette::WHITE)(&theme);
        let _ = overlay::scrim(palette::WHITE)(&theme);
        let _ = slider::volume(palette::ACCENT, palette::GRAY_700)(
            &theme,
            iced::widget::slider::Status::Active,
        );
    }

    #[test]
    fn design_tokens_are_accessible() {
        let _ = palette::ACCENT;
        let _ = spacing::MD;
        let _ = opacity::OVERLAY_STRONG;
        let _ = sizing::ICON_LG;
    }

    #[test]
    fn preview_matches_thumbnail_size() {
        assert!((sizing::PREVIEW_WIDTH - iced_reel::config::THUMBNAIL_WIDTH as f32).abs() < f32::EPSILON);
        assert!(
            (sizing::PREVIEW_HEIGHT - iced_reel::config::THUMBNAIL_HEIGHT as f32).abs() < f32::EPSILON
        );
    }

    #[test]
    fn configured_colors_reach_the_theme() {
        let mut config = PlayerConfig::new("clip.mp4");
        config.primary_color = "#e50914".to_string();
        config.secondary_color = "not a color".to_string();

        let theme = PlayerTheme::from_config(&config);
        assert!(theme.primary.r > 0.8 && theme.primary.g < 0.1);
        assert_eq!(theme.secondary, PlayerTheme::default().secondary);
    }
}
