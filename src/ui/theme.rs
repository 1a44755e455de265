// SPDX-License-Identifier: MPL-2.0
//! Player colors and font resolved from the configuration.

use crate::config::PlayerConfig;
use crate::ui::design_tokens::palette;
use iced::{Color, Font};

/// Colors and font of one player instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerTheme {
    /// Accent: progress fill, selected entries, spinner.
    pub primary: Color,
    /// Text and icon color on the dark overlays.
    pub secondary: Color,
    pub font: Font,
}

impl Default for PlayerTheme {
    fn default() -> Self {
        Self {
            primary: palette::ACCENT,
            secondary: palette::WHITE,
            font: Font::DEFAULT,
        }
    }
}

impl PlayerTheme {
    /// Parses the configured hex colors, keeping the defaults for values
    /// that do not parse.
    #[must_use]
    pub fn from_config(config: &PlayerConfig) -> Self {
        let fallback = Self::default();
        Self {
            primary: parse_color(&config.primary_color).unwrap_or(fallback.primary),
            secondary: parse_color(&config.secondary_color).unwrap_or(fallback.secondary),
            font: config
                .font_family
                .as_deref()
                .map_or(Font::DEFAULT, font_by_name),
        }
    }
}

fn parse_color(value: &str) -> Option<Color> {
    let parsed = Color::parse(value.trim());
    if parsed.is_none() {
        tracing::warn!(value, "ignoring unparsable color");
    }
    parsed
}

/// Font lookups need a `'static` family name; names are interned once.
fn font_by_name(name: &str) -> Font {
    use std::collections::HashMap;
    use std::sync::{Mutex, OnceLock};

    static NAMES: OnceLock<Mutex<HashMap<String, &'static str>>> = OnceLock::new();
    let names = NAMES.get_or_init(|| Mutex::new(HashMap::new()));
    let Ok(mut names) = names.lock() else {
        return Font::DEFAULT;
    };
    let family: &'static str = names
        .entry(name.to_string())
        .or_insert_with(|| Box::leak(name.to_string().into_boxed_str()));
    Font::with_name(family)
}
