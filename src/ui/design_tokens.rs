// SPDX-License-Identifier: MPL-2.0
#![doc = r#"
# Design Tokens

Design constants shared by every player widget.

## Organization

- **Palette**: Base colors
- **Opacity**: Standardized opacity levels
- **Spacing**: Spacing scale (8px grid)
- **Sizing**: Component sizes
- **Typography**: Font size scale
- **Radius**: Border radii
- **Shadow**: Shadow definitions

## Examples

```
use iced_reel::ui::design_tokens::{palette, spacing, opacity};
use iced::Color;

let scrim = Color {
    a: opacity::OVERLAY_STRONG,
    ..palette::BLACK
};

let padding = spacing::MD; // 16px
```

The brand colors of a player instance come from its configuration
(`primary_color`, `secondary_color`); the palette below only holds the
neutral tones and the fallbacks.
"#]

use iced::Color;

// ============================================================================
// Color Palette
// ============================================================================

pub mod palette {
    use super::Color;

    // Grayscale
    pub const BLACK: Color = Color::BLACK;
    pub const WHITE: Color = Color::WHITE;
    pub const GRAY_900: Color = Color::from_rgb(0.1, 0.1, 0.1);
    pub const GRAY_700: Color = Color::from_rgb(0.3, 0.3, 0.3);

    /// Fallback accent when the configured primary color does not parse.
    pub const ACCENT: Color = Color::from_rgb(0.012, 0.875, 0.988);
}

// ============================================================================
// Opacity Scale
// ============================================================================

pub mod opacity {
    pub const TRANSPARENT: f32 = 0.0;
    pub const OVERLAY_SUBTLE: f32 = 0.2;
    pub const OVERLAY_MEDIUM: f32 = 0.5;
    pub const OVERLAY_STRONG: f32 = 0.7;
    pub const OVERLAY_HOVER: f32 = 0.8;
    pub const OVERLAY_PRESSED: f32 = 0.9;

    /// Buffered range of the progress bar.
    pub const BUFFERED: f32 = 0.45;
}

// ============================================================================
// Spacing Scale (8px baseline grid)
// ============================================================================

pub mod spacing {
    pub const XXS: f32 = 4.0; // 0.5 unit
    pub const XS: f32 = 8.0; // 1 unit
    pub const SM: f32 = 12.0; // 1.5 units
    pub const MD: f32 = 16.0; // 2 units
    pub const LG: f32 = 24.0; // 3 units
    pub const XL: f32 = 32.0; // 4 units
    pub const XXL: f32 = 48.0; // 6 units
}

// ============================================================================
// Sizing Scale
// ============================================================================

pub mod sizing {
    // Icon sizes
    pub const ICON_MD: f32 = 24.0;
    pub const ICON_LG: f32 = 32.0;
    pub const ICON_XXL: f32 = 64.0;

    pub const BUTTON_HEIGHT: f32 = 36.0;

    // Progress bar
    pub const PROGRESS_HEIGHT: f32 = 16.0;
    pub const PROGRESS_TRACK: f32 = 4.0;
    pub const PROGRESS_TRACK_HOVER: f32 = 6.0;
    pub const SCRUBBER_THUMB: f32 = 12.0;

    /// Displayed size of a scrub preview thumbnail.
    pub const PREVIEW_WIDTH: f32 = 160.0;
    pub const PREVIEW_HEIGHT: f32 = 90.0;

    pub const VOLUME_SLIDER_WIDTH: f32 = 96.0;
    pub const POPOVER_WIDTH: f32 = 260.0;
    pub const PAUSED_INFO_WIDTH: f32 = 520.0;
}

// ============================================================================
// Typography Scale
// ============================================================================

pub mod typography {
    /// Paused-info headline.
    pub const TITLE_LG: f32 = 30.0;

    /// Title bar.
    pub const TITLE_MD: f32 = 20.0;

    /// Popover headers.
    pub const TITLE_SM: f32 = 18.0;

    pub const BODY: f32 = 14.0;

    /// Time labels, badges.
    pub const CAPTION: f32 = 12.0;
}

// ============================================================================
// Border Radius Scale
// ============================================================================

pub mod radius {
    pub const NONE: f32 = 0.0;
    pub const SM: f32 = 4.0;
    pub const MD: f32 = 8.0;
    pub const LG: f32 = 12.0;
    pub const FULL: f32 = 9999.0; // Pill shape
}

// ============================================================================
// Shadow Definitions
// ============================================================================

pub mod shadow {
    use super::palette;
    use iced::{Shadow, Vector};

    pub const NONE: Shadow = Shadow {
        color: palette::BLACK,
        offset: Vector::ZERO,
        blur_radius: 0.0,
    };

    pub const MD: Shadow = Shadow {
        color: palette::BLACK,
        offset: Vector { x: 0.0, y: 4.0 },
        blur_radius: 8.0,
    };
}

// ============================================================================
// Compile-time Validation
// ============================================================================

const _: () = {
    assert!(spacing::XS > 0.0);
    assert!(spacing::SM > spacing::XS);
    assert!(spacing::MD > spacing::SM);
    assert!(spacing::LG > spacing::MD);

    assert!(opacity::TRANSPARENT == 0.0);
    assert!(opacity::OVERLAY_MEDIUM > 0.0 && opacity::OVERLAY_MEDIUM < 1.0);

    assert!(sizing::ICON_XXL > sizing::ICON_LG);
    assert!(sizing::ICON_LG > sizing::ICON_MD);
    assert!(sizing::PROGRESS_TRACK_HOVER > sizing::PROGRESS_TRACK);
    assert!(sizing::PROGRESS_HEIGHT >= sizing::SCRUBBER_THUMB);

    assert!(typography::TITLE_LG > typography::TITLE_MD);
    assert!(typography::TITLE_MD > typography::TITLE_SM);
    assert!(typography::BODY > typography::CAPTION);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_scale_is_consistent() {
        assert_eq!(spacing::MD, spacing::XS * 2.0);
        assert_eq!(spacing::LG, spacing::MD * 1.5);
    }

    #[test]
    fn preview_matches_thumbnail_aspect() {
        let ratio = sizing::PREVIEW_WIDTH / sizing::PREVIEW_HEIGHT;
        #[allow(clippy::cast_precision_loss)]
        let captured = crate::config::THUMBNAIL_WIDTH as f32 / crate::config::THUMBNAIL_HEIGHT as f32;
        assert!((ratio - captured).abs() < 0.01);
    }
}
