// SPDX-License-Identifier: MPL-2.0
//! Centralized icon module.
//!
//! Icons are small monochrome SVGs embedded as string literals. They are drawn
//! in `currentColor` so the overlay style can tint them with the configured
//! secondary color. Handles are cached using `OnceLock`.
//!
//! # Naming Convention
//!
//! Icons use generic visual names describing the icon's appearance,
//! not the action context (e.g., `arrow_left` not `back`).

use iced::widget::svg::{Handle, Svg};
use iced::Length;
use std::sync::OnceLock;

// =============================================================================
// Macro for icon definition with cached handle
// =============================================================================

/// Defines an icon function with a cached handle from a 24x24 SVG body.
macro_rules! define_icon {
    ($name:ident, $body:literal, $doc:literal) => {
        #[doc = $doc]
        pub fn $name() -> Svg<'static> {
            static HANDLE: OnceLock<Handle> = OnceLock::new();
            let handle = HANDLE.get_or_init(|| {
                Handle::from_memory(
                    concat!(
                        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="currentColor">"#,
                        $body,
                        "</svg>"
                    )
                    .as_bytes(),
                )
            });
            Svg::new(handle.clone())
        }
    };
}

// =============================================================================
// Transport Icons
// =============================================================================

define_icon!(play, r#"<path d="M8 5v14l11-7z"/>"#, "Play icon: triangle pointing right.");
define_icon!(
    pause,
    r#"<path d="M6 5h4v14H6zM14 5h4v14h-4z"/>"#,
    "Pause icon: two vertical bars."
);
define_icon!(
    rewind,
    r#"<path d="M11 18V6l-8.5 6zM20 18V6l-8.5 6z"/>"#,
    "Rewind icon: two triangles pointing left."
);
define_icon!(
    fast_forward,
    r#"<path d="M4 18l8.5-6L4 6zM13 6v12l8.5-6z"/>"#,
    "Fast forward icon: two triangles pointing right."
);
define_icon!(
    skip_next,
    r#"<path d="M6 18l8.5-6L6 6zM16 6h2v12h-2z"/>"#,
    "Skip next icon: triangle against a bar."
);

// =============================================================================
// Audio Icons
// =============================================================================

define_icon!(
    speaker,
    r#"<path d="M3 9v6h4l5 5V4L7 9zM16.5 12A4.5 4.5 0 0 0 14 8v8a4.5 4.5 0 0 0 2.5-4zM14 3.2v2.1a7 7 0 0 1 0 13.4v2.1a9 9 0 0 0 0-17.6z"/>"#,
    "Speaker icon with sound waves."
);
define_icon!(
    speaker_muted,
    r#"<path d="M3 9v6h4l5 5V4L7 9zM21 9.4 19.6 8 17 10.6 14.4 8 13 9.4l2.6 2.6L13 14.6l1.4 1.4 2.6-2.6 2.6 2.6 1.4-1.4-2.6-2.6z"/>"#,
    "Speaker icon with a cross."
);

// =============================================================================
// Window and Menu Icons
// =============================================================================

define_icon!(
    expand,
    r#"<path d="M5 5h5v2H7v3H5zM14 5h5v5h-2V7h-3zM5 14h2v3h3v2H5zM17 14h2v5h-5v-2h3z"/>"#,
    "Expand icon: four outward corners."
);
define_icon!(
    arrow_left,
    r#"<path d="M20 11H7.8l5.6-5.6L12 4l-8 8 8 8 1.4-1.4L7.8 13H20z"/>"#,
    "Arrow pointing left."
);
define_icon!(
    list,
    r#"<path d="M3 5h18v2H3zM3 11h18v2H3zM3 17h18v2H3z"/>"#,
    "List icon: three horizontal lines."
);
define_icon!(
    gauge,
    r#"<path d="M12 4a10 10 0 0 0-8.7 15h17.4A10 10 0 0 0 12 4zm1 10.7a2 2 0 1 1-2-3.4l5-3.3z"/>"#,
    "Gauge icon with a needle."
);
define_icon!(
    sliders,
    r#"<path d="M4 6h10v2H4zM18 6h2v2h-2zM14 4h2v6h-2zM4 16h4v2H4zM12 16h8v2h-8zM8 14h2v6H8z"/>"#,
    "Sliders icon: two adjustment bars."
);
define_icon!(
    warning,
    r#"<path d="M1 21h22L12 2zm12-3h-2v-2h2zm0-4h-2v-4h2z"/>"#,
    "Warning icon: exclamation mark in a triangle."
);

// =============================================================================
// Sizing Helpers
// =============================================================================

/// Creates an icon with a fixed square size.
pub fn sized(icon: Svg<'static>, size: f32) -> Svg<'static> {
    icon.width(Length::Fixed(size)).height(Length::Fixed(size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icons_build_from_embedded_svg() {
        for icon in [play(), pause(), speaker_muted(), expand(), warning()] {
            let _ = sized(icon, 16.0);
        }
    }
}
