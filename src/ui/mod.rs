// SPDX-License-Identifier: MPL-2.0
//! User interface of the player, following the Elm-style "state down,
//! messages up" pattern.
//!
//! - [`player_view`] - The player surface, overlays and control bar
//! - [`widgets`] - Custom Iced widgets (spinner, progress bar)
//! - [`styles`] - Centralized styling (buttons, containers, overlays)
//! - [`design_tokens`] - Design system constants (colors, spacing, sizing)
//! - [`theme`] - Per-player colors and font from the configuration
//! - [`icons`] - Embedded SVG icons

pub mod design_tokens;
pub mod icons;
pub mod player_view;
pub mod styles;
pub mod theme;
pub mod widgets;
