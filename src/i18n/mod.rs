// SPDX-License-Identifier: MPL-2.0
//! Internationalization (i18n) support for the player.
//!
//! Translations are Fluent `.ftl` files embedded at compile time. The active
//! locale is chosen from the CLI, the player configuration, the settings file
//! or the operating system, and falls back to `en-US`.

pub mod fluent;
