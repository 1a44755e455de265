// SPDX-License-Identifier: MPL-2.0
//! Player rendering: the video surface with its stacked overlays and the
//! control bar.
//!
//! Layers from bottom to top:
//! 1. video surface (clicks and pointer movement)
//! 2. buffering spinner
//! 3. paused-info overlay
//! 4. autoplay recovery overlay
//! 5. error overlay
//! 6. volume overlay
//! 7. title bar, popover, scrub preview and control bar

use crate::config::{PlayerConfig, NORMAL_RATE_TOKEN};
use crate::i18n::fluent::I18n;
use crate::player::time_units::format_time;
use crate::player::{FrameSource, MediaHandle, Message, Popover, State};
use crate::ui::design_tokens::{radius, sizing, spacing, typography};
use crate::ui::theme::PlayerTheme;
use crate::ui::widgets::progress_bar::{self, ProgressBar};
use crate::ui::widgets::AnimatedSpinner;
use crate::ui::{icons, styles};
use iced::alignment::{Horizontal, Vertical};
use iced::widget::{
    button, image, mouse_area, slider, svg::Svg, Column, Container, Row, Space, Stack, Text,
};
use iced::{ContentFit, Element, Length, Padding};

pub struct ViewContext<'a> {
    pub i18n: &'a I18n,
    pub theme: PlayerTheme,
}

/// Renders the whole player.
pub fn view<'a, M: MediaHandle, F: FrameSource>(
    ctx: ViewContext<'a>,
    state: &'a State<M, F>,
) -> Element<'a, Message> {
    let controller = state.controller();
    let visibility = state.visibility();
    let config = state.config();

    let mut stack = Stack::new()
        .width(Length::Fill)
        .height(Length::Fill)
        .push(video_surface(state));

    if state.shows_spinner() {
        let spinner = AnimatedSpinner::new(ctx.theme.primary, state.spinner_rotation())
            .into_element::<Message>();
        stack = stack.push(centered(spinner));
    }

    if shows_paused_info(state) {
        stack = stack.push(paused_info(&ctx, config));
    }

    if controller.requires_user_interaction() {
        stack = stack.push(autoplay_recovery(&ctx));
    }

    if let Some(error) = controller.error() {
        stack = stack.push(error_overlay(&ctx, config, ctx.i18n.tr(error.i18n_key())));
    }

    if visibility.volume_overlay_visible() {
        stack = stack.push(volume_overlay(
            &ctx,
            controller.volume().value(),
            controller.is_muted(),
        ));
    }

    if visibility.controls_visible() {
        stack = stack.push(controls_layer(&ctx, state));
    }

    stack.into()
}

// ============================================================================
// Surface and overlays
// ============================================================================

/// The paused-info overlay yields to the error and autoplay recovery overlays.
pub fn shows_paused_info<M: MediaHandle, F: FrameSource>(state: &State<M, F>) -> bool {
    let controller = state.controller();
    state.visibility().paused_info_visible()
        && !controller.has_error()
        && !controller.requires_user_interaction()
}

fn video_surface<M: MediaHandle, F: FrameSource>(state: &State<M, F>) -> Element<'_, Message> {
    let content: Element<'_, Message> = match state.current_frame() {
        Some(frame) => image(frame.handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => Space::new().width(Length::Fill).height(Length::Fill).into(),
    };

    let padding = if state.config().full_player {
        0.0
    } else {
        spacing::XXL
    };

    let surface = Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(padding)
        .style(styles::container::video_surface);

    mouse_area(surface)
        .on_press(Message::SurfaceClicked)
        .on_move(|_| Message::PointerMoved)
        .into()
}

fn paused_info<'a>(ctx: &ViewContext<'a>, config: &'a PlayerConfig) -> Element<'a, Message> {
    let headline = config.title_media.as_deref().or(config.title.as_deref());

    let mut info = Column::new()
        .spacing(spacing::XS)
        .max_width(sizing::PAUSED_INFO_WIDTH)
        .push(label(ctx.i18n.tr("player-paused-label"), &ctx.theme).size(typography::BODY));
    if let Some(headline) = headline {
        info = info.push(label(headline.to_string(), &ctx.theme).size(typography::TITLE_LG));
    }
    if let Some(extra) = config.extra_info_media.as_deref() {
        info = info.push(label(extra.to_string(), &ctx.theme).size(typography::BODY));
    }

    let hint = label(ctx.i18n.tr("player-paused-hint"), &ctx.theme).size(typography::TITLE_SM);

    let layout = Column::new()
        .height(Length::Fill)
        .push(
            Container::new(info)
                .height(Length::Fill)
                .align_y(Vertical::Center),
        )
        .push(
            Container::new(hint)
                .width(Length::Fill)
                .align_x(Horizontal::Right),
        );

    Container::new(layout)
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(spacing::XXL)
        .style(styles::overlay::scrim(ctx.theme.secondary))
        .into()
}

fn autoplay_recovery<'a>(ctx: &ViewContext<'a>) -> Element<'a, Message> {
    let play_button = button(icon(icons::play(), sizing::ICON_LG, &ctx.theme))
        .on_press(Message::RecoverPlayback)
        .padding(spacing::MD)
        .style(styles::button::video_play_overlay());

    let content = Column::new()
        .spacing(spacing::SM)
        .align_x(Horizontal::Center)
        .push(play_button)
        .push(label(ctx.i18n.tr("player-autoplay-resume"), &ctx.theme).size(typography::TITLE_SM))
        .push(label(ctx.i18n.tr("player-autoplay-blocked"), &ctx.theme).size(typography::CAPTION));

    centered(content)
}

fn error_overlay<'a>(
    ctx: &ViewContext<'a>,
    config: &'a PlayerConfig,
    message: String,
) -> Element<'a, Message> {
    let mut content = Column::new()
        .spacing(spacing::SM)
        .align_x(Horizontal::Center)
        .push(icon(icons::warning(), sizing::ICON_LG, &ctx.theme))
        .push(label(ctx.i18n.tr("player-error-title"), &ctx.theme).size(typography::TITLE_MD))
        .push(label(message, &ctx.theme).size(typography::BODY));

    // A media error is only recoverable by switching to another rendition.
    let alternatives: Vec<_> = config
        .qualities
        .iter()
        .filter(|quality| !quality.playing)
        .collect();
    if config.qualities.len() > 1 && !alternatives.is_empty() {
        content = content.push(
            label(ctx.i18n.tr("player-error-switch-quality"), &ctx.theme)
                .size(typography::CAPTION),
        );
        let mut choices = Row::new().spacing(spacing::XS);
        for quality in alternatives {
            choices = choices.push(
                button(label(quality.name.clone(), &ctx.theme).size(typography::BODY))
                    .on_press(Message::SelectQuality(quality.id.clone()))
                    .padding([spacing::XXS, spacing::SM])
                    .style(styles::button::control(ctx.theme.secondary)),
            );
        }
        content = content.push(choices);
    }

    let panel = Container::new(content)
        .padding(spacing::LG)
        .max_width(420.0)
        .style(styles::overlay::indicator(radius::MD, ctx.theme.secondary));

    Container::new(panel)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(Horizontal::Center)
        .align_y(Vertical::Center)
        .style(styles::overlay::scrim(ctx.theme.secondary))
        .into()
}

fn volume_overlay<'a>(ctx: &ViewContext<'a>, level: u8, muted: bool) -> Element<'a, Message> {
    let (glyph, text) = if muted {
        (icons::speaker_muted(), ctx.i18n.tr("player-muted"))
    } else {
        let level = level.to_string();
        (
            icons::speaker(),
            ctx.i18n
                .tr_with_args("player-volume-level", &[("level", level.as_str())]),
        )
    };

    let indicator = Container::new(
        Row::new()
            .spacing(spacing::XS)
            .align_y(Vertical::Center)
            .push(icon(glyph, sizing::ICON_MD, &ctx.theme))
            .push(label(text, &ctx.theme).size(typography::TITLE_SM)),
    )
    .padding([spacing::XS, spacing::MD])
    .style(styles::overlay::indicator(radius::LG, ctx.theme.secondary));

    Container::new(indicator)
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(spacing::XL)
        .align_x(Horizontal::Right)
        .align_y(Vertical::Top)
        .into()
}

// ============================================================================
// Controls
// ============================================================================

fn controls_layer<'a, M: MediaHandle, F: FrameSource>(
    ctx: &ViewContext<'a>,
    state: &'a State<M, F>,
) -> Element<'a, Message> {
    let controller = state.controller();
    let config = state.config();

    let mut bottom = Column::new().spacing(spacing::XXS);

    if let Some(popover) = popover_panel(ctx, state) {
        bottom = bottom.push(
            Container::new(popover)
                .width(Length::Fill)
                .align_x(Horizontal::Right),
        );
    }

    if let Some(preview) = scrub_preview(ctx, state) {
        bottom = bottom.push(preview);
    }

    let duration = controller.duration_secs();
    let bar = ProgressBar {
        played: progress_bar::fraction(controller.position_secs(), duration),
        buffered: progress_bar::fraction(controller.buffered_fraction(), 1.0),
        accent: ctx.theme.primary,
        rail: ctx.theme.secondary,
    };
    bottom = bottom.push(bar.into_element()).push(control_row(ctx, state));

    let bottom_bar = Container::new(bottom)
        .width(Length::Fill)
        .padding(Padding {
            top: spacing::XL,
            right: spacing::MD,
            bottom: spacing::SM,
            left: spacing::MD,
        })
        .style(styles::overlay::controls_container(ctx.theme.secondary));

    Column::new()
        .width(Length::Fill)
        .height(Length::Fill)
        .push(title_bar(ctx, config))
        .push(Space::new().height(Length::Fill))
        .push(bottom_bar)
        .into()
}

fn title_bar<'a>(ctx: &ViewContext<'a>, config: &'a PlayerConfig) -> Element<'a, Message> {
    let mut row = Row::new()
        .spacing(spacing::SM)
        .align_y(Vertical::Center);

    if config.back_button {
        row = row.push(control_button(
            icons::arrow_left(),
            Message::Close,
            ctx.i18n.tr("player-back"),
            &ctx.theme,
        ));
    }

    let mut titles = Column::new().spacing(spacing::XXS);
    if let Some(title) = config.title.as_deref() {
        titles = titles.push(label(title.to_string(), &ctx.theme).size(typography::TITLE_MD));
    }
    if let Some(subtitle) = config.subtitle.as_deref() {
        titles = titles.push(label(subtitle.to_string(), &ctx.theme).size(typography::BODY));
    }
    row = row.push(titles);

    Container::new(row)
        .width(Length::Fill)
        .padding(Padding {
            top: spacing::SM,
            right: spacing::MD,
            bottom: spacing::XL,
            left: spacing::MD,
        })
        .style(styles::overlay::title_bar(ctx.theme.secondary))
        .into()
}

fn control_row<'a, M: MediaHandle, F: FrameSource>(
    ctx: &ViewContext<'a>,
    state: &'a State<M, F>,
) -> Element<'a, Message> {
    let controller = state.controller();
    let config = state.config();
    let theme = &ctx.theme;

    let (play_glyph, play_tip) = if controller.is_playing() {
        (icons::pause(), ctx.i18n.tr("player-pause"))
    } else {
        (icons::play(), ctx.i18n.tr("player-play"))
    };
    let (mute_glyph, mute_tip) = if controller.is_muted() {
        (icons::speaker_muted(), ctx.i18n.tr("player-unmute"))
    } else {
        (icons::speaker(), ctx.i18n.tr("player-mute"))
    };

    let volume = slider(
        0..=100u8,
        controller.volume().value(),
        Message::SetVolume,
    )
    .width(Length::Fixed(sizing::VOLUME_SLIDER_WIDTH))
    .style(styles::slider::volume(theme.primary, theme.secondary));

    let time = format!(
        "{} / {}",
        format_time(controller.position_secs()),
        format_time(controller.duration_secs())
    );

    let mut row = Row::new()
        .spacing(spacing::XS)
        .align_y(Vertical::Center)
        .push(control_button(
            play_glyph,
            Message::TogglePlayback,
            play_tip,
            theme,
        ))
        .push(control_button(
            icons::rewind(),
            Message::SkipBackward,
            ctx.i18n.tr("player-skip-back"),
            theme,
        ))
        .push(control_button(
            icons::fast_forward(),
            Message::SkipForward,
            ctx.i18n.tr("player-skip-forward"),
            theme,
        ))
        .push(control_button(mute_glyph, Message::ToggleMute, mute_tip, theme))
        .push(volume)
        .push(label(time, theme).size(typography::CAPTION))
        .push(Space::new().width(Length::Fill));

    if config.data_next.is_some() {
        row = row.push(control_button(
            icons::skip_next(),
            Message::TogglePopover(Popover::NextUp),
            ctx.i18n.tr("player-next"),
            theme,
        ));
    }
    if !config.reproduction_list.is_empty() {
        row = row.push(control_button(
            icons::list(),
            Message::TogglePopover(Popover::Playlist),
            ctx.i18n.tr("player-playlist"),
            theme,
        ));
    }
    if config.playback_rate_enabled {
        row = row.push(control_button(
            icons::gauge(),
            Message::TogglePopover(Popover::PlaybackRate),
            ctx.i18n.tr("player-playback-rate"),
            theme,
        ));
    }
    if !config.qualities.is_empty() {
        row = row.push(control_button(
            icons::sliders(),
            Message::TogglePopover(Popover::Quality),
            ctx.i18n.tr("player-quality"),
            theme,
        ));
    }

    row.push(control_button(
        icons::expand(),
        Message::ToggleFullscreen,
        ctx.i18n.tr("player-fullscreen"),
        theme,
    ))
    .into()
}

/// Hover tooltip above the progress bar: preview thumbnail and time.
fn scrub_preview<'a, M: MediaHandle, F: FrameSource>(
    ctx: &ViewContext<'a>,
    state: &'a State<M, F>,
) -> Option<Element<'a, Message>> {
    let scrub = state.scrub();
    let hover = scrub.hover()?;

    let mut content = Column::new()
        .spacing(spacing::XXS)
        .align_x(Horizontal::Center);
    if scrub.is_enabled() {
        let frame: Element<'a, Message> = match &hover.preview {
            Some(thumbnail) => image(thumbnail.handle.clone())
                .width(Length::Fixed(sizing::PREVIEW_WIDTH))
                .height(Length::Fixed(sizing::PREVIEW_HEIGHT))
                .into(),
            None => {
                let placeholder: Element<'a, Message> = if hover.loading {
                    AnimatedSpinner::new(ctx.theme.primary, state.spinner_rotation())
                        .size(sizing::ICON_MD)
                        .into_element()
                } else {
                    Space::new().into()
                };
                Container::new(placeholder)
                    .width(Length::Fixed(sizing::PREVIEW_WIDTH))
                    .height(Length::Fixed(sizing::PREVIEW_HEIGHT))
                    .align_x(Horizontal::Center)
                    .align_y(Vertical::Center)
                    .into()
            }
        };
        content = content.push(frame);
    }
    content = content
        .push(label(format_time(hover.hovered_secs), &ctx.theme).size(typography::CAPTION));

    let tooltip_box = Container::new(content)
        .padding(spacing::XXS)
        .style(styles::overlay::indicator(radius::SM, ctx.theme.secondary));

    let offset = preview_offset(hover.pointer_x, hover.bar_width, sizing::PREVIEW_WIDTH);
    Some(
        Row::new()
            .push(Space::new().width(Length::Fixed(offset)))
            .push(tooltip_box)
            .into(),
    )
}

/// Left offset that centers a `box_width` tooltip on the pointer while
/// keeping it inside the bar.
fn preview_offset(pointer_x: f32, bar_width: f32, box_width: f32) -> f32 {
    let max = (bar_width - box_width).max(0.0);
    (pointer_x - box_width / 2.0).clamp(0.0, max)
}

// ============================================================================
// Popovers
// ============================================================================

fn popover_panel<'a, M: MediaHandle, F: FrameSource>(
    ctx: &ViewContext<'a>,
    state: &'a State<M, F>,
) -> Option<Element<'a, Message>> {
    let config = state.config();
    let theme = &ctx.theme;

    let (header, body): (String, Column<'a, Message>) = match state.visibility().popover() {
        Popover::Closed => return None,
        Popover::Quality => {
            let mut entries = Column::new().spacing(spacing::XXS);
            for quality in &config.qualities {
                let text = match quality.prefix.as_deref() {
                    Some(prefix) => format!("{} {prefix}", quality.name),
                    None => quality.name.clone(),
                };
                entries = entries.push(popover_entry(
                    text,
                    quality.playing,
                    Message::SelectQuality(quality.id.clone()),
                    theme,
                ));
            }
            (ctx.i18n.tr("player-quality"), entries)
        }
        Popover::PlaybackRate => {
            let current = state.controller().playback_rate();
            let mut entries = Column::new().spacing(spacing::XXS);
            for token in &config.playback_rates {
                let text = if token == NORMAL_RATE_TOKEN {
                    ctx.i18n.tr("player-rate-normal")
                } else {
                    format!("{token}x")
                };
                entries = entries.push(popover_entry(
                    text,
                    current.matches_token(token),
                    Message::SetPlaybackRate(token.clone()),
                    theme,
                ));
            }
            (ctx.i18n.tr("player-playback-rate"), entries)
        }
        Popover::Playlist => {
            let mut entries = Column::new().spacing(spacing::XS);
            for item in &config.reproduction_list {
                let mut entry = Column::new()
                    .spacing(spacing::XXS)
                    .push(label(item.name.clone(), theme).size(typography::BODY));
                if item.playing {
                    entry = entry.push(
                        label(ctx.i18n.tr("player-playing-now"), theme)
                            .size(typography::CAPTION)
                            .color(theme.primary),
                    );
                }
                entry = entry.push(iced::widget::progress_bar(
                    0.0..=100.0,
                    item.percent.clamp(0.0, 100.0),
                ));
                entries = entries.push(
                    button(entry)
                        .on_press(Message::SelectPlaylistItem(item.id.clone()))
                        .width(Length::Fill)
                        .padding(spacing::XS)
                        .style(styles::button::popover_entry(
                            theme.primary,
                            theme.secondary,
                            item.playing,
                        )),
                );
            }
            (ctx.i18n.tr("player-playlist"), entries)
        }
        Popover::NextUp => {
            let next = config.data_next.as_ref()?;
            let mut entries = Column::new()
                .spacing(spacing::XS)
                .push(label(next.title.clone(), theme).size(typography::TITLE_SM));
            if !next.description.is_empty() {
                entries =
                    entries.push(label(next.description.clone(), theme).size(typography::BODY));
            }
            entries = entries.push(
                button(label(ctx.i18n.tr("player-next"), theme).size(typography::BODY))
                    .on_press(Message::NextClicked)
                    .padding([spacing::XXS, spacing::SM])
                    .style(styles::button::video_play_overlay()),
            );
            (ctx.i18n.tr("player-next-up"), entries)
        }
    };

    let panel = Column::new()
        .spacing(spacing::XS)
        .push(label(header, theme).size(typography::TITLE_SM))
        .push(body);

    Some(
        Container::new(panel)
            .width(Length::Fixed(sizing::POPOVER_WIDTH))
            .padding(spacing::SM)
            .style(styles::container::popover(theme.secondary))
            .into(),
    )
}

fn popover_entry<'a>(
    text: String,
    selected: bool,
    on_press: Message,
    theme: &PlayerTheme,
) -> Element<'a, Message> {
    button(label(text, theme).size(typography::BODY))
        .on_press(on_press)
        .width(Length::Fill)
        .padding([spacing::XXS, spacing::XS])
        .style(styles::button::popover_entry(
            theme.primary,
            theme.secondary,
            selected,
        ))
        .into()
}

// ============================================================================
// Helpers
// ============================================================================

fn label<'a>(content: String, theme: &PlayerTheme) -> Text<'a> {
    Text::new(content).font(theme.font)
}

fn icon(glyph: Svg<'static>, size: f32, theme: &PlayerTheme) -> Svg<'static> {
    icons::sized(glyph, size).style(styles::overlay::icon(theme.secondary))
}

fn control_button<'a>(
    glyph: Svg<'static>,
    on_press: Message,
    tip: String,
    theme: &PlayerTheme,
) -> Element<'a, Message> {
    let content: Element<'a, Message> = button(icon(glyph, sizing::ICON_MD, theme))
        .on_press(on_press)
        .padding(spacing::XXS)
        .height(Length::Fixed(sizing::BUTTON_HEIGHT))
        .style(styles::button::control(theme.secondary))
        .into();

    styles::tooltip::above(content, tip, theme.secondary, theme.font)
}

fn centered<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(Horizontal::Center)
        .align_y(Vertical::Center)
        .into()
}
