// SPDX-License-Identifier: MPL-2.0
//! Audio output through the system's default device.
//!
//! The `cpal` stream lives on its own thread; the handle shares the sample
//! buffer and the volume, mute and pause state with the device callback.

use crate::config::AUDIO_OUTPUT_BUFFER_SECS;
use crate::error::MediaError;
use crate::player::Volume;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Sample rate and channel count the decoder must resample to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioOutputConfig {
    pub sample_rate: u32,
    pub channels: u16,
}

/// State read by the device callback on every buffer.
#[derive(Debug)]
struct SharedState {
    /// Linear gain, stored as `f32` bits.
    gain_bits: AtomicU32,
    muted: AtomicBool,
    paused: AtomicBool,
}

impl SharedState {
    fn new(volume: Volume, muted: bool) -> Self {
        Self {
            gain_bits: AtomicU32::new(perceptual_gain(volume).to_bits()),
            muted: AtomicBool::new(muted),
            paused: AtomicBool::new(true),
        }
    }

    fn gain(&self) -> f32 {
        f32::from_bits(self.gain_bits.load(Ordering::Relaxed))
    }

    /// Gain the callback applies right now; zero while muted or paused.
    fn effective_gain(&self) -> f32 {
        if self.muted.load(Ordering::Relaxed) || self.paused.load(Ordering::Relaxed) {
            0.0
        } else {
            self.gain()
        }
    }
}

/// Quadratic curve so the slider feels linear to the ear.
fn perceptual_gain(volume: Volume) -> f32 {
    let fraction = volume.as_fraction();
    fraction * fraction
}

type SampleBuffer = Arc<Mutex<VecDeque<f32>>>;

/// Handle to a running output stream. Dropping it closes the device.
pub struct AudioOutput {
    config: AudioOutputConfig,
    shared: Arc<SharedState>,
    buffer: SampleBuffer,
    max_buffered: usize,
    /// Dropped with the handle, which ends the stream thread.
    _shutdown: oneshot::Sender<()>,
}

impl std::fmt::Debug for AudioOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioOutput")
            .field("config", &self.config)
            .field("gain", &self.shared.gain())
            .finish_non_exhaustive()
    }
}

impl AudioOutput {
    /// Opens the default output device. Starts paused.
    pub async fn open(volume: Volume, muted: bool) -> Result<Self, MediaError> {
        let shared = Arc::new(SharedState::new(volume, muted));
        let buffer: SampleBuffer = Arc::new(Mutex::new(VecDeque::new()));
        let (ready_tx, ready_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread_shared = Arc::clone(&shared);
        let thread_buffer = Arc::clone(&buffer);
        std::thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || match start_stream(thread_shared, thread_buffer) {
                Ok((stream, config)) => {
                    let _ = ready_tx.send(Ok(config));
                    // Held until the handle is dropped.
                    let _ = shutdown_rx.blocking_recv();
                    drop(stream);
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                }
            })
            .map_err(|err| MediaError::Other(format!("audio thread: {err}")))?;

        let config = ready_rx
            .await
            .map_err(|_| MediaError::Other("audio thread exited".to_string()))??;

        Ok(Self {
            config,
            shared,
            buffer,
            max_buffered: config.sample_rate as usize
                * usize::from(config.channels)
                * AUDIO_OUTPUT_BUFFER_SECS,
            _shutdown: shutdown_tx,
        })
    }

    #[must_use]
    pub fn config(&self) -> AudioOutputConfig {
        self.config
    }

    /// Appends interleaved samples, dropping what does not fit.
    pub fn queue(&self, samples: &[f32]) {
        let Ok(mut buffer) = self.buffer.lock() else {
            return;
        };
        let room = self.max_buffered.saturating_sub(buffer.len());
        buffer.extend(samples.iter().take(room));
    }

    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
    }

    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::Relaxed);
    }

    pub fn set_volume(&self, volume: Volume) {
        self.shared
            .gain_bits
            .store(perceptual_gain(volume).to_bits(), Ordering::Relaxed);
    }

    pub fn set_muted(&self, muted: bool) {
        self.shared.muted.store(muted, Ordering::Relaxed);
    }
}

fn start_stream(
    shared: Arc<SharedState>,
    buffer: SampleBuffer,
) -> Result<(cpal::Stream, AudioOutputConfig), MediaError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| MediaError::Other("no audio output device".to_string()))?;
    let supported = device
        .default_output_config()
        .map_err(|err| MediaError::Other(format!("audio config: {err}")))?;

    let config = AudioOutputConfig {
        sample_rate: supported.sample_rate(),
        channels: supported.channels(),
    };
    let stream_config: cpal::StreamConfig = supported.config();

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, buffer, shared)?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, buffer, shared)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, buffer, shared)?,
        other => {
            return Err(MediaError::Other(format!(
                "unsupported audio sample format {other:?}"
            )))
        }
    };
    stream
        .play()
        .map_err(|err| MediaError::Other(format!("audio stream: {err}")))?;

    tracing::debug!(
        sample_rate = config.sample_rate,
        channels = config.channels,
        "audio output opened"
    );
    Ok((stream, config))
}

fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    buffer: SampleBuffer,
    shared: Arc<SharedState>,
) -> Result<cpal::Stream, MediaError> {
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let gain = shared.effective_gain();
                match buffer.lock() {
                    // Paused output keeps its samples for the resume.
                    Ok(mut pending) if !shared.paused.load(Ordering::Relaxed) => {
                        fill(data, &mut pending, gain);
                    }
                    _ => data.fill(T::from_sample(0.0_f32)),
                }
            },
            |err| tracing::warn!(%err, "audio output error"),
            None,
        )
        .map_err(|err| MediaError::Other(format!("audio stream: {err}")))
}

/// Writes buffered samples scaled by `gain` into `data`, padding with silence.
fn fill<T: cpal::Sample + cpal::FromSample<f32>>(
    data: &mut [T],
    pending: &mut VecDeque<f32>,
    gain: f32,
) {
    for slot in data.iter_mut() {
        let sample = pending.pop_front().unwrap_or(0.0);
        // Stays below 1.0 so integer formats do not overflow.
        *slot = T::from_sample((sample * gain).clamp(-1.0, 0.999_999_9));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;

    #[test]
    fn gain_follows_a_quadratic_curve() {
        assert_abs_diff_eq!(perceptual_gain(Volume::new(100)), 1.0);
        assert_abs_diff_eq!(perceptual_gain(Volume::new(50)), 0.25);
        assert_abs_diff_eq!(perceptual_gain(Volume::new(0)), 0.0);
    }

    #[test]
    fn mute_and_pause_silence_the_callback() {
        let state = SharedState::new(Volume::new(80), false);
        assert_abs_diff_eq!(state.effective_gain(), 0.0);

        state.paused.store(false, Ordering::Relaxed);
        assert_abs_diff_eq!(state.effective_gain(), 0.64, epsilon = 1e-6);

        state.muted.store(true, Ordering::Relaxed);
        assert_abs_diff_eq!(state.effective_gain(), 0.0);
    }

    #[test]
    fn fill_scales_and_pads_with_silence() {
        let mut pending: VecDeque<f32> = [0.5, -0.5].into_iter().collect();
        let mut data = [1.0_f32; 4];
        fill(&mut data[..], &mut pending, 0.5);

        assert_eq!(data, [0.25, -0.25, 0.0, 0.0]);
        assert!(pending.is_empty());
    }

    #[test]
    fn fill_clips_amplified_peaks() {
        let mut pending: VecDeque<f32> = [1.0, -1.0].into_iter().collect();
        let mut data = [0_i16; 2];
        fill(&mut data[..], &mut pending, 1.0);

        assert!(data[0] > 32_000);
        assert_eq!(data[1], i16::MIN);
    }

    #[tokio::test]
    #[ignore = "requires audio hardware"]
    async fn default_device_opens() {
        let output = AudioOutput::open(Volume::default(), false)
            .await
            .expect("audio device");
        assert!(output.config().sample_rate > 0);
        assert!(output.config().channels > 0);
    }
}
