// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use crossbeam_channel::{Sender, TrySendError};
use tracing::{debug, error, info, warn};

use super::{cursor::PlaybackCursor, mixer::AudioMixer, Device, OutputFormat, OutputStream};
use crate::{config, samples::CachedSound};

/// Owns the output stream and hands play requests to its callback.
///
/// An engine whose device couldn't be opened is disabled: every `play` is a
/// silent no-op and nothing ever fails.
pub struct MixingEngine {
    /// Producer side of the play queue. None when disabled.
    requests: Option<Sender<PlaybackCursor>>,
    /// The running stream. Dropping it stops playback.
    stream: Option<Box<dyn OutputStream>>,
    /// Output format, fixed at creation.
    format: OutputFormat,
}

impl MixingEngine {
    /// Opens the device and starts the output stream. Failure to open is logged
    /// and yields a disabled engine.
    pub fn new(device: &dyn Device, config: &config::Audio) -> MixingEngine {
        let format = OutputFormat::new(config.sample_rate(), config.channels());
        let (tx, rx) = crossbeam_channel::bounded(config.queue_capacity().max(1));
        let mixer = AudioMixer::new(rx, format.channels, format.sample_rate, config.max_active());

        match device.start(mixer, config.stream_buffer_frames()) {
            Ok(stream) => {
                info!(
                    device = device.to_string(),
                    format = format.to_string(),
                    "Audio output started."
                );
                MixingEngine {
                    requests: Some(tx),
                    stream: Some(stream),
                    format,
                }
            }
            Err(e) => {
                error!(
                    device = device.to_string(),
                    err = e.to_string(),
                    "Unable to open audio output, sound is disabled."
                );
                MixingEngine::disabled(format)
            }
        }
    }

    /// Creates an engine with no output. Every play is dropped.
    pub fn disabled(format: OutputFormat) -> MixingEngine {
        MixingEngine {
            requests: None,
            stream: None,
            format,
        }
    }

    /// Queues the sound to start at the next callback. Never blocks and never
    /// fails; requests that can't be honored are dropped.
    pub fn play(&self, sound: &CachedSound) {
        let Some(requests) = &self.requests else {
            return;
        };

        if sound.channel_count() != self.format.channels
            || sound.sample_rate() != self.format.sample_rate
        {
            warn!(
                sound = sound.name(),
                "Sound is not in the engine's output format, ignoring."
            );
            return;
        }

        if sound.is_empty() {
            return;
        }

        match requests.try_send(sound.cursor()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!(sound = sound.name(), "Play queue full, dropping request.");
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!(sound = sound.name(), "Output stream is gone, dropping request.");
            }
        }
    }

    /// Returns true if the output stream opened.
    pub fn is_enabled(&self) -> bool {
        self.stream.is_some()
    }

    /// Returns true while the output stream is delivering audio.
    pub fn is_running(&self) -> bool {
        self.stream.as_ref().is_some_and(|stream| stream.is_running())
    }

    /// Gets the output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

impl Drop for MixingEngine {
    fn drop(&mut self) {
        if self.stream.take().is_some() {
            info!("Audio output stopped.");
        }
    }
}
