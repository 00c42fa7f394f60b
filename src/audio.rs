// Copyright (C) 2025 Michael Wilson <mike@mdwn.dev>
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
use std::{fmt, sync::Arc};

use crate::config;

pub mod cpal;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod mixer;
pub mod mock;
pub mod pcm;
pub mod synth;
pub mod wav;

pub use engine::MixingEngine;
pub use error::{DeviceError, SynthError, WavError};
pub use mixer::AudioMixer;
pub use pcm::PcmBuffer;

/// Device name that selects a mock device which fails to open.
pub const MOCK_UNAVAILABLE_DEVICE: &str = "mock-unavailable";

/// The output format of an engine. Fixed for the engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of interleaved output channels
    pub channels: u16,
}

impl OutputFormat {
    /// Creates a new OutputFormat. Zero rates and channel counts are raised to
    /// the smallest usable value.
    pub fn new(sample_rate: u32, channels: u16) -> OutputFormat {
        OutputFormat {
            sample_rate: sample_rate.max(1),
            channels: channels.max(1),
        }
    }
}

impl Default for OutputFormat {
    /// 44.1kHz stereo
    fn default() -> Self {
        OutputFormat {
            sample_rate: 44100,
            channels: 2,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz/{}ch", self.sample_rate, self.channels)
    }
}

/// An audio output that can host the mixer.
pub trait Device: fmt::Display + Send + Sync {
    /// Starts an output stream whose callback drives the given mixer. The stream
    /// runs until the returned handle is dropped.
    fn start(
        &self,
        mixer: AudioMixer,
        buffer_frames: usize,
    ) -> Result<Box<dyn OutputStream>, DeviceError>;
}

/// A running output stream. Dropping it stops the stream and releases the device.
pub trait OutputStream: Send + Sync {
    /// Returns true while the stream is delivering audio.
    fn is_running(&self) -> bool;
}

/// Gets the output device named in the configuration. Names starting with "mock"
/// select a mock device; anything else opens the default output through cpal.
pub fn get_device(config: &config::Audio) -> Arc<dyn Device> {
    let device = config.device();
    if device == MOCK_UNAVAILABLE_DEVICE {
        return Arc::new(mock::Device::unavailable(device));
    }
    if device.starts_with("mock") {
        return Arc::new(mock::Device::get(device));
    }

    Arc::new(cpal::Device::default_output())
}
