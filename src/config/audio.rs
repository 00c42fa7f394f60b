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
use serde::Deserialize;

const DEFAULT_DEVICE: &str = "default";
const DEFAULT_SAMPLE_RATE: u32 = 44100;
const DEFAULT_CHANNELS: u16 = 2;
pub(crate) const DEFAULT_STREAM_BUFFER_FRAMES: usize = 512;
const DEFAULT_QUEUE_CAPACITY: usize = 64;
const DEFAULT_MAX_ACTIVE: usize = 32;

/// A YAML representation of the audio output configuration.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Audio {
    /// The audio device. "mock" names select a mock device.
    device: Option<String>,

    /// Output sample rate in Hz (default: 44100)
    sample_rate: Option<u32>,

    /// Output channel count (default: 2)
    channels: Option<u16>,

    /// Frames per cpal callback (default: 512). 0 lets the backend choose.
    stream_buffer_frames: Option<usize>,

    /// Number of play requests that can wait for the next callback (default: 64)
    queue_capacity: Option<usize>,

    /// Number of concurrent sounds the mixer preallocates for (default: 32)
    max_active: Option<usize>,
}

impl Audio {
    /// New will create a new Audio configuration.
    pub fn new(device: &str) -> Audio {
        Audio {
            device: Some(device.to_string()),
            ..Audio::default()
        }
    }

    /// Sets the output format.
    pub fn with_format(mut self, sample_rate: u32, channels: u16) -> Audio {
        self.sample_rate = Some(sample_rate);
        self.channels = Some(channels);
        self
    }

    /// Sets the play queue capacity.
    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Audio {
        self.queue_capacity = Some(queue_capacity);
        self
    }

    /// Returns the device from the configuration.
    pub fn device(&self) -> &str {
        self.device.as_deref().unwrap_or(DEFAULT_DEVICE)
    }

    /// Returns the output sample rate (default: 44100)
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    /// Returns the output channel count (default: 2)
    pub fn channels(&self) -> u16 {
        self.channels.unwrap_or(DEFAULT_CHANNELS)
    }

    /// Returns the frames per callback (default: 512)
    pub fn stream_buffer_frames(&self) -> usize {
        self.stream_buffer_frames
            .unwrap_or(DEFAULT_STREAM_BUFFER_FRAMES)
    }

    /// Returns the play queue capacity (default: 64). Always at least 1.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY).max(1)
    }

    /// Returns the number of preallocated mixer slots (default: 32)
    pub fn max_active(&self) -> usize {
        self.max_active.unwrap_or(DEFAULT_MAX_ACTIVE)
    }
}
