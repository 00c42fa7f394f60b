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

use parking_lot::Mutex;
use tracing::info;

use super::{error::DeviceError, mixer::AudioMixer, OutputStream};

/// A mock device. Doesn't play anything; the mixer it's handed is rendered on
/// demand instead of by a hardware callback.
#[derive(Clone)]
pub struct Device {
    name: String,
    available: bool,
    mixer: Arc<Mutex<Option<AudioMixer>>>,
}

impl Device {
    /// Gets the given mock device.
    pub fn get(name: &str) -> Device {
        Device {
            name: name.to_string(),
            available: true,
            mixer: Arc::new(Mutex::new(None)),
        }
    }

    /// Gets a mock device that fails to start, like a machine with no sound card.
    pub fn unavailable(name: &str) -> Device {
        Device {
            available: false,
            ..Device::get(name)
        }
    }

    /// Runs one callback of `num_frames` frames through the started mixer.
    /// Returns None if no stream is running.
    pub fn render(&self, num_frames: usize) -> Option<Vec<f32>> {
        self.mixer
            .lock()
            .as_mut()
            .map(|mixer| mixer.process_frames(num_frames))
    }

    /// Returns the number of sounds the mixer is currently playing.
    pub fn active_count(&self) -> usize {
        self.mixer
            .lock()
            .as_ref()
            .map_or(0, |mixer| mixer.active_count())
    }

    /// Returns true while a stream started on this device is alive.
    pub fn is_running(&self) -> bool {
        self.mixer.lock().is_some()
    }
}

impl super::Device for Device {
    fn start(
        &self,
        mixer: AudioMixer,
        buffer_frames: usize,
    ) -> Result<Box<dyn OutputStream>, DeviceError> {
        if !self.available {
            return Err(DeviceError::Unavailable(self.name.clone()));
        }

        info!(
            device = self.name,
            sample_rate = mixer.sample_rate(),
            channels = mixer.num_channels(),
            buffer_frames,
            "Starting mock output stream."
        );
        *self.mixer.lock() = Some(mixer);
        Ok(Box::new(MockStream {
            mixer: self.mixer.clone(),
        }))
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.available {
            write!(f, "{} (Mock)", self.name)
        } else {
            write!(f, "{} (Mock, unavailable)", self.name)
        }
    }
}

/// The stream handle for a mock device. Dropping it releases the mixer.
struct MockStream {
    mixer: Arc<Mutex<Option<AudioMixer>>>,
}

impl OutputStream for MockStream {
    fn is_running(&self) -> bool {
        self.mixer.lock().is_some()
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        self.mixer.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossbeam_channel::bounded;

    use crate::audio::{cursor::PlaybackCursor, Device as _};

    use super::*;

    #[test]
    fn test_render_started_mixer() {
        let device = Device::get("mock");
        assert!(device.render(4).is_none());

        let (tx, rx) = bounded(4);
        let stream = device.start(AudioMixer::new(rx, 1, 44100, 4), 4).unwrap();
        assert!(stream.is_running());
        assert!(device.is_running());

        tx.send(PlaybackCursor::new(Arc::new(vec![0.5; 6]))).unwrap();
        assert_eq!(device.render(4).unwrap(), vec![0.5; 4]);
        assert_eq!(device.active_count(), 1);

        drop(stream);
        assert!(!device.is_running());
        assert!(device.render(4).is_none());
        assert_eq!(device.active_count(), 0);
    }

    #[test]
    fn test_unavailable_device() {
        let device = Device::unavailable("mock-unavailable");
        let (_tx, rx) = bounded(4);
        let result = device.start(AudioMixer::new(rx, 2, 44100, 4), 512);
        assert!(matches!(result, Err(DeviceError::Unavailable(_))));
        assert!(!device.is_running());
    }
}
