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
use std::time::Duration;

/// Scale used to move between 16-bit samples and normalized floats.
pub const PCM16_SCALE: f32 = 32768.0;

/// A block of 16-bit PCM audio (interleaved if multi-channel).
/// The samples can't be modified once the buffer has been produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl PcmBuffer {
    /// Creates a new PCM buffer.
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> PcmBuffer {
        PcmBuffer {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Returns the raw samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the number of channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Returns the number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Returns true if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the playback duration of the buffer.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Returns the samples normalized to [-1.0, 1.0).
    pub fn to_normalized(&self) -> Vec<f32> {
        self.samples
            .iter()
            .map(|&sample| sample as f32 / PCM16_SCALE)
            .collect()
    }
}

/// Converts a 16-bit scaled value to a sample, clamping to the valid range and
/// truncating toward zero.
pub fn quantize(value: f64) -> i16 {
    value.clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_and_duration() {
        let buffer = PcmBuffer::new(vec![0; 44100], 44100, 1);
        assert_eq!(buffer.frames(), 44100);
        assert_eq!(buffer.duration(), Duration::from_secs(1));

        let stereo = PcmBuffer::new(vec![0; 8], 8, 2);
        assert_eq!(stereo.frames(), 4);
        assert_eq!(stereo.duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_zero_channels_has_no_frames() {
        let buffer = PcmBuffer::new(vec![1, 2, 3], 44100, 0);
        assert_eq!(buffer.frames(), 0);
        assert_eq!(buffer.duration(), Duration::ZERO);
    }

    #[test]
    fn test_quantize_clamps_and_truncates() {
        assert_eq!(quantize(40000.0), i16::MAX);
        assert_eq!(quantize(-40000.0), i16::MIN);
        assert_eq!(quantize(1.9), 1);
        assert_eq!(quantize(-1.9), -1);
        assert_eq!(quantize(f64::NAN), 0);
    }

    #[test]
    fn test_to_normalized() {
        let buffer = PcmBuffer::new(vec![i16::MIN, 0, 16384], 44100, 1);
        assert_eq!(buffer.to_normalized(), vec![-1.0, 0.0, 0.5]);
    }
}
