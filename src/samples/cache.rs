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

//! Sound loading and caching.
//!
//! Sounds are loaded entirely into memory up front so triggering one costs no
//! decoding and no I/O.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::error::LoadError;
use crate::audio::{
    cursor::PlaybackCursor,
    pcm::PcmBuffer,
    wav::{self, WavSpec},
    OutputFormat, WavError,
};

/// A sound ready for the mixer. The samples are stored in an Arc so any number
/// of cursors can play them at once without copying.
#[derive(Clone, Debug)]
pub struct CachedSound {
    /// The logical name of the sound.
    name: String,
    /// Interleaved samples in the output format.
    data: Arc<Vec<f32>>,
    /// Number of channels in the data.
    channel_count: u16,
    /// Sample rate of the data.
    sample_rate: u32,
    /// Format of the source before conversion.
    source: WavSpec,
}

impl CachedSound {
    /// Creates a sound from samples that are already in the given format.
    pub fn from_samples(name: &str, samples: Vec<f32>, format: OutputFormat) -> CachedSound {
        CachedSound {
            name: name.to_string(),
            data: Arc::new(samples),
            channel_count: format.channels,
            sample_rate: format.sample_rate,
            source: WavSpec {
                channels: format.channels,
                sample_rate: format.sample_rate,
                bits_per_sample: 32,
            },
        }
    }

    /// Creates a new cursor at the start of the sound.
    pub fn cursor(&self) -> PlaybackCursor {
        PlaybackCursor::new(self.data.clone())
    }

    /// Returns the name of the sound.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the samples.
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// Returns true if the sound has no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of channels.
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the format the sound was loaded from.
    pub fn source(&self) -> WavSpec {
        self.source
    }

    /// Returns the number of frames.
    pub fn frames(&self) -> usize {
        self.data.len() / self.channel_count.max(1) as usize
    }

    /// Returns the playback duration.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate.max(1) as f64)
    }

    /// Returns the memory size in bytes.
    pub fn memory_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }
}

/// Decodes and stores sounds by name, converted to a single output format.
pub struct SoundCache {
    /// Loaded sounds by name.
    cache: HashMap<String, CachedSound>,
    /// Format every sound is converted to.
    format: OutputFormat,
}

impl SoundCache {
    /// Creates a new, empty cache.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            cache: HashMap::new(),
            format,
        }
    }

    /// Decodes a WAV file held in memory and stores it under `name`.
    /// Returns the cached version if the name is already loaded.
    pub fn load(&mut self, name: &str, bytes: &[u8]) -> Result<CachedSound, LoadError> {
        if let Some(sound) = self.cache.get(name) {
            debug!(name, "Using cached sound");
            return Ok(sound.clone());
        }

        let decoded = wav::decode(bytes)?;
        let spec = decoded.spec();
        self.ingest(name, spec, decoded.into_samples())
    }

    /// Reads a WAV file from disk and stores it under `name`.
    pub fn load_file(&mut self, name: &str, path: &Path) -> Result<CachedSound, LoadError> {
        if let Some(sound) = self.cache.get(name) {
            debug!(name, "Using cached sound");
            return Ok(sound.clone());
        }

        info!(name, path = ?path, "Loading sound into memory");
        let bytes = fs::read(path).map_err(|source| LoadError::AssetMissing {
            path: path.to_path_buf(),
            source,
        })?;
        self.load(name, &bytes)
    }

    /// Stores an already synthesized buffer under `name`.
    pub fn load_pcm(&mut self, name: &str, buffer: &PcmBuffer) -> Result<CachedSound, LoadError> {
        if let Some(sound) = self.cache.get(name) {
            debug!(name, "Using cached sound");
            return Ok(sound.clone());
        }

        let spec = WavSpec {
            channels: buffer.channels(),
            sample_rate: buffer.sample_rate(),
            bits_per_sample: 16,
        };
        self.ingest(name, spec, buffer.to_normalized())
    }

    /// Scales a loaded sound by `gain` and returns the scaled sound. Sounds
    /// already handed out keep their original samples.
    pub fn apply_gain(&mut self, name: &str, gain: f32) -> Option<CachedSound> {
        let sound = self.cache.get_mut(name)?;
        for sample in Arc::make_mut(&mut sound.data).iter_mut() {
            *sample *= gain;
        }
        debug!(name, gain, "Applied gain");
        Some(sound.clone())
    }

    /// Gets a loaded sound.
    pub fn get(&self, name: &str) -> Option<&CachedSound> {
        self.cache.get(name)
    }

    /// Returns the number of loaded sounds.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns true if nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Returns the output format sounds are converted to.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Returns the total memory used by cached sounds.
    pub fn total_memory_usage(&self) -> usize {
        self.cache.values().map(|s| s.memory_size()).sum()
    }

    /// Converts decoded samples to the output format and stores them.
    fn ingest(
        &mut self,
        name: &str,
        source: WavSpec,
        mut samples: Vec<f32>,
    ) -> Result<CachedSound, LoadError> {
        if source.channels == 0 {
            return Err(LoadError::Empty(name.to_string()));
        }
        // A trailing partial frame is dropped.
        let channels = source.channels as usize;
        samples.truncate(samples.len() / channels * channels);
        if samples.is_empty() {
            return Err(LoadError::Empty(name.to_string()));
        }
        if source.sample_rate == 0 {
            return Err(WavError::Format(format!("sound {} has a sample rate of 0", name)).into());
        }

        let resampled = if source.sample_rate != self.format.sample_rate {
            debug!(
                name,
                source_rate = source.sample_rate,
                target_rate = self.format.sample_rate,
                "Resampling sound"
            );
            resample(
                &samples,
                source.channels,
                source.sample_rate,
                self.format.sample_rate,
            )
        } else {
            samples
        };
        let converted = convert_channels(resampled, source.channels, self.format.channels);
        if converted.is_empty() {
            return Err(LoadError::Empty(name.to_string()));
        }

        let sound = CachedSound {
            name: name.to_string(),
            data: Arc::new(converted),
            channel_count: self.format.channels,
            sample_rate: self.format.sample_rate,
            source,
        };

        info!(
            name,
            source_channels = source.channels,
            source_rate = source.sample_rate,
            source_bits = source.bits_per_sample,
            duration_ms = sound.duration().as_millis(),
            memory_kb = sound.memory_size() / 1024,
            "Sound loaded"
        );

        self.cache.insert(name.to_string(), sound.clone());
        Ok(sound)
    }
}

impl std::fmt::Debug for SoundCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundCache")
            .field("cached_sounds", &self.cache.len())
            .field("format", &self.format)
            .field("total_memory_kb", &(self.total_memory_usage() / 1024))
            .finish()
    }
}

/// Resamples interleaved audio using linear interpolation. Plenty for short
/// one-shots.
fn resample(samples: &[f32], channel_count: u16, source_rate: u32, target_rate: u32) -> Vec<f32> {
    let ratio = target_rate as f64 / source_rate as f64;
    let channels = channel_count.max(1) as usize;
    let source_frames = samples.len() / channels;
    let target_frames = (source_frames as f64 * ratio).ceil() as usize;

    let mut output = Vec::with_capacity(target_frames * channels);

    for target_frame in 0..target_frames {
        let source_pos = target_frame as f64 / ratio;
        let source_frame = source_pos.floor() as usize;
        let frac = source_pos.fract() as f32;

        for channel in 0..channels {
            let idx0 = source_frame * channels + channel;
            let idx1 = (source_frame + 1) * channels + channel;

            let s0 = samples.get(idx0).copied().unwrap_or(0.0);
            let s1 = samples.get(idx1).copied().unwrap_or(s0);

            output.push(s0 + (s1 - s0) * frac);
        }
    }

    output
}

/// Converts interleaved audio between channel counts. Mono is copied to every
/// output channel; extra source channels are averaged into the output channel
/// they wrap onto. A trailing partial frame is dropped.
fn convert_channels(mut samples: Vec<f32>, from: u16, to: u16) -> Vec<f32> {
    let from = from.max(1) as usize;
    let to = to.max(1) as usize;
    let frames = samples.len() / from;
    if from == to {
        samples.truncate(frames * from);
        return samples;
    }

    let mut output = Vec::with_capacity(frames * to);
    for frame in samples.chunks_exact(from) {
        if from < to {
            output.extend((0..to).map(|channel| frame[channel % from]));
        } else {
            output.extend((0..to).map(|channel| {
                let sources = frame.iter().skip(channel).step_by(to);
                let count = sources.clone().count();
                sources.sum::<f32>() / count as f32
            }));
        }
    }
    output
}
