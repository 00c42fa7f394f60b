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
use std::sync::Arc;

/// A read position into a cached sound. The samples are shared with the cache
/// and every other cursor playing the same sound; only the position is owned.
pub struct PlaybackCursor {
    /// Interleaved samples, already in the output format.
    samples: Arc<Vec<f32>>,
    /// Next sample to read. Always <= samples.len().
    position: usize,
}

impl PlaybackCursor {
    /// Creates a cursor at the start of the given samples.
    pub fn new(samples: Arc<Vec<f32>>) -> Self {
        Self {
            samples,
            position: 0,
        }
    }

    /// Returns the current read position in samples.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the total number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the underlying sound has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns true once every sample has been read.
    pub fn is_finished(&self) -> bool {
        self.position == self.samples.len()
    }

    /// Adds the next samples into `output` and advances. Returns the number of
    /// samples mixed, which is less than `output.len()` only at the end.
    #[inline]
    pub fn mix_into(&mut self, output: &mut [f32]) -> usize {
        let remaining = &self.samples[self.position..];
        let count = remaining.len().min(output.len());
        for (out, sample) in output[..count].iter_mut().zip(&remaining[..count]) {
            *out += *sample;
        }
        self.position += count;
        count
    }
}
