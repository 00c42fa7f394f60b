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
// Core mixing logic shared by the cpal callback and the mock device
use crossbeam_channel::Receiver;

use super::cursor::PlaybackCursor;

/// Sums every active cursor into the output. Owned by the audio callback; new
/// cursors arrive over a bounded channel and are drained at the start of each block.
pub struct AudioMixer {
    /// Cursors currently playing
    active: Vec<PlaybackCursor>,
    /// Play requests from the triggering thread
    requests: Receiver<PlaybackCursor>,
    /// Number of output channels
    num_channels: u16,
    /// Sample rate
    sample_rate: u32,
}

impl AudioMixer {
    /// Creates a new mixer. `max_active` cursors are preallocated so the
    /// callback does not allocate while playing up to that many sounds.
    pub fn new(
        requests: Receiver<PlaybackCursor>,
        num_channels: u16,
        sample_rate: u32,
        max_active: usize,
    ) -> Self {
        Self {
            active: Vec::with_capacity(max_active),
            requests,
            num_channels,
            sample_rate,
        }
    }

    /// Mixes one block of interleaved audio into `output`, overwriting it.
    ///
    /// This runs in the real-time callback: it doesn't lock and doesn't allocate
    /// unless more than `max_active` sounds play at once. The mix is a plain sum
    /// with no gain reduction or limiting.
    pub fn process_into_output(&mut self, output: &mut [f32]) {
        while let Ok(cursor) = self.requests.try_recv() {
            self.active.push(cursor);
        }

        output.fill(0.0);

        // Retire cursors as soon as they reach the end.
        self.active.retain_mut(|cursor| {
            cursor.mix_into(output);
            !cursor.is_finished()
        });
    }

    /// Mixes `num_frames` frames into a new buffer.
    pub fn process_frames(&mut self, num_frames: usize) -> Vec<f32> {
        let mut frames = vec![0.0f32; num_frames * self.num_channels as usize];
        self.process_into_output(&mut frames);
        frames
    }

    /// Returns the number of cursors still playing.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Gets the number of output channels
    pub fn num_channels(&self) -> u16 {
        self.num_channels
    }

    /// Gets the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{bounded, Sender};
    use std::sync::Arc;

    fn mixer(num_channels: u16) -> (Sender<PlaybackCursor>, AudioMixer) {
        let (tx, rx) = bounded(16);
        (tx, AudioMixer::new(rx, num_channels, 44100, 8))
    }

    fn cursor(samples: Vec<f32>) -> PlaybackCursor {
        PlaybackCursor::new(Arc::new(samples))
    }

    #[test]
    fn test_basic_mixing() {
        let (tx, mut mixer) = mixer(2);
        tx.send(cursor(vec![0.5, 0.5, 0.8, 0.8])).unwrap();

        let frames = mixer.process_frames(3);
        assert_eq!(frames, vec![0.5, 0.5, 0.8, 0.8, 0.0, 0.0]);
        assert_eq!(mixer.active_count(), 0);
    }

    #[test]
    fn test_constant_sources_sum() {
        let (tx, mut mixer) = mixer(1);
        tx.send(cursor(vec![0.25; 4])).unwrap();
        tx.send(cursor(vec![0.25; 4])).unwrap();

        let frames = mixer.process_frames(4);
        assert_eq!(frames, vec![0.5; 4]);
    }

    #[test]
    fn test_sum_is_not_limited() {
        let (tx, mut mixer) = mixer(1);
        for _ in 0..3 {
            tx.send(cursor(vec![0.75; 2])).unwrap();
        }

        let frames = mixer.process_frames(2);
        assert_eq!(frames, vec![2.25, 2.25]);
    }

    #[test]
    fn test_silence_without_sources() {
        let (_tx, mut mixer) = mixer(2);
        let mut output = vec![1.0; 64];
        for _ in 0..4 {
            mixer.process_into_output(&mut output);
            assert!(output.iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn test_cursor_retires_after_ceil_blocks() {
        let (tx, mut mixer) = mixer(1);
        let block = 256;
        let length = 1000;
        tx.send(cursor(vec![0.1; length])).unwrap();

        // Not active until a callback drains the queue.
        assert_eq!(mixer.active_count(), 0);

        let blocks = length.div_ceil(block);
        let mut output = vec![0.0; block];
        for callback in 1..=blocks {
            mixer.process_into_output(&mut output);
            if callback < blocks {
                assert_eq!(mixer.active_count(), 1, "callback {}", callback);
            }
        }
        assert_eq!(mixer.active_count(), 0);

        // The final block holds the tail followed by silence.
        let tail = length - (blocks - 1) * block;
        assert!(output[..tail].iter().all(|&s| s == 0.1));
        assert!(output[tail..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_exact_block_length_retires_in_same_callback() {
        let (tx, mut mixer) = mixer(1);
        tx.send(cursor(vec![0.1; 128])).unwrap();

        let mut output = vec![0.0; 128];
        mixer.process_into_output(&mut output);
        assert_eq!(mixer.active_count(), 0);
    }

    #[test]
    fn test_sources_added_mid_stream() {
        let (tx, mut mixer) = mixer(1);
        tx.send(cursor(vec![0.5; 6])).unwrap();
        let first = mixer.process_frames(4);
        assert_eq!(first, vec![0.5; 4]);

        tx.send(cursor(vec![0.25; 4])).unwrap();
        let second = mixer.process_frames(4);
        assert_eq!(second, vec![0.75, 0.75, 0.25, 0.25]);
        assert_eq!(mixer.active_count(), 0);
    }

    #[test]
    fn test_same_sound_plays_concurrently() {
        let (tx, mut mixer) = mixer(1);
        let samples = Arc::new(vec![0.1, 0.2, 0.3, 0.4]);
        tx.send(PlaybackCursor::new(samples.clone())).unwrap();
        assert_eq!(mixer.process_frames(2), vec![0.1, 0.2]);

        tx.send(PlaybackCursor::new(samples.clone())).unwrap();
        let frames = mixer.process_frames(2);
        assert!((frames[0] - 0.4).abs() < 1e-6);
        assert!((frames[1] - 0.6).abs() < 1e-6);
        assert_eq!(mixer.active_count(), 1);
        assert_eq!(*samples, vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_more_than_preallocated_cursors() {
        let (tx, rx) = bounded(64);
        let mut mixer = AudioMixer::new(rx, 1, 44100, 2);
        for _ in 0..20 {
            tx.send(cursor(vec![0.01; 10])).unwrap();
        }
        let frames = mixer.process_frames(5);
        assert_eq!(mixer.active_count(), 20);
        assert!((frames[0] - 0.2).abs() < 1e-5);
    }
}
