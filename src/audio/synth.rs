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

//! Procedural generators for short retro sound effects.
//!
//! Every generator produces mono 16-bit PCM at [`SYNTH_SAMPLE_RATE`]. The
//! waveform is computed and quantized first, then the envelope is multiplied in
//! and the result quantized again, so the envelope never affects the phase.

use std::f64::consts::TAU;

use rand::Rng;
use serde::Deserialize;

use super::{
    error::SynthError,
    pcm::{quantize, PcmBuffer},
};

/// Sample rate of every synthesized buffer.
pub const SYNTH_SAMPLE_RATE: u32 = 44_100;

/// Amplitude shaping over normalized time t in [0, 1).
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Envelope {
    /// Constant full amplitude.
    #[default]
    None,
    /// Linear decay, 1 - t.
    Linear,
    /// Power decay, (1 - t)^2.
    Power,
}

impl Envelope {
    /// Returns the amplitude factor at normalized time t.
    pub fn factor(self, t: f64) -> f64 {
        match self {
            Envelope::None => 1.0,
            Envelope::Linear => 1.0 - t,
            Envelope::Power => (1.0 - t).powi(2),
        }
    }
}

/// How a tone's sine is turned into samples.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToneStyle {
    /// The sine scaled by the amplitude.
    #[default]
    Smooth,
    /// The sine's sign at full amplitude, for a hard retro beep.
    Clipped,
}

/// Returns the number of samples in a buffer of the given duration.
pub fn sample_count(duration_ms: u32) -> usize {
    (SYNTH_SAMPLE_RATE as u64 * duration_ms as u64 / 1000) as usize
}

/// Renders `n` samples. `wave` receives the sample index and normalized time and
/// returns the unshaped value at 16-bit scale. Both the wave and the shaped
/// sample are truncated to 16 bits.
fn render<F>(n: usize, envelope: Envelope, mut wave: F) -> PcmBuffer
where
    F: FnMut(usize, f64) -> f64,
{
    let samples = (0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            quantize(quantize(wave(i, t)) as f64 * envelope.factor(t))
        })
        .collect();
    PcmBuffer::new(samples, SYNTH_SAMPLE_RATE, 1)
}

/// A fixed frequency tone, `sin(2π·f·i/sr)`.
pub fn tone(
    frequency: f64,
    duration_ms: u32,
    amplitude: f64,
    style: ToneStyle,
    envelope: Envelope,
) -> PcmBuffer {
    let sr = SYNTH_SAMPLE_RATE as f64;
    render(sample_count(duration_ms), envelope, |i, _| {
        let s = (TAU * frequency * i as f64 / sr).sin();
        match style {
            ToneStyle::Smooth => s * amplitude,
            ToneStyle::Clipped => {
                if s > 0.0 {
                    amplitude
                } else {
                    -amplitude
                }
            }
        }
    })
}

/// A tone whose frequency moves linearly from `start_frequency` to `end_frequency`.
///
/// The phase is taken from the instantaneous frequency and the absolute sample
/// index rather than being integrated, which gives the sweep its characteristic
/// warble.
pub fn swept_tone(
    start_frequency: f64,
    end_frequency: f64,
    duration_ms: u32,
    amplitude: f64,
    envelope: Envelope,
) -> PcmBuffer {
    let sr = SYNTH_SAMPLE_RATE as f64;
    render(sample_count(duration_ms), envelope, |i, t| {
        let frequency = start_frequency + (end_frequency - start_frequency) * t;
        (TAU * frequency * i as f64 / sr).sin() * amplitude
    })
}

/// Uniform white noise in [-amplitude, amplitude). The amplitude is limited to
/// the 16-bit range; a non-finite amplitude gives silence.
pub fn noise<R: Rng + ?Sized>(
    duration_ms: u32,
    amplitude: f64,
    envelope: Envelope,
    rng: &mut R,
) -> PcmBuffer {
    let amplitude = if amplitude.is_finite() {
        amplitude.min(i16::MAX as f64)
    } else {
        0.0
    };
    render(sample_count(duration_ms), envelope, |_, _| {
        if amplitude > 0.0 {
            rng.gen_range(-amplitude..amplitude)
        } else {
            0.0
        }
    })
}

/// A rough square wave sliding between two frequencies.
///
/// The square is derived from normalized time, `(t mod 1/f) > 0.5/f`, and is not
/// band limited.
pub fn square_slide(
    start_frequency: f64,
    end_frequency: f64,
    duration_ms: u32,
    amplitude: f64,
    envelope: Envelope,
) -> PcmBuffer {
    render(sample_count(duration_ms), envelope, |_, t| {
        let frequency = start_frequency + (end_frequency - start_frequency) * t;
        let period = 1.0 / frequency;
        if t % period > 0.5 * period {
            amplitude
        } else {
            -amplitude
        }
    })
}

/// A sequence of tones of equal length. The envelope restarts on every note.
pub fn arpeggio(
    frequencies: &[f64],
    note_ms: u32,
    amplitude: f64,
    style: ToneStyle,
    envelope: Envelope,
) -> PcmBuffer {
    let mut samples = Vec::with_capacity(sample_count(note_ms) * frequencies.len());
    for &frequency in frequencies {
        let note = tone(frequency, note_ms, amplitude, style, envelope);
        samples.extend_from_slice(note.samples());
    }
    PcmBuffer::new(samples, SYNTH_SAMPLE_RATE, 1)
}

/// A description of a synthesized sound that can be rendered on demand.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "waveform", rename_all = "snake_case")]
pub enum Recipe {
    Tone {
        frequency: f64,
        duration_ms: u32,
        amplitude: f64,
        #[serde(default)]
        style: ToneStyle,
        #[serde(default)]
        envelope: Envelope,
    },
    SweptTone {
        start_frequency: f64,
        end_frequency: f64,
        duration_ms: u32,
        amplitude: f64,
        #[serde(default)]
        envelope: Envelope,
    },
    Noise {
        duration_ms: u32,
        amplitude: f64,
        #[serde(default)]
        envelope: Envelope,
    },
    SquareSlide {
        start_frequency: f64,
        end_frequency: f64,
        duration_ms: u32,
        amplitude: f64,
        #[serde(default)]
        envelope: Envelope,
    },
    Arpeggio {
        frequencies: Vec<f64>,
        note_ms: u32,
        amplitude: f64,
        #[serde(default)]
        style: ToneStyle,
        #[serde(default)]
        envelope: Envelope,
    },
}

impl Recipe {
    /// Renders the recipe. Noise recipes use the thread RNG and differ per call.
    /// Fails if any frequency or the amplitude is not finite.
    pub fn render(&self) -> Result<PcmBuffer, SynthError> {
        self.validate()?;
        Ok(match self {
            Recipe::Tone {
                frequency,
                duration_ms,
                amplitude,
                style,
                envelope,
            } => tone(*frequency, *duration_ms, *amplitude, *style, *envelope),
            Recipe::SweptTone {
                start_frequency,
                end_frequency,
                duration_ms,
                amplitude,
                envelope,
            } => swept_tone(
                *start_frequency,
                *end_frequency,
                *duration_ms,
                *amplitude,
                *envelope,
            ),
            Recipe::Noise {
                duration_ms,
                amplitude,
                envelope,
            } => noise(*duration_ms, *amplitude, *envelope, &mut rand::thread_rng()),
            Recipe::SquareSlide {
                start_frequency,
                end_frequency,
                duration_ms,
                amplitude,
                envelope,
            } => square_slide(
                *start_frequency,
                *end_frequency,
                *duration_ms,
                *amplitude,
                *envelope,
            ),
            Recipe::Arpeggio {
                frequencies,
                note_ms,
                amplitude,
                style,
                envelope,
            } => arpeggio(frequencies, *note_ms, *amplitude, *style, *envelope),
        })
    }

    fn validate(&self) -> Result<(), SynthError> {
        let mut parameters = vec![("amplitude", self.amplitude())];
        match self {
            Recipe::Tone { frequency, .. } => parameters.push(("frequency", *frequency)),
            Recipe::SweptTone {
                start_frequency,
                end_frequency,
                ..
            }
            | Recipe::SquareSlide {
                start_frequency,
                end_frequency,
                ..
            } => {
                parameters.push(("start_frequency", *start_frequency));
                parameters.push(("end_frequency", *end_frequency));
            }
            Recipe::Noise { .. } => {}
            Recipe::Arpeggio { frequencies, .. } => {
                parameters.extend(frequencies.iter().map(|&f| ("frequency", f)))
            }
        }

        match parameters.into_iter().find(|(_, value)| !value.is_finite()) {
            Some((parameter, value)) => Err(SynthError::NonFinite { parameter, value }),
            None => Ok(()),
        }
    }

    fn amplitude(&self) -> f64 {
        match self {
            Recipe::Tone { amplitude, .. }
            | Recipe::SweptTone { amplitude, .. }
            | Recipe::Noise { amplitude, .. }
            | Recipe::SquareSlide { amplitude, .. }
            | Recipe::Arpeggio { amplitude, .. } => *amplitude,
        }
    }

    /// Returns the length of the rendered sound in milliseconds.
    pub fn duration_ms(&self) -> u32 {
        match self {
            Recipe::Tone { duration_ms, .. }
            | Recipe::SweptTone { duration_ms, .. }
            | Recipe::Noise { duration_ms, .. }
            | Recipe::SquareSlide { duration_ms, .. } => *duration_ms,
            Recipe::Arpeggio {
                frequencies,
                note_ms,
                ..
            } => note_ms.saturating_mul(frequencies.len() as u32),
        }
    }
}
