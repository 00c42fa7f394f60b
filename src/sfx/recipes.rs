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
use super::Effect;
use crate::audio::synth::{Envelope, Recipe, ToneStyle};

/// Amplitude of the clipped beeps.
const BEEP_AMPLITUDE: f64 = 10000.0;

/// Returns the built-in sound design for an effect.
pub fn builtin(effect: Effect) -> Recipe {
    match effect {
        Effect::Dig => beep(400.0, 50),
        Effect::Shoot => Recipe::SweptTone {
            start_frequency: 800.0,
            end_frequency: 200.0,
            duration_ms: 150,
            amplitude: 32000.0,
            envelope: Envelope::Linear,
        },
        Effect::Collect => beep(1200.0, 50),
        Effect::Die => beep(200.0, 500),
        Effect::Jackpot => beep(1500.0, 150),
        Effect::Explosion => Recipe::Noise {
            duration_ms: 400,
            amplitude: 10000.0,
            envelope: Envelope::Power,
        },
        Effect::Pop => Recipe::Tone {
            frequency: 1200.0,
            duration_ms: 50,
            amplitude: 20000.0,
            style: ToneStyle::Smooth,
            envelope: Envelope::Linear,
        },
        Effect::GameOver => Recipe::SquareSlide {
            start_frequency: 400.0,
            end_frequency: 100.0,
            duration_ms: 1000,
            amplitude: 32000.0,
            envelope: Envelope::Linear,
        },
    }
}

fn beep(frequency: f64, duration_ms: u32) -> Recipe {
    Recipe::Tone {
        frequency,
        duration_ms,
        amplitude: BEEP_AMPLITUDE,
        style: ToneStyle::Clipped,
        envelope: Envelope::None,
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use crate::audio::synth::sample_count;

    /// Renders a 16-bit mono sound the way the shipped generators did: the wave
    /// is truncated to 16 bits, then scaled by 1 - t and truncated again.
    fn shipped(duration_ms: u32, wave: impl Fn(usize, f64) -> f64) -> Vec<i16> {
        let n = sample_count(duration_ms);
        (0..n)
            .map(|i| {
                let t = i as f64 / n as f64;
                let val = wave(i, t) as i16;
                (val as f64 * (1.0 - t)) as i16
            })
            .collect()
    }

    #[test]
    fn test_durations() {
        let expected = [50, 150, 50, 500, 150, 400, 50, 1000];
        for (effect, duration_ms) in Effect::ALL.into_iter().zip(expected) {
            assert_eq!(builtin(effect).duration_ms(), duration_ms, "{}", effect);
        }
    }

    #[test]
    fn test_beeps_are_clipped() {
        let rendered = builtin(Effect::Dig).render().unwrap();
        assert_eq!(rendered.samples().len(), sample_count(50));
        assert!(rendered
            .samples()
            .iter()
            .all(|&s| s == 10000 || s == -10000));
    }

    #[test]
    fn test_decaying_effects_end_quiet() {
        for effect in [Effect::Shoot, Effect::Pop, Effect::GameOver, Effect::Explosion] {
            let rendered = builtin(effect).render().unwrap();
            let last = *rendered.samples().last().unwrap();
            assert!(last.abs() <= 10, "{} ends at {}", effect, last);
        }
    }

    #[test]
    fn test_shoot_matches_shipped_sound() {
        let expected = shipped(150, |i, t| {
            let freq = 800.0 - (600.0 * t);
            32000.0 * (2.0 * PI * freq * i as f64 / 44100.0).sin()
        });
        assert_eq!(builtin(Effect::Shoot).render().unwrap().samples(), &expected[..]);
    }

    #[test]
    fn test_pop_matches_shipped_sound() {
        let expected = shipped(50, |i, _| {
            20000.0 * (2.0 * PI * 1200.0 * i as f64 / 44100.0).sin()
        });
        assert_eq!(builtin(Effect::Pop).render().unwrap().samples(), &expected[..]);
    }

    #[test]
    fn test_game_over_matches_shipped_sound() {
        let expected = shipped(1000, |_, t| {
            let freq = 400.0 - (300.0 * t);
            32000.0 * if t % (1.0 / freq) > (0.5 / freq) { 1.0 } else { -1.0 }
        });
        assert_eq!(
            builtin(Effect::GameOver).render().unwrap().samples(),
            &expected[..]
        );
    }
}
