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
/// Error types for WAV encoding and decoding
#[derive(Debug, thiserror::Error)]
pub enum WavError {
    #[error("Invalid WAV format: {0}")]
    Format(String),

    #[error("Malformed WAV: data chunk declares {declared} bytes but only {available} remain")]
    Malformed { declared: u32, available: usize },

    #[error("WAV encode overflow: {0}")]
    EncodeOverflow(String),
}

/// Error types for rendering a synthesized sound
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("Recipe {parameter} must be finite, got {value}")]
    NonFinite { parameter: &'static str, value: f64 },
}

/// Error types for opening the audio output
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Audio output device unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}
