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

//! Embeddable sound effects for small games.
//!
//! This crate provides:
//! - Procedural synthesis of short retro effects as 16-bit PCM
//! - A RIFF/WAVE PCM codec
//! - A sound cache that decodes each effect once
//! - A real-time mixer that sums any number of one-shot sounds
//! - A [`SoundManager`] facade with one play operation per effect

pub mod audio;
pub mod config;
pub mod samples;
pub mod sfx;
#[cfg(test)]
mod testutil;
mod util;

pub use sfx::{Effect, SoundManager};
