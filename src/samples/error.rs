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
use std::path::PathBuf;

use crate::audio::{SynthError, WavError};

/// Error types for loading sounds into the cache. None of these are fatal;
/// the sound is simply absent.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Sound asset {} could not be read: {source}", path.display())]
    AssetMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Format(#[from] WavError),

    #[error(transparent)]
    Synth(#[from] SynthError),

    #[error("Sound {0} has no samples")]
    Empty(String),
}
