// Copyright (C) 2024 Michael Wilson <mike@mdwn.dev>
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
use std::path::Path;

use config::{Config, File, FileFormat};
use serde::Deserialize;

mod audio;
mod error;
mod sounds;

pub use audio::Audio;
pub(crate) use audio::DEFAULT_STREAM_BUFFER_FRAMES;
pub use error::ConfigError;
pub use sounds::Sounds;

/// A YAML representation of the whole sound system: where it plays and what
/// it plays.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct SoundSystem {
    /// Output configuration.
    #[serde(default)]
    audio: Audio,

    /// Effect configuration.
    #[serde(default)]
    sounds: Sounds,
}

impl SoundSystem {
    /// Creates a new sound system configuration.
    pub fn new(audio: Audio, sounds: Sounds) -> SoundSystem {
        SoundSystem { audio, sounds }
    }

    /// Parse a sound system configuration from a YAML file.
    pub fn deserialize(path: &Path) -> Result<SoundSystem, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<SoundSystem>()?)
    }

    /// Parse a sound system configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<SoundSystem, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize::<SoundSystem>()?)
    }

    /// Gets the output configuration.
    pub fn audio(&self) -> &Audio {
        &self.audio
    }

    /// Gets the effect configuration.
    pub fn sounds(&self) -> &Sounds {
        &self.sounds
    }
}
