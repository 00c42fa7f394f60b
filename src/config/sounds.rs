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
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::audio::synth::Recipe;

/// A YAML representation of the sound effect configuration.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Sounds {
    /// Whether effects play at startup (default: true).
    enabled: Option<bool>,

    /// Directory holding one `<stem>.wav` per effect. When unset, every
    /// effect is synthesized in memory.
    assets_dir: Option<PathBuf>,

    /// Whether missing assets are synthesized and written to `assets_dir`
    /// (default: true).
    generate_missing: Option<bool>,

    /// Per-effect sound design overrides, keyed by asset stem.
    #[serde(default)]
    recipes: HashMap<String, Recipe>,

    /// Gain applied to every effect (default: 1.0).
    volume: Option<f32>,

    /// Per-effect gain, keyed by asset stem. Multiplied with `volume`.
    #[serde(default)]
    volumes: HashMap<String, f32>,
}

impl Sounds {
    /// Sets the assets directory.
    pub fn with_assets_dir(mut self, assets_dir: &Path) -> Sounds {
        self.assets_dir = Some(assets_dir.to_path_buf());
        self
    }

    /// Sets whether missing assets are generated.
    pub fn with_generate_missing(mut self, generate_missing: bool) -> Sounds {
        self.generate_missing = Some(generate_missing);
        self
    }

    /// Sets whether effects start enabled.
    pub fn with_enabled(mut self, enabled: bool) -> Sounds {
        self.enabled = Some(enabled);
        self
    }

    /// Overrides the recipe for the given stem.
    pub fn with_recipe(mut self, stem: &str, recipe: Recipe) -> Sounds {
        self.recipes.insert(stem.to_string(), recipe);
        self
    }

    /// Sets the gain applied to every effect.
    pub fn with_volume(mut self, volume: f32) -> Sounds {
        self.volume = Some(volume);
        self
    }

    /// Sets the gain for the given stem.
    pub fn with_effect_volume(mut self, stem: &str, volume: f32) -> Sounds {
        self.volumes.insert(stem.to_string(), volume);
        self
    }

    /// Returns whether effects start enabled (default: true)
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Returns the assets directory, if any.
    pub fn assets_dir(&self) -> Option<&Path> {
        self.assets_dir.as_deref()
    }

    /// Returns whether missing assets are generated (default: true)
    pub fn generate_missing(&self) -> bool {
        self.generate_missing.unwrap_or(true)
    }

    /// Returns the recipe overrides.
    pub fn recipes(&self) -> &HashMap<String, Recipe> {
        &self.recipes
    }

    /// Returns the per-effect volumes.
    pub fn volumes(&self) -> &HashMap<String, f32> {
        &self.volumes
    }

    /// Returns the gain for the given stem: the master volume times the
    /// effect's volume (default: 1.0)
    pub fn gain(&self, stem: &str) -> f32 {
        self.volume.unwrap_or(1.0) * self.volumes.get(stem).copied().unwrap_or(1.0)
    }
}
