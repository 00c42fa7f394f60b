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
    error::Error,
    fs,
    path::Path,
    sync::atomic::{AtomicBool, Ordering},
};

use tracing::{debug, info, span, warn, Level};

use super::{recipes, Effect};
use crate::{
    audio::{self, synth::Recipe, wav, Device, MixingEngine, OutputFormat},
    config,
    samples::{CachedSound, LoadError, SoundCache},
    util::filename_display,
};

/// The game-facing sound API. Every effect is resolved once at construction;
/// playing one afterwards is a table lookup and a queue push.
///
/// Nothing here returns an error or panics. A sound that couldn't be loaded,
/// or an output that couldn't be opened, simply stays silent.
pub struct SoundManager {
    engine: MixingEngine,
    cache: SoundCache,
    table: [Option<CachedSound>; Effect::COUNT],
    enabled: AtomicBool,
}

impl SoundManager {
    /// Opens the configured output device and loads every effect.
    pub fn new(config: &config::SoundSystem) -> SoundManager {
        let device = audio::get_device(config.audio());
        SoundManager::with_device(device.as_ref(), config)
    }

    /// Loads every effect and plays them through the given device.
    pub fn with_device(device: &dyn Device, config: &config::SoundSystem) -> SoundManager {
        let span = span!(Level::INFO, "sound manager");
        let _enter = span.enter();

        let engine = MixingEngine::new(device, config.audio());
        let mut cache = SoundCache::new(engine.format());
        let sounds = config.sounds();

        for stem in sounds.recipes().keys() {
            if Effect::from_stem(stem).is_none() {
                warn!(stem, "Ignoring recipe for unknown effect.");
            }
        }
        for stem in sounds.volumes().keys() {
            if Effect::from_stem(stem).is_none() {
                warn!(stem, "Ignoring volume for unknown effect.");
            }
        }

        let table = Effect::ALL.map(|effect| resolve(&mut cache, effect, sounds));

        info!(
            loaded = table.iter().flatten().count(),
            effects = Effect::COUNT,
            memory_kb = cache.total_memory_usage() / 1024,
            output = engine.is_enabled(),
            "Sound effects ready."
        );

        SoundManager {
            engine,
            cache,
            table,
            enabled: AtomicBool::new(sounds.enabled()),
        }
    }

    /// Turns effect playback on or off. Sounds already playing finish.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Returns true if effects are enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Returns true if the output device opened.
    pub fn has_output(&self) -> bool {
        self.engine.is_enabled()
    }

    /// Gets the output format effects are mixed in.
    pub fn output_format(&self) -> OutputFormat {
        self.engine.format()
    }

    /// Gets the loaded sound for an effect.
    pub fn sound(&self, effect: Effect) -> Option<&CachedSound> {
        self.table[effect.index()].as_ref()
    }

    /// Gets the sound cache.
    pub fn cache(&self) -> &SoundCache {
        &self.cache
    }

    /// Plays the effect. A no-op when disabled or when the effect has no sound.
    pub fn play(&self, effect: Effect) {
        if !self.is_enabled() {
            return;
        }

        match &self.table[effect.index()] {
            Some(sound) => self.engine.play(sound),
            None => debug!(effect = effect.stem(), "No sound loaded for effect."),
        }
    }

    pub fn play_dig(&self) {
        self.play(Effect::Dig)
    }

    pub fn play_shoot(&self) {
        self.play(Effect::Shoot)
    }

    pub fn play_collect(&self) {
        self.play(Effect::Collect)
    }

    pub fn play_die(&self) {
        self.play(Effect::Die)
    }

    pub fn play_jackpot(&self) {
        self.play(Effect::Jackpot)
    }

    pub fn play_explosion(&self) {
        self.play(Effect::Explosion)
    }

    pub fn play_pop(&self) {
        self.play(Effect::Pop)
    }

    pub fn play_game_over(&self) {
        self.play(Effect::GameOver)
    }
}

/// Loads the sound for one effect and applies its gain, logging and returning
/// None on failure.
fn resolve(cache: &mut SoundCache, effect: Effect, sounds: &config::Sounds) -> Option<CachedSound> {
    let recipe = sounds
        .recipes()
        .get(effect.stem())
        .cloned()
        .unwrap_or_else(|| recipes::builtin(effect));

    let result = match sounds.assets_dir() {
        Some(dir) => load_asset(cache, effect, &recipe, dir, sounds.generate_missing()),
        None => synthesize(cache, effect, &recipe),
    };

    let sound = match result {
        Ok(sound) => sound,
        Err(e) => {
            warn!(
                effect = effect.stem(),
                err = e.to_string(),
                "Sound effect unavailable, it will be silent."
            );
            return None;
        }
    };

    let gain = sounds.gain(effect.stem());
    if gain == 1.0 {
        return Some(sound);
    }
    if !gain.is_finite() || gain < 0.0 {
        warn!(effect = effect.stem(), gain, "Ignoring invalid volume.");
        return Some(sound);
    }
    cache.apply_gain(effect.stem(), gain)
}

/// Renders the recipe to a WAV in memory and loads it through the codec.
fn synthesize(
    cache: &mut SoundCache,
    effect: Effect,
    recipe: &Recipe,
) -> Result<CachedSound, LoadError> {
    let bytes = wav::encode(&recipe.render()?)?;
    cache.load(effect.stem(), &bytes)
}

/// Loads `<dir>/<stem>.wav`, writing it from the recipe first if it's missing
/// and generation is allowed.
fn load_asset(
    cache: &mut SoundCache,
    effect: Effect,
    recipe: &Recipe,
    dir: &Path,
    generate_missing: bool,
) -> Result<CachedSound, LoadError> {
    let path = dir.join(effect.file_name());
    if generate_missing && !path.exists() {
        if let Err(e) = write_asset(&path, recipe) {
            warn!(path = ?path, err = e.as_ref(), "Unable to generate sound asset.");
        }
    }
    cache.load_file(effect.stem(), &path)
}

fn write_asset(path: &Path, recipe: &Recipe) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, wav::encode(&recipe.render()?)?)?;
    info!(file = filename_display(path), "Generated sound asset.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;
    use crate::{
        audio::{mock, synth::sample_count, wav::decode},
        config::{Audio, SoundSystem, Sounds},
        testutil::audio_test_utils::peak,
    };

    fn mono_config(sounds: Sounds) -> SoundSystem {
        SoundSystem::new(Audio::new("mock").with_format(44100, 1), sounds)
    }

    #[test]
    fn test_synthesized_effects() {
        let device = mock::Device::get("mock");
        let manager = SoundManager::with_device(&device, &mono_config(Sounds::default()));

        assert!(manager.has_output());
        assert!(manager.is_enabled());
        assert_eq!(manager.cache().len(), Effect::COUNT);
        for effect in Effect::ALL {
            let sound = manager.sound(effect).unwrap();
            assert_eq!(sound.name(), effect.stem());
            assert_eq!(sound.source().bits_per_sample, 16);
        }
        assert_eq!(
            manager.sound(Effect::GameOver).unwrap().frames(),
            sample_count(1000)
        );

        manager.play_dig();
        let frames = device.render(64).unwrap();
        assert_eq!(device.active_count(), 1);
        assert_eq!(peak(&frames), 10000.0 / 32768.0);
    }

    #[test]
    fn test_every_convenience_method_plays() {
        let device = mock::Device::get("mock");
        let manager = SoundManager::with_device(&device, &mono_config(Sounds::default()));

        manager.play_dig();
        manager.play_shoot();
        manager.play_collect();
        manager.play_die();
        manager.play_jackpot();
        manager.play_explosion();
        manager.play_pop();
        manager.play_game_over();

        device.render(1).unwrap();
        assert_eq!(device.active_count(), Effect::COUNT);
    }

    #[test]
    fn test_disabled_plays_nothing() {
        let device = mock::Device::get("mock");
        let manager = SoundManager::with_device(&device, &mono_config(Sounds::default()));

        manager.set_enabled(false);
        assert!(!manager.is_enabled());
        manager.play_explosion();
        assert_eq!(device.render(64).unwrap(), vec![0.0; 64]);
        assert_eq!(device.active_count(), 0);

        manager.set_enabled(true);
        manager.play_explosion();
        device.render(64).unwrap();
        assert_eq!(device.active_count(), 1);
    }

    #[test]
    fn test_starts_disabled_from_config() {
        let device = mock::Device::get("mock");
        let manager = SoundManager::with_device(
            &device,
            &mono_config(Sounds::default().with_enabled(false)),
        );
        assert!(!manager.is_enabled());
        manager.play_pop();
        device.render(8).unwrap();
        assert_eq!(device.active_count(), 0);
    }

    #[test]
    fn test_unavailable_output_is_silent() {
        let device = mock::Device::unavailable("mock-unavailable");
        let manager = SoundManager::with_device(&device, &mono_config(Sounds::default()));

        assert!(!manager.has_output());
        // Sounds still load; they just have nowhere to go.
        assert!(manager.sound(Effect::Dig).is_some());
        for _ in 0..100 {
            for effect in Effect::ALL {
                manager.play(effect);
            }
        }
        assert!(device.render(8).is_none());
    }

    #[test]
    fn test_generates_missing_assets() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("sfx");
        let device = mock::Device::get("mock");
        let manager = SoundManager::with_device(
            &device,
            &mono_config(Sounds::default().with_assets_dir(&assets)),
        );

        for effect in Effect::ALL {
            let path = assets.join(effect.file_name());
            let decoded = decode(&fs::read(&path).unwrap()).unwrap();
            assert_eq!(decoded.spec().sample_rate, 44100);
            assert_eq!(decoded.spec().channels, 1);
            assert!(manager.sound(effect).is_some());
        }
    }

    #[test]
    fn test_existing_assets_are_used() {
        let dir = tempfile::tempdir().unwrap();
        let custom = [8192i16, -8192, 8192, -8192];
        crate::testutil::write_wav_i16(dir.path().join("dig.wav"), &custom, 1, 44100).unwrap();

        let device = mock::Device::get("mock");
        let manager = SoundManager::with_device(
            &device,
            &mono_config(Sounds::default().with_assets_dir(dir.path())),
        );

        let dig = manager.sound(Effect::Dig).unwrap();
        assert_eq!(dig.samples(), &[0.25, -0.25, 0.25, -0.25]);

        // The existing file was left alone.
        let on_disk = decode(&fs::read(dir.path().join("dig.wav")).unwrap()).unwrap();
        assert_eq!(on_disk.to_pcm16().samples(), &custom);
    }

    #[test]
    fn test_missing_assets_without_generation() {
        let dir = tempfile::tempdir().unwrap();
        let device = mock::Device::get("mock");
        let manager = SoundManager::with_device(
            &device,
            &mono_config(
                Sounds::default()
                    .with_assets_dir(dir.path())
                    .with_generate_missing(false),
            ),
        );

        assert!(manager.cache().is_empty());
        assert!(Effect::ALL
            .iter()
            .all(|&effect| manager.sound(effect).is_none()));
        assert!(!dir.path().join("dig.wav").exists());

        // Playing an effect that never loaded is a no-op.
        manager.play_shoot();
        assert_eq!(device.render(16).unwrap(), vec![0.0; 16]);
        assert_eq!(device.active_count(), 0);
    }

    #[test]
    fn test_recipe_override() {
        let device = mock::Device::get("mock");
        let sounds = Sounds::default().with_recipe(
            "pop",
            Recipe::Tone {
                frequency: 880.0,
                duration_ms: 10,
                amplitude: 5000.0,
                style: Default::default(),
                envelope: Default::default(),
            },
        );
        let manager = SoundManager::with_device(&device, &mono_config(sounds));

        assert_eq!(manager.sound(Effect::Pop).unwrap().frames(), sample_count(10));
        assert_eq!(manager.sound(Effect::Dig).unwrap().frames(), sample_count(50));
    }

    #[test]
    fn test_bad_recipe_from_config_is_silent() {
        let yaml = r#"
            audio:
              device: mock
              channels: 1
            sounds:
              recipes:
                explode:
                  waveform: noise
                  duration_ms: 10
                  amplitude: 1.0e308
        "#;
        let system = SoundSystem::from_yaml_str(yaml).unwrap();
        let device = mock::Device::get("mock");
        let manager = SoundManager::with_device(&device, &system);

        // A huge amplitude is limited to full scale.
        let explode = manager.sound(Effect::Explosion).unwrap();
        assert_eq!(explode.frames(), sample_count(10));
        assert!(peak(explode.samples()) <= 1.0);

        let sounds = Sounds::default().with_recipe(
            "explode",
            Recipe::Noise {
                duration_ms: 10,
                amplitude: f64::INFINITY,
                envelope: Default::default(),
            },
        );
        let other = mock::Device::get("mock-other");
        let manager = SoundManager::with_device(&other, &mono_config(sounds));
        assert!(manager.sound(Effect::Explosion).is_none());
        assert!(manager.sound(Effect::Dig).is_some());
        manager.play_explosion();
        assert_eq!(other.render(8).unwrap(), vec![0.0; 8]);
    }

    #[test]
    fn test_bad_recipe_is_not_written_to_assets() {
        let dir = tempfile::tempdir().unwrap();
        let sounds = Sounds::default()
            .with_assets_dir(dir.path())
            .with_recipe(
                "shoot",
                Recipe::SweptTone {
                    start_frequency: f64::NAN,
                    end_frequency: 200.0,
                    duration_ms: 10,
                    amplitude: 1000.0,
                    envelope: Default::default(),
                },
            );
        let device = mock::Device::get("mock");
        let manager = SoundManager::with_device(&device, &mono_config(sounds));

        assert!(manager.sound(Effect::Shoot).is_none());
        assert!(!dir.path().join("shoot.wav").exists());
        assert!(dir.path().join("dig.wav").exists());
    }

    #[test]
    fn test_volume_is_applied_at_load() {
        let device = mock::Device::get("mock");
        let sounds = Sounds::default()
            .with_volume(0.5)
            .with_effect_volume("dig", 0.5);
        let manager = SoundManager::with_device(&device, &mono_config(sounds));

        let full = 10000.0 / 32768.0;
        let dig = manager.sound(Effect::Dig).unwrap();
        assert!(dig.samples().iter().all(|&s| s.abs() == full * 0.25));
        assert_eq!(manager.cache().get("dig").unwrap().samples(), dig.samples());
        let collect = manager.sound(Effect::Collect).unwrap();
        assert!(collect.samples().iter().all(|&s| s.abs() == full * 0.5));

        // Mixing stays a plain sum of the scaled sounds.
        manager.play_dig();
        manager.play_dig();
        let frames = device.render(64).unwrap();
        assert_eq!(peak(&frames), full * 0.5);
    }

    #[test]
    fn test_invalid_volume_is_ignored() {
        let device = mock::Device::get("mock");
        let sounds = Sounds::default()
            .with_effect_volume("dig", -1.0)
            .with_effect_volume("pop", f32::NAN);
        let manager = SoundManager::with_device(&device, &mono_config(sounds));

        assert_eq!(peak(manager.sound(Effect::Dig).unwrap().samples()), 10000.0 / 32768.0);
        assert!(manager.sound(Effect::Pop).is_some());
    }

    #[test]
    fn test_converted_to_output_format() {
        let device = mock::Device::get("mock");
        let config = SoundSystem::new(
            Audio::new("mock").with_format(22050, 2),
            Sounds::default(),
        );
        let manager = SoundManager::with_device(&device, &config);

        let dig = manager.sound(Effect::Dig).unwrap();
        assert_eq!(dig.sample_rate(), 22050);
        assert_eq!(dig.channel_count(), 2);
        assert_eq!(dig.source().sample_rate, 44100);
        assert_eq!(dig.frames(), sample_count(50).div_ceil(2));
    }

    #[test]
    fn test_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SoundManager>();

        let device = mock::Device::get("mock");
        let manager = Arc::new(SoundManager::with_device(
            &device,
            &mono_config(Sounds::default()),
        ));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let manager = manager.clone();
                thread::spawn(move || {
                    for _ in 0..4 {
                        manager.play_collect();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        device.render(1).unwrap();
        assert_eq!(device.active_count(), 16);
    }
}
