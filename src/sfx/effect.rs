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
use std::fmt;

/// The sound effects a game can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Dig,
    Shoot,
    Collect,
    Die,
    Jackpot,
    Explosion,
    Pop,
    GameOver,
}

impl Effect {
    /// Number of effects.
    pub const COUNT: usize = 8;

    /// Every effect, in table order.
    pub const ALL: [Effect; Effect::COUNT] = [
        Effect::Dig,
        Effect::Shoot,
        Effect::Collect,
        Effect::Die,
        Effect::Jackpot,
        Effect::Explosion,
        Effect::Pop,
        Effect::GameOver,
    ];

    /// Returns the effect's slot in a table of `COUNT` entries.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the asset stem, which is also the cache key.
    pub fn stem(self) -> &'static str {
        match self {
            Effect::Dig => "dig",
            Effect::Shoot => "shoot",
            Effect::Collect => "collect",
            Effect::Die => "die",
            Effect::Jackpot => "jackpot",
            Effect::Explosion => "explode",
            Effect::Pop => "pop",
            Effect::GameOver => "gameover",
        }
    }

    /// Returns the asset file name.
    pub fn file_name(self) -> String {
        format!("{}.wav", self.stem())
    }

    /// Looks an effect up by asset stem.
    pub fn from_stem(stem: &str) -> Option<Effect> {
        Effect::ALL.into_iter().find(|effect| effect.stem() == stem)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}
