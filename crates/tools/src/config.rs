//! Optional TOML config for the CLI. Every field may be omitted; command
//! line flags override whatever the file sets.
//!
//! ```toml
//! [map]
//! seed = 7
//! width = 14
//! height = 10
//! type = "DenseShip"
//! bonusLootCount = 3
//!
//! [sector]
//! seed = 99
//! ranks = 9
//!
//! [sector.rules]
//! difficulty = "Ironman"
//! mapGrowthRate = 0.5
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use shipgen::campaign::{CampaignDifficulty, SectorMapOptions};
use shipgen::{GameRules, MapGenerationConfig, MapGeneratorType};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_SIDE: usize = 12;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub map: MapSection,
    pub sector: SectorSection,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MapSection {
    pub seed: Option<u64>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    #[serde(rename = "type")]
    pub kind: Option<MapGeneratorType>,
    pub spawn_point_count: Option<usize>,
    pub bonus_loot_count: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectorSection {
    pub seed: Option<u64>,
    pub ranks: Option<usize>,
    pub rules: Option<GameRules>,
}

/// Map settings as given on the command line.
#[derive(Clone, Debug, Default)]
pub struct MapOverrides {
    pub seed: Option<u64>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub kind: Option<MapGeneratorType>,
    pub spawn_point_count: Option<usize>,
    pub bonus_loot_count: Option<usize>,
}

/// Sector settings as given on the command line. A difficulty swaps in
/// that preset before the other overrides apply.
#[derive(Clone, Debug, Default)]
pub struct SectorOverrides {
    pub seed: Option<u64>,
    pub difficulty: Option<CampaignDifficulty>,
    pub growth_rate: Option<f64>,
    pub kind: Option<MapGeneratorType>,
    pub ranks: Option<usize>,
}

impl ToolConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn map_config(&self, flags: &MapOverrides) -> MapGenerationConfig {
        let file = &self.map;
        let side = |flag: Option<usize>, from_file: Option<usize>| {
            flag.or(from_file).unwrap_or(DEFAULT_SIDE)
        };
        let mut config = MapGenerationConfig::new(
            flags.seed.or(file.seed).unwrap_or(DEFAULT_SEED),
            side(flags.width, file.width),
            side(flags.height, file.height),
            flags.kind.or(file.kind).unwrap_or_default(),
        );
        config.spawn_point_count = flags.spawn_point_count.or(file.spawn_point_count);
        config.bonus_loot_count = flags.bonus_loot_count.or(file.bonus_loot_count);
        config
    }

    pub fn sector_setup(&self, flags: &SectorOverrides) -> (u64, GameRules) {
        let seed = flags.seed.or(self.sector.seed).unwrap_or(DEFAULT_SEED);
        let mut rules = match flags.difficulty {
            Some(difficulty) => GameRules::for_difficulty(difficulty),
            None => self.sector.rules.clone().unwrap_or_default(),
        };
        if let Some(rate) = flags.growth_rate {
            rules.map_growth_rate = rate;
        }
        if let Some(kind) = flags.kind {
            rules.map_generator_type = kind;
        }
        (seed, rules)
    }

    pub fn sector_options(&self, flags: &SectorOverrides) -> SectorMapOptions {
        SectorMapOptions { ranks: flags.ranks.or(self.sector.ranks), ..SectorMapOptions::default() }
    }
}
