//! Campaign rule sets and the difficulty presets they start from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::MapGeneratorType;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RulesMode {
    #[default]
    Custom,
    Preset,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignDifficulty {
    Simulation,
    Clone,
    #[default]
    Standard,
    Ironman,
}

impl CampaignDifficulty {
    pub const ALL: [CampaignDifficulty; 4] = [
        CampaignDifficulty::Simulation,
        CampaignDifficulty::Clone,
        CampaignDifficulty::Standard,
        CampaignDifficulty::Ironman,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CampaignDifficulty::Simulation => "Simulation",
            CampaignDifficulty::Clone => "Clone",
            CampaignDifficulty::Standard => "Standard",
            CampaignDifficulty::Ironman => "Ironman",
        }
    }
}

impl fmt::Display for CampaignDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown campaign difficulty `{0}`")]
pub struct UnknownDifficulty(pub String);

impl FromStr for CampaignDifficulty {
    type Err = UnknownDifficulty;

    /// Accepts the preset names plus the casual aliases `easy`, `normal`,
    /// `hard` and `extreme`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "simulation" | "easy" => Ok(CampaignDifficulty::Simulation),
            "clone" | "normal" => Ok(CampaignDifficulty::Clone),
            "standard" | "hard" => Ok(CampaignDifficulty::Standard),
            "ironman" | "extreme" => Ok(CampaignDifficulty::Ironman),
            _ => Err(UnknownDifficulty(value.to_string())),
        }
    }
}

/// What happens to a soldier who falls in a mission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathRule {
    Iron,
    #[default]
    Clone,
    Simulation,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EconomyMode {
    #[default]
    Open,
    Limited,
}

/// Campaign-wide knobs. The sector generator reads the growth rate, the
/// difficulty and economy settings, and the map generator type; the other
/// fields ride along for the campaign layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameRules {
    pub mode: RulesMode,
    pub difficulty: CampaignDifficulty,
    pub death_rule: DeathRule,
    pub allow_tactical_pause: bool,
    pub map_generator_type: MapGeneratorType,
    pub difficulty_scaling: f64,
    pub resource_scarcity: f64,
    pub starting_scrap: u32,
    pub map_growth_rate: f64,
    pub base_enemy_count: u32,
    pub enemy_growth_per_mission: f64,
    pub economy_mode: EconomyMode,
    pub skip_prologue: bool,
}

impl GameRules {
    pub fn for_difficulty(difficulty: CampaignDifficulty) -> Self {
        let base = Self {
            mode: RulesMode::Preset,
            difficulty,
            death_rule: DeathRule::Clone,
            allow_tactical_pause: true,
            map_generator_type: MapGeneratorType::DenseShip,
            difficulty_scaling: 1.0,
            resource_scarcity: 1.0,
            starting_scrap: 500,
            map_growth_rate: 1.0,
            base_enemy_count: 3,
            enemy_growth_per_mission: 1.0,
            economy_mode: EconomyMode::Open,
            skip_prologue: false,
        };
        match difficulty {
            CampaignDifficulty::Simulation => Self {
                death_rule: DeathRule::Simulation,
                difficulty_scaling: 0.8,
                resource_scarcity: 1.2,
                starting_scrap: 1000,
                base_enemy_count: 2,
                enemy_growth_per_mission: 0.5,
                ..base
            },
            CampaignDifficulty::Clone => base,
            CampaignDifficulty::Standard => Self {
                death_rule: DeathRule::Iron,
                difficulty_scaling: 1.5,
                resource_scarcity: 0.7,
                starting_scrap: 300,
                base_enemy_count: 4,
                enemy_growth_per_mission: 1.5,
                ..base
            },
            CampaignDifficulty::Ironman => Self {
                death_rule: DeathRule::Iron,
                allow_tactical_pause: false,
                difficulty_scaling: 2.0,
                resource_scarcity: 0.5,
                starting_scrap: 150,
                base_enemy_count: 5,
                enemy_growth_per_mission: 2.0,
                ..base
            },
        }
    }

    /// Growth rate the generators actually use: anything that is not a
    /// positive finite number counts as `1.0`.
    pub fn effective_growth_rate(&self) -> f64 {
        if self.map_growth_rate.is_finite() && self.map_growth_rate > 0.0 {
            self.map_growth_rate
        } else {
            1.0
        }
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self::for_difficulty(CampaignDifficulty::Standard)
    }
}
