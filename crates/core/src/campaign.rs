//! Campaign-level generation: the rules a campaign runs under and the
//! sector maps of mission nodes built from them.

pub mod rules;
pub mod sector;

pub use rules::{CampaignDifficulty, DeathRule, EconomyMode, GameRules, RulesMode};
pub use sector::{
    MAX_RANKS, MissionType, NodePosition, NodeStatus, NodeType, NodeTypeShares,
    SectorMapGenerator, SectorMapOptions, SectorNode, mission_config,
};
