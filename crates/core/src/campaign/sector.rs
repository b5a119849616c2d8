//! Campaign sector maps: a ranked DAG of mission nodes laid out on four
//! lanes, from a single start node to a single boss node.
//!
//! Nodes only link to the next rank, to a lane at most one step away, and
//! never so that two links cross. Lane choices keep every node within
//! reach of both the start lane and the boss lane, which is what lets
//! every node get an incoming and an outgoing link.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::mapgen::{MapGenerationConfig, Prng, calculate_map_size};

use super::rules::{CampaignDifficulty, EconomyMode, GameRules};

pub const LANES: usize = 4;

/// Ranks a growth rate of `1.0` spans past the start node.
const RANK_SPAN: f64 = 6.0;
/// Upper bound on ranks per sector, whatever the growth rate or override.
pub const MAX_RANKS: usize = 64;
const LAYOUT_WIDTH: f64 = 800.0;
const LAYOUT_HEIGHT: f64 = 600.0;
const LANE_JITTER: f64 = 0.4;
const EXTRA_LINK_CHANCE: f64 = 0.35;
const MAX_MAP_SEED: i32 = 1_000_000;
const MAX_BONUS_LOOT: i32 = 3;

const EVENT_SHARE: f64 = 0.1;

const COMBAT_MISSIONS: [MissionType; 4] = [
    MissionType::RecoverIntel,
    MissionType::ExtractArtifacts,
    MissionType::DestroyHive,
    MissionType::EscortVip,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Combat,
    Elite,
    Shop,
    Event,
    Boss,
}

impl NodeType {
    pub fn is_combat(self) -> bool {
        matches!(self, NodeType::Combat | NodeType::Elite | NodeType::Boss)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeStatus {
    #[default]
    Hidden,
    Revealed,
    Accessible,
    Cleared,
    Skipped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionType {
    Prologue,
    RecoverIntel,
    ExtractArtifacts,
    DestroyHive,
    #[serde(rename = "EscortVIP")]
    EscortVip,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorNode {
    pub id: String,
    pub rank: usize,
    pub lane: usize,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub status: NodeStatus,
    pub difficulty: f64,
    pub map_seed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_type: Option<MissionType>,
    /// Ids of the linked nodes in the next rank, ordered by lane.
    pub connections: Vec<String>,
    pub position: NodePosition,
    pub bonus_loot_count: usize,
}

/// Probability of each intermediate node type, after the difficulty and
/// economy adjustments. Combat takes whatever the others leave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTypeShares {
    pub elite: f64,
    pub shop: f64,
    pub event: f64,
}

impl NodeTypeShares {
    pub fn for_rules(rules: &GameRules) -> Self {
        let elite = match rules.difficulty {
            CampaignDifficulty::Simulation => 0.1,
            CampaignDifficulty::Clone | CampaignDifficulty::Standard => 0.2,
            CampaignDifficulty::Ironman => 0.3,
        };
        let shop = match rules.economy_mode {
            EconomyMode::Open => 0.1,
            EconomyMode::Limited => 0.05,
        };
        Self { elite, shop, event: EVENT_SHARE }
    }

    pub fn combat(&self) -> f64 {
        1.0 - self.elite - self.shop - self.event
    }

    fn pick(&self, roll: f64) -> NodeType {
        let combat = self.combat();
        if roll < combat {
            NodeType::Combat
        } else if roll < combat + self.elite {
            NodeType::Elite
        } else if roll < combat + self.elite + self.shop {
            NodeType::Shop
        } else {
            NodeType::Event
        }
    }
}

/// Shape overrides for a sector. The defaults derive the rank count from
/// the growth rate and lay nodes out on an 800x600 canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectorMapOptions {
    /// Fixed number of ranks, start and boss included. Clamped to
    /// `1..=MAX_RANKS`.
    pub ranks: Option<usize>,
    pub width: f64,
    pub height: f64,
}

impl Default for SectorMapOptions {
    fn default() -> Self {
        Self { ranks: None, width: LAYOUT_WIDTH, height: LAYOUT_HEIGHT }
    }
}

struct Layout {
    last: usize,
    width: f64,
    lane_height: f64,
}

pub struct SectorMapGenerator {
    seed: u64,
    options: SectorMapOptions,
}

impl SectorMapGenerator {
    pub fn new(seed: u64) -> Self {
        Self::with_options(seed, SectorMapOptions::default())
    }

    pub fn with_options(seed: u64, options: SectorMapOptions) -> Self {
        Self { seed, options }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn options(&self) -> &SectorMapOptions {
        &self.options
    }

    /// `floor(6 / growth) + 1` ranks, so a growth rate of `1.0` yields ranks
    /// `0..=6` and `0.5` yields `0..=12`. Never more than [`MAX_RANKS`].
    pub fn rank_count(rules: &GameRules) -> usize {
        let span = (RANK_SPAN / rules.effective_growth_rate()).floor();
        span.min((MAX_RANKS - 1) as f64) as usize + 1
    }

    fn ranks(&self, rules: &GameRules) -> usize {
        match self.options.ranks {
            Some(ranks) => ranks.clamp(1, MAX_RANKS),
            None => Self::rank_count(rules),
        }
    }

    /// Nodes in rank order, lanes ascending within a rank.
    pub fn generate(&self, rules: &GameRules) -> Vec<SectorNode> {
        let mut prng = Prng::new(self.seed);
        let ranks = self.ranks(rules);
        let last = ranks - 1;
        let layout = Layout {
            last,
            width: self.options.width,
            lane_height: self.options.height / LANES as f64,
        };
        let shares = NodeTypeShares::for_rules(rules);

        let start_lane = prng.next_int(1, 2) as usize;
        let boss_lane = prng.next_int(1, 2) as usize;

        let mut tiers: Vec<Vec<SectorNode>> = Vec::with_capacity(ranks);
        for rank in 0..ranks {
            let lanes = if rank == last {
                vec![boss_lane]
            } else if rank == 0 {
                vec![start_lane]
            } else {
                pick_lanes(&mut prng, rank, last, start_lane, boss_lane)
            };
            let tier = lanes
                .into_iter()
                .map(|lane| build_node(&mut prng, rules, &shares, &layout, rank, lane))
                .collect();
            tiers.push(tier);
        }

        for rank in 0..last {
            let (current, next) = tiers.split_at_mut(rank + 1);
            let (from, to) = (&mut current[rank], &next[0]);
            let from_lanes: Vec<usize> = from.iter().map(|node| node.lane).collect();
            let to_lanes: Vec<usize> = to.iter().map(|node| node.lane).collect();
            let links = link_ranks(&mut prng, &from_lanes, &to_lanes);
            for node in from.iter_mut() {
                node.connections = links
                    .iter()
                    .filter(|(source, _)| *source == node.lane)
                    .map(|&(_, target)| node_id(rank + 1, target))
                    .collect();
            }
        }

        tiers.into_iter().flatten().collect()
    }
}

fn node_id(rank: usize, lane: usize) -> String {
    format!("node_{rank}_{lane}")
}

/// Up to four lanes, drawn from those still within reach of both the
/// start lane and the boss lane. Near the ends of a short sector that can
/// leave only two.
fn pick_lanes(
    prng: &mut Prng,
    rank: usize,
    last: usize,
    start_lane: usize,
    boss_lane: usize,
) -> Vec<usize> {
    let count = prng.next_int(3, 4) as usize;
    let mut lanes: Vec<usize> = (0..LANES)
        .filter(|&lane| lane.abs_diff(start_lane) <= rank && lane.abs_diff(boss_lane) <= last - rank)
        .collect();
    prng.shuffle(&mut lanes);
    lanes.truncate(count);
    lanes.sort_unstable();
    lanes
}

fn build_node(
    prng: &mut Prng,
    rules: &GameRules,
    shares: &NodeTypeShares,
    layout: &Layout,
    rank: usize,
    lane: usize,
) -> SectorNode {
    let last = layout.last;
    let node_type = if rank == last {
        NodeType::Boss
    } else if rank == 0 {
        NodeType::Combat
    } else {
        shares.pick(prng.next_f64())
    };

    let lane_height = layout.lane_height;
    let jitter = (prng.next_f64() - 0.5) * lane_height * LANE_JITTER;
    let x = if last == 0 { 0.0 } else { rank as f64 / last as f64 * layout.width };
    let map_seed = prng.next_int(0, MAX_MAP_SEED) as u64;

    let mission_type = if rank == 0 && rank != last && !rules.skip_prologue {
        Some(MissionType::Prologue)
    } else if node_type.is_combat() {
        prng.pick(&COMBAT_MISSIONS).copied()
    } else {
        None
    };

    SectorNode {
        id: node_id(rank, lane),
        rank,
        lane,
        node_type,
        status: if rank == 0 { NodeStatus::Accessible } else { NodeStatus::Revealed },
        difficulty: 1.0 + rank as f64 * rules.difficulty_scaling,
        map_seed,
        mission_type,
        connections: Vec::new(),
        position: NodePosition { x, y: (lane as f64 + 0.5) * lane_height + jitter },
        bonus_loot_count: prng.next_int(0, MAX_BONUS_LOOT) as usize,
    }
}

fn nearest_lane(lanes: &[usize], lane: usize) -> Option<usize> {
    lanes
        .iter()
        .copied()
        .filter(|candidate| candidate.abs_diff(lane) <= 1)
        .min_by_key(|&candidate| (candidate.abs_diff(lane), candidate))
}

/// Links between two adjacent ranks as `(from_lane, to_lane)` pairs.
///
/// With lane distance capped at one, the only way two links cross is the
/// swap `(a, a + 1)` next to `(a + 1, a)`. Nearest-lane links never form
/// one, and extra diagonals are only added when their mirror is absent.
fn link_ranks(prng: &mut Prng, from: &[usize], to: &[usize]) -> BTreeSet<(usize, usize)> {
    let mut links = BTreeSet::new();
    for &source in from {
        if let Some(target) = nearest_lane(to, source) {
            links.insert((source, target));
        }
    }
    for &target in to {
        if links.iter().any(|&(_, linked)| linked == target) {
            continue;
        }
        if let Some(source) = nearest_lane(from, target) {
            links.insert((source, target));
        }
    }
    for &source in from {
        for target in [source.checked_sub(1), Some(source + 1)].into_iter().flatten() {
            if !to.contains(&target)
                || links.contains(&(source, target))
                || links.contains(&(target, source))
            {
                continue;
            }
            if prng.chance(EXTRA_LINK_CHANCE) {
                links.insert((source, target));
            }
        }
    }
    links
}

/// Floor plan request for a mission node: the map grows with rank and
/// uses the campaign's generator type.
pub fn mission_config(node: &SectorNode, rules: &GameRules) -> MapGenerationConfig {
    let side = calculate_map_size(node.rank, rules.effective_growth_rate());
    let mut config = MapGenerationConfig::new(node.map_seed, side, side, rules.map_generator_type);
    config.bonus_loot_count = Some(node.bonus_loot_count);
    config
}
