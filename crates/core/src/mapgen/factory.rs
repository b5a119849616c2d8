//! Mission-level map assembly: picks the spawn count, generates or loads the
//! floor plan, and scatters bonus loot through free room cells.

use std::collections::BTreeSet;

use log::warn;

use crate::error::{AssemblyError, GenerationError};
use crate::types::{CellType, Vector2};

use super::generator::MapGenerator;
use super::model::{MapDefinition, MapGenerationConfig};
use super::progression::calculate_spawn_points;
use super::seed::Prng;
use super::tiles::{TileAssembly, TileLibrary};
use super::validate::validate;

/// Loot draws from its own stream so adding loot never reshapes the layout.
const LOOT_SEED_OFFSET: u64 = 999;

pub struct MapFactory {
    config: MapGenerationConfig,
}

impl MapFactory {
    pub fn new(config: MapGenerationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapGenerationConfig {
        &self.config
    }

    /// Spawn count requested by the config, or the size-based default.
    pub fn spawn_point_count(&self) -> usize {
        self.config
            .spawn_point_count
            .unwrap_or_else(|| calculate_spawn_points(self.config.width.min(self.config.height)))
    }

    pub fn generate(&self) -> Result<MapDefinition, GenerationError> {
        let MapGenerationConfig { seed, width, height, kind, .. } = self.config;
        let map = MapGenerator::new(seed).generate(
            width,
            height,
            kind,
            Some(self.spawn_point_count()),
        )?;
        Ok(self.enrich(map))
    }

    /// Runs a hand-made layout through the same sanitizing and loot steps
    /// as a generated one.
    pub fn load(&self, layout: &MapDefinition) -> MapDefinition {
        let map = MapGenerator::new(self.config.seed).load(layout);
        self.enrich(map)
    }

    pub fn assemble(
        &self,
        assembly: &TileAssembly,
        library: &TileLibrary,
    ) -> Result<MapDefinition, AssemblyError> {
        let map = MapGenerator::new(self.config.seed).assemble(assembly, library)?;
        Ok(self.enrich(map))
    }

    fn enrich(&self, mut map: MapDefinition) -> MapDefinition {
        let requested = self.config.bonus_loot_count.unwrap_or(0);
        map.bonus_loot = place_bonus_loot(&map, requested, self.config.seed);

        let report = validate(&map);
        if !report.is_valid {
            warn!(
                "{} map for seed {} has {} validation issue(s): {:?}",
                self.config.kind,
                self.config.seed,
                report.issues.len(),
                report.issues
            );
        }
        map
    }
}

/// Up to `count` loot positions on free room cells of `map`. Asking for
/// more than the rooms can hold yields every free room cell.
pub fn place_bonus_loot(map: &MapDefinition, count: usize, seed: u64) -> Vec<Vector2> {
    if count == 0 {
        return Vec::new();
    }

    let mut occupied: BTreeSet<Vector2> = map.squad_positions().into_iter().collect();
    occupied.extend(map.spawn_points.iter().map(|spawn| spawn.pos));
    occupied.extend(map.extraction);
    occupied.extend(map.objectives.iter().filter_map(|objective| objective.target_cell));
    occupied.extend(map.bonus_loot.iter().copied());

    let mut available: Vec<Vector2> = map
        .cells
        .iter()
        .filter(|cell| cell.kind == CellType::Floor && cell.is_room())
        .map(|cell| cell.pos())
        .filter(|pos| !occupied.contains(pos))
        .collect();

    let mut prng = Prng::new(seed.wrapping_add(LOOT_SEED_OFFSET));
    prng.shuffle(&mut available);
    available.truncate(count);
    available
}
