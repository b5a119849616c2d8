//! Generator facade: dispatches to a layout strategy, then sanitizes and
//! tags the result.

mod dense_ship;
mod pipeline;
mod spaceship;
mod tree_ship;

use log::info;

use crate::error::{AssemblyError, GenerationError};
use crate::types::MapGeneratorType;

use super::model::MapDefinition;
use super::sanitize::sanitize;
use super::tiles::{self, TileAssembly, TileLibrary};
use super::validate::{ValidationReport, validate};

pub use dense_ship::DenseShipGenerator;
pub use spaceship::SpaceshipGenerator;
pub use tree_ship::TreeShipGenerator;

pub const DEFAULT_SPAWN_POINT_COUNT: usize = 2;

/// The generative layout strategies, one per [`MapGeneratorType`] that
/// carves its own floor plan.
pub enum ShipGenerator {
    TreeShip(TreeShipGenerator),
    DenseShip(DenseShipGenerator),
    Spaceship(SpaceshipGenerator),
}

impl ShipGenerator {
    pub fn new(
        kind: MapGeneratorType,
        seed: u64,
        width: usize,
        height: usize,
    ) -> Result<Self, GenerationError> {
        match kind {
            MapGeneratorType::TreeShip => {
                Ok(Self::TreeShip(TreeShipGenerator::new(seed, width, height)))
            }
            MapGeneratorType::DenseShip => {
                Ok(Self::DenseShip(DenseShipGenerator::new(seed, width, height)))
            }
            MapGeneratorType::Procedural => {
                Ok(Self::Spaceship(SpaceshipGenerator::new(seed, width, height)))
            }
            MapGeneratorType::Static => Err(GenerationError::StaticRequiresLayout),
        }
    }

    pub fn kind(&self) -> MapGeneratorType {
        match self {
            Self::TreeShip(_) => MapGeneratorType::TreeShip,
            Self::DenseShip(_) => MapGeneratorType::DenseShip,
            Self::Spaceship(_) => MapGeneratorType::Procedural,
        }
    }

    /// Raw layout straight from the strategy, before sanitizing.
    pub fn generate(&mut self, spawn_point_count: usize) -> Result<MapDefinition, GenerationError> {
        match self {
            Self::TreeShip(generator) => generator.generate(spawn_point_count),
            Self::DenseShip(generator) => generator.generate(spawn_point_count),
            Self::Spaceship(generator) => generator.generate(spawn_point_count),
        }
    }
}

pub struct MapGenerator {
    seed: u64,
}

impl MapGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn generate(
        &self,
        width: usize,
        height: usize,
        kind: MapGeneratorType,
        spawn_point_count: Option<usize>,
    ) -> Result<MapDefinition, GenerationError> {
        let mut strategy = ShipGenerator::new(kind, self.seed, width, height)?;
        let raw = strategy.generate(spawn_point_count.unwrap_or(DEFAULT_SPAWN_POINT_COUNT))?;
        let mut map = sanitize(&raw);
        map.generator_name = Some(strategy.kind());
        info!(
            "generated {kind} {width}x{height} seed {}: {} floor cells, {} doors",
            self.seed,
            map.cells.len(),
            map.doors.len()
        );
        Ok(map)
    }

    /// Accepts a hand-made layout. Untagged layouts are tagged `Static`;
    /// either way the result goes through the same sanitizer as generated
    /// maps.
    pub fn load(&self, layout: &MapDefinition) -> MapDefinition {
        let mut map = sanitize(layout);
        map.generator_name = Some(layout.generator_name.unwrap_or(MapGeneratorType::Static));
        map
    }

    /// Stitches a tile assembly into a layout and loads it.
    pub fn assemble(
        &self,
        assembly: &TileAssembly,
        library: &TileLibrary,
    ) -> Result<MapDefinition, AssemblyError> {
        tiles::assemble(assembly, library).map(|layout| self.load(&layout))
    }

    pub fn validate(map: &MapDefinition) -> ValidationReport {
        validate(map)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;
    use crate::mapgen::model::{Cell, SpawnPoint};
    use crate::types::{CellType, Vector2};

    #[test]
    fn static_generation_requires_a_layout() {
        let result = MapGenerator::new(1).generate(8, 8, MapGeneratorType::Static, None);
        assert_eq!(result, Err(GenerationError::StaticRequiresLayout));
    }

    #[test]
    fn generated_maps_are_sanitized_and_tagged() {
        for kind in MapGeneratorType::GENERATIVE {
            let map = MapGenerator::new(99).generate(10, 10, kind, None).expect("generates");
            assert_eq!(map.generator_name, Some(kind));
            assert!(map.cells.iter().all(|cell| cell.kind == CellType::Floor));
            assert_eq!(map.spawn_points.len(), DEFAULT_SPAWN_POINT_COUNT);
            let report = MapGenerator::validate(&map);
            assert!(report.is_valid, "{kind}: {:?}", report.issues);
        }
    }

    #[test]
    fn same_inputs_produce_byte_identical_maps() {
        for kind in MapGeneratorType::GENERATIVE {
            let a = MapGenerator::new(123_456).generate(14, 12, kind, Some(3)).expect("generates");
            let b = MapGenerator::new(123_456).generate(14, 12, kind, Some(3)).expect("generates");
            assert_eq!(a.canonical_bytes(), b.canonical_bytes());
        }
    }

    #[test]
    fn different_seeds_change_the_layout() {
        let a = MapGenerator::new(1).generate(12, 12, MapGeneratorType::TreeShip, None);
        let b = MapGenerator::new(2).generate(12, 12, MapGeneratorType::TreeShip, None);
        assert_ne!(a.expect("generates").fingerprint(), b.expect("generates").fingerprint());
    }

    #[test]
    fn load_tags_untagged_layouts_as_static() {
        let mut layout = MapDefinition::empty(2, 1);
        layout.cells.push(Cell::floor(Vector2::new(0, 0), Some("room-a".into())));
        layout.cells.push(Cell { x: 1, y: 0, kind: CellType::Void, room_id: None });
        layout.spawn_points.push(SpawnPoint { id: "spawn-1".into(), pos: Vector2::new(0, 0), radius: 1 });

        let map = MapGenerator::new(0).load(&layout);
        assert_eq!(map.generator_name, Some(MapGeneratorType::Static));
        assert_eq!(map.cells.len(), 1);
        assert_eq!(layout.cells.len(), 2, "input layout is left untouched");
    }

    #[test]
    fn strategy_kind_round_trips_through_dispatch() {
        for kind in MapGeneratorType::GENERATIVE {
            let strategy = ShipGenerator::new(kind, 5, 8, 8).expect("generative");
            assert_eq!(strategy.kind(), kind);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]
        #[test]
        fn generated_maps_keep_one_connected_floor_region(
            seed in any::<u64>(),
            width in 6_usize..=16,
            height in 6_usize..=16,
            kind_selector in 0_usize..3,
        ) {
            let kind = MapGeneratorType::GENERATIVE[kind_selector];
            let map = MapGenerator::new(seed).generate(width, height, kind, None);
            prop_assert!(map.is_ok(), "{kind} {width}x{height} seed={seed}: {map:?}");
            let map = map.expect("checked above");
            let floor: BTreeSet<Vector2> = map.cells.iter().map(Cell::pos).collect();
            prop_assert_eq!(floor.len(), map.cells.len());
            prop_assert!(map.fill_rate() >= 0.2);
            let report = MapGenerator::validate(&map);
            prop_assert!(report.is_valid, "{} seed={}: {:?}", kind, seed, report.issues);
        }
    }
}
