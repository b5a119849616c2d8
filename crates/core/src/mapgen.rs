//! Procedural ship floor plans split into coherent submodules.

pub mod ascii;
pub mod graph;
pub mod model;
pub mod progression;
pub mod tiles;

mod factory;
mod generator;
mod grid;
mod layout;
mod sanitize;
mod seed;
mod spawns;
mod validate;

pub use factory::{MapFactory, place_bonus_loot};
pub use generator::{
    DEFAULT_SPAWN_POINT_COUNT, DenseShipGenerator, MapGenerator, ShipGenerator,
    SpaceshipGenerator, TreeShipGenerator,
};
pub use grid::quadrant;
pub use model::{
    Cell, Door, MapDefinition, MapGenerationConfig, ObjectiveDefinition, ObjectiveKind,
    SpawnPoint, WallDefinition,
};
pub use progression::{calculate_map_size, calculate_spawn_points};
pub use sanitize::sanitize;
pub use seed::Prng;
pub use spawns::SQUAD_SPAWN_COUNT;
pub use tiles::{
    TileAssembly, TileDefinition, TileLibrary, TileRotation, assemble, standard_tiles,
};
pub use validate::{ValidationReport, validate};

use crate::error::GenerationError;

/// Generates the map a config describes, loot included.
pub fn generate_map(config: &MapGenerationConfig) -> Result<MapDefinition, GenerationError> {
    MapFactory::new(config.clone()).generate()
}

#[cfg(test)]
mod tests {
    use super::{MapFactory, MapGenerationConfig};
    use crate::types::MapGeneratorType;

    #[test]
    fn generate_map_matches_map_factory_output() {
        let mut config = MapGenerationConfig::new(123, 10, 10, MapGeneratorType::DenseShip);
        config.bonus_loot_count = Some(2);

        let from_helper = super::generate_map(&config);
        let from_factory = MapFactory::new(config).generate();

        assert_eq!(from_helper, from_factory);
    }
}
