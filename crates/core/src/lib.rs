pub mod campaign;
pub mod error;
pub mod mapgen;
pub mod types;

pub use campaign::{GameRules, SectorMapGenerator, SectorNode, mission_config};
pub use error::{AsciiMapError, AssemblyError, GenerationError};
pub use mapgen::{
    MapDefinition, MapFactory, MapGenerationConfig, MapGenerator, ValidationReport, generate_map,
    sanitize, validate,
};
pub use types::*;
