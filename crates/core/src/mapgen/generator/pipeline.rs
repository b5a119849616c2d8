//! Retry loop shared by every layout strategy: carve, prune, check fill,
//! place features, and emit the raw map.

use log::debug;

use crate::error::GenerationError;
use crate::types::MapGeneratorType;

use super::super::layout::Blueprint;
use super::super::model::MapDefinition;
use super::super::progression::MIN_MAP_SIDE;
use super::super::seed::Prng;
use super::super::spawns::{FeatureRequest, place_features};

pub(super) const MAX_LAYOUT_ATTEMPTS: usize = 64;
pub(super) const MIN_FILL_RATE: f64 = 0.2;

pub(super) struct LayoutRequest {
    pub(super) kind: MapGeneratorType,
    pub(super) width: usize,
    pub(super) height: usize,
    pub(super) features: FeatureRequest,
}

/// Runs `carve` on fresh blueprints until one passes, drawing every attempt
/// from the same stream so the outcome stays a pure function of the seed.
pub(super) fn generate_layout(
    request: &LayoutRequest,
    prng: &mut Prng,
    carve: fn(&mut Prng, &mut Blueprint),
) -> Result<MapDefinition, GenerationError> {
    let LayoutRequest { kind, width, height, features } = *request;
    if width < MIN_MAP_SIDE || height < MIN_MAP_SIDE {
        return Err(GenerationError::InvalidDimensions { width, height, minimum: MIN_MAP_SIDE });
    }

    for attempt in 1..=MAX_LAYOUT_ATTEMPTS {
        let mut blueprint = Blueprint::new(width, height);
        carve(prng, &mut blueprint);

        let dropped = blueprint.retain_largest_component();
        if dropped > 0 {
            debug!("{kind} attempt {attempt}: pruned {dropped} disconnected cells");
        }

        let fill_rate = blueprint.fill_rate();
        if fill_rate < MIN_FILL_RATE {
            debug!("{kind} attempt {attempt}: fill rate {fill_rate:.3} below {MIN_FILL_RATE}");
            continue;
        }

        match place_features(&mut blueprint, prng, features) {
            Ok(placed) => {
                debug!(
                    "{kind} {width}x{height} seed {} accepted on attempt {attempt}",
                    prng.seed()
                );
                return Ok(blueprint.into_map(kind, placed));
            }
            Err(reason) => debug!("{kind} attempt {attempt}: {reason}"),
        }
    }

    Err(GenerationError::RetriesExhausted { kind, width, height, attempts: MAX_LAYOUT_ATTEMPTS })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vector2;

    fn carve_nothing(_: &mut Prng, _: &mut Blueprint) {}

    fn carve_full_grid(_: &mut Prng, blueprint: &mut Blueprint) {
        for y in 0..blueprint.height as i32 {
            for x in 0..blueprint.width as i32 {
                blueprint.carve(Vector2::new(x, y), format!("room-{x}-{y}"));
            }
        }
        for y in 0..blueprint.height as i32 {
            for x in 0..blueprint.width as i32 {
                let here = Vector2::new(x, y);
                blueprint.add_door(here, Vector2::new(x + 1, y));
                blueprint.add_door(here, Vector2::new(x, y + 1));
            }
        }
    }

    fn request(width: usize, height: usize) -> LayoutRequest {
        LayoutRequest {
            kind: MapGeneratorType::TreeShip,
            width,
            height,
            features: FeatureRequest { spawn_point_count: 2, objective_count: 1 },
        }
    }

    #[test]
    fn undersized_maps_are_rejected_before_carving() {
        let result = generate_layout(&request(5, 9), &mut Prng::new(1), carve_full_grid);
        assert_eq!(
            result,
            Err(GenerationError::InvalidDimensions { width: 5, height: 9, minimum: 6 })
        );
    }

    #[test]
    fn empty_layouts_exhaust_retries() {
        let result = generate_layout(&request(8, 8), &mut Prng::new(1), carve_nothing);
        assert_eq!(
            result,
            Err(GenerationError::RetriesExhausted {
                kind: MapGeneratorType::TreeShip,
                width: 8,
                height: 8,
                attempts: MAX_LAYOUT_ATTEMPTS,
            })
        );
    }

    #[test]
    fn accepted_layouts_emit_every_cell_and_tag_the_strategy() {
        let map = generate_layout(&request(6, 6), &mut Prng::new(3), carve_full_grid)
            .expect("full grid always places");
        assert_eq!(map.cells.len(), 36);
        assert_eq!(map.generator_name, Some(MapGeneratorType::TreeShip));
        assert_eq!(map.squad_spawn, map.squad_spawns.first().copied());
        assert_eq!(map.spawn_points.len(), 2);
    }
}
