//! Size and population rules that scale maps with campaign progress.

/// Smallest side any generative layout accepts.
pub const MIN_MAP_SIDE: usize = 6;
pub const BASE_MAP_SIDE: usize = 6;
pub const MAX_MAP_SIDE: usize = 12;

/// Enemy spawn points for a map whose shorter side is `min_side`: one at
/// the minimum size and one more for every two cells beyond it.
pub fn calculate_spawn_points(min_side: usize) -> usize {
    1 + min_side.saturating_sub(BASE_MAP_SIDE) / 2
}

/// Square map side for a mission at `rank`, growing by `growth_rate` cells
/// per rank and capped at [`MAX_MAP_SIDE`].
pub fn calculate_map_size(rank: usize, growth_rate: f64) -> usize {
    let growth = (rank as f64 * growth_rate).floor();
    if !growth.is_finite() || growth <= 0.0 {
        return BASE_MAP_SIDE;
    }
    (BASE_MAP_SIDE + growth as usize).min(MAX_MAP_SIDE)
}
