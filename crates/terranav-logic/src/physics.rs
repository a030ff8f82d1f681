//! Movability and step-cost primitives shared by every strategy.

/// Horizontal distance between adjacent cell centres, in elevation units.
pub const REFERENCE_DISTANCE: f64 = 10.0;

/// Weight of the elevation delta in the slope-scaled step cost.
pub const SLOPE_FACTOR: f64 = 1.0;

/// Can an avatar with the given climbing capability step between two
/// adjacent cells? Symmetric in its elevation arguments.
pub fn movable(elevation_a: f64, elevation_b: f64, max_slope: f64) -> bool {
    (elevation_a - elevation_b).abs() <= max_slope
}

/// Time units for one step between adjacent cells, scaled by slope:
/// `ceil(base_time * (1 + SLOPE_FACTOR * |Δelev| / REFERENCE_DISTANCE))`.
pub fn slope_scaled_cost(base_time: u64, elevation_a: f64, elevation_b: f64) -> u64 {
    let delta = (elevation_a - elevation_b).abs();
    let actual = base_time as f64 * (1.0 + SLOPE_FACTOR * delta / REFERENCE_DISTANCE);
    actual.ceil() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movable_within_slope() {
        assert!(movable(5.0, 8.0, 4.0));
        assert!(movable(5.0, 9.0, 4.0)); // boundary is inclusive
        assert!(!movable(5.0, 9.5, 4.0));
    }

    #[test]
    fn test_movable_is_symmetric() {
        for (a, b) in [(0.0, 3.0), (10.0, -2.5), (7.0, 7.0), (1.0, 100.0)] {
            assert_eq!(movable(a, b, 5.0), movable(b, a, 5.0));
        }
    }

    #[test]
    fn test_flat_step_costs_base_time() {
        assert_eq!(slope_scaled_cost(10, 5.0, 5.0), 10);
    }

    #[test]
    fn test_slope_scales_cost() {
        // Δ5 over reference distance 10 → ×1.5
        assert_eq!(slope_scaled_cost(10, 0.0, 5.0), 15);
        // Fractional results round up
        assert_eq!(slope_scaled_cost(3, 0.0, 1.0), 4); // 3 * 1.1 = 3.3
    }
}
