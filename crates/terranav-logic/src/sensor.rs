//! Sensor descriptors and the detection mask derived from them.
//!
//! A mask is the union over all attached sensors of the relative `(dx, dy)`
//! offsets the avatar can see from wherever it stands. It is regenerated
//! wholesale whenever the sensor set changes, never patched incrementally,
//! and is read-only during a run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::grid::{DetectMap, TerrainGrid};

/// A single sensing device mounted on an avatar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub name: String,
    /// Detection radius in grid cells.
    pub range: u32,
    /// Field of view in degrees.
    pub field_of_view: f64,
    /// Facing direction in degrees, 0 = +x axis.
    pub direction: f64,
    /// Battery draw attributed to this sensor.
    pub battery_consumption: f64,
    pub description: String,
}

impl Sensor {
    /// An omnidirectional radar, the stock sensor for default rovers.
    pub fn radar_360(name: &str, range: u32) -> Self {
        Self {
            name: name.to_string(),
            range,
            field_of_view: 360.0,
            direction: 0.0,
            battery_consumption: 2.0,
            description: format!("{name} radar, 360-degree vision"),
        }
    }
}

/// Cached set of visible relative offsets for one avatar configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionMask {
    offsets: HashSet<(i32, i32)>,
}

impl DetectionMask {
    /// Compute the union of visible offsets across all sensors.
    ///
    /// An offset qualifies for a sensor when it lies inside the range circle
    /// (`dx² + dy² ≤ r²`) and its atan2 angle, normalized to `[0, 360)`,
    /// falls inside the sensor's field of view around its facing direction.
    pub fn generate(sensors: &[Sensor]) -> Self {
        let mut offsets = HashSet::new();
        for sensor in sensors {
            let range = sensor.range as i32;
            for dx in -range..=range {
                for dy in -range..=range {
                    let distance = ((dx * dx + dy * dy) as f64).sqrt();
                    if distance > sensor.range as f64 {
                        continue;
                    }
                    let mut angle = (dy as f64).atan2(dx as f64).to_degrees();
                    if angle < 0.0 {
                        angle += 360.0;
                    }
                    if angle_in_fov(angle, sensor.direction, sensor.field_of_view) {
                        offsets.insert((dx, dy));
                    }
                }
            }
        }
        Self { offsets }
    }

    pub fn offsets(&self) -> &HashSet<(i32, i32)> {
        &self.offsets
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Reveal every in-bounds cell the mask covers from `(x, y)` by copying
    /// the true elevation into the detect map. Offsets that land outside the
    /// grid are silently skipped.
    pub fn apply(&self, detect_map: &mut DetectMap, grid: &TerrainGrid, x: i64, y: i64) {
        for &(dx, dy) in &self.offsets {
            let (nx, ny) = (x + dx as i64, y + dy as i64);
            if grid.in_bounds(nx, ny) {
                detect_map.reveal(nx, ny, grid.get(nx, ny));
            }
        }
    }
}

/// Is `angle` inside `[direction - fov/2, direction + fov/2]`, mod 360?
fn angle_in_fov(angle: f64, direction: f64, fov: f64) -> bool {
    let min_angle = (direction - fov / 2.0).rem_euclid(360.0);
    let max_angle = (direction + fov / 2.0).rem_euclid(360.0);
    if min_angle < max_angle {
        min_angle <= angle && angle <= max_angle
    } else {
        // The arc wraps across 0 degrees.
        angle >= min_angle || angle <= max_angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with(range: u32, fov: f64, direction: f64) -> DetectionMask {
        DetectionMask::generate(&[Sensor {
            name: "test".into(),
            range,
            field_of_view: fov,
            direction,
            battery_consumption: 1.0,
            description: String::new(),
        }])
    }

    #[test]
    fn test_offsets_respect_range_circle() {
        let mask = mask_with(3, 360.0, 0.0);
        for &(dx, dy) in mask.offsets() {
            assert!(dx * dx + dy * dy <= 9, "({dx},{dy}) outside range circle");
            assert!(dx.abs() <= 3 && dy.abs() <= 3);
        }
    }

    #[test]
    fn test_full_fov_is_direction_independent() {
        let a = mask_with(4, 360.0, 0.0);
        let b = mask_with(4, 360.0, 137.0);
        let c = mask_with(4, 360.0, 270.0);
        assert_eq!(a.offsets(), b.offsets());
        assert_eq!(a.offsets(), c.offsets());
    }

    #[test]
    fn test_narrow_fov_is_a_strict_subset() {
        let narrow = mask_with(4, 90.0, 0.0);
        let full = mask_with(4, 360.0, 0.0);
        assert!(narrow.offsets().len() < full.offsets().len());
        assert!(narrow.offsets().is_subset(full.offsets()));
    }

    #[test]
    fn test_fov_wraps_across_zero_degrees() {
        // Facing +x with a 90-degree cone: cells at roughly -40 and +40
        // degrees are both visible even though the arc spans 0.
        let mask = mask_with(4, 90.0, 0.0);
        assert!(mask.offsets().contains(&(3, 2)));
        assert!(mask.offsets().contains(&(3, -2)));
        assert!(!mask.offsets().contains(&(-3, 0)));
    }

    #[test]
    fn test_union_across_sensors() {
        let forward = Sensor {
            name: "fwd".into(),
            range: 3,
            field_of_view: 90.0,
            direction: 0.0,
            battery_consumption: 1.0,
            description: String::new(),
        };
        let backward = Sensor {
            name: "back".into(),
            range: 3,
            field_of_view: 90.0,
            direction: 180.0,
            battery_consumption: 1.0,
            description: String::new(),
        };
        let both = DetectionMask::generate(&[forward.clone(), backward.clone()]);
        let fwd_only = DetectionMask::generate(&[forward]);
        let back_only = DetectionMask::generate(&[backward]);
        let expected: HashSet<_> = fwd_only.offsets().union(back_only.offsets()).copied().collect();
        assert_eq!(*both.offsets(), expected);
    }

    #[test]
    fn test_apply_reveals_in_bounds_cells_only() {
        let grid = TerrainGrid::flat(5, 5, 3.0);
        let mut map = DetectMap::new(5, 5);
        let mask = mask_with(2, 360.0, 0.0);

        // Corner position: most of the mask hangs off the grid.
        mask.apply(&mut map, &grid, 0, 0);
        assert!(map.is_revealed(0, 0));
        assert!(map.is_revealed(1, 1));
        assert!(!map.is_revealed(4, 4));
        assert_eq!(map.get(0, 1), Some(3.0));
    }

    #[test]
    fn test_apply_is_monotonic() {
        let grid = TerrainGrid::flat(5, 5, 1.0);
        let mut map = DetectMap::new(5, 5);
        let mask = mask_with(1, 360.0, 0.0);

        mask.apply(&mut map, &grid, 0, 0);
        let before = map.revealed_count();
        mask.apply(&mut map, &grid, 2, 2);
        assert!(map.revealed_count() >= before);
        assert!(map.is_revealed(0, 0));
    }
}
