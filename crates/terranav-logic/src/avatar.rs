//! Avatar descriptor — the rover's physical and sensing capabilities.

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::physics::REFERENCE_DISTANCE;
use crate::sensor::Sensor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub name: String,
    /// Mass in kg.
    pub weight: f64,
    pub material: String,
    pub description: String,
    pub battery_capacity: f64,
    /// Battery draw per unit of distance travelled.
    pub battery_consumption_rate: f64,
    /// Traction force in N.
    pub driving_force: f64,
    /// Top speed in grid units per time unit. Must be positive.
    pub speed: f64,
    /// Energy restored per clock tick at full light intensity.
    pub energy_recharge_rate: f64,
    pub sensors: Vec<Sensor>,
}

impl Avatar {
    /// Maximum elevation delta (not angle) traversable between adjacent
    /// cells, from the force balance on an incline:
    /// `d * tan(atan((F − μ·m·g) / (m·g)))` at the reference distance.
    ///
    /// Degenerate physics (non-positive driving force or weight) degrades to
    /// zero rather than erroring.
    pub fn max_slope(&self, env: &Environment) -> f64 {
        if self.driving_force <= 0.0 || self.weight <= 0.0 {
            return 0.0;
        }
        let normal_force = self.weight * env.gravity;
        let slope_radians =
            ((self.driving_force - env.friction * normal_force) / normal_force).atan();
        REFERENCE_DISTANCE * slope_radians.tan()
    }

    /// Base time units to cross one grid cell on flat ground.
    pub fn base_time_per_grid(&self) -> u64 {
        (REFERENCE_DISTANCE / self.speed).ceil() as u64
    }

    /// Attach a sensor unless one with the same name is already bound.
    /// The holder must regenerate any cached detection mask afterwards.
    pub fn bind_sensor(&mut self, sensor: Sensor) -> bool {
        if self.sensors.iter().any(|s| s.name == sensor.name) {
            return false;
        }
        self.sensors.push(sensor);
        true
    }

    /// Detach the named sensor, reporting whether anything was removed.
    pub fn unbind_sensor(&mut self, name: &str) -> bool {
        let before = self.sensors.len();
        self.sensors.retain(|s| s.name != name);
        self.sensors.len() != before
    }

    /// Stock high-endurance exploration rover with a 360-degree radar.
    pub fn default_rover(name: &str) -> Self {
        Self {
            name: name.to_string(),
            weight: 80.0,
            material: "Titanium Alloy".to_string(),
            description: format!("High-endurance exploration rover {name}"),
            battery_capacity: 200.0,
            battery_consumption_rate: 5.0,
            driving_force: 280.0,
            speed: 1.0,
            energy_recharge_rate: 20.0,
            sensors: vec![Sensor::radar_360(&format!("{name}_radar"), 5)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_slope_from_force_balance() {
        let avatar = Avatar::default_rover("r1");
        let env = Environment::default();
        // N = 80 * 3.73 = 298.4; tan(atan((280 - 149.2) / 298.4)) * 10
        let expected = 10.0 * (280.0 - 0.5 * 298.4) / 298.4;
        assert!((avatar.max_slope(&env) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_physics_gives_zero_slope() {
        let env = Environment::default();
        let mut avatar = Avatar::default_rover("r1");
        avatar.driving_force = 0.0;
        assert_eq!(avatar.max_slope(&env), 0.0);

        let mut avatar = Avatar::default_rover("r2");
        avatar.weight = -5.0;
        assert_eq!(avatar.max_slope(&env), 0.0);
    }

    #[test]
    fn test_base_time_per_grid_rounds_up() {
        let mut avatar = Avatar::default_rover("r1");
        assert_eq!(avatar.base_time_per_grid(), 10);
        avatar.speed = 3.0;
        assert_eq!(avatar.base_time_per_grid(), 4); // ceil(10/3)
    }

    #[test]
    fn test_sensor_binding_dedupes_by_name() {
        let mut avatar = Avatar::default_rover("r1");
        let extra = Sensor::radar_360("aux", 2);
        assert!(avatar.bind_sensor(extra.clone()));
        assert!(!avatar.bind_sensor(extra));
        assert_eq!(avatar.sensors.len(), 2);

        assert!(avatar.unbind_sensor("aux"));
        assert!(!avatar.unbind_sensor("aux"));
        assert_eq!(avatar.sensors.len(), 1);
    }
}
