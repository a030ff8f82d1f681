//! Ambient terrain conditions, read-only during a run.
//!
//! Friction coefficient (μ) reference for Mars-like terrain:
//!
//! | Terrain type        | μ         | Notes                         |
//! |---------------------|-----------|-------------------------------|
//! | Loose sand/dust     | 0.3 – 0.4 | Slippery, like dry sand       |
//! | Compact soil        | 0.5 – 0.6 | Firmer, more traction         |
//! | Rocky terrain       | 0.6 – 0.8 | Good grip, like gravel        |
//! | Ice-covered regions | 0.1 – 0.3 | Very slippery, low traction   |

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Surface friction coefficient (μ).
    pub friction: f64,
    /// Gravitational acceleration in m/s².
    pub gravity: f64,
    /// Scales the avatar's energy recharge rate.
    pub light_intensity: f64,
}

impl Default for Environment {
    /// Compact Martian soil under full daylight.
    fn default() -> Self {
        Self {
            friction: 0.5,
            gravity: 3.73,
            light_intensity: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_mars_like() {
        let env = Environment::default();
        assert_eq!(env.friction, 0.5);
        assert_eq!(env.gravity, 3.73);
        assert_eq!(env.light_intensity, 1.0);
    }
}
