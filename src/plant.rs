use na::Vector2;
use serde::{Deserialize, Serialize};

use crate::types::Float;

/// Angle and angular rate of the arm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmState {
    pub q: Float,
    pub v: Float,
}

impl ArmState {
    pub fn new(q: Float, v: Float) -> Self {
        ArmState { q, v }
    }

    /// Arm held still at angle `q`.
    pub fn at_rest(q: Float) -> Self {
        ArmState { q, v: 0.0 }
    }

    pub fn to_vector(&self) -> Vector2<Float> {
        Vector2::new(self.q, self.v)
    }

    pub fn from_vector(x: &Vector2<Float>) -> Self {
        ArmState { q: x[0], v: x[1] }
    }
}

/// Continuous-time dynamics of a single-axis plant:
///     d/dt [q, v] = f(q, v, u)
pub trait Dynamics {
    fn derivative(&self, q: Float, v: Float, u: Float) -> Vector2<Float>;
}

/// Voltage-driven rotational arm with viscous damping.
///     qdot = v
///     vdot = -B v + K u_actual
///
/// With friction enabled, commands smaller in magnitude than the dead-zone
/// threshold produce no torque (static friction holds the arm).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArmPlant {
    pub k: Float,
    pub b: Float,
    pub friction: bool,
    pub dead_zone: Float,
}

impl ArmPlant {
    pub fn new(k: Float, b: Float, friction: bool, dead_zone: Float) -> Self {
        ArmPlant {
            k,
            b,
            friction,
            dead_zone,
        }
    }

    /// The command that actually produces torque after the dead zone.
    pub fn effective_input(&self, u: Float) -> Float {
        if self.friction && u.abs() < self.dead_zone {
            0.0
        } else {
            u
        }
    }
}

impl Dynamics for ArmPlant {
    fn derivative(&self, _q: Float, v: Float, u: Float) -> Vector2<Float> {
        let u_actual = self.effective_input(u);
        Vector2::new(v, -self.b * v + self.k * u_actual)
    }
}

#[cfg(test)]
mod plant_tests {
    use crate::assert_close;

    use super::*;

    fn arm(friction: bool) -> ArmPlant {
        ArmPlant::new(6616.0, 31.0, friction, 0.2)
    }

    #[test]
    fn derivative_matches_equations_of_motion() {
        let plant = arm(false);

        let f = plant.derivative(1.5, 2.0, 0.5);

        assert_close!(f[0], 2.0, 1e-12);
        assert_close!(f[1], -31.0 * 2.0 + 6616.0 * 0.5, 1e-9);
    }

    #[test]
    fn dead_zone_swallows_small_commands() {
        let plant = arm(true);

        for u in [-0.19, -0.1, 0.0, 0.05, 0.199] {
            let f = plant.derivative(0.3, 4.0, u);
            assert_close!(f[1], -31.0 * 4.0, 1e-12);
            assert_eq!(plant.effective_input(u), 0.0);
        }
    }

    #[test]
    fn dead_zone_passes_large_commands() {
        let plant = arm(true);

        for u in [-3.0, -0.2, 0.2, 1.0] {
            assert_eq!(plant.effective_input(u), u);
        }
    }

    #[test]
    fn no_dead_zone_without_friction() {
        let plant = arm(false);
        assert_eq!(plant.effective_input(0.1), 0.1);
    }

    #[test]
    fn derivative_ignores_angle() {
        let plant = arm(false);
        assert_eq!(
            plant.derivative(0.0, 1.0, 1.0),
            plant.derivative(42.0, 1.0, 1.0)
        );
    }
}
