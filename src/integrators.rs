use na::Vector2;
use serde::{Deserialize, Serialize};

use crate::{
    plant::{ArmState, Dynamics},
    types::Float,
};

/// Fixed-step integration scheme used to advance the plant.
///
/// The input `u` is held constant across the whole step. `disturbance` is an
/// offset added to the angle before the step: the derivatives are evaluated
/// from the shifted angle and the update starts from it, so a kick moves the
/// arm by the offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Integrator {
    SemiImplicitEuler,
    RungeKutta2,
    #[default]
    RungeKutta4,
}

impl Integrator {
    pub fn step<D: Dynamics>(
        &self,
        plant: &D,
        state: &ArmState,
        u: Float,
        disturbance: Float,
        dt: Float,
    ) -> ArmState {
        match self {
            Integrator::SemiImplicitEuler => semi_implicit_euler(plant, state, u, disturbance, dt),
            Integrator::RungeKutta2 => runge_kutta_2(plant, state, u, disturbance, dt),
            Integrator::RungeKutta4 => runge_kutta_4(plant, state, u, disturbance, dt),
        }
    }
}

/// Starting point of a step: the stored state shifted by the disturbance
/// offset.
fn disturbed_start(state: &ArmState, disturbance: Float) -> Vector2<Float> {
    state.to_vector() + Vector2::new(disturbance, 0.0)
}

/// Semi-Implicit Euler integration step:
///     v(k+1) = v(k) + dt * vdot
///     q(k+1) = q(k) + dt * v(k+1)
pub fn semi_implicit_euler<D: Dynamics>(
    plant: &D,
    state: &ArmState,
    u: Float,
    disturbance: Float,
    dt: Float,
) -> ArmState {
    let x = disturbed_start(state, disturbance);
    let vdot = plant.derivative(x[0], x[1], u)[1];

    let v = x[1] + vdot * dt;
    let q = x[0] + v * dt;
    ArmState::new(q, v)
}

/// Midpoint Runge-Kutta step.
pub fn runge_kutta_2<D: Dynamics>(
    plant: &D,
    state: &ArmState,
    u: Float,
    disturbance: Float,
    dt: Float,
) -> ArmState {
    let f = |x: Vector2<Float>| plant.derivative(x[0], x[1], u);
    let x = disturbed_start(state, disturbance);

    let k1 = f(x);
    let k2 = f(x + k1 * (dt / 2.0));

    ArmState::from_vector(&(x + k2 * dt))
}

/// Classical 4th-order Runge-Kutta step:
///     k1 = f(x)
///     k2 = f(x + dt/2 k1)
///     k3 = f(x + dt/2 k2)
///     k4 = f(x + dt k3)
///     x(k+1) = x(k) + dt/6 (k1 + 2 k2 + 2 k3 + k4)
pub fn runge_kutta_4<D: Dynamics>(
    plant: &D,
    state: &ArmState,
    u: Float,
    disturbance: Float,
    dt: Float,
) -> ArmState {
    let f = |x: Vector2<Float>| plant.derivative(x[0], x[1], u);
    let x = disturbed_start(state, disturbance);

    let k1 = f(x);
    let k2 = f(x + k1 * (dt / 2.0));
    let k3 = f(x + k2 * (dt / 2.0));
    let k4 = f(x + k3 * dt);

    let increment = (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0);
    ArmState::from_vector(&(x + increment))
}

#[cfg(test)]
mod integrators_tests {
    use crate::{assert_close, plant::ArmPlant, TWO_PI};

    use super::*;

    /// Undamped unit oscillator: qddot = -q
    struct Harmonic;

    impl Dynamics for Harmonic {
        fn derivative(&self, q: Float, v: Float, _u: Float) -> Vector2<Float> {
            Vector2::new(v, -q)
        }
    }

    fn max_error_over_period(integrator: Integrator, num_steps: usize) -> Float {
        let dt = TWO_PI / num_steps as Float;
        let mut state = ArmState::at_rest(1.0);
        let mut max_error: Float = 0.0;
        for i in 1..=num_steps {
            state = integrator.step(&Harmonic, &state, 0.0, 0.0, dt);
            let exact = (i as Float * dt).cos();
            max_error = max_error.max((state.q - exact).abs());
        }
        max_error
    }

    #[test]
    fn rk4_harmonic_error_is_fourth_order() {
        for num_steps in [50, 100, 200] {
            let dt = TWO_PI / num_steps as Float;
            let error = max_error_over_period(Integrator::RungeKutta4, num_steps);
            assert!(
                error < 0.1 * dt.powi(4),
                "steps: {}, error: {}",
                num_steps,
                error
            );
        }

        // Halving the step should shrink the error by roughly 2^4.
        let ratio = max_error_over_period(Integrator::RungeKutta4, 100)
            / max_error_over_period(Integrator::RungeKutta4, 200);
        assert!(ratio > 12.0 && ratio < 20.0, "ratio: {}", ratio);
    }

    #[test]
    fn rk4_beats_lower_order_schemes() {
        let rk4 = max_error_over_period(Integrator::RungeKutta4, 100);
        let rk2 = max_error_over_period(Integrator::RungeKutta2, 100);
        let euler = max_error_over_period(Integrator::SemiImplicitEuler, 100);
        assert!(rk4 < rk2);
        assert!(rk2 < euler);
    }

    /// Constant voltage from rest has a closed-form response:
    ///     v(t) = Ku/B (1 - e^(-Bt))
    ///     q(t) = Ku/B (t - (1 - e^(-Bt)) / B)
    #[test]
    fn rk4_arm_step_response_matches_closed_form() {
        // Arrange
        let (k, b, u) = (6616.0, 31.0, 1.0);
        let plant = ArmPlant::new(k, b, false, 0.2);
        let dt = 0.001;
        let mut state = ArmState::default();

        // Act
        for _ in 0..100 {
            state = runge_kutta_4(&plant, &state, u, 0.0, dt);
        }

        // Assert
        let t: Float = 0.1;
        let decay = 1.0 - (-b * t).exp();
        assert_close!(state.v, k * u / b * decay, 1e-6);
        assert_close!(state.q, k * u / b * (t - decay / b), 1e-6);
    }

    #[test]
    fn disturbance_shifts_arm_angle() {
        let plant = ArmPlant::new(6616.0, 31.0, false, 0.2);
        let state = ArmState::new(0.5, 2.0);

        for integrator in [
            Integrator::SemiImplicitEuler,
            Integrator::RungeKutta2,
            Integrator::RungeKutta4,
        ] {
            let next = integrator.step(&plant, &state, 1.0, 0.0, 0.001);
            let kicked = integrator.step(&plant, &state, 1.0, 30.0, 0.001);

            assert_close!(kicked.q - next.q, 30.0, 1e-9);
            assert_eq!(kicked.v, next.v);
        }
    }

    #[test]
    fn disturbance_enters_angle_dependent_dynamics() {
        let state = ArmState::new(0.5, 0.0);
        let shifted = ArmState::new(0.6, 0.0);

        let kicked = runge_kutta_4(&Harmonic, &state, 0.0, 0.1, 0.01);
        let reference = runge_kutta_4(&Harmonic, &shifted, 0.0, 0.0, 0.01);

        assert_close!(kicked.q, reference.q, 1e-12);
        assert_close!(kicked.v, reference.v, 1e-12);
    }

    #[test]
    fn zero_input_keeps_arm_at_rest() {
        let plant = ArmPlant::new(6616.0, 31.0, false, 0.2);
        let state = ArmState::at_rest(0.3);

        for integrator in [
            Integrator::SemiImplicitEuler,
            Integrator::RungeKutta2,
            Integrator::RungeKutta4,
        ] {
            let next = integrator.step(&plant, &state, 0.0, 0.0, 0.001);
            assert_eq!(next, state);
        }
    }
}
