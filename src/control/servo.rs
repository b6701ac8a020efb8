use crate::types::Float;

use super::{ControlContext, Controller};

/// Position servo with integral action.
///
/// PI-D form:
///     u = k1 (r - q) - k2 v + ki ∫(r - q)
/// I-PD form, proportional term on the absolute angle:
///     u = -k1 q - k2 v + ki ∫(r - q)
///
/// The error integral is accumulated with forward Euler, once per call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ServoController {
    pub gain1: Float,
    pub gain2: Float,
    pub gain_integral: Float,
    pub i_pd: bool,

    integral: Float,
}

impl ServoController {
    pub fn new(gain1: Float, gain2: Float, gain_integral: Float, i_pd: bool) -> Self {
        Self {
            gain1,
            gain2,
            gain_integral,
            i_pd,
            integral: 0.,
        }
    }

    pub fn set_gains(&mut self, gain1: Float, gain2: Float, gain_integral: Float) {
        self.gain1 = gain1;
        self.gain2 = gain2;
        self.gain_integral = gain_integral;
    }

    pub fn integral(&self) -> Float {
        self.integral
    }

    pub fn reset(&mut self) {
        self.integral = 0.;
    }
}

impl Controller for ServoController {
    fn control(&mut self, context: &ControlContext) -> Float {
        let q = context.state.q;
        let v = context.state.v;
        let error = context.reference - q;
        self.integral += error * context.dt;

        let proportional = if self.i_pd {
            -self.gain1 * q
        } else {
            self.gain1 * error
        };

        proportional - self.gain2 * v + self.gain_integral * self.integral
    }
}
