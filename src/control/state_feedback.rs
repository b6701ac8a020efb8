use crate::types::Float;

use super::{ControlContext, Controller};

/// Linear state feedback with a constant bias:
///     u = -k1 q - k2 v + u_ff
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateFeedback {
    pub k1: Float,
    pub k2: Float,
    pub ff_input: Float,
}

impl Controller for StateFeedback {
    fn control(&mut self, context: &ControlContext) -> Float {
        -self.k1 * context.state.q - self.k2 * context.state.v + self.ff_input
    }
}
