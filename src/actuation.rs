use std::collections::VecDeque;

use crate::{
    config::{Flags, SimulationConfig},
    types::Float,
};

/// Hard clamp of a command to [-vmax, vmax].
///
/// # Panics
/// If `vmax` is negative or NaN. A validated [`SimulationConfig`] always
/// carries a finite, positive bound.
pub fn saturate(u: Float, vmax: Float) -> Float {
    u.clamp(-vmax, vmax)
}

/// FIFO of previously issued commands modelling a fixed input delay.
///
/// Created full of zeros. Pushing at the tail and popping at the head once
/// per step keeps the length constant, so the popped command is the one
/// pushed `capacity` steps earlier.
#[derive(Clone, Debug)]
pub struct DelayBuffer {
    commands: VecDeque<Float>,
    capacity: usize,
}

impl DelayBuffer {
    pub fn new(capacity: usize) -> Self {
        let mut buffer = DelayBuffer {
            commands: VecDeque::with_capacity(capacity),
            capacity,
        };
        buffer.clear();
        buffer
    }

    /// Refill with `capacity` zeros.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.commands.resize(self.capacity, 0.0);
    }

    pub fn push(&mut self, u: Float) {
        self.commands.push_back(u);
    }

    pub fn pop(&mut self) -> Option<Float> {
        self.commands.pop_front()
    }

    /// Configured delay in steps.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of commands currently held.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Command issued by the controller this step, and the command the plant
/// actually receives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Actuation {
    pub command: Float,
    pub applied: Float,
}

/// Routes a raw control command through saturation and input delay.
#[derive(Clone, Debug)]
pub struct ActuationPipeline {
    buffer: DelayBuffer,
    vmax: Float,
}

impl ActuationPipeline {
    /// `vmax` must be finite and positive, see [`saturate`].
    pub fn new(delay_steps: usize, vmax: Float) -> Self {
        ActuationPipeline {
            buffer: DelayBuffer::new(delay_steps),
            vmax,
        }
    }

    /// Pipeline sized by a validated configuration.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.delay_steps(), config.vmax)
    }

    /// Process one step's command.
    ///
    /// `limited` says whether the active control law is subject to the
    /// saturation bound; it only takes effect when the input constraint flag
    /// is set. The issued command always enters the delay buffer. With the
    /// delay flag cleared nothing is popped, and the plant receives the
    /// command issued this step.
    ///
    /// While the delay is off the buffer therefore grows by one entry per
    /// step until the next reset. Turning the delay back on replays that
    /// backlog oldest first, so the plant receives commands issued
    /// arbitrarily long ago before it catches up.
    pub fn actuate(&mut self, raw: Float, limited: bool, flags: &Flags) -> Actuation {
        let command = if limited && flags.input_saturation {
            saturate(raw, self.vmax)
        } else {
            raw
        };

        self.buffer.push(command);

        let applied = if flags.input_delay {
            // Never empty right after a push.
            self.buffer.pop().unwrap_or(command)
        } else {
            command
        };

        Actuation { command, applied }
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    pub fn buffer(&self) -> &DelayBuffer {
        &self.buffer
    }

    pub fn vmax(&self) -> Float {
        self.vmax
    }
}

#[cfg(test)]
mod actuation_tests {
    use super::*;

    fn flags(input_delay: bool, input_saturation: bool) -> Flags {
        Flags {
            input_delay,
            input_saturation,
            ..Flags::default()
        }
    }

    #[test]
    fn saturation_is_idempotent() {
        let vmax = 5.0;
        for u in [-100.0, -5.0, -4.99, -0.3, 0.0, 1.0, 5.0, 5.01, 1e9] {
            let once = saturate(u, vmax);
            assert_eq!(saturate(once, vmax), once);
            assert!(once.abs() <= vmax);
        }
    }

    #[test]
    fn saturation_passes_commands_within_bounds() {
        for u in [-5.0, -2.5, 0.0, 3.3, 5.0] {
            assert_eq!(saturate(u, 5.0), u);
        }
        assert_eq!(saturate(7.0, 5.0), 5.0);
        assert_eq!(saturate(-7.0, 5.0), -5.0);
    }

    #[test]
    fn delay_buffer_starts_full_of_zeros() {
        let mut buffer = DelayBuffer::new(3);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.pop(), Some(0.0));
    }

    #[test]
    fn delay_buffer_returns_value_pushed_capacity_steps_earlier() {
        let capacity = 10;
        let mut buffer = DelayBuffer::new(capacity);

        for i in 0..50 {
            buffer.push(i as Float);
            let popped = buffer.pop().unwrap();
            assert_eq!(buffer.len(), capacity);

            let expected = if i >= capacity {
                (i - capacity) as Float
            } else {
                0.0
            };
            assert_eq!(popped, expected);
        }
    }

    #[test]
    fn zero_length_buffer_is_transparent() {
        let mut pipeline = ActuationPipeline::new(0, 5.0);
        let actuation = pipeline.actuate(1.5, true, &flags(true, true));
        assert_eq!(actuation.applied, 1.5);
        assert_eq!(pipeline.buffer().len(), 0);
    }

    #[test]
    fn pipeline_delays_saturated_command() {
        // Arrange
        let mut pipeline = ActuationPipeline::new(2, 5.0);
        let flags = flags(true, true);

        // Act
        let a0 = pipeline.actuate(9.0, true, &flags);
        let a1 = pipeline.actuate(-1.0, true, &flags);
        let a2 = pipeline.actuate(0.0, true, &flags);

        // Assert
        assert_eq!(a0.command, 5.0);
        assert_eq!(a0.applied, 0.0);
        assert_eq!(a1.applied, 0.0);
        assert_eq!(a2.applied, 5.0);
        assert_eq!(pipeline.buffer().len(), 2);
    }

    #[test]
    fn unlimited_laws_bypass_saturation() {
        let mut pipeline = ActuationPipeline::new(0, 5.0);
        let actuation = pipeline.actuate(9.0, false, &flags(false, true));
        assert_eq!(actuation.command, 9.0);
    }

    #[test]
    fn saturation_flag_disables_clamping() {
        let mut pipeline = ActuationPipeline::new(0, 5.0);
        let actuation = pipeline.actuate(9.0, true, &flags(false, false));
        assert_eq!(actuation.applied, 9.0);
    }

    #[test]
    fn disabled_delay_applies_current_command_but_still_buffers() {
        let mut pipeline = ActuationPipeline::new(3, 5.0);
        let flags = flags(false, true);

        let actuation = pipeline.actuate(2.0, true, &flags);

        assert_eq!(actuation.applied, 2.0);
        assert_eq!(pipeline.buffer().len(), 4);
    }

    #[test]
    fn reenabled_delay_replays_backlog() {
        let mut pipeline = ActuationPipeline::new(2, 5.0);
        for u in [1.0, 2.0, 3.0] {
            pipeline.actuate(u, true, &flags(false, true));
        }
        assert_eq!(pipeline.buffer().len(), 5);

        let applied: Vec<Float> = [4.0, 4.0, 4.0, 4.0]
            .iter()
            .map(|&u| pipeline.actuate(u, true, &flags(true, true)).applied)
            .collect();

        assert_eq!(applied, vec![0.0, 0.0, 1.0, 2.0]);
        assert_eq!(pipeline.buffer().len(), 5);
    }

    #[test]
    fn pipeline_from_default_config() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());

        let mut pipeline = ActuationPipeline::from_config(&config);

        assert_eq!(pipeline.buffer().capacity(), 10);
        assert_eq!(pipeline.vmax(), 5.0);
        let actuation = pipeline.actuate(-80.0, true, &flags(false, true));
        assert_eq!(actuation.applied, -5.0);
    }

    #[test]
    fn reset_restores_configured_length() {
        let mut pipeline = ActuationPipeline::new(3, 5.0);
        for _ in 0..5 {
            pipeline.actuate(1.0, true, &flags(false, true));
        }

        pipeline.reset();

        assert_eq!(pipeline.buffer().len(), 3);
        assert_eq!(pipeline.buffer().capacity(), 3);
    }
}
