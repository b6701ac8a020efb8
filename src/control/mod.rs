use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    config::{ConfigError, ControlParameters, Flags},
    plant::ArmState,
    types::Float,
};

pub mod feedforward;
pub mod servo;
pub mod state_feedback;

use feedforward::Feedforward;
use servo::ServoController;
use state_feedback::StateFeedback;

/// What a control law sees at each sub-step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlContext {
    pub state: ArmState,
    pub reference: Float,
    pub time: Float,
    pub dt: Float,
}

pub trait Controller {
    /// Raw voltage command for this sub-step, before saturation and delay.
    fn control(&mut self, context: &ControlContext) -> Float;
}

/// Selectable control mode. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Manual,
    Servo,
    StateFeedback,
    Feedforward,
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::Manual,
        Mode::Servo,
        Mode::StateFeedback,
        Mode::Feedforward,
    ];
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Manual => "Manual",
            Mode::Servo => "Servo",
            Mode::StateFeedback => "StateFeedback",
            Mode::Feedforward => "Feedforward",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.to_string() == s)
            .ok_or_else(|| ConfigError::UnknownMode(s.to_string()))
    }
}

/// The active control law, holding only the parameters its mode reads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlLaw {
    /// Externally set voltage, no feedback.
    Manual { voltage: Float },
    Servo(ServoController),
    StateFeedback(StateFeedback),
    Feedforward(Feedforward),
}

impl ControlLaw {
    /// Fresh law for `mode`; a servo starts with an empty integral.
    pub fn new(mode: Mode, parameters: &ControlParameters, flags: &Flags) -> Self {
        match mode {
            Mode::Manual => ControlLaw::Manual {
                voltage: parameters.voltage,
            },
            Mode::Servo => ControlLaw::Servo(ServoController::new(
                parameters.gain1,
                parameters.gain2,
                parameters.gain_integral,
                flags.i_pd,
            )),
            Mode::StateFeedback => ControlLaw::StateFeedback(StateFeedback {
                k1: parameters.gain1,
                k2: parameters.gain2,
                ff_input: parameters.ff_input,
            }),
            Mode::Feedforward => ControlLaw::Feedforward(Feedforward {
                waveform: parameters.waveform,
                amplitude: parameters.amplitude,
                frequency: parameters.frequency,
            }),
        }
    }

    /// Pick up new parameter values without touching accumulated state.
    pub fn update(&mut self, parameters: &ControlParameters, flags: &Flags) {
        match self {
            ControlLaw::Manual { voltage } => *voltage = parameters.voltage,
            ControlLaw::Servo(servo) => {
                servo.set_gains(
                    parameters.gain1,
                    parameters.gain2,
                    parameters.gain_integral,
                );
                servo.i_pd = flags.i_pd;
            }
            ControlLaw::StateFeedback(sf) => {
                sf.k1 = parameters.gain1;
                sf.k2 = parameters.gain2;
                sf.ff_input = parameters.ff_input;
            }
            ControlLaw::Feedforward(ff) => {
                ff.waveform = parameters.waveform;
                ff.amplitude = parameters.amplitude;
                ff.frequency = parameters.frequency;
            }
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            ControlLaw::Manual { .. } => Mode::Manual,
            ControlLaw::Servo(_) => Mode::Servo,
            ControlLaw::StateFeedback(_) => Mode::StateFeedback,
            ControlLaw::Feedforward(_) => Mode::Feedforward,
        }
    }

    /// Whether the command is clamped to the saturation bound. Open-loop
    /// commands are bounded by their own parameter ranges instead.
    pub fn is_limited(&self) -> bool {
        match self {
            ControlLaw::Manual { .. } | ControlLaw::Feedforward(_) => false,
            ControlLaw::Servo(_) | ControlLaw::StateFeedback(_) => true,
        }
    }

    /// Accumulated servo error, zero for every other law.
    pub fn integral(&self) -> Float {
        match self {
            ControlLaw::Servo(servo) => servo.integral(),
            ControlLaw::Manual { .. } | ControlLaw::StateFeedback(_) | ControlLaw::Feedforward(_) => {
                0.0
            }
        }
    }
}

impl Controller for ControlLaw {
    fn control(&mut self, context: &ControlContext) -> Float {
        match self {
            ControlLaw::Manual { voltage } => *voltage,
            ControlLaw::Servo(servo) => servo.control(context),
            ControlLaw::StateFeedback(sf) => sf.control(context),
            ControlLaw::Feedforward(ff) => ff.control(context),
        }
    }
}
