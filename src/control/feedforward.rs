use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{config::ConfigError, types::Float, TWO_PI};

use super::{ControlContext, Controller};

/// Shape of the open-loop command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    #[default]
    #[serde(rename = "step")]
    Step,
    #[serde(rename = "sin")]
    Sine,
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Waveform::Step => write!(f, "step"),
            Waveform::Sine => write!(f, "sin"),
        }
    }
}

impl FromStr for Waveform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "step" => Ok(Waveform::Step),
            "sin" | "sine" => Ok(Waveform::Sine),
            _ => Err(ConfigError::UnknownWaveform(s.to_string())),
        }
    }
}

/// Open-loop voltage waveform, independent of the measured state.
///     step: u = A
///     sine: u = A sin(2 pi f t)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Feedforward {
    pub waveform: Waveform,
    pub amplitude: Float,
    pub frequency: Float,
}

impl Feedforward {
    pub fn command(&self, t: Float) -> Float {
        match self.waveform {
            Waveform::Step => self.amplitude,
            Waveform::Sine => self.amplitude * (TWO_PI * self.frequency * t).sin(),
        }
    }
}

impl Controller for Feedforward {
    fn control(&mut self, context: &ControlContext) -> Float {
        self.command(context.time)
    }
}
