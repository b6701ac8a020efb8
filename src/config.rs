use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{control::feedforward::Waveform, integrators::Integrator, types::Float};

/// Errors raised when a configuration is accepted.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid time step: {0} (must be finite and > 0)")]
    InvalidTimeStep(Float),

    #[error(
        "Invalid input delay: {0} (must be finite, >= 0 and at most {max} steps)",
        max = MAX_DELAY_STEPS
    )]
    InvalidDelay(Float),

    #[error("Invalid saturation bound: {0} (must be finite and > 0)")]
    InvalidSaturation(Float),

    #[error("Invalid dead-zone threshold: {0} (must be finite and >= 0)")]
    InvalidDeadZone(Float),

    #[error("Reference period must be at least one tick")]
    InvalidReferencePeriod,

    #[error("Invalid value for {field}: {value} (must be finite)")]
    NonFinite { field: &'static str, value: Float },

    #[error("Invalid value for {field}: {value} (must be >= 0)")]
    Negative { field: &'static str, value: Float },

    #[error("Unknown control mode: {0}")]
    UnknownMode(String),

    #[error("Unknown waveform: {0}")]
    UnknownWaveform(String),
}

/// Longest accepted input delay, in integration steps.
pub const MAX_DELAY_STEPS: usize = 100_000;

fn ensure_finite(field: &'static str, value: Float) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

/// Physical and numerical setup of a run. Changing it resets the simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed integration step [s]
    pub dt: Float,
    /// Input delay [s]; rounded up to whole steps
    pub input_delay: Float,
    /// Saturation bound on the command [V]
    pub vmax: Float,
    /// Torque gain
    pub k: Float,
    /// Viscous damping
    pub b: Float,
    /// Commands below this magnitude are lost to static friction
    pub dead_zone: Float,
    /// Period of the automatic reference [ticks]
    pub reference_period: u64,
    /// Amplitude of the automatic reference
    pub reference_amplitude: Float,
    pub integrator: Integrator,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            dt: 0.001,
            input_delay: 0.01,
            vmax: 5.0,
            k: 6616.0,
            b: 31.0,
            dead_zone: 0.2,
            reference_period: 8000,
            reference_amplitude: 45.0,
            integrator: Integrator::RungeKutta4,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::InvalidTimeStep(self.dt));
        }
        if !(self.input_delay.is_finite() && self.input_delay >= 0.0) {
            return Err(ConfigError::InvalidDelay(self.input_delay));
        }
        let steps = (self.input_delay / self.dt).ceil();
        if !(steps.is_finite() && steps <= MAX_DELAY_STEPS as Float) {
            return Err(ConfigError::InvalidDelay(self.input_delay));
        }
        if !(self.vmax.is_finite() && self.vmax > 0.0) {
            return Err(ConfigError::InvalidSaturation(self.vmax));
        }
        if !(self.dead_zone.is_finite() && self.dead_zone >= 0.0) {
            return Err(ConfigError::InvalidDeadZone(self.dead_zone));
        }
        if self.reference_period == 0 {
            return Err(ConfigError::InvalidReferencePeriod);
        }
        ensure_finite("k", self.k)?;
        ensure_finite("b", self.b)?;
        ensure_finite("reference_amplitude", self.reference_amplitude)?;
        Ok(())
    }

    /// Length of the delay buffer: ceil(delay / dt). Only meaningful for a
    /// validated configuration.
    pub fn delay_steps(&self) -> usize {
        (self.input_delay / self.dt).ceil() as usize
    }
}

/// Tunable values read by the control laws. May change between frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlParameters {
    /// Manual mode voltage [V]
    pub voltage: Float,
    /// Proportional gain (k1)
    pub gain1: Float,
    /// Derivative gain (k2)
    pub gain2: Float,
    /// Integral gain
    pub gain_integral: Float,
    /// Bias added to the state-feedback command
    pub ff_input: Float,
    /// Manual reference position
    pub reference: Float,
    /// Feedforward amplitude [V]
    pub amplitude: Float,
    /// Feedforward frequency [Hz]
    pub frequency: Float,
    pub waveform: Waveform,
    /// Angle the arm is placed at on reset
    pub initial_angle: Float,
    /// Angle offset applied by a disturbance kick
    pub disturbance: Float,
}

impl Default for ControlParameters {
    fn default() -> Self {
        ControlParameters {
            voltage: 0.0,
            gain1: 0.1,
            gain2: 0.0,
            gain_integral: 0.0,
            ff_input: 0.0,
            reference: 30.0,
            amplitude: 0.0,
            frequency: 1.0,
            waveform: Waveform::Step,
            initial_angle: 0.0,
            disturbance: 5.0,
        }
    }
}

impl ControlParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("voltage", self.voltage),
            ("gain1", self.gain1),
            ("gain2", self.gain2),
            ("gain_integral", self.gain_integral),
            ("ff_input", self.ff_input),
            ("reference", self.reference),
            ("amplitude", self.amplitude),
            ("frequency", self.frequency),
            ("initial_angle", self.initial_angle),
            ("disturbance", self.disturbance),
        ];
        for (field, value) in fields {
            ensure_finite(field, value)?;
        }
        if self.frequency < 0.0 {
            return Err(ConfigError::Negative {
                field: "frequency",
                value: self.frequency,
            });
        }
        Ok(())
    }
}

/// Boolean switches for the plant and the actuation path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flags {
    /// Dead zone on small commands
    pub friction: bool,
    pub input_delay: bool,
    /// Clamp feedback commands to the saturation bound
    pub input_saturation: bool,
    /// Servo uses I-PD instead of PI-D
    pub i_pd: bool,
    /// Reference follows the square wave generator
    pub auto_reference: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Flags {
            friction: false,
            input_delay: true,
            input_saturation: true,
            i_pd: false,
            auto_reference: false,
        }
    }
}

/// Complete configuration of an arm simulator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmConfig {
    pub simulation: SimulationConfig,
    pub parameters: ControlParameters,
    pub flags: Flags,
}

impl ArmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        self.parameters.validate()
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: ArmConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
