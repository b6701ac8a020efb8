use tracing::{debug, info, trace, warn};

use crate::{
    actuation::{Actuation, ActuationPipeline},
    config::{ArmConfig, ConfigError, ControlParameters, Flags, SimulationConfig},
    control::{feedforward::Waveform, ControlContext, ControlLaw, Controller, Mode},
    plant::{ArmPlant, ArmState},
    record::{self, Sample},
    reference::reference_at,
    types::Float,
    SUBSTEPS_PER_FRAME,
};

/// Everything that evolves over a run of the arm simulator.
///
/// Owns the plant state, the delay buffer (inside the actuation pipeline),
/// the servo integral (inside the control law) and the sample history.
/// Parameter and flag updates take effect at the next sub-step; mode and
/// configuration changes reset the run.
pub struct ArmSimulator {
    config: SimulationConfig,
    parameters: ControlParameters,
    flags: Flags,

    plant: ArmPlant,
    law: ControlLaw,
    pipeline: ActuationPipeline,

    state: ArmState,
    tick: u64,
    disturbance: Float,
    reference: Float,
    running: bool,
    samples: Vec<Sample>,
}

impl ArmSimulator {
    pub fn new(config: ArmConfig) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate() {
            warn!("rejected arm configuration: {}", e);
            return Err(e);
        }
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: ArmConfig) -> Self {
        let ArmConfig {
            simulation,
            parameters,
            flags,
        } = config;

        let plant = ArmPlant::new(
            simulation.k,
            simulation.b,
            flags.friction,
            simulation.dead_zone,
        );
        let law = ControlLaw::new(Mode::default(), &parameters, &flags);
        let pipeline = ActuationPipeline::from_config(&simulation);

        let mut simulator = ArmSimulator {
            config: simulation,
            parameters,
            flags,
            plant,
            law,
            pipeline,
            state: ArmState::default(),
            tick: 0,
            disturbance: 0.0,
            reference: 0.0,
            running: false,
            samples: vec![],
        };
        simulator.reset();
        simulator
    }

    /// Apply a new physical/numerical setup. The run is reset; the active
    /// mode is kept.
    pub fn configure(&mut self, config: SimulationConfig) -> Result<(), ConfigError> {
        if let Err(e) = config.validate() {
            warn!("rejected simulation configuration: {}", e);
            return Err(e);
        }

        self.plant = ArmPlant::new(config.k, config.b, self.flags.friction, config.dead_zone);
        self.pipeline = ActuationPipeline::from_config(&config);
        self.config = config;
        self.reset();
        Ok(())
    }

    pub fn set_parameters(&mut self, parameters: ControlParameters) -> Result<(), ConfigError> {
        if let Err(e) = parameters.validate() {
            warn!("rejected control parameters: {}", e);
            return Err(e);
        }

        self.law.update(&parameters, &self.flags);
        self.parameters = parameters;
        Ok(())
    }

    pub fn set_flags(&mut self, flags: Flags) {
        self.plant.friction = flags.friction;
        self.law.update(&self.parameters, &flags);
        self.flags = flags;
    }

    /// Switch control law. Always resets, even when `mode` is already active.
    pub fn set_mode(&mut self, mode: Mode) {
        debug!("switching control mode {} -> {}", self.mode(), mode);
        self.law = ControlLaw::new(mode, &self.parameters, &self.flags);
        self.reset();
    }

    /// Select the feedforward waveform. Resets the run.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.parameters.waveform = waveform;
        self.law.update(&self.parameters, &self.flags);
        self.reset();
    }

    /// Back to t = 0 with the arm at rest at the initial angle, zeroed delay
    /// buffer, empty servo integral and no recorded samples. Stops the run.
    pub fn reset(&mut self) {
        self.tick = 0;
        self.state = ArmState::at_rest(self.parameters.initial_angle);
        self.pipeline.reset();
        self.law = ControlLaw::new(self.law.mode(), &self.parameters, &self.flags);
        self.samples.clear();
        self.disturbance = 0.0;
        self.reference = reference_at(0, &self.config, &self.parameters, &self.flags);
        self.running = false;
        debug!(
            "reset arm simulator: mode {}, initial angle {}",
            self.mode(),
            self.parameters.initial_angle
        );
    }

    pub fn start(&mut self) {
        if !self.running {
            info!("simulation started at t = {:.3}", self.time());
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            info!("simulation stopped at t = {:.3}", self.time());
        }
        self.running = false;
    }

    pub fn toggle_running(&mut self) {
        if self.running {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Knock the arm by the configured disturbance angle at the start of the
    /// next sub-step.
    pub fn kick_disturbance(&mut self) {
        self.disturbance = self.parameters.disturbance;
        debug!("disturbance kick of {}", self.disturbance);
    }

    /// Advance one rendered frame: `SUBSTEPS_PER_FRAME` sub-steps while
    /// running, nothing otherwise.
    pub fn frame(&mut self) {
        if !self.running {
            return;
        }
        for _ in 0..SUBSTEPS_PER_FRAME {
            self.substep();
        }
        trace!(
            "frame done: t = {:.3}, reference = {}, angle = {}",
            self.time(),
            self.reference,
            self.state.q
        );
    }

    fn substep(&mut self) {
        let dt = self.config.dt;
        let time = self.time();
        let reference = reference_at(self.tick, &self.config, &self.parameters, &self.flags);

        let context = ControlContext {
            state: self.state,
            reference,
            time,
            dt,
        };
        let raw = self.law.control(&context);
        let Actuation { command, applied } =
            self.pipeline.actuate(raw, self.law.is_limited(), &self.flags);

        let next = self
            .config
            .integrator
            .step(&self.plant, &self.state, applied, self.disturbance, dt);

        self.samples.push(Sample {
            time,
            reference,
            angle: self.state.q,
            command,
        });

        self.tick += 1;
        self.state = next;
        self.reference = reference;
        self.disturbance = 0.0;
    }

    /// Stop the run and export the recorded samples as CSV.
    pub fn export_csv(&mut self) -> String {
        self.stop();
        record::to_csv(&self.samples)
    }

    pub fn export_filename(&self) -> String {
        record::export_filename(
            self.mode(),
            self.parameters.amplitude,
            self.parameters.frequency,
        )
    }

    pub fn mode(&self) -> Mode {
        self.law.mode()
    }

    pub fn law(&self) -> &ControlLaw {
        &self.law
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn time(&self) -> Float {
        self.tick as Float * self.config.dt
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn state(&self) -> ArmState {
        self.state
    }

    pub fn angle(&self) -> Float {
        self.state.q
    }

    /// Reference used by the most recent sub-step.
    pub fn reference(&self) -> Float {
        self.reference
    }

    pub fn integral(&self) -> Float {
        self.law.integral()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn pipeline(&self) -> &ActuationPipeline {
        &self.pipeline
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn parameters(&self) -> &ControlParameters {
        &self.parameters
    }

    pub fn flags(&self) -> &Flags {
        &self.flags
    }
}

impl Default for ArmSimulator {
    fn default() -> Self {
        Self::from_valid(ArmConfig::default())
    }
}

/// Run whole frames until simulated time reaches `final_time`.
/// Returns the recorded samples.
pub fn simulate(simulator: &mut ArmSimulator, final_time: Float) -> Vec<Sample> {
    simulator.start();
    while simulator.time() < final_time {
        simulator.frame();
    }
    simulator.stop();
    simulator.samples().to_vec()
}
