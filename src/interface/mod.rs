use wasm_bindgen::prelude::*;
use web_sys::js_sys::Float64Array;

use crate::{
    config::{ArmConfig, ConfigError, ControlParameters, Flags},
    control::{feedforward::Waveform, Mode},
    simulate::ArmSimulator,
    toJsFloat64Array,
    types::Float,
    util::console_log,
};

pub mod util;

fn to_js_error(e: ConfigError) -> JsValue {
    let message = e.to_string();
    console_log(&message);
    JsValue::from_str(&message)
}

/// WebAssembly interface to the ArmSimulator struct.
#[wasm_bindgen]
pub struct InterfaceArmSimulator {
    pub(crate) inner: ArmSimulator,
}

#[wasm_bindgen]
impl InterfaceArmSimulator {
    /// Advance one rendered frame. Returns [reference, angle].
    pub fn frame(&mut self) -> Float64Array {
        self.inner.frame();
        toJsFloat64Array!([self.inner.reference(), self.inner.angle()])
    }

    pub fn toggleRunning(&mut self) {
        self.inner.toggle_running();
    }

    pub fn isRunning(&self) -> bool {
        self.inner.running()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    pub fn kickDisturbance(&mut self) {
        self.inner.kick_disturbance();
    }

    pub fn setMode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode: Mode = mode.parse().map_err(to_js_error)?;
        self.inner.set_mode(mode);
        Ok(())
    }

    pub fn mode(&self) -> String {
        self.inner.mode().to_string()
    }

    pub fn setWaveform(&mut self, waveform: &str) -> Result<(), JsValue> {
        let waveform: Waveform = waveform.parse().map_err(to_js_error)?;
        self.inner.set_waveform(waveform);
        Ok(())
    }

    pub fn setVoltage(&mut self, voltage: Float) -> Result<(), JsValue> {
        self.update_parameters(|p| p.voltage = voltage)
    }

    pub fn setGain1(&mut self, gain: Float) -> Result<(), JsValue> {
        self.update_parameters(|p| p.gain1 = gain)
    }

    pub fn setGain2(&mut self, gain: Float) -> Result<(), JsValue> {
        self.update_parameters(|p| p.gain2 = gain)
    }

    pub fn setGainIntegral(&mut self, gain: Float) -> Result<(), JsValue> {
        self.update_parameters(|p| p.gain_integral = gain)
    }

    pub fn setFeedforwardInput(&mut self, ff_input: Float) -> Result<(), JsValue> {
        self.update_parameters(|p| p.ff_input = ff_input)
    }

    pub fn setReference(&mut self, reference: Float) -> Result<(), JsValue> {
        self.update_parameters(|p| p.reference = reference)
    }

    pub fn setAmplitude(&mut self, amplitude: Float) -> Result<(), JsValue> {
        self.update_parameters(|p| p.amplitude = amplitude)
    }

    pub fn setFrequency(&mut self, frequency: Float) -> Result<(), JsValue> {
        self.update_parameters(|p| p.frequency = frequency)
    }

    pub fn setInitialAngle(&mut self, angle: Float) -> Result<(), JsValue> {
        self.update_parameters(|p| p.initial_angle = angle)
    }

    pub fn setDisturbance(&mut self, disturbance: Float) -> Result<(), JsValue> {
        self.update_parameters(|p| p.disturbance = disturbance)
    }

    pub fn setFriction(&mut self, on: bool) {
        self.update_flags(|f| f.friction = on);
    }

    pub fn setInputDelay(&mut self, on: bool) {
        self.update_flags(|f| f.input_delay = on);
    }

    pub fn setInputSaturation(&mut self, on: bool) {
        self.update_flags(|f| f.input_saturation = on);
    }

    pub fn setIPD(&mut self, on: bool) {
        self.update_flags(|f| f.i_pd = on);
    }

    pub fn setAutoReference(&mut self, on: bool) {
        self.update_flags(|f| f.auto_reference = on);
    }

    pub fn time(&self) -> Float {
        self.inner.time()
    }

    pub fn angle(&self) -> Float {
        self.inner.angle()
    }

    pub fn reference(&self) -> Float {
        self.inner.reference()
    }

    /// Stops the run and returns the recorded samples as CSV.
    pub fn exportCsv(&mut self) -> String {
        self.inner.export_csv()
    }

    pub fn exportFilename(&self) -> String {
        self.inner.export_filename()
    }
}

impl InterfaceArmSimulator {
    fn update_parameters(
        &mut self,
        change: impl FnOnce(&mut ControlParameters),
    ) -> Result<(), JsValue> {
        let mut parameters = self.inner.parameters().clone();
        change(&mut parameters);
        self.inner.set_parameters(parameters).map_err(to_js_error)
    }

    fn update_flags(&mut self, change: impl FnOnce(&mut Flags)) {
        let mut flags = *self.inner.flags();
        change(&mut flags);
        self.inner.set_flags(flags);
    }
}

/// Arm simulator with the default plant, gains and flags.
#[wasm_bindgen]
pub fn createArmSimulator() -> InterfaceArmSimulator {
    console_error_panic_hook::set_once();
    InterfaceArmSimulator {
        inner: ArmSimulator::default(),
    }
}

/// Arm simulator from a TOML document with [simulation], [parameters] and
/// [flags] tables.
#[wasm_bindgen]
pub fn createArmSimulatorFromToml(toml: &str) -> Result<InterfaceArmSimulator, JsValue> {
    console_error_panic_hook::set_once();
    let config = ArmConfig::from_toml_str(toml).map_err(to_js_error)?;
    let inner = ArmSimulator::new(config).map_err(to_js_error)?;
    Ok(InterfaceArmSimulator { inner })
}
