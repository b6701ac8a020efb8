use anyhow::Context;
use arm_sim::{
    config::{ArmConfig, ControlParameters, Flags},
    control::{feedforward::Waveform, Mode},
    plot::plot_samples,
    simulate::{simulate, ArmSimulator},
};
use tracing::info;

/// Drive the arm open loop with a sine voltage and record the response.
///
/// Usage: feedforward_sine [amplitude] [frequency]
pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arm_sim=debug,feedforward_sine=info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let amplitude: f64 = match args.next() {
        Some(a) => a.parse().context("amplitude must be a number")?,
        None => 0.5,
    };
    let frequency: f64 = match args.next() {
        Some(f) => f.parse().context("frequency must be a number")?,
        None => 2.0,
    };

    let config = ArmConfig {
        parameters: ControlParameters {
            amplitude,
            frequency,
            waveform: Waveform::Sine,
            ..Default::default()
        },
        flags: Flags {
            friction: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let mut simulator = ArmSimulator::new(config)?;
    simulator.set_mode(Mode::Feedforward);

    let samples = simulate(&mut simulator, 4.0);
    let csv = simulator.export_csv();
    let filename = simulator.export_filename();
    std::fs::write(&filename, csv).with_context(|| format!("failed to write {}", filename))?;

    plot_samples(&samples, "feedforward_sine.png", "Feedforward sine response")
        .context("failed to plot")?;

    info!(
        "wrote {} samples to {} (amplitude {}, frequency {} Hz)",
        samples.len(),
        filename,
        amplitude,
        frequency
    );
    Ok(())
}
