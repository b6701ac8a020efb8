use anyhow::Context;
use arm_sim::{
    config::{ArmConfig, ControlParameters, Flags},
    control::Mode,
    plot::plot_samples,
    record::to_csv,
    simulate::{simulate, ArmSimulator},
};
use tracing::info;

/// Servo the arm around the automatic square-wave reference for two periods,
/// then write the trace to CSV and plot it.
///
/// Usage: servo_step [config.toml]
pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arm_sim=debug,servo_step=info".into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ArmConfig::from_toml_file(&path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => ArmConfig {
            parameters: ControlParameters {
                gain1: 0.1,
                gain2: 0.002,
                gain_integral: 0.05,
                ..Default::default()
            },
            flags: Flags {
                auto_reference: true,
                ..Default::default()
            },
            ..Default::default()
        },
    };

    let mut simulator = ArmSimulator::new(config)?;
    simulator.set_mode(Mode::Servo);

    let final_time = 16.0;
    let samples = simulate(&mut simulator, final_time);
    info!(
        "simulated {} samples, final angle {:.3}, integral {:.4}",
        samples.len(),
        simulator.angle(),
        simulator.integral()
    );

    let filename = simulator.export_filename();
    std::fs::write(&filename, to_csv(&samples))
        .with_context(|| format!("failed to write {}", filename))?;
    plot_samples(&samples, "servo_step.png", "Servo response")
        .context("failed to plot")?;

    info!("wrote {} and servo_step.png", filename);
    Ok(())
}
