use arm_sim::{
    config::{ArmConfig, ControlParameters, Flags, SimulationConfig},
    control::Mode,
    integrators::Integrator,
    simulate::{simulate, ArmSimulator},
};
use tracing::info;

/// Compare the final state of a servo run across integration schemes and
/// step sizes.
pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "integrator_compare=info".into()),
        )
        .init();

    let parameters = ControlParameters {
        gain1: 0.1,
        gain2: 0.002,
        reference: 30.0,
        ..Default::default()
    };
    let flags = Flags {
        input_delay: false,
        ..Default::default()
    };

    for dt in [0.004, 0.002, 0.001] {
        for integrator in [
            Integrator::SemiImplicitEuler,
            Integrator::RungeKutta2,
            Integrator::RungeKutta4,
        ] {
            let config = ArmConfig {
                simulation: SimulationConfig {
                    dt,
                    integrator,
                    ..Default::default()
                },
                parameters: parameters.clone(),
                flags,
            };
            let mut simulator = ArmSimulator::new(config)?;
            simulator.set_mode(Mode::Servo);

            simulate(&mut simulator, 0.2);
            let state = simulator.state();
            info!(
                "dt = {:.3}, {:?}: q = {:.6}, v = {:.6}",
                dt, integrator, state.q, state.v
            );
        }
    }
    Ok(())
}
