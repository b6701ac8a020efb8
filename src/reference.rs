use crate::{
    config::{ControlParameters, Flags, SimulationConfig},
    types::Float,
};

/// Square wave over integer ticks, split into quarter periods:
///     +amplitude, 0, -amplitude, 0
pub fn square_wave(tick: u64, period: u64, amplitude: Float) -> Float {
    let phase = (tick % period) as Float;
    let period = period as Float;

    if phase < period / 4.0 {
        amplitude
    } else if phase < period / 2.0 {
        0.0
    } else if phase < period * 3.0 / 4.0 {
        -amplitude
    } else {
        0.0
    }
}

/// Reference position at `tick`: the square wave generator when automatic
/// reference is on, the manually set position otherwise.
pub fn reference_at(
    tick: u64,
    config: &SimulationConfig,
    parameters: &ControlParameters,
    flags: &Flags,
) -> Float {
    if flags.auto_reference {
        square_wave(tick, config.reference_period, config.reference_amplitude)
    } else {
        parameters.reference
    }
}

#[cfg(test)]
mod reference_tests {
    use super::*;

    #[test]
    fn quarter_phase_boundaries() {
        let period = 8000;
        assert_eq!(square_wave(0, period, 45.0), 45.0);
        assert_eq!(square_wave(1999, period, 45.0), 45.0);
        assert_eq!(square_wave(2000, period, 45.0), 0.0);
        assert_eq!(square_wave(4000, period, 45.0), -45.0);
        assert_eq!(square_wave(5999, period, 45.0), -45.0);
        assert_eq!(square_wave(6000, period, 45.0), 0.0);
        assert_eq!(square_wave(7999, period, 45.0), 0.0);
    }

    #[test]
    fn repeats_every_period() {
        for tick in [0, 1500, 2500, 4100, 7000] {
            assert_eq!(
                square_wave(tick, 8000, 45.0),
                square_wave(tick + 3 * 8000, 8000, 45.0)
            );
        }
    }

    #[test]
    fn manual_reference_when_auto_is_off() {
        let config = SimulationConfig::default();
        let parameters = ControlParameters {
            reference: 12.0,
            ..Default::default()
        };

        let manual = reference_at(4000, &config, &parameters, &Flags::default());
        let auto = reference_at(
            4000,
            &config,
            &parameters,
            &Flags {
                auto_reference: true,
                ..Default::default()
            },
        );

        assert_eq!(manual, 12.0);
        assert_eq!(auto, -45.0);
    }
}
