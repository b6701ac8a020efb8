use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{control::Mode, types::Float};

/// One recorded sub-step.
///
/// `angle` is the state the command was computed from, and `command` is the
/// command issued this sub-step (after saturation, before delay).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: Float,
    pub reference: Float,
    pub angle: Float,
    pub command: Float,
}

impl Sample {
    /// Comma-separated fields, five decimals each.
    pub fn to_csv_row(&self) -> String {
        [self.time, self.reference, self.angle, self.command]
            .iter()
            .map(|x| format!("{:.5}", x))
            .join(",")
    }
}

/// One row per sample, each terminated by a newline.
pub fn to_csv(samples: &[Sample]) -> String {
    let mut csv = String::with_capacity(samples.len() * 48);
    for sample in samples {
        csv.push_str(&sample.to_csv_row());
        csv.push('\n');
    }
    csv
}

/// Name of the export file for the current run.
pub fn export_filename(mode: Mode, amplitude: Float, frequency: Float) -> String {
    match mode {
        Mode::StateFeedback => "data.csv".to_string(),
        _ => format!("data_ff_{:.3}_{:.3}.csv", amplitude, frequency),
    }
}

#[cfg(test)]
mod record_tests {
    use super::*;

    #[test]
    fn rows_have_five_decimals() {
        let sample = Sample {
            time: 0.001,
            reference: 30.0,
            angle: -1.234567,
            command: 5.0,
        };
        assert_eq!(sample.to_csv_row(), "0.00100,30.00000,-1.23457,5.00000");
    }

    #[test]
    fn csv_has_one_line_per_sample() {
        let samples = vec![
            Sample {
                time: 0.0,
                reference: 1.0,
                angle: 0.0,
                command: 0.5,
            },
            Sample {
                time: 0.001,
                reference: 1.0,
                angle: 0.25,
                command: 0.5,
            },
        ];

        let csv = to_csv(&samples);

        assert_eq!(
            csv,
            "0.00000,1.00000,0.00000,0.50000\n0.00100,1.00000,0.25000,0.50000\n"
        );
    }

    #[test]
    fn empty_history_exports_nothing() {
        assert_eq!(to_csv(&[]), "");
    }

    #[test]
    fn filename_depends_on_mode() {
        assert_eq!(export_filename(Mode::StateFeedback, 1.0, 2.0), "data.csv");
        assert_eq!(
            export_filename(Mode::Feedforward, 1.5, 2.0),
            "data_ff_1.500_2.000.csv"
        );
        assert_eq!(
            export_filename(Mode::Servo, 0.0, 1.0),
            "data_ff_0.000_1.000.csv"
        );
    }
}
