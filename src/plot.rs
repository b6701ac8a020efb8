use std::path::Path;

use anyhow::{bail, Result};
use plotters::prelude::*;

use crate::{record::Sample, types::Float};

/// Plot reference and angle against time into a PNG at `path`.
pub fn plot_samples(
    samples: &[Sample],
    path: impl AsRef<Path>,
    caption: &str,
) -> Result<()> {
    let (min_t, max_t) = match (samples.first(), samples.last()) {
        (Some(first), Some(last)) => (first.time, last.time.max(first.time + Float::EPSILON)),
        _ => bail!("no samples to plot"),
    };

    // Determine y-axis limits based on the minimum and maximum values in the data
    let values = samples.iter().flat_map(|s| [s.reference, s.angle]);
    let min_y = values.clone().fold(Float::INFINITY, Float::min);
    let max_y = values.fold(Float::NEG_INFINITY, Float::max);
    let margin = ((max_y - min_y) * 0.05).max(1.0);

    // Create a plotting area
    let root = BitMapBackend::new(path.as_ref(), (960, 540)).into_drawing_area();
    root.fill(&WHITE)?;

    // Configure the chart
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(min_t..max_t, (min_y - margin)..(max_y + margin))?;

    chart
        .configure_mesh()
        .x_desc("time [s]")
        .y_desc("angle")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            samples.iter().map(|s| (s.time, s.angle)),
            &BLUE,
        ))?
        .label("angle")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .draw_series(LineSeries::new(
            samples.iter().map(|s| (s.time, s.reference)),
            &RED,
        ))?
        .label("ref")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod plot_tests {
    use super::*;

    #[test]
    fn empty_history_is_an_error() {
        let err = plot_samples(&[], "unused.png", "empty").unwrap_err();
        assert_eq!(err.to_string(), "no samples to plot");
    }
}
