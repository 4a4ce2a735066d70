use crate::Result;
use crate::sys::Driver;
use crate::config::{AcquisitionConfiguration, PollPolicy, TriggerConfiguration};
use crate::params::AcquisitionParameters;
use crate::device::Device;

/// Time of each of `len` samples taken at `sampling_frequency` Hz, in ms.
pub fn time_axis_ms(len: usize, sampling_frequency: f64) -> Vec<f64> {
    let period_ms = 1000.0 / sampling_frequency;
    (0..len).map(|index| index as f64 * period_ms).collect()
}

/// A single triggered recording of one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub params: AcquisitionParameters,
    pub channel: usize,
    /// Voltages in V.
    pub samples: Vec<f64>,
}

impl Capture {
    pub fn time_axis_ms(&self) -> Vec<f64> {
        time_axis_ms(self.samples.len(), self.params.sampling_frequency)
    }

    /// Lowest and highest sample, or `None` if nothing was recorded.
    pub fn voltage_bounds(&self) -> Option<(f64, f64)> {
        self.samples.iter().fold(None, |bounds, &sample| match bounds {
            None => Some((sample, sample)),
            Some((low, high)) => Some((f64::min(low, sample), f64::max(high, sample))),
        })
    }

    /// Render the recording as a voltage over time line chart in SVG format.
    #[cfg(feature = "plot")]
    pub fn plot(&self, path: &std::path::Path) -> Result<()> {
        use plotters::prelude::*;

        fn plot_error<E: std::fmt::Display>(error: E) -> crate::Error {
            crate::Error::Other(format!("cannot render plot: {}", error).into())
        }

        let time_ms = self.time_axis_ms();
        let t_max = time_ms.last().copied().filter(|&t| t > 0.0).unwrap_or(1.0);
        let (v_min, v_max) = match self.voltage_bounds() {
            Some((low, high)) if high > low => {
                let margin = (high - low) * 0.05;
                (low - margin, high + margin)
            }
            Some((value, _)) => (value - 1.0, value + 1.0),
            None => (-1.0, 1.0),
        };

        let root = SVGBackend::new(path, (1280, 720)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;
        let mut chart = ChartBuilder::on(&root)
            .caption("Digitized Signal", ("sans-serif", 28))
            .margin(16)
            .x_label_area_size(48)
            .y_label_area_size(64)
            .build_cartesian_2d(0.0..t_max, v_min..v_max)
            .map_err(plot_error)?;
        chart.configure_mesh()
            .x_desc("Time (ms)")
            .y_desc("Voltage (V)")
            .draw()
            .map_err(plot_error)?;
        chart.draw_series(LineSeries::new(
                time_ms.into_iter().zip(self.samples.iter().copied()), &BLUE))
            .map_err(plot_error)?;
        root.present().map_err(plot_error)?;
        log::info!("plotted {} samples to {}", self.samples.len(), path.display());
        Ok(())
    }
}

/// Record one buffer of `channel`, arming the trigger first, then reset the oscilloscope.
pub fn acquire<D: Driver>(
    device: &mut Device<D>,
    acquisition: &AcquisitionConfiguration,
    trigger: &TriggerConfiguration,
    channel: usize,
    poll: &PollPolicy,
) -> Result<Capture> {
    let params = device.setup_acquisition(acquisition)?;
    device.set_trigger(trigger)?;
    let samples = device.record(&params, channel, poll)?;
    device.reset_acquisition()?;
    log::info!("captured {} samples on channel {} at {} Hz",
        samples.len(), channel, params.sampling_frequency);
    Ok(Capture { params, channel, samples })
}
