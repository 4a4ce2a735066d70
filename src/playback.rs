//! Playing emulated photomultiplier tube pulses on the waveform generator.
//!
//! The custom waveform is uploaded already scaled to the requested amplitude, and the carrier
//! amplitude is also set to that amplitude. On hardware the delivered peak has been observed to
//! fall short of the requested one (roughly 70%); the relationship is not calibrated here.

use std::thread::sleep;

use rand::Rng;

use crate::Result;
use crate::sys::Driver;
use crate::config::{PlaybackConfiguration, PulseShape, RandomPlaybackConfiguration};
use crate::device::{Device, WaveformOutput};
use crate::pulse::pulse;

fn pulse_output(channel: usize, shape: &PulseShape, time: &[f64], amplitude: f64)
        -> WaveformOutput {
    WaveformOutput {
        channel,
        samples: pulse(time, amplitude, shape.tau_rise, shape.tau_fall),
        frequency: shape.carrier_frequency(),
        amplitude,
        offset: 0.0,
    }
}

// Leaves the generator reset if `f` fails part way through programming it.
fn reset_on_error<D, T, F>(device: &mut Device<D>, channel: usize, f: F) -> Result<T>
        where D: Driver, F: FnOnce(&mut Device<D>) -> Result<T> {
    let result = f(device);
    if result.is_err() {
        if let Err(error) = device.reset_output(channel) {
            log::warn!("error resetting output {}: {}", channel, error)
        }
    }
    result
}

/// Play a pulse of fixed amplitude for `config.dwell`, then stop the generator.
///
/// If any step fails, the generator channel is reset before the error is returned.
pub fn play_pulse<D: Driver>(device: &mut Device<D>, config: &PlaybackConfiguration)
        -> Result<()> {
    let time = config.shape.time_vector();
    let output = pulse_output(config.channel, &config.shape, &time, config.amplitude);
    reset_on_error(device, config.channel, |device| {
        device.enable_output(config.channel)?;
        device.configure_output(&output)?;
        device.start_output(config.channel)?;
        log::info!("generating {:.0} mV pulse at {:.4} MHz for {:?}",
            config.amplitude * 1e3, output.frequency / 1e6, config.dwell);
        sleep(config.dwell);
        device.stop_output(config.channel)
    })
}

/// Play `config.count` pulses, each with an amplitude drawn from `config.amplitudes` and
/// lasting `config.dwell`, then stop the generator.
///
/// `on_pulse` is called with the zero-based index and amplitude of each pulse once it plays.
/// Returns the amplitudes played, in order. If any step fails, the generator channel is reset
/// before the error is returned.
pub fn play_random_pulses<D, R, F>(
    device: &mut Device<D>,
    config: &RandomPlaybackConfiguration,
    rng: &mut R,
    mut on_pulse: F,
) -> Result<Vec<f64>>
        where D: Driver, R: Rng + ?Sized, F: FnMut(usize, f64) {
    let time = config.shape.time_vector();
    reset_on_error(device, config.channel, |device| {
        let mut amplitudes = Vec::with_capacity(config.count);
        device.enable_output(config.channel)?;
        for index in 0..config.count {
            let amplitude = config.amplitudes.sample(rng);
            let output = pulse_output(config.channel, &config.shape, &time, amplitude);
            device.configure_output(&output)?;
            device.start_output(config.channel)?;
            log::debug!("pulse {}/{}: {} V", index + 1, config.count, amplitude);
            on_pulse(index, amplitude);
            amplitudes.push(amplitude);
            sleep(config.dwell);
        }
        device.stop_output(config.channel)?;
        Ok(amplitudes)
    })
}
