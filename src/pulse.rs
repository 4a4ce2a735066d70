//! Photomultiplier tube pulse synthesis.

use rand::Rng;

use crate::{Error, Result};
use crate::config::PulseShape;

/// `count` evenly spaced points from `0` to `stop`, both ends included.
pub fn time_vector(stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let step = stop / (count - 1) as f64;
            // compute the last point separately so that it is exactly `stop`
            (0..count - 1).map(|index| index as f64 * step).chain([stop]).collect()
        }
    }
}

/// Negative-going double-exponential pulse `(1 - e^(-t/tau_rise)) * e^(-t/tau_fall)`, scaled
/// such that its largest magnitude is exactly `amplitude`.
///
/// If the shape is zero at every point of `t` (e.g. `t` only contains `0`), the result is zero
/// everywhere.
pub fn pulse(t: &[f64], amplitude: f64, tau_rise: f64, tau_fall: f64) -> Vec<f64> {
    let shape = t.iter()
        .map(|&t| (1.0 - (-t / tau_rise).exp()) * (-t / tau_fall).exp())
        .collect::<Vec<_>>();
    let peak = shape.iter().fold(0.0f64, |peak, &value| peak.max(value.abs()));
    if peak == 0.0 {
        return vec![0.0; shape.len()]
    }
    shape.into_iter().map(|value| -amplitude * value / peak).collect()
}

impl PulseShape {
    pub fn time_vector(&self) -> Vec<f64> {
        time_vector(self.span * self.width, self.sample_count)
    }

    /// Sampled waveform with a peak of `amplitude` V.
    pub fn waveform(&self, amplitude: f64) -> Vec<f64> {
        pulse(&self.time_vector(), amplitude, self.tau_rise, self.tau_fall)
    }

    /// Generator carrier frequency in Hz; the generator plays one pulse per carrier period.
    pub fn carrier_frequency(&self) -> f64 {
        1.0 / self.width
    }
}

/// Closed interval of pulse amplitudes, in V.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmplitudeRange {
    low: f64,
    high: f64,
}

impl AmplitudeRange {
    pub const DEFAULT: AmplitudeRange = AmplitudeRange { low: 250e-3, high: 400e-3 };

    pub fn new(low: f64, high: f64) -> Result<AmplitudeRange> {
        if !low.is_finite() || !high.is_finite() {
            return Err(Error::InvalidParameter(
                format!("amplitude range {}..{} is not finite", low, high)))
        }
        if low > high {
            return Err(Error::InvalidParameter(
                format!("amplitude range {}..{} is empty", low, high)))
        }
        Ok(AmplitudeRange { low, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    /// Draw an amplitude uniformly from the interval.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.low..=self.high)
    }
}

impl Default for AmplitudeRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn min(values: &[f64]) -> f64 {
        values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn test_time_vector() {
        let t = time_vector(2.1e-6, 1000);
        assert_eq!(t.len(), 1000);
        assert_eq!(t[0], 0.0);
        assert_eq!(t[999], 2.1e-6);
        assert!((t[1] - 2.1e-6 / 999.0).abs() < 1e-20);
    }

    #[test]
    fn test_time_vector_degenerate() {
        assert!(time_vector(1.0, 0).is_empty());
        assert_eq!(time_vector(1.0, 1), vec![0.0]);
        assert_eq!(time_vector(1.0, 2), vec![0.0, 1.0]);
    }

    #[test]
    fn test_pulse_normalized_to_amplitude() {
        let t = PulseShape::default().time_vector();
        for &amplitude in &[1e-3, 0.25, 0.3, 0.4, 1.0, 5.0] {
            let p = pulse(&t, amplitude, 100e-9, 200e-9);
            assert!((min(&p) + amplitude).abs() < amplitude * 1e-12,
                "amplitude {}: minimum {}", amplitude, min(&p));
            assert!(p.iter().all(|&v| v <= 0.0 && v >= -amplitude));
        }
    }

    #[test]
    fn test_pulse_starts_at_baseline() {
        let p = PulseShape::default().waveform(0.3);
        assert_eq!(p[0], 0.0);
    }

    #[test]
    fn test_pulse_arbitrary_time_vector() {
        let t = [0.0, 50e-9, 80e-9, 1e-6, 3e-7];
        let p = pulse(&t, 2.0, 100e-9, 200e-9);
        assert_eq!(p.len(), 5);
        assert_eq!(min(&p), -2.0);
    }

    #[test]
    fn test_pulse_all_zero() {
        assert_eq!(pulse(&[0.0, 0.0], 1.0, 100e-9, 200e-9), vec![0.0, 0.0]);
        assert!(pulse(&[], 1.0, 100e-9, 200e-9).is_empty());
    }

    #[test]
    fn test_pulse_peak_position() {
        // the peak of (1 - e^(-t/a)) e^(-t/b) is at a ln((a + b) / a)
        let shape = PulseShape { sample_count: 100_001, ..Default::default() };
        let t = shape.time_vector();
        let p = shape.waveform(1.0);
        let (peak_index, _) = p.iter().enumerate()
            .fold((0, 0.0), |(i, m), (j, &v)| if v < m { (j, v) } else { (i, m) });
        let expected = 100e-9 * (3.0f64).ln();
        assert!((t[peak_index] - expected).abs() < 1e-10);
    }

    #[test]
    fn test_carrier_frequency() {
        let shape = PulseShape::default();
        assert!((shape.carrier_frequency() - 1.0 / 700e-9).abs() < 1e-3);
        assert_eq!((shape.carrier_frequency() / 1e6 * 1e4).round() / 1e4, 1.4286);
    }

    #[test]
    fn test_amplitude_range_bounds() {
        let range = AmplitudeRange::new(0.25, 0.4).unwrap();
        assert_eq!((range.low(), range.high()), (0.25, 0.4));
        assert_eq!(range, AmplitudeRange::default());
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..10_000 {
            let amplitude = range.sample(&mut rng);
            assert!(amplitude >= 0.25 && amplitude <= 0.4);
        }
    }

    #[test]
    fn test_amplitude_range_degenerate() {
        let range = AmplitudeRange::new(0.3, 0.3).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(range.sample(&mut rng), 0.3);
    }

    #[test]
    fn test_amplitude_range_invalid() {
        assert!(matches!(AmplitudeRange::new(0.4, 0.25), Err(Error::InvalidParameter(_))));
        assert!(AmplitudeRange::new(f64::NAN, 0.25).is_err());
        assert!(AmplitudeRange::new(0.0, f64::INFINITY).is_err());
    }
}
