use crate::config::AcquisitionConfiguration;

/// Acquisition parameters as programmed into the device.
///
/// Returned by `Device::setup_acquisition`; unlike `AcquisitionConfiguration`, the buffer size
/// is always resolved to a concrete sample count within what the device supports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquisitionParameters {
    pub sampling_frequency: f64,
    pub buffer_size: usize,
    pub min_buffer_size: usize,
    pub max_buffer_size: usize,
    pub offset: f64,
    pub amplitude_range: f64,
}

impl AcquisitionParameters {
    /// Resolve `config` against the buffer size range reported by the device.
    ///
    /// A buffer size of 0 selects the maximum; any other size is clamped to
    /// `min_buffer_size..=max_buffer_size`, as the device itself would.
    pub fn derive(config: &AcquisitionConfiguration, min_buffer_size: usize,
            max_buffer_size: usize) -> AcquisitionParameters {
        let buffer_size = match config.buffer_size {
            0 => max_buffer_size,
            size => size.clamp(min_buffer_size, max_buffer_size.max(min_buffer_size)),
        };
        if config.buffer_size != 0 && buffer_size != config.buffer_size {
            log::warn!("buffer size {} is out of range {}..={}, using {}",
                config.buffer_size, min_buffer_size, max_buffer_size, buffer_size);
        }
        AcquisitionParameters {
            sampling_frequency: config.sampling_frequency,
            buffer_size,
            min_buffer_size,
            max_buffer_size,
            offset: config.offset,
            amplitude_range: config.amplitude_range,
        }
    }

    /// Time between samples in ms.
    pub fn sample_period_ms(&self) -> f64 {
        1000.0 / self.sampling_frequency
    }

    /// Duration of a full buffer in ms.
    pub fn record_length_ms(&self) -> f64 {
        self.buffer_size as f64 * self.sample_period_ms()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_zero_buffer_size_uses_maximum() {
        let config = AcquisitionConfiguration { buffer_size: 0, ..Default::default() };
        let params = AcquisitionParameters::derive(&config, 16, 32768);
        assert_eq!(params.buffer_size, 32768);
        assert_eq!(params.max_buffer_size, 32768);
    }

    #[test]
    fn test_explicit_buffer_size() {
        let config = AcquisitionConfiguration { buffer_size: 1000, ..Default::default() };
        let params = AcquisitionParameters::derive(&config, 16, 32768);
        assert_eq!(params.buffer_size, 1000);
    }

    #[test]
    fn test_buffer_size_above_maximum() {
        let config = AcquisitionConfiguration { buffer_size: 100_000, ..Default::default() };
        let params = AcquisitionParameters::derive(&config, 16, 8192);
        assert_eq!(params.buffer_size, 8192);
    }

    #[test]
    fn test_buffer_size_below_minimum() {
        let config = AcquisitionConfiguration { buffer_size: 4, ..Default::default() };
        let params = AcquisitionParameters::derive(&config, 16, 8192);
        assert_eq!(params.buffer_size, 16);
        assert_eq!(params.min_buffer_size, 16);
    }

    #[test]
    fn test_sample_period() {
        let params = AcquisitionParameters::derive(&AcquisitionConfiguration::default(), 16, 8192);
        assert!((params.sample_period_ms() - 0.00005).abs() < 1e-15);
        assert!((params.record_length_ms() - 0.4096).abs() < 1e-12);
    }
}
