//! High-level configuration of acquisitions and pulse playback in terms of physical qualities.

use std::time::Duration;

use crate::dwf::{TriggerSlope, TriggerSource};
use crate::pulse::AmplitudeRange;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquisitionConfiguration {
    /// Sampling frequency in Hz.
    pub sampling_frequency: f64,
    /// Samples per recording; `0` selects the largest buffer the device supports.
    pub buffer_size: usize,
    /// Offset voltage in V, applied to every channel.
    pub offset: f64,
    /// Amplitude range in V, applied to every channel.
    pub amplitude_range: f64,
}

impl Default for AcquisitionConfiguration {
    fn default() -> Self {
        Self {
            sampling_frequency: 20e6,
            buffer_size: 8192,
            offset: 0.0,
            amplitude_range: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Edge {
    #[default]
    Rising,
    Falling,
}

impl Edge {
    pub(crate) fn slope(self) -> TriggerSlope {
        match self {
            Self::Rising => TriggerSlope::Rise,
            Self::Falling => TriggerSlope::Fall,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeTrigger {
    pub source: TriggerSource,
    /// Zero-based analog channel for `DetectorAnalogIn`, or digital line `0..=15` for
    /// `DetectorDigitalIn`.
    pub channel: usize,
    pub edge: Edge,
    /// Level in V.
    pub level: f64,
    /// Time after which the acquisition triggers on its own; zero disables auto triggering.
    pub auto_timeout: Duration,
}

impl Default for EdgeTrigger {
    fn default() -> Self {
        Self {
            source: TriggerSource::DetectorAnalogIn,
            channel: 0,
            edge: Edge::Rising,
            level: 0.0,
            auto_timeout: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TriggerConfiguration {
    #[default]
    Disabled,
    Edge(EdgeTrigger),
}

/// How long and how often to ask the device whether an acquisition has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Double-exponential pulse emulating a photomultiplier tube output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseShape {
    /// Pulse width in s; one period of the generator carrier.
    pub width: f64,
    pub tau_rise: f64,
    pub tau_fall: f64,
    pub sample_count: usize,
    /// Length of the sampled window, in pulse widths.
    pub span: f64,
}

impl Default for PulseShape {
    fn default() -> Self {
        Self {
            width: 700e-9,
            tau_rise: 100e-9,
            tau_fall: 200e-9,
            sample_count: 1000,
            span: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfiguration {
    pub channel: usize,
    pub shape: PulseShape,
    /// Peak amplitude in V.
    pub amplitude: f64,
    pub dwell: Duration,
}

impl Default for PlaybackConfiguration {
    fn default() -> Self {
        Self {
            channel: 0,
            shape: PulseShape::default(),
            amplitude: 300e-3,
            dwell: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomPlaybackConfiguration {
    pub channel: usize,
    pub shape: PulseShape,
    pub amplitudes: AmplitudeRange,
    pub count: usize,
    /// Time each pulse amplitude is played for.
    pub dwell: Duration,
}

impl Default for RandomPlaybackConfiguration {
    fn default() -> Self {
        Self {
            channel: 0,
            shape: PulseShape::default(),
            amplitudes: AmplitudeRange::DEFAULT,
            count: 50,
            dwell: Duration::from_millis(100),
        }
    }
}
