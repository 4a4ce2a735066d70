pub mod sys;
pub mod dwf;
mod config;
mod params;
mod device;
mod pulse;
mod capture;
mod playback;

use std::time::Duration;

#[derive(Debug)]
pub enum Error {
    NotFound,
    Library(String),
    Unsupported,
    Sdk { call: &'static str, code: i32, message: String },
    Timeout(Duration),
    InvalidParameter(String),
    Io(std::io::Error),
    Other(Box<dyn std::error::Error + Sync + Send + 'static>),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::NotFound =>
                write!(f, "no device found"),
            Self::Library(reason) =>
                write!(f, "cannot load WaveForms SDK library: {}", reason),
            Self::Unsupported =>
                write!(f, "WaveForms SDK binding is not available on this platform"),
            Self::Sdk { call, code, message } =>
                write!(f, "{} failed (error {}): {}", call, code, message.trim_end()),
            Self::Timeout(timeout) =>
                write!(f, "acquisition did not complete within {:?}", timeout),
            Self::InvalidParameter(reason) =>
                write!(f, "invalid parameter: {}", reason),
            Self::Io(io_error) =>
                write!(f, "I/O error: {}", io_error),
            Self::Other(error) =>
                write!(f, "{}", error),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            &Self::Io(ref io_error) => Some(io_error),
            &Self::Other(ref error) => Some(error.as_ref()),
            _ => None
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        match error.downcast::<Self>() {
            Ok(error) => error,
            Err(error) => Error::Io(error),
        }
    }
}

impl From<Error> for std::io::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::Io(io_error) =>
                io_error,
            Error::NotFound =>
                Self::new(std::io::ErrorKind::NotFound, error),
            Error::Timeout(_) =>
                Self::new(std::io::ErrorKind::TimedOut, error),
            Error::InvalidParameter(_) =>
                Self::new(std::io::ErrorKind::InvalidInput, error),
            Error::Unsupported =>
                Self::new(std::io::ErrorKind::Unsupported, error),
            error =>
                Self::new(std::io::ErrorKind::Other, error),
        }
    }
}

pub type Result<T> =
    core::result::Result<T, Error>;

pub use dwf::{
    Handle,
    Channels,
    EnumFilter,
    State,
    TriggerSource,
    TriggerType,
    TriggerSlope,
    Filter,
    AnalogOutNode,
    Function,
};

pub use sys::{
    Driver,
    DwfLibrary,
    Simulator,
    Call,
};

pub use config::{
    AcquisitionConfiguration,
    Edge,
    EdgeTrigger,
    TriggerConfiguration,
    PollPolicy,
    PulseShape,
    PlaybackConfiguration,
    RandomPlaybackConfiguration,
};

pub use params::AcquisitionParameters;

pub use device::{
    Device,
    WaveformOutput,
};

pub use pulse::{
    time_vector,
    pulse,
    AmplitudeRange,
};

pub use capture::{
    acquire,
    time_axis_ms,
    Capture,
};

pub use playback::{
    play_pulse,
    play_random_pulses,
};

/// Force-close every device opened by this process, ignoring failures.
///
/// Used on the error path of the command line tools, after which the process exits.
pub fn close_all_devices() {
    match DwfLibrary::load() {
        Ok(library) => {
            if let Err(error) = library.close_all() {
                log::warn!("failed to close devices: {}", error);
            }
        }
        Err(error) => log::debug!("not closing devices: {}", error),
    }
}
