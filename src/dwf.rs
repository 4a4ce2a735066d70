//! Vocabulary of the WaveForms SDK, with the values fixed by its C header.

#![allow(dead_code)]

use bitflags::bitflags;
use libc::{c_int, c_uchar};

/// Device handle (`HDWF`) returned by `FDwfDeviceOpen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub(crate) c_int);

impl Handle {
    /// `hdwfNone`
    pub const NONE: Handle = Handle(0);

    pub fn raw(self) -> c_int {
        self.0
    }
}

/// Selects the channels a per-channel setter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    All,
    One(usize),
}

impl Channels {
    pub(crate) fn code(self) -> c_int {
        match self {
            Self::All => -1,
            Self::One(index) => index as c_int,
        }
    }
}

bitflags! {
    // ENUMFILTER; `empty()` is `enumfilterAll`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EnumFilter: u32 {
        const Usb     = 0x0000_0001;
        const Network = 0x0000_0002;
        const Axi     = 0x0000_0004;
        const Remote  = 0x1000_0000;
        const Audio   = 0x2000_0000;
        const Demo    = 0x4000_0000;
        const Type    = 0x8000_0000;
    }
}

impl EnumFilter {
    pub const ALL: EnumFilter = EnumFilter::empty();
}

/// Instrument state (`DwfState`) reported by the status calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Ready,
    Armed,
    Done,
    Running, // also `DwfStateTriggered`
    Config,
    Prefill,
    Wait,
    Unknown(u8),
}

impl State {
    pub(crate) fn from_code(code: c_uchar) -> State {
        match code {
            0 => Self::Ready,
            1 => Self::Armed,
            2 => Self::Done,
            3 => Self::Running,
            4 => Self::Config,
            5 => Self::Prefill,
            7 => Self::Wait,
            code => Self::Unknown(code),
        }
    }

    pub(crate) fn code(self) -> c_uchar {
        match self {
            Self::Ready => 0,
            Self::Armed => 1,
            Self::Done => 2,
            Self::Running => 3,
            Self::Config => 4,
            Self::Prefill => 5,
            Self::Wait => 7,
            Self::Unknown(code) => code,
        }
    }
}

/// Trigger source (`TRIGSRC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerSource {
    #[default]
    None,
    Pc,
    DetectorAnalogIn,
    DetectorDigitalIn,
    AnalogIn,
    DigitalIn,
    DigitalOut,
    AnalogOut(u8),  // 1..=4
    External(u8),   // 1..=4
}

impl TriggerSource {
    /// Whether the instrument index of an `AnalogOut` or `External` source is in range.
    pub fn is_valid(self) -> bool {
        match self {
            Self::AnalogOut(index) | Self::External(index) => (1..=4).contains(&index),
            _ => true,
        }
    }

    pub(crate) fn code(self) -> c_uchar {
        match self {
            Self::None => 0,
            Self::Pc => 1,
            Self::DetectorAnalogIn => 2,
            Self::DetectorDigitalIn => 3,
            Self::AnalogIn => 4,
            Self::DigitalIn => 5,
            Self::DigitalOut => 6,
            Self::AnalogOut(index) => {
                assert!(index >= 1 && index <= 4, "analog out trigger index out of range");
                6 + index
            }
            Self::External(index) => {
                assert!(index >= 1 && index <= 4, "external trigger index out of range");
                10 + index
            }
        }
    }
}

/// Trigger type (`TRIGTYPE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerType {
    #[default]
    Edge,
    Pulse,
    Transition,
    Window,
}

impl TriggerType {
    pub(crate) fn code(self) -> c_int {
        match self {
            Self::Edge => 0,
            Self::Pulse => 1,
            Self::Transition => 2,
            Self::Window => 3,
        }
    }
}

/// Trigger condition (`DwfTriggerSlope`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerSlope {
    #[default]
    Rise,
    Fall,
    Either,
}

impl TriggerSlope {
    pub(crate) fn code(self) -> c_int {
        match self {
            Self::Rise => 0,
            Self::Fall => 1,
            Self::Either => 2,
        }
    }
}

/// Acquisition filter (`FILTER`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    Decimate,
    Average,
    MinMax,
}

impl Filter {
    pub(crate) fn code(self) -> c_int {
        match self {
            Self::Decimate => 0,
            Self::Average => 1,
            Self::MinMax => 2,
        }
    }
}

/// Waveform generator node (`AnalogOutNode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalogOutNode {
    #[default]
    Carrier,
    Fm,
    Am,
}

impl AnalogOutNode {
    pub(crate) fn code(self) -> c_int {
        match self {
            Self::Carrier => 0,
            Self::Fm => 1,
            Self::Am => 2,
        }
    }
}

/// Waveform generator function (`FUNC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Function {
    #[default]
    Dc,
    Sine,
    Square,
    Triangle,
    RampUp,
    RampDown,
    Noise,
    Pulse,
    Trapezium,
    SinePower,
    Custom,
    Play,
}

impl Function {
    pub(crate) fn code(self) -> c_uchar {
        match self {
            Self::Dc => 0,
            Self::Sine => 1,
            Self::Square => 2,
            Self::Triangle => 3,
            Self::RampUp => 4,
            Self::RampDown => 5,
            Self::Noise => 6,
            Self::Pulse => 7,
            Self::Trapezium => 8,
            Self::SinePower => 9,
            Self::Custom => 30,
            Self::Play => 31,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_channel_codes() {
        assert_eq!(Channels::All.code(), -1);
        assert_eq!(Channels::One(0).code(), 0);
        assert_eq!(Channels::One(3).code(), 3);
    }

    #[test]
    fn test_trigger_source_codes() {
        assert_eq!(TriggerSource::None.code(), 0);
        assert_eq!(TriggerSource::DetectorAnalogIn.code(), 2);
        assert_eq!(TriggerSource::DetectorDigitalIn.code(), 3);
        assert_eq!(TriggerSource::AnalogOut(1).code(), 7);
        assert_eq!(TriggerSource::External(1).code(), 11);
        assert_eq!(TriggerSource::External(4).code(), 14);
    }

    #[test]
    fn test_trigger_source_range() {
        assert!(TriggerSource::Pc.is_valid());
        assert!(TriggerSource::AnalogOut(4).is_valid());
        assert!(!TriggerSource::AnalogOut(0).is_valid());
        assert!(!TriggerSource::External(5).is_valid());
    }

    #[test]
    fn test_state_round_trip() {
        for code in 0..=8 {
            assert_eq!(State::from_code(code).code(), code);
        }
        assert_eq!(State::from_code(2), State::Done);
        assert_eq!(State::from_code(6), State::Unknown(6));
    }

    #[test]
    fn test_enum_filter() {
        assert_eq!(EnumFilter::ALL.bits(), 0);
        assert_eq!((EnumFilter::Usb | EnumFilter::Network).bits(), 3);
    }

    #[test]
    fn test_custom_function_code() {
        assert_eq!(Function::Custom.code(), 30);
        assert_eq!(AnalogOutNode::Carrier.code(), 0);
    }
}
