//! A stand-in for the WaveForms SDK with no hardware attached.
//!
//! The simulated device acquires a sine wave and accepts any waveform generator settings.
//! Every call is recorded so the sequence issued by the device layer can be inspected.

use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use crate::{Error, Result};
use crate::dwf::{AnalogOutNode, Channels, EnumFilter, Filter, Function, Handle, State};
use crate::dwf::{TriggerSlope, TriggerSource, TriggerType};

/// `dwfercInvalidParameter0`
const ERC_INVALID_PARAMETER: i32 = 0x10;
/// `dwfercNotSupported`
const ERC_NOT_SUPPORTED: i32 = 0x4;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Enumerate(EnumFilter),
    DeviceName(usize),
    Open(usize),
    Close(Handle),
    CloseAll,
    InChannelCount,
    InBufferSizeInfo,
    InChannelEnable(Channels, bool),
    InChannelOffset(Channels, f64),
    InChannelRange(Channels, f64),
    InChannelFilter(Channels, Filter),
    InBufferSize(usize),
    InFrequency(f64),
    InTriggerAutoTimeout(f64),
    InTriggerSource(TriggerSource),
    InTriggerChannel(usize),
    InTriggerType(TriggerType),
    InTriggerLevel(f64),
    InTriggerCondition(TriggerSlope),
    InConfigure { reconfigure: bool, start: bool },
    InStatus { read_data: bool },
    InStatusData { channel: usize, count: usize },
    InStatusSample(usize),
    InReset,
    OutNodeEnable(Channels, AnalogOutNode, bool),
    OutNodeFunction(Channels, AnalogOutNode, Function),
    OutNodeData(Channels, AnalogOutNode, Vec<f64>),
    OutNodeFrequency(Channels, AnalogOutNode, f64),
    OutNodeAmplitude(Channels, AnalogOutNode, f64),
    OutNodeOffset(Channels, AnalogOutNode, f64),
    OutConfigure(Channels, bool),
    OutReset(Channels),
}

#[derive(Debug, Clone, Copy)]
struct Signal {
    frequency: f64,
    amplitude: f64,
    offset: f64,
}

#[derive(Debug)]
struct SimState {
    devices: Vec<String>,
    open: Option<Handle>,
    next_handle: i32,
    channel_count: usize,
    buffer_size_max: usize,
    buffer_size: usize,
    frequency: f64,
    signal: Signal,
    latency: Option<u32>, // `None` never completes
    polls_left: u32,
    acquiring: bool,
    failing: Option<&'static str>,
    calls: Vec<Call>,
}

#[derive(Debug, Clone)]
pub struct Simulator {
    state: Rc<RefCell<SimState>>,
}

impl Default for Simulator {
    fn default() -> Self {
        Simulator::new()
    }
}

impl Simulator {
    /// A single two-channel device with an 8192 sample buffer acquiring a 1 MHz, 1 V sine.
    pub fn new() -> Simulator {
        Simulator {
            state: Rc::new(RefCell::new(SimState {
                devices: vec!["Analog Discovery (simulated)".to_owned()],
                open: None,
                next_handle: 1,
                channel_count: 2,
                buffer_size_max: 8192,
                buffer_size: 8192,
                frequency: 100e6,
                signal: Signal { frequency: 1e6, amplitude: 1.0, offset: 0.0 },
                latency: Some(3),
                polls_left: 0,
                acquiring: false,
                failing: None,
                calls: Vec::new(),
            }))
        }
    }

    pub fn without_devices() -> Simulator {
        let simulator = Simulator::new();
        simulator.state.borrow_mut().devices.clear();
        simulator
    }

    /// Number of status polls reporting the acquisition as armed before it is done.
    pub fn with_acquisition_latency(self, polls: u32) -> Simulator {
        self.state.borrow_mut().latency = Some(polls);
        self
    }

    /// The acquisition never completes, as if the trigger condition never occurred.
    pub fn stalled(self) -> Simulator {
        self.state.borrow_mut().latency = None;
        self
    }

    pub fn with_max_buffer_size(self, size: usize) -> Simulator {
        self.state.borrow_mut().buffer_size_max = size;
        self
    }

    pub fn with_signal(self, frequency: f64, amplitude: f64, offset: f64) -> Simulator {
        self.state.borrow_mut().signal = Signal { frequency, amplitude, offset };
        self
    }

    /// Make the native call named `call` (e.g. `"FDwfAnalogInFrequencySet"`) report failure.
    pub fn failing_on(self, call: &'static str) -> Simulator {
        self.state.borrow_mut().failing = Some(call);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().open.is_some()
    }

    fn record(&self, name: &'static str, call: Call) -> Result<()> {
        let mut state = self.state.borrow_mut();
        log::trace!("{}: {:?}", name, call);
        state.calls.push(call);
        if state.failing == Some(name) {
            return Err(Error::Sdk {
                call: name,
                code: ERC_NOT_SUPPORTED,
                message: "simulated failure".to_owned(),
            })
        }
        Ok(())
    }

    fn record_with(&self, name: &'static str, handle: Handle, call: Call) -> Result<()> {
        self.record(name, call)?;
        if self.state.borrow().open != Some(handle) {
            return Err(Error::Sdk {
                call: name,
                code: ERC_INVALID_PARAMETER,
                message: "invalid device handle".to_owned(),
            })
        }
        Ok(())
    }

    fn sample_at(signal: Signal, frequency: f64, index: usize) -> f64 {
        let t = index as f64 / frequency;
        signal.offset + signal.amplitude * (2.0 * PI * signal.frequency * t).sin()
    }
}

impl super::Driver for Simulator {
    fn enumerate(&self, filter: EnumFilter) -> Result<usize> {
        self.record("FDwfEnum", Call::Enumerate(filter))?;
        Ok(self.state.borrow().devices.len())
    }

    fn device_name(&self, index: usize) -> Result<String> {
        self.record("FDwfEnumDeviceName", Call::DeviceName(index))?;
        self.state.borrow().devices.get(index).cloned().ok_or(Error::Sdk {
            call: "FDwfEnumDeviceName",
            code: ERC_INVALID_PARAMETER,
            message: "device index out of range".to_owned(),
        })
    }

    fn open(&self, index: usize) -> Result<Handle> {
        self.record("FDwfDeviceOpen", Call::Open(index))?;
        let mut state = self.state.borrow_mut();
        if index >= state.devices.len() || state.open.is_some() {
            return Err(Error::Sdk {
                call: "FDwfDeviceOpen",
                code: ERC_INVALID_PARAMETER,
                message: "device not available".to_owned(),
            })
        }
        let handle = Handle(state.next_handle);
        state.next_handle += 1;
        state.open = Some(handle);
        Ok(handle)
    }

    fn close(&self, handle: Handle) -> Result<()> {
        self.record_with("FDwfDeviceClose", handle, Call::Close(handle))?;
        let mut state = self.state.borrow_mut();
        state.open = None;
        state.acquiring = false;
        Ok(())
    }

    fn close_all(&self) -> Result<()> {
        self.record("FDwfDeviceCloseAll", Call::CloseAll)?;
        let mut state = self.state.borrow_mut();
        state.open = None;
        state.acquiring = false;
        Ok(())
    }

    fn analog_in_channel_count(&self, handle: Handle) -> Result<usize> {
        self.record_with("FDwfAnalogInChannelCount", handle, Call::InChannelCount)?;
        Ok(self.state.borrow().channel_count)
    }

    fn analog_in_buffer_size_info(&self, handle: Handle) -> Result<(usize, usize)> {
        self.record_with("FDwfAnalogInBufferSizeInfo", handle, Call::InBufferSizeInfo)?;
        Ok((16, self.state.borrow().buffer_size_max))
    }

    fn analog_in_channel_enable(&self, handle: Handle, channels: Channels, enable: bool)
            -> Result<()> {
        self.record_with("FDwfAnalogInChannelEnableSet", handle,
            Call::InChannelEnable(channels, enable))
    }

    fn analog_in_channel_offset(&self, handle: Handle, channels: Channels, volts: f64)
            -> Result<()> {
        self.record_with("FDwfAnalogInChannelOffsetSet", handle,
            Call::InChannelOffset(channels, volts))
    }

    fn analog_in_channel_range(&self, handle: Handle, channels: Channels, volts: f64)
            -> Result<()> {
        self.record_with("FDwfAnalogInChannelRangeSet", handle,
            Call::InChannelRange(channels, volts))
    }

    fn analog_in_channel_filter(&self, handle: Handle, channels: Channels, filter: Filter)
            -> Result<()> {
        self.record_with("FDwfAnalogInChannelFilterSet", handle,
            Call::InChannelFilter(channels, filter))
    }

    fn analog_in_buffer_size(&self, handle: Handle, size: usize) -> Result<()> {
        self.record_with("FDwfAnalogInBufferSizeSet", handle, Call::InBufferSize(size))?;
        let mut state = self.state.borrow_mut();
        // the device silently clamps to what it supports
        state.buffer_size = size.clamp(16, state.buffer_size_max);
        Ok(())
    }

    fn analog_in_frequency(&self, handle: Handle, hertz: f64) -> Result<()> {
        self.record_with("FDwfAnalogInFrequencySet", handle, Call::InFrequency(hertz))?;
        self.state.borrow_mut().frequency = hertz;
        Ok(())
    }

    fn analog_in_trigger_auto_timeout(&self, handle: Handle, seconds: f64) -> Result<()> {
        self.record_with("FDwfAnalogInTriggerAutoTimeoutSet", handle,
            Call::InTriggerAutoTimeout(seconds))
    }

    fn analog_in_trigger_source(&self, handle: Handle, source: TriggerSource) -> Result<()> {
        self.record_with("FDwfAnalogInTriggerSourceSet", handle, Call::InTriggerSource(source))
    }

    fn analog_in_trigger_channel(&self, handle: Handle, channel: usize) -> Result<()> {
        self.record_with("FDwfAnalogInTriggerChannelSet", handle,
            Call::InTriggerChannel(channel))
    }

    fn analog_in_trigger_type(&self, handle: Handle, trigger_type: TriggerType) -> Result<()> {
        self.record_with("FDwfAnalogInTriggerTypeSet", handle, Call::InTriggerType(trigger_type))
    }

    fn analog_in_trigger_level(&self, handle: Handle, volts: f64) -> Result<()> {
        self.record_with("FDwfAnalogInTriggerLevelSet", handle, Call::InTriggerLevel(volts))
    }

    fn analog_in_trigger_condition(&self, handle: Handle, slope: TriggerSlope) -> Result<()> {
        self.record_with("FDwfAnalogInTriggerConditionSet", handle,
            Call::InTriggerCondition(slope))
    }

    fn analog_in_configure(&self, handle: Handle, reconfigure: bool, start: bool) -> Result<()> {
        self.record_with("FDwfAnalogInConfigure", handle,
            Call::InConfigure { reconfigure, start })?;
        let mut state = self.state.borrow_mut();
        state.acquiring = start;
        state.polls_left = state.latency.unwrap_or(0);
        Ok(())
    }

    fn analog_in_status(&self, handle: Handle, read_data: bool) -> Result<State> {
        self.record_with("FDwfAnalogInStatus", handle, Call::InStatus { read_data })?;
        let mut state = self.state.borrow_mut();
        if !state.acquiring {
            return Ok(State::Ready)
        }
        match state.latency {
            None => Ok(State::Armed),
            Some(_) if state.polls_left > 0 => {
                state.polls_left -= 1;
                Ok(State::Armed)
            }
            Some(_) => Ok(State::Done),
        }
    }

    fn analog_in_status_data(&self, handle: Handle, channel: usize, data: &mut [f64])
            -> Result<()> {
        self.record_with("FDwfAnalogInStatusData", handle,
            Call::InStatusData { channel, count: data.len() })?;
        let state = self.state.borrow();
        if channel >= state.channel_count {
            return Err(Error::Sdk {
                call: "FDwfAnalogInStatusData",
                code: ERC_INVALID_PARAMETER + 1,
                message: "channel index out of range".to_owned(),
            })
        }
        for (index, sample) in data.iter_mut().enumerate() {
            *sample = Self::sample_at(state.signal, state.frequency, index);
        }
        Ok(())
    }

    fn analog_in_status_sample(&self, handle: Handle, channel: usize) -> Result<f64> {
        self.record_with("FDwfAnalogInStatusSample", handle, Call::InStatusSample(channel))?;
        let state = self.state.borrow();
        Ok(Self::sample_at(state.signal, state.frequency, 0))
    }

    fn analog_in_reset(&self, handle: Handle) -> Result<()> {
        self.record_with("FDwfAnalogInReset", handle, Call::InReset)?;
        self.state.borrow_mut().acquiring = false;
        Ok(())
    }

    fn analog_out_node_enable(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
            enable: bool) -> Result<()> {
        self.record_with("FDwfAnalogOutNodeEnableSet", handle,
            Call::OutNodeEnable(channels, node, enable))
    }

    fn analog_out_node_function(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
            function: Function) -> Result<()> {
        self.record_with("FDwfAnalogOutNodeFunctionSet", handle,
            Call::OutNodeFunction(channels, node, function))
    }

    fn analog_out_node_data(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
            data: &[f64]) -> Result<()> {
        self.record_with("FDwfAnalogOutNodeDataSet", handle,
            Call::OutNodeData(channels, node, data.to_vec()))
    }

    fn analog_out_node_frequency(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
            hertz: f64) -> Result<()> {
        self.record_with("FDwfAnalogOutNodeFrequencySet", handle,
            Call::OutNodeFrequency(channels, node, hertz))
    }

    fn analog_out_node_amplitude(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
            volts: f64) -> Result<()> {
        self.record_with("FDwfAnalogOutNodeAmplitudeSet", handle,
            Call::OutNodeAmplitude(channels, node, volts))
    }

    fn analog_out_node_offset(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
            volts: f64) -> Result<()> {
        self.record_with("FDwfAnalogOutNodeOffsetSet", handle,
            Call::OutNodeOffset(channels, node, volts))
    }

    fn analog_out_configure(&self, handle: Handle, channels: Channels, start: bool)
            -> Result<()> {
        self.record_with("FDwfAnalogOutConfigure", handle, Call::OutConfigure(channels, start))
    }

    fn analog_out_reset(&self, handle: Handle, channels: Channels) -> Result<()> {
        self.record_with("FDwfAnalogOutReset", handle, Call::OutReset(channels))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sys::Driver;

    #[test]
    fn test_open_close() {
        let sim = Simulator::new();
        assert_eq!(sim.enumerate(EnumFilter::ALL).unwrap(), 1);
        let handle = sim.open(0).unwrap();
        assert!(sim.is_open());
        assert!(sim.open(0).is_err());
        sim.close(handle).unwrap();
        assert!(!sim.is_open());
    }

    #[test]
    fn test_stale_handle() {
        let sim = Simulator::new();
        let handle = sim.open(0).unwrap();
        sim.close(handle).unwrap();
        assert!(matches!(sim.analog_in_reset(handle),
            Err(Error::Sdk { call: "FDwfAnalogInReset", .. })));
    }

    #[test]
    fn test_latency() {
        let sim = Simulator::new().with_acquisition_latency(2);
        let handle = sim.open(0).unwrap();
        assert_eq!(sim.analog_in_status(handle, true).unwrap(), State::Ready);
        sim.analog_in_configure(handle, false, true).unwrap();
        assert_eq!(sim.analog_in_status(handle, true).unwrap(), State::Armed);
        assert_eq!(sim.analog_in_status(handle, true).unwrap(), State::Armed);
        assert_eq!(sim.analog_in_status(handle, true).unwrap(), State::Done);
    }

    #[test]
    fn test_sine_data() {
        let sim = Simulator::new().with_signal(1e6, 2.0, 0.5);
        let handle = sim.open(0).unwrap();
        sim.analog_in_frequency(handle, 4e6).unwrap();
        let mut data = [0.0; 4];
        sim.analog_in_status_data(handle, 0, &mut data).unwrap();
        assert!((data[0] - 0.5).abs() < 1e-9);
        assert!((data[1] - 2.5).abs() < 1e-9);
        assert!((data[2] - 0.5).abs() < 1e-9);
        assert!((data[3] + 1.5).abs() < 1e-9);
        assert!(sim.analog_in_status_data(handle, 2, &mut data).is_err());
    }

    #[test]
    fn test_failure_injection() {
        let sim = Simulator::new().failing_on("FDwfAnalogInFrequencySet");
        let handle = sim.open(0).unwrap();
        match sim.analog_in_frequency(handle, 1e6) {
            Err(Error::Sdk { call, code, .. }) => {
                assert_eq!(call, "FDwfAnalogInFrequencySet");
                assert_eq!(code, ERC_NOT_SUPPORTED);
            }
            result => panic!("unexpected {:?}", result),
        }
        assert_eq!(sim.calls().last(), Some(&Call::InFrequency(1e6)));
    }
}
