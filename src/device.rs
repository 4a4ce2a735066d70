use std::time::Instant;
use std::thread::sleep;

use crate::{Error, Result};
use crate::sys::{Driver, DwfLibrary};
use crate::dwf::{AnalogOutNode, Channels, EnumFilter, Filter, Function, Handle, State};
use crate::dwf::{TriggerSource, TriggerType};
use crate::config::{AcquisitionConfiguration, EdgeTrigger, PollPolicy, TriggerConfiguration};
use crate::params::AcquisitionParameters;

/// Custom waveform for one generator channel.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformOutput {
    pub channel: usize,
    /// Samples of one carrier period.
    pub samples: Vec<f64>,
    /// Carrier frequency in Hz.
    pub frequency: f64,
    /// Amplitude in V.
    pub amplitude: f64,
    /// Offset in V.
    pub offset: f64,
}

#[derive(Debug)]
pub struct Device<D: Driver = DwfLibrary> {
    driver: D,
    handle: Option<Handle>,
}

impl Device<DwfLibrary> {
    /// Open the first device attached, through the WaveForms SDK.
    pub fn new() -> Result<Device<DwfLibrary>> {
        Device::open(DwfLibrary::load()?, 0)
    }
}

impl<D: Driver> Device<D> {
    /// Open device `index` among those enumerated by `driver`.
    ///
    /// If no device is attached at all, any device handle left open by this process is closed
    /// and `Error::NotFound` is returned without configuring anything.
    pub fn open(driver: D, index: usize) -> Result<Device<D>> {
        let count = driver.enumerate(EnumFilter::ALL)?;
        log::debug!("enumerate() = {}", count);
        if count == 0 {
            if let Err(error) = driver.close_all() {
                log::warn!("failed to close devices: {}", error);
            }
            return Err(Error::NotFound)
        }
        if index >= count {
            return Err(Error::NotFound)
        }
        let name = driver.device_name(index)?;
        let handle = driver.open(index)?;
        log::info!("opened device #{} ({}), handle {:?}", index, name, handle.raw());
        Ok(Device { driver, handle: Some(handle) })
    }

    /// Open device `index`, run `f`, and close the device whether or not `f` succeeded.
    ///
    /// An error returned by `f` takes precedence over an error closing the device.
    pub fn with<F, T>(driver: D, index: usize, f: F) -> Result<T>
            where F: FnOnce(&mut Device<D>) -> Result<T> {
        let mut device = Device::open(driver, index)?;
        let result = f(&mut device);
        let closed = device.close();
        let value = result?;
        closed?;
        Ok(value)
    }

    fn handle(&self) -> Handle {
        // `handle` is only taken by `close`, which consumes `self`
        self.handle.unwrap_or(Handle::NONE)
    }

    pub fn close(mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => {
                log::debug!("close({:?})", handle.raw());
                self.driver.close(handle)
            }
            None => Ok(())
        }
    }

    pub fn analog_in_channel_count(&mut self) -> Result<usize> {
        let count = self.driver.analog_in_channel_count(self.handle())?;
        log::debug!("analog_in_channel_count() = {}", count);
        Ok(count)
    }

    /// Program every analog input channel for an acquisition.
    pub fn setup_acquisition(&mut self, config: &AcquisitionConfiguration)
            -> Result<AcquisitionParameters> {
        let handle = self.handle();
        let (min_buffer_size, max_buffer_size) = self.driver.analog_in_buffer_size_info(handle)?;
        let params = AcquisitionParameters::derive(config, min_buffer_size, max_buffer_size);
        log::debug!("setup_acquisition({:?})", params);

        self.driver.analog_in_channel_enable(handle, Channels::All, true)?;
        self.driver.analog_in_channel_offset(handle, Channels::All, params.offset)?;
        self.driver.analog_in_channel_range(handle, Channels::All, params.amplitude_range)?;
        self.driver.analog_in_buffer_size(handle, params.buffer_size)?;
        self.driver.analog_in_frequency(handle, params.sampling_frequency)?;
        // decimation rather than averaging between samples
        self.driver.analog_in_channel_filter(handle, Channels::All, Filter::Decimate)?;
        Ok(params)
    }

    pub fn set_trigger(&mut self, trigger: &TriggerConfiguration) -> Result<()> {
        log::debug!("set_trigger({:?})", trigger);
        if let TriggerConfiguration::Edge(EdgeTrigger { source, .. }) = trigger {
            if !source.is_valid() {
                return Err(Error::InvalidParameter(
                    format!("trigger source {:?} is out of range", source)))
            }
        }
        let handle = self.handle();
        match trigger {
            TriggerConfiguration::Edge(trigger) if trigger.source != TriggerSource::None => {
                self.driver.analog_in_trigger_auto_timeout(handle,
                    trigger.auto_timeout.as_secs_f64())?;
                self.driver.analog_in_trigger_source(handle, trigger.source)?;
                self.driver.analog_in_trigger_channel(handle, trigger.channel)?;
                self.driver.analog_in_trigger_type(handle, TriggerType::Edge)?;
                self.driver.analog_in_trigger_level(handle, trigger.level)?;
                self.driver.analog_in_trigger_condition(handle, trigger.edge.slope())?;
            }
            _ => {
                self.driver.analog_in_trigger_source(handle, TriggerSource::None)?;
            }
        }
        Ok(())
    }

    /// Start an acquisition, wait for it to complete, and read back `channel`.
    ///
    /// The device is polled every `poll.interval`; if the acquisition has not completed after
    /// `poll.timeout`, `Error::Timeout` is returned and the acquisition is left running.
    pub fn record(&mut self, params: &AcquisitionParameters, channel: usize, poll: &PollPolicy)
            -> Result<Vec<f64>> {
        let handle = self.handle();
        log::debug!("record({}, {} samples)", channel, params.buffer_size);
        self.driver.analog_in_configure(handle, false, true)?;

        let started_at = Instant::now();
        let mut polls = 0usize;
        loop {
            let state = self.driver.analog_in_status(handle, true)?;
            polls += 1;
            if state == State::Done {
                break
            }
            if started_at.elapsed() >= poll.timeout {
                log::debug!("record: gave up after {} polls, last state {:?}", polls, state);
                return Err(Error::Timeout(poll.timeout))
            }
            sleep(poll.interval);
        }
        log::debug!("record: done after {} polls ({:?})", polls, started_at.elapsed());

        let mut samples = vec![0.0; params.buffer_size];
        self.driver.analog_in_status_data(handle, channel, &mut samples)?;
        Ok(samples)
    }

    /// Read the instantaneous voltage on `channel`, without a triggered acquisition.
    pub fn measure(&mut self, channel: usize) -> Result<f64> {
        let handle = self.handle();
        self.driver.analog_in_configure(handle, false, false)?;
        self.driver.analog_in_status(handle, false)?;
        let volts = self.driver.analog_in_status_sample(handle, channel)?;
        log::debug!("measure({}) = {}", channel, volts);
        Ok(volts)
    }

    pub fn reset_acquisition(&mut self) -> Result<()> {
        log::debug!("reset_acquisition()");
        self.driver.analog_in_reset(self.handle())
    }

    pub fn enable_output(&mut self, channel: usize) -> Result<()> {
        log::debug!("enable_output({})", channel);
        self.driver.analog_out_node_enable(self.handle(), Channels::One(channel),
            AnalogOutNode::Carrier, true)
    }

    /// Load a custom waveform into the carrier node of a generator channel.
    pub fn configure_output(&mut self, output: &WaveformOutput) -> Result<()> {
        log::debug!("configure_output({}, {} samples, {} Hz, {} V, {} V)",
            output.channel, output.samples.len(), output.frequency, output.amplitude,
            output.offset);
        let handle = self.handle();
        let channel = Channels::One(output.channel);
        let node = AnalogOutNode::Carrier;
        self.driver.analog_out_node_enable(handle, channel, node, true)?;
        self.driver.analog_out_node_function(handle, channel, node, Function::Custom)?;
        self.driver.analog_out_node_data(handle, channel, node, &output.samples)?;
        self.driver.analog_out_node_frequency(handle, channel, node, output.frequency)?;
        self.driver.analog_out_node_amplitude(handle, channel, node, output.amplitude)?;
        self.driver.analog_out_node_offset(handle, channel, node, output.offset)?;
        Ok(())
    }

    pub fn start_output(&mut self, channel: usize) -> Result<()> {
        log::debug!("start_output({})", channel);
        self.driver.analog_out_configure(self.handle(), Channels::One(channel), true)
    }

    pub fn stop_output(&mut self, channel: usize) -> Result<()> {
        log::debug!("stop_output({})", channel);
        self.driver.analog_out_configure(self.handle(), Channels::One(channel), false)
    }

    pub fn reset_output(&mut self, channel: usize) -> Result<()> {
        log::debug!("reset_output({})", channel);
        self.driver.analog_out_reset(self.handle(), Channels::One(channel))
    }
}

impl<D: Driver> Drop for Device<D> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(error) = self.driver.close(handle) {
                log::warn!("error closing device: {}", error)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;
    use crate::config::Edge;
    use crate::sys::{Call, Simulator};

    fn zero_poll() -> PollPolicy {
        PollPolicy { interval: Duration::ZERO, timeout: Duration::from_secs(1) }
    }

    #[test]
    fn test_not_found_before_configuration() {
        let sim = Simulator::without_devices();
        assert!(matches!(Device::open(sim.clone(), 0), Err(Error::NotFound)));
        assert_eq!(sim.calls(), vec![Call::Enumerate(EnumFilter::ALL), Call::CloseAll]);
    }

    #[test]
    fn test_index_out_of_range() {
        let sim = Simulator::new();
        assert!(matches!(Device::open(sim.clone(), 1), Err(Error::NotFound)));
        assert!(!sim.is_open());
    }

    #[test]
    fn test_setup_acquisition_order() {
        let sim = Simulator::new();
        let mut device = Device::open(sim.clone(), 0).unwrap();
        let params = device.setup_acquisition(&AcquisitionConfiguration {
            sampling_frequency: 1e6,
            buffer_size: 1000,
            offset: 0.5,
            amplitude_range: 2.0,
        }).unwrap();
        assert_eq!(params.buffer_size, 1000);
        assert_eq!(&sim.calls()[3..], &[
            Call::InBufferSizeInfo,
            Call::InChannelEnable(Channels::All, true),
            Call::InChannelOffset(Channels::All, 0.5),
            Call::InChannelRange(Channels::All, 2.0),
            Call::InBufferSize(1000),
            Call::InFrequency(1e6),
            Call::InChannelFilter(Channels::All, Filter::Decimate),
        ]);
    }

    #[test]
    fn test_setup_acquisition_max_buffer() {
        let sim = Simulator::new().with_max_buffer_size(16384);
        let mut device = Device::open(sim.clone(), 0).unwrap();
        let params = device.setup_acquisition(&AcquisitionConfiguration {
            buffer_size: 0,
            ..Default::default()
        }).unwrap();
        assert_eq!(params.buffer_size, 16384);
        assert!(sim.calls().contains(&Call::InBufferSize(16384)));
    }

    #[test]
    fn test_record_clamped_buffer() {
        let sim = Simulator::new().with_max_buffer_size(8192);
        let mut device = Device::open(sim.clone(), 0).unwrap();
        let params = device.setup_acquisition(&AcquisitionConfiguration {
            buffer_size: 100_000,
            ..Default::default()
        }).unwrap();
        assert_eq!(params.buffer_size, 8192);
        assert!(sim.calls().contains(&Call::InBufferSize(8192)));
        let samples = device.record(&params, 0, &zero_poll()).unwrap();
        assert_eq!(samples.len(), 8192);

        let params = device.setup_acquisition(&AcquisitionConfiguration {
            buffer_size: 1,
            ..Default::default()
        }).unwrap();
        assert_eq!(params.buffer_size, 16);
    }

    #[test]
    fn test_edge_trigger() {
        let sim = Simulator::new();
        let mut device = Device::open(sim.clone(), 0).unwrap();
        device.set_trigger(&TriggerConfiguration::Edge(EdgeTrigger {
            source: TriggerSource::DetectorAnalogIn,
            channel: 1,
            edge: Edge::Falling,
            level: 0.25,
            auto_timeout: Duration::from_millis(500),
        })).unwrap();
        assert_eq!(&sim.calls()[3..], &[
            Call::InTriggerAutoTimeout(0.5),
            Call::InTriggerSource(TriggerSource::DetectorAnalogIn),
            Call::InTriggerChannel(1),
            Call::InTriggerType(TriggerType::Edge),
            Call::InTriggerLevel(0.25),
            Call::InTriggerCondition(crate::dwf::TriggerSlope::Fall),
        ]);
    }

    #[test]
    fn test_trigger_source_out_of_range() {
        let sim = Simulator::new();
        let mut device = Device::open(sim.clone(), 0).unwrap();
        for source in [TriggerSource::External(5), TriggerSource::AnalogOut(0)] {
            let result = device.set_trigger(&TriggerConfiguration::Edge(EdgeTrigger {
                source,
                ..Default::default()
            }));
            assert!(matches!(result, Err(Error::InvalidParameter(_))));
        }
        assert_eq!(sim.calls().len(), 3);
    }

    #[test]
    fn test_trigger_disabled() {
        let sim = Simulator::new();
        let mut device = Device::open(sim.clone(), 0).unwrap();
        device.set_trigger(&TriggerConfiguration::Disabled).unwrap();
        device.set_trigger(&TriggerConfiguration::Edge(EdgeTrigger {
            source: TriggerSource::None,
            ..Default::default()
        })).unwrap();
        assert_eq!(&sim.calls()[3..], &[
            Call::InTriggerSource(TriggerSource::None),
            Call::InTriggerSource(TriggerSource::None),
        ]);
    }

    #[test]
    fn test_record_polls_until_done() {
        let sim = Simulator::new().with_acquisition_latency(5);
        let mut device = Device::open(sim.clone(), 0).unwrap();
        let params = device.setup_acquisition(&Default::default()).unwrap();
        let samples = device.record(&params, 0, &zero_poll()).unwrap();
        assert_eq!(samples.len(), 8192);
        let calls = sim.calls();
        let polls = calls.iter()
            .filter(|call| **call == Call::InStatus { read_data: true })
            .count();
        assert_eq!(polls, 6);
        assert_eq!(calls.last(), Some(&Call::InStatusData { channel: 0, count: 8192 }));
    }

    #[test]
    fn test_record_timeout() {
        let sim = Simulator::new().stalled();
        let mut device = Device::open(sim.clone(), 0).unwrap();
        let params = device.setup_acquisition(&Default::default()).unwrap();
        let poll = PollPolicy {
            interval: Duration::from_millis(1),
            timeout: Duration::from_millis(20),
        };
        assert!(matches!(device.record(&params, 0, &poll), Err(Error::Timeout(_))));
        assert!(!sim.calls().iter().any(|call| matches!(call, Call::InStatusData { .. })));
    }

    #[test]
    fn test_sdk_error_aborts() {
        let sim = Simulator::new().failing_on("FDwfAnalogInChannelRangeSet");
        let mut device = Device::open(sim.clone(), 0).unwrap();
        match device.setup_acquisition(&Default::default()) {
            Err(Error::Sdk { call, .. }) => assert_eq!(call, "FDwfAnalogInChannelRangeSet"),
            result => panic!("unexpected {:?}", result),
        }
        assert!(!sim.calls().iter().any(|call| matches!(call, Call::InBufferSize(_))));
    }

    #[test]
    fn test_measure() {
        let sim = Simulator::new().with_signal(1e3, 1.0, 1.25);
        let mut device = Device::open(sim.clone(), 0).unwrap();
        assert_eq!(device.measure(0).unwrap(), 1.25);
        assert_eq!(&sim.calls()[3..], &[
            Call::InConfigure { reconfigure: false, start: false },
            Call::InStatus { read_data: false },
            Call::InStatusSample(0),
        ]);
    }

    #[test]
    fn test_configure_output() {
        let sim = Simulator::new();
        let mut device = Device::open(sim.clone(), 0).unwrap();
        device.configure_output(&WaveformOutput {
            channel: 1,
            samples: vec![0.0, -1.0, -0.5],
            frequency: 1e6,
            amplitude: 0.3,
            offset: 0.0,
        }).unwrap();
        let channel = Channels::One(1);
        let node = AnalogOutNode::Carrier;
        assert_eq!(&sim.calls()[3..], &[
            Call::OutNodeEnable(channel, node, true),
            Call::OutNodeFunction(channel, node, Function::Custom),
            Call::OutNodeData(channel, node, vec![0.0, -1.0, -0.5]),
            Call::OutNodeFrequency(channel, node, 1e6),
            Call::OutNodeAmplitude(channel, node, 0.3),
            Call::OutNodeOffset(channel, node, 0.0),
        ]);
    }

    #[test]
    fn test_close_on_drop() {
        let sim = Simulator::new();
        {
            let _device = Device::open(sim.clone(), 0).unwrap();
            assert!(sim.is_open());
        }
        assert!(!sim.is_open());
    }

    #[test]
    fn test_with_closes_on_error() {
        let sim = Simulator::new();
        let result: Result<()> = Device::with(sim.clone(), 0, |_device| {
            Err(Error::InvalidParameter("test".to_owned()))
        });
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert!(!sim.is_open());
        assert!(matches!(sim.calls().last(), Some(Call::Close(_))));
    }

    #[test]
    fn test_with_returns_value() {
        let sim = Simulator::new();
        let count = Device::with(sim.clone(), 0, |device| device.analog_in_channel_count());
        assert_eq!(count.unwrap(), 2);
        assert!(!sim.is_open());
    }
}
