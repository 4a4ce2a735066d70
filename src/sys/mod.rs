use crate::Result;
use crate::dwf::{AnalogOutNode, Channels, EnumFilter, Filter, Function, Handle, State};
use crate::dwf::{TriggerSlope, TriggerSource, TriggerType};

/// Entry points of the WaveForms SDK used by this crate, one method per native call.
///
/// A native call that reports failure is returned as `Error::Sdk`, carrying the last error
/// reported by the SDK.
pub trait Driver {
    fn enumerate(&self, filter: EnumFilter) -> Result<usize>;
    fn device_name(&self, index: usize) -> Result<String>;
    fn open(&self, index: usize) -> Result<Handle>;
    fn close(&self, handle: Handle) -> Result<()>;
    fn close_all(&self) -> Result<()>;

    fn analog_in_channel_count(&self, handle: Handle) -> Result<usize>;
    fn analog_in_buffer_size_info(&self, handle: Handle) -> Result<(usize, usize)>;
    fn analog_in_channel_enable(&self, handle: Handle, channels: Channels, enable: bool)
        -> Result<()>;
    fn analog_in_channel_offset(&self, handle: Handle, channels: Channels, volts: f64)
        -> Result<()>;
    fn analog_in_channel_range(&self, handle: Handle, channels: Channels, volts: f64)
        -> Result<()>;
    fn analog_in_channel_filter(&self, handle: Handle, channels: Channels, filter: Filter)
        -> Result<()>;
    fn analog_in_buffer_size(&self, handle: Handle, size: usize) -> Result<()>;
    fn analog_in_frequency(&self, handle: Handle, hertz: f64) -> Result<()>;
    fn analog_in_trigger_auto_timeout(&self, handle: Handle, seconds: f64) -> Result<()>;
    fn analog_in_trigger_source(&self, handle: Handle, source: TriggerSource) -> Result<()>;
    fn analog_in_trigger_channel(&self, handle: Handle, channel: usize) -> Result<()>;
    fn analog_in_trigger_type(&self, handle: Handle, trigger_type: TriggerType) -> Result<()>;
    fn analog_in_trigger_level(&self, handle: Handle, volts: f64) -> Result<()>;
    fn analog_in_trigger_condition(&self, handle: Handle, slope: TriggerSlope) -> Result<()>;
    fn analog_in_configure(&self, handle: Handle, reconfigure: bool, start: bool) -> Result<()>;
    fn analog_in_status(&self, handle: Handle, read_data: bool) -> Result<State>;
    fn analog_in_status_data(&self, handle: Handle, channel: usize, data: &mut [f64])
        -> Result<()>;
    fn analog_in_status_sample(&self, handle: Handle, channel: usize) -> Result<f64>;
    fn analog_in_reset(&self, handle: Handle) -> Result<()>;

    fn analog_out_node_enable(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
        enable: bool) -> Result<()>;
    fn analog_out_node_function(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
        function: Function) -> Result<()>;
    fn analog_out_node_data(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
        data: &[f64]) -> Result<()>;
    fn analog_out_node_frequency(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
        hertz: f64) -> Result<()>;
    fn analog_out_node_amplitude(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
        volts: f64) -> Result<()>;
    fn analog_out_node_offset(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
        volts: f64) -> Result<()>;
    fn analog_out_configure(&self, handle: Handle, channels: Channels, start: bool) -> Result<()>;
    fn analog_out_reset(&self, handle: Handle, channels: Channels) -> Result<()>;
}

#[cfg(unix)]
#[path = "unix.rs"]
pub mod imp;

#[cfg(not(unix))]
#[path = "stub.rs"]
pub mod imp;

mod sim;

pub use imp::DwfLibrary;
pub use sim::{Call, Simulator};
