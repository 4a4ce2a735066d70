use crate::{Error, Result};
use crate::dwf::{AnalogOutNode, Channels, EnumFilter, Filter, Function, Handle, State};
use crate::dwf::{TriggerSlope, TriggerSource, TriggerType};

/// Overrides the library location on platforms with a binding.
pub const LIBRARY_PATH_VAR: &str = "DWF_LIBRARY";

#[derive(Debug)]
pub struct DwfLibrary;

impl DwfLibrary {
    pub fn load() -> Result<DwfLibrary> {
        Err(Error::Unsupported)
    }

    pub fn load_from(_path: &str) -> Result<DwfLibrary> {
        Err(Error::Unsupported)
    }
}

impl super::Driver for DwfLibrary {
    fn enumerate(&self, _filter: EnumFilter) -> Result<usize> { Err(Error::Unsupported) }
    fn device_name(&self, _index: usize) -> Result<String> { Err(Error::Unsupported) }
    fn open(&self, _index: usize) -> Result<Handle> { Err(Error::Unsupported) }
    fn close(&self, _handle: Handle) -> Result<()> { Err(Error::Unsupported) }
    fn close_all(&self) -> Result<()> { Err(Error::Unsupported) }

    fn analog_in_channel_count(&self, _: Handle) -> Result<usize> { Err(Error::Unsupported) }
    fn analog_in_buffer_size_info(&self, _: Handle) -> Result<(usize, usize)> {
        Err(Error::Unsupported)
    }
    fn analog_in_channel_enable(&self, _: Handle, _: Channels, _: bool) -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_in_channel_offset(&self, _: Handle, _: Channels, _: f64) -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_in_channel_range(&self, _: Handle, _: Channels, _: f64) -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_in_channel_filter(&self, _: Handle, _: Channels, _: Filter) -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_in_buffer_size(&self, _: Handle, _: usize) -> Result<()> { Err(Error::Unsupported) }
    fn analog_in_frequency(&self, _: Handle, _: f64) -> Result<()> { Err(Error::Unsupported) }
    fn analog_in_trigger_auto_timeout(&self, _: Handle, _: f64) -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_in_trigger_source(&self, _: Handle, _: TriggerSource) -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_in_trigger_channel(&self, _: Handle, _: usize) -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_in_trigger_type(&self, _: Handle, _: TriggerType) -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_in_trigger_level(&self, _: Handle, _: f64) -> Result<()> { Err(Error::Unsupported) }
    fn analog_in_trigger_condition(&self, _: Handle, _: TriggerSlope) -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_in_configure(&self, _: Handle, _: bool, _: bool) -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_in_status(&self, _: Handle, _: bool) -> Result<State> { Err(Error::Unsupported) }
    fn analog_in_status_data(&self, _: Handle, _: usize, _: &mut [f64]) -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_in_status_sample(&self, _: Handle, _: usize) -> Result<f64> {
        Err(Error::Unsupported)
    }
    fn analog_in_reset(&self, _: Handle) -> Result<()> { Err(Error::Unsupported) }

    fn analog_out_node_enable(&self, _: Handle, _: Channels, _: AnalogOutNode, _: bool)
            -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_out_node_function(&self, _: Handle, _: Channels, _: AnalogOutNode, _: Function)
            -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_out_node_data(&self, _: Handle, _: Channels, _: AnalogOutNode, _: &[f64])
            -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_out_node_frequency(&self, _: Handle, _: Channels, _: AnalogOutNode, _: f64)
            -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_out_node_amplitude(&self, _: Handle, _: Channels, _: AnalogOutNode, _: f64)
            -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_out_node_offset(&self, _: Handle, _: Channels, _: AnalogOutNode, _: f64)
            -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_out_configure(&self, _: Handle, _: Channels, _: bool) -> Result<()> {
        Err(Error::Unsupported)
    }
    fn analog_out_reset(&self, _: Handle, _: Channels) -> Result<()> { Err(Error::Unsupported) }
}
