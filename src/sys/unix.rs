use std::ffi::{CStr, CString};
use libc::{c_char, c_double, c_int, c_uchar, c_void};

use crate::{Error, Result};
use crate::dwf::{AnalogOutNode, Channels, EnumFilter, Filter, Function, Handle, State};
use crate::dwf::{TriggerSlope, TriggerSource, TriggerType};

#[cfg(target_os = "macos")]
const DEFAULT_LIBRARY_PATH: &str = "/Library/Frameworks/dwf.framework/dwf";
#[cfg(not(target_os = "macos"))]
const DEFAULT_LIBRARY_PATH: &str = "libdwf.so";

/// Overrides `DEFAULT_LIBRARY_PATH`.
pub const LIBRARY_PATH_VAR: &str = "DWF_LIBRARY";

fn last_dl_error() -> String {
    unsafe {
        let message = libc::dlerror();
        if message.is_null() {
            "unknown dynamic loader error".to_owned()
        } else {
            CStr::from_ptr(message).to_string_lossy().into_owned()
        }
    }
}

macro_rules! dwf_api {
    { $( fn $name:ident ( $( $arg:ty ),* ); )* } => {
        #[allow(non_snake_case)]
        struct Api {
            $( $name: unsafe extern "C" fn( $( $arg ),* ) -> c_int, )*
        }

        impl Api {
            // SAFETY: `library` must be a live handle returned by `dlopen`, and every symbol
            // must have the signature declared in `dwf.h`.
            unsafe fn resolve(library: *mut c_void) -> Result<Api> {
                Ok(Api { $( $name: {
                    let name = concat!(stringify!($name), "\0");
                    let symbol = libc::dlsym(library, name.as_ptr() as *const c_char);
                    if symbol.is_null() {
                        return Err(Error::Library(last_dl_error()))
                    }
                    std::mem::transmute::<*mut c_void, unsafe extern "C" fn( $( $arg ),* ) -> c_int>(symbol)
                }, )* })
            }
        }
    }
}

dwf_api! {
    fn FDwfGetLastError(*mut c_int);
    fn FDwfGetLastErrorMsg(*mut c_char);

    fn FDwfEnum(c_int, *mut c_int);
    fn FDwfEnumDeviceName(c_int, *mut c_char);
    fn FDwfDeviceOpen(c_int, *mut c_int);
    fn FDwfDeviceClose(c_int);
    fn FDwfDeviceCloseAll();

    fn FDwfAnalogInChannelCount(c_int, *mut c_int);
    fn FDwfAnalogInBufferSizeInfo(c_int, *mut c_int, *mut c_int);
    fn FDwfAnalogInChannelEnableSet(c_int, c_int, c_int);
    fn FDwfAnalogInChannelOffsetSet(c_int, c_int, c_double);
    fn FDwfAnalogInChannelRangeSet(c_int, c_int, c_double);
    fn FDwfAnalogInChannelFilterSet(c_int, c_int, c_int);
    fn FDwfAnalogInBufferSizeSet(c_int, c_int);
    fn FDwfAnalogInFrequencySet(c_int, c_double);
    fn FDwfAnalogInTriggerAutoTimeoutSet(c_int, c_double);
    fn FDwfAnalogInTriggerSourceSet(c_int, c_uchar);
    fn FDwfAnalogInTriggerChannelSet(c_int, c_int);
    fn FDwfAnalogInTriggerTypeSet(c_int, c_int);
    fn FDwfAnalogInTriggerLevelSet(c_int, c_double);
    fn FDwfAnalogInTriggerConditionSet(c_int, c_int);
    fn FDwfAnalogInConfigure(c_int, c_int, c_int);
    fn FDwfAnalogInStatus(c_int, c_int, *mut c_uchar);
    fn FDwfAnalogInStatusData(c_int, c_int, *mut c_double, c_int);
    fn FDwfAnalogInStatusSample(c_int, c_int, *mut c_double);
    fn FDwfAnalogInReset(c_int);

    fn FDwfAnalogOutNodeEnableSet(c_int, c_int, c_int, c_int);
    fn FDwfAnalogOutNodeFunctionSet(c_int, c_int, c_int, c_uchar);
    fn FDwfAnalogOutNodeDataSet(c_int, c_int, c_int, *mut c_double, c_int);
    fn FDwfAnalogOutNodeFrequencySet(c_int, c_int, c_int, c_double);
    fn FDwfAnalogOutNodeAmplitudeSet(c_int, c_int, c_int, c_double);
    fn FDwfAnalogOutNodeOffsetSet(c_int, c_int, c_int, c_double);
    fn FDwfAnalogOutConfigure(c_int, c_int, c_int);
    fn FDwfAnalogOutReset(c_int, c_int);
}

/// The WaveForms SDK shared library, loaded at run time.
pub struct DwfLibrary {
    library: *mut c_void,
    api: Api,
}

impl std::fmt::Debug for DwfLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("DwfLibrary").field("library", &self.library).finish_non_exhaustive()
    }
}

impl DwfLibrary {
    /// Load the library from `$DWF_LIBRARY`, or from the platform default location.
    pub fn load() -> Result<DwfLibrary> {
        let path = std::env::var(LIBRARY_PATH_VAR)
            .unwrap_or_else(|_| DEFAULT_LIBRARY_PATH.to_owned());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<DwfLibrary> {
        let c_path = CString::new(path)
            .map_err(|_| Error::Library(format!("invalid library path {:?}", path)))?;
        unsafe {
            let library = libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL);
            if library.is_null() {
                return Err(Error::Library(last_dl_error()))
            }
            match Api::resolve(library) {
                Ok(api) => {
                    log::debug!("loaded WaveForms SDK from {:?}", path);
                    Ok(DwfLibrary { library, api })
                }
                Err(error) => {
                    libc::dlclose(library);
                    Err(error)
                }
            }
        }
    }

    fn check(&self, call: &'static str, result: c_int) -> Result<()> {
        log::trace!("{}() = {}", call, result);
        if result != 0 {
            return Ok(())
        }
        let mut code: c_int = 0;
        let mut message = [0 as c_char; 512];
        unsafe {
            (self.api.FDwfGetLastError)(&mut code);
            (self.api.FDwfGetLastErrorMsg)(message.as_mut_ptr());
        }
        let message = unsafe { CStr::from_ptr(message.as_ptr()) }.to_string_lossy().into_owned();
        Err(Error::Sdk { call, code, message })
    }
}

impl Drop for DwfLibrary {
    fn drop(&mut self) {
        unsafe {
            if libc::dlclose(self.library) != 0 {
                log::warn!("error unloading WaveForms SDK: {}", last_dl_error())
            }
        }
    }
}

fn c_bool(value: bool) -> c_int {
    value as c_int
}

fn c_count(count: usize) -> Result<c_int> {
    c_int::try_from(count)
        .map_err(|_| Error::InvalidParameter(format!("count {} does not fit the SDK", count)))
}

macro_rules! call {
    ($self:ident . $name:ident ( $( $arg:expr ),* )) => {
        $self.check(stringify!($name), unsafe { ($self.api.$name)( $( $arg ),* ) })
    };
}

impl super::Driver for DwfLibrary {
    fn enumerate(&self, filter: EnumFilter) -> Result<usize> {
        let mut count: c_int = 0;
        call!(self.FDwfEnum(filter.bits() as c_int, &mut count))?;
        Ok(count.max(0) as usize)
    }

    fn device_name(&self, index: usize) -> Result<String> {
        let mut name = [0 as c_char; 32];
        call!(self.FDwfEnumDeviceName(c_count(index)?, name.as_mut_ptr()))?;
        name[name.len() - 1] = 0;
        Ok(unsafe { CStr::from_ptr(name.as_ptr()) }.to_string_lossy().into_owned())
    }

    fn open(&self, index: usize) -> Result<Handle> {
        let mut handle: c_int = 0;
        call!(self.FDwfDeviceOpen(c_count(index)?, &mut handle))?;
        Ok(Handle(handle))
    }

    fn close(&self, handle: Handle) -> Result<()> {
        call!(self.FDwfDeviceClose(handle.0))
    }

    fn close_all(&self) -> Result<()> {
        call!(self.FDwfDeviceCloseAll())
    }

    fn analog_in_channel_count(&self, handle: Handle) -> Result<usize> {
        let mut count: c_int = 0;
        call!(self.FDwfAnalogInChannelCount(handle.0, &mut count))?;
        Ok(count.max(0) as usize)
    }

    fn analog_in_buffer_size_info(&self, handle: Handle) -> Result<(usize, usize)> {
        let (mut min, mut max): (c_int, c_int) = (0, 0);
        call!(self.FDwfAnalogInBufferSizeInfo(handle.0, &mut min, &mut max))?;
        Ok((min.max(0) as usize, max.max(0) as usize))
    }

    fn analog_in_channel_enable(&self, handle: Handle, channels: Channels, enable: bool)
            -> Result<()> {
        call!(self.FDwfAnalogInChannelEnableSet(handle.0, channels.code(), c_bool(enable)))
    }

    fn analog_in_channel_offset(&self, handle: Handle, channels: Channels, volts: f64)
            -> Result<()> {
        call!(self.FDwfAnalogInChannelOffsetSet(handle.0, channels.code(), volts))
    }

    fn analog_in_channel_range(&self, handle: Handle, channels: Channels, volts: f64)
            -> Result<()> {
        call!(self.FDwfAnalogInChannelRangeSet(handle.0, channels.code(), volts))
    }

    fn analog_in_channel_filter(&self, handle: Handle, channels: Channels, filter: Filter)
            -> Result<()> {
        call!(self.FDwfAnalogInChannelFilterSet(handle.0, channels.code(), filter.code()))
    }

    fn analog_in_buffer_size(&self, handle: Handle, size: usize) -> Result<()> {
        call!(self.FDwfAnalogInBufferSizeSet(handle.0, c_count(size)?))
    }

    fn analog_in_frequency(&self, handle: Handle, hertz: f64) -> Result<()> {
        call!(self.FDwfAnalogInFrequencySet(handle.0, hertz))
    }

    fn analog_in_trigger_auto_timeout(&self, handle: Handle, seconds: f64) -> Result<()> {
        call!(self.FDwfAnalogInTriggerAutoTimeoutSet(handle.0, seconds))
    }

    fn analog_in_trigger_source(&self, handle: Handle, source: TriggerSource) -> Result<()> {
        call!(self.FDwfAnalogInTriggerSourceSet(handle.0, source.code()))
    }

    fn analog_in_trigger_channel(&self, handle: Handle, channel: usize) -> Result<()> {
        call!(self.FDwfAnalogInTriggerChannelSet(handle.0, c_count(channel)?))
    }

    fn analog_in_trigger_type(&self, handle: Handle, trigger_type: TriggerType) -> Result<()> {
        call!(self.FDwfAnalogInTriggerTypeSet(handle.0, trigger_type.code()))
    }

    fn analog_in_trigger_level(&self, handle: Handle, volts: f64) -> Result<()> {
        call!(self.FDwfAnalogInTriggerLevelSet(handle.0, volts))
    }

    fn analog_in_trigger_condition(&self, handle: Handle, slope: TriggerSlope) -> Result<()> {
        call!(self.FDwfAnalogInTriggerConditionSet(handle.0, slope.code()))
    }

    fn analog_in_configure(&self, handle: Handle, reconfigure: bool, start: bool) -> Result<()> {
        call!(self.FDwfAnalogInConfigure(handle.0, c_bool(reconfigure), c_bool(start)))
    }

    fn analog_in_status(&self, handle: Handle, read_data: bool) -> Result<State> {
        let mut state: c_uchar = 0;
        call!(self.FDwfAnalogInStatus(handle.0, c_bool(read_data), &mut state))?;
        Ok(State::from_code(state))
    }

    fn analog_in_status_data(&self, handle: Handle, channel: usize, data: &mut [f64])
            -> Result<()> {
        call!(self.FDwfAnalogInStatusData(handle.0, c_count(channel)?,
            data.as_mut_ptr(), c_count(data.len())?))
    }

    fn analog_in_status_sample(&self, handle: Handle, channel: usize) -> Result<f64> {
        let mut volts: c_double = 0.0;
        call!(self.FDwfAnalogInStatusSample(handle.0, c_count(channel)?, &mut volts))?;
        Ok(volts)
    }

    fn analog_in_reset(&self, handle: Handle) -> Result<()> {
        call!(self.FDwfAnalogInReset(handle.0))
    }

    fn analog_out_node_enable(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
            enable: bool) -> Result<()> {
        call!(self.FDwfAnalogOutNodeEnableSet(handle.0, channels.code(), node.code(),
            c_bool(enable)))
    }

    fn analog_out_node_function(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
            function: Function) -> Result<()> {
        call!(self.FDwfAnalogOutNodeFunctionSet(handle.0, channels.code(), node.code(),
            function.code()))
    }

    fn analog_out_node_data(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
            data: &[f64]) -> Result<()> {
        // the SDK takes a mutable pointer but only reads through it
        call!(self.FDwfAnalogOutNodeDataSet(handle.0, channels.code(), node.code(),
            data.as_ptr() as *mut c_double, c_count(data.len())?))
    }

    fn analog_out_node_frequency(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
            hertz: f64) -> Result<()> {
        call!(self.FDwfAnalogOutNodeFrequencySet(handle.0, channels.code(), node.code(), hertz))
    }

    fn analog_out_node_amplitude(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
            volts: f64) -> Result<()> {
        call!(self.FDwfAnalogOutNodeAmplitudeSet(handle.0, channels.code(), node.code(), volts))
    }

    fn analog_out_node_offset(&self, handle: Handle, channels: Channels, node: AnalogOutNode,
            volts: f64) -> Result<()> {
        call!(self.FDwfAnalogOutNodeOffsetSet(handle.0, channels.code(), node.code(), volts))
    }

    fn analog_out_configure(&self, handle: Handle, channels: Channels, start: bool)
            -> Result<()> {
        call!(self.FDwfAnalogOutConfigure(handle.0, channels.code(), c_bool(start)))
    }

    fn analog_out_reset(&self, handle: Handle, channels: Channels) -> Result<()> {
        call!(self.FDwfAnalogOutReset(handle.0, channels.code()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_missing_library() {
        match DwfLibrary::load_from("/nonexistent/libdwf.so") {
            Err(Error::Library(reason)) => assert!(reason.contains("/nonexistent/libdwf.so")),
            result => panic!("unexpected {:?}", result),
        }
    }

    #[test]
    fn test_invalid_library_path() {
        assert!(matches!(DwfLibrary::load_from("a\0b"), Err(Error::Library(_))));
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_missing_symbol() {
        match DwfLibrary::load_from("libc.so.6") {
            Err(Error::Library(reason)) => assert!(reason.contains("FDwfGetLastError")),
            result => panic!("unexpected {:?}", result),
        }
    }

    #[test]
    fn test_library_path_override() {
        let path = "/nonexistent/override/libdwf.so";
        std::env::set_var(LIBRARY_PATH_VAR, path);
        let result = DwfLibrary::load();
        std::env::remove_var(LIBRARY_PATH_VAR);
        match result {
            Err(Error::Library(reason)) => assert!(reason.contains(path)),
            result => panic!("unexpected {:?}", result),
        }
    }
}
