//! Minimal libfreenect FFI surface, resolved at runtime.
//!
//! The driver SDK is consumed as an opaque call contract: context and device
//! lifecycle, mode lookup/selection, callback registration, stream start/stop
//! and the bounded event pump. libfreenect ships as a system shared library,
//! so the symbols are resolved once per process with `libloading` instead of
//! link-time binding; a missing library surfaces as a recoverable connection
//! error, not a startup crash.

use crate::error::{Error, Result};
use libloading::Library;
use std::os::raw::{c_int, c_void};
use std::sync::OnceLock;

/// Opaque `freenect_context`
pub type FreenectContext = c_void;
/// Opaque `freenect_device`
pub type FreenectDevice = c_void;

/// `FREENECT_RESOLUTION_MEDIUM` (640x480)
pub const RESOLUTION_MEDIUM: c_int = 1;
/// `FREENECT_VIDEO_RGB`
pub const VIDEO_RGB: c_int = 0;
/// `FREENECT_VIDEO_IR_8BIT`
pub const VIDEO_IR_8BIT: c_int = 2;
/// `FREENECT_DEPTH_11BIT`
pub const DEPTH_11BIT: c_int = 0;

/// `freenect_frame_mode`, returned by value from the mode lookups
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FrameMode {
    pub reserved: u32,
    pub resolution: c_int,
    /// Union of the video/depth format enums
    pub format: c_int,
    pub bytes: i32,
    pub width: i16,
    pub height: i16,
    pub data_bits_per_pixel: i8,
    pub padding_bits_per_pixel: i8,
    pub framerate: i8,
    pub is_valid: i8,
}

/// `freenect_video_cb` / `freenect_depth_cb`
pub type FrameCallback = unsafe extern "C" fn(*mut FreenectDevice, *mut c_void, u32);

type InitFn = unsafe extern "C" fn(*mut *mut FreenectContext, *mut c_void) -> c_int;
type ShutdownFn = unsafe extern "C" fn(*mut FreenectContext) -> c_int;
type NumDevicesFn = unsafe extern "C" fn(*mut FreenectContext) -> c_int;
type OpenDeviceFn = unsafe extern "C" fn(*mut FreenectContext, *mut *mut FreenectDevice, c_int) -> c_int;
type CloseDeviceFn = unsafe extern "C" fn(*mut FreenectDevice) -> c_int;
type SetUserFn = unsafe extern "C" fn(*mut FreenectDevice, *mut c_void);
type GetUserFn = unsafe extern "C" fn(*mut FreenectDevice) -> *mut c_void;
type SetCallbackFn = unsafe extern "C" fn(*mut FreenectDevice, Option<FrameCallback>);
type FindModeFn = unsafe extern "C" fn(c_int, c_int) -> FrameMode;
type SetModeFn = unsafe extern "C" fn(*mut FreenectDevice, FrameMode) -> c_int;
type StreamFn = unsafe extern "C" fn(*mut FreenectDevice) -> c_int;
type ProcessEventsFn = unsafe extern "C" fn(*mut FreenectContext) -> c_int;

/// Resolved libfreenect entry points.
///
/// The library handle is kept alive for the process lifetime; the function
/// pointers are plain copies and stay valid as long as `_lib` does.
pub struct FreenectLib {
    _lib: Library,
    pub init: InitFn,
    pub shutdown: ShutdownFn,
    pub num_devices: NumDevicesFn,
    pub open_device: OpenDeviceFn,
    pub close_device: CloseDeviceFn,
    pub set_user: SetUserFn,
    pub get_user: GetUserFn,
    pub set_video_callback: SetCallbackFn,
    pub set_depth_callback: SetCallbackFn,
    pub find_video_mode: FindModeFn,
    pub find_depth_mode: FindModeFn,
    pub set_video_mode: SetModeFn,
    pub set_depth_mode: SetModeFn,
    pub start_video: StreamFn,
    pub stop_video: StreamFn,
    pub start_depth: StreamFn,
    pub stop_depth: StreamFn,
    pub process_events: ProcessEventsFn,
}

#[cfg(target_os = "linux")]
const LIBRARY_NAMES: &[&str] = &["libfreenect.so.0", "libfreenect.so"];
#[cfg(target_os = "macos")]
const LIBRARY_NAMES: &[&str] = &["libfreenect.dylib", "libfreenect.0.dylib"];
#[cfg(target_os = "windows")]
const LIBRARY_NAMES: &[&str] = &["freenect.dll"];

unsafe fn symbol<T: Copy>(lib: &Library, name: &'static str) -> std::result::Result<T, String> {
    match lib.get::<T>(name.as_bytes()) {
        Ok(sym) => Ok(*sym),
        Err(e) => Err(format!("missing symbol {name}: {e}")),
    }
}

impl FreenectLib {
    fn load() -> std::result::Result<Self, String> {
        let lib = LIBRARY_NAMES
            .iter()
            .find_map(|name| unsafe { Library::new(name) }.ok())
            .ok_or_else(|| format!("could not load libfreenect (tried {LIBRARY_NAMES:?})"))?;

        unsafe {
            Ok(Self {
                init: symbol(&lib, "freenect_init")?,
                shutdown: symbol(&lib, "freenect_shutdown")?,
                num_devices: symbol(&lib, "freenect_num_devices")?,
                open_device: symbol(&lib, "freenect_open_device")?,
                close_device: symbol(&lib, "freenect_close_device")?,
                set_user: symbol(&lib, "freenect_set_user")?,
                get_user: symbol(&lib, "freenect_get_user")?,
                set_video_callback: symbol(&lib, "freenect_set_video_callback")?,
                set_depth_callback: symbol(&lib, "freenect_set_depth_callback")?,
                find_video_mode: symbol(&lib, "freenect_find_video_mode")?,
                find_depth_mode: symbol(&lib, "freenect_find_depth_mode")?,
                set_video_mode: symbol(&lib, "freenect_set_video_mode")?,
                set_depth_mode: symbol(&lib, "freenect_set_depth_mode")?,
                start_video: symbol(&lib, "freenect_start_video")?,
                stop_video: symbol(&lib, "freenect_stop_video")?,
                start_depth: symbol(&lib, "freenect_start_depth")?,
                stop_depth: symbol(&lib, "freenect_stop_depth")?,
                process_events: symbol(&lib, "freenect_process_events")?,
                _lib: lib,
            })
        }
    }
}

static LIB: OnceLock<std::result::Result<FreenectLib, String>> = OnceLock::new();

/// The process-wide libfreenect handle, loaded on first use.
///
/// A load failure is cached: every later connection attempt reports the same
/// error through the reconnect cycle.
pub fn lib() -> Result<&'static FreenectLib> {
    match LIB.get_or_init(FreenectLib::load) {
        Ok(lib) => Ok(lib),
        Err(e) => Err(Error::Library(e.clone())),
    }
}
