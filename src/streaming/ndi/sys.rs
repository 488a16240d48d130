//! Minimal NDI send-side FFI surface, resolved at runtime.
//!
//! The NDI SDK is distributed as a runtime shared library, never through the
//! package registry, so the handful of send-side entry points are resolved
//! with `libloading` when the process starts. Only the send path is bound;
//! this process has no inbound NDI interface.

use libloading::Library;
use std::env;
use std::os::raw::{c_char, c_int};
use std::path::PathBuf;

/// `NDIlib_FourCC_type_BGRX`: 4:4:4:4 blue-green-red with an ignored fourth
/// channel
pub const FOURCC_BGRX: c_int =
    ('B' as c_int) | (('G' as c_int) << 8) | (('R' as c_int) << 16) | (('X' as c_int) << 24);

/// `NDIlib_frame_format_type_progressive`
pub const FRAME_FORMAT_PROGRESSIVE: c_int = 1;

/// `NDIlib_send_timecode_synthesize`: let the SDK stamp timecodes
pub const SEND_TIMECODE_SYNTHESIZE: i64 = i64::MAX;

/// Opaque `NDIlib_send_instance_t`
pub type SendInstance = *mut std::os::raw::c_void;

/// `NDIlib_send_create_t`
#[repr(C)]
pub struct SendCreate {
    pub p_ndi_name: *const c_char,
    pub p_groups: *const c_char,
    pub clock_video: bool,
    pub clock_audio: bool,
}

/// `NDIlib_video_frame_v2_t`
#[repr(C)]
pub struct VideoFrame {
    pub xres: c_int,
    pub yres: c_int,
    pub fourcc: c_int,
    pub frame_rate_n: c_int,
    pub frame_rate_d: c_int,
    pub picture_aspect_ratio: f32,
    pub frame_format_type: c_int,
    pub timecode: i64,
    pub p_data: *const u8,
    pub line_stride_in_bytes: c_int,
    pub p_metadata: *const c_char,
    pub timestamp: i64,
}

type InitializeFn = unsafe extern "C" fn() -> bool;
type DestroyFn = unsafe extern "C" fn();
type SendCreateFn = unsafe extern "C" fn(*const SendCreate) -> SendInstance;
type SendDestroyFn = unsafe extern "C" fn(SendInstance);
type SendVideoFn = unsafe extern "C" fn(SendInstance, *const VideoFrame);

/// Resolved NDI entry points; the library handle lives as long as the struct
pub struct NdiLib {
    _lib: Library,
    pub initialize: InitializeFn,
    pub destroy: DestroyFn,
    pub send_create: SendCreateFn,
    pub send_destroy: SendDestroyFn,
    pub send_video_async: SendVideoFn,
}

#[cfg(target_os = "linux")]
const LIBRARY_NAMES: &[&str] = &["libndi.so.6", "libndi.so.5", "libndi.so"];
#[cfg(target_os = "macos")]
const LIBRARY_NAMES: &[&str] = &["libndi.dylib"];
#[cfg(target_os = "windows")]
const LIBRARY_NAMES: &[&str] = &["Processing.NDI.Lib.x64.dll"];

/// The SDK's runtime-directory environment variables, newest first
const RUNTIME_DIR_VARS: &[&str] = &["NDI_RUNTIME_DIR_V6", "NDI_RUNTIME_DIR_V5"];

fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for var in RUNTIME_DIR_VARS {
        if let Ok(dir) = env::var(var) {
            for name in LIBRARY_NAMES {
                candidates.push(PathBuf::from(&dir).join(name));
            }
        }
    }
    for name in LIBRARY_NAMES {
        candidates.push(PathBuf::from(name));
    }
    candidates
}

unsafe fn symbol<T: Copy>(lib: &Library, name: &'static str) -> Result<T, String> {
    match lib.get::<T>(name.as_bytes()) {
        Ok(sym) => Ok(*sym),
        Err(e) => Err(format!("missing symbol {name}: {e}")),
    }
}

impl NdiLib {
    /// Load the NDI runtime from the SDK's env-var directories or the
    /// default library search path
    pub fn load() -> Result<Self, String> {
        let lib = candidate_paths()
            .into_iter()
            .find_map(|path| unsafe { Library::new(&path) }.ok())
            .ok_or_else(|| {
                format!("could not load the NDI runtime (tried {LIBRARY_NAMES:?})")
            })?;

        unsafe {
            Ok(Self {
                initialize: symbol(&lib, "NDIlib_initialize")?,
                destroy: symbol(&lib, "NDIlib_destroy")?,
                send_create: symbol(&lib, "NDIlib_send_create")?,
                send_destroy: symbol(&lib, "NDIlib_send_destroy")?,
                send_video_async: symbol(&lib, "NDIlib_send_send_video_async_v2")?,
                _lib: lib,
            })
        }
    }
}
