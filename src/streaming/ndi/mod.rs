//! Safe wrappers over the NDI send API.
//!
//! [`NdiRuntime`] owns process-wide library init/teardown; [`NdiSender`] owns
//! one named send instance. Sender creation never fails the process: a failed
//! creation yields a null instance whose sends are guarded no-ops.

pub mod sys;

use crate::core::types::{BgraImage, FRAME_RATE_D, FRAME_RATE_N};
use crate::error::{Error, Result};
use crate::streaming::sink::VideoSink;
use std::ffi::CString;
use std::os::raw::c_int;
use std::ptr;
use std::sync::Arc;

/// Process-wide NDI runtime guard.
///
/// Initialized once at startup; failure here is fatal. `Drop` shuts the
/// library down, so the runtime must outlive every sender created from it.
pub struct NdiRuntime {
    lib: Arc<sys::NdiLib>,
}

impl NdiRuntime {
    /// Load the runtime library and initialize it
    pub fn init() -> Result<Self> {
        let lib = Arc::new(sys::NdiLib::load().map_err(Error::Library)?);
        if !unsafe { (lib.initialize)() } {
            return Err(Error::NdiInit);
        }
        log::debug!("NDI runtime initialized");
        Ok(Self { lib })
    }

    /// Create a named sender.
    ///
    /// Creation failure is logged and tolerated: the returned sender carries
    /// a null instance and silently drops every frame handed to it.
    pub fn create_sender(&self, name: &str) -> NdiSender {
        let c_name = CString::new(name).unwrap_or_default();
        let desc = sys::SendCreate {
            p_ndi_name: c_name.as_ptr(),
            p_groups: ptr::null(),
            clock_video: false,
            clock_audio: false,
        };
        let instance = unsafe { (self.lib.send_create)(&desc) };
        if instance.is_null() {
            log::error!("failed to create NDI sender \"{name}\"; its frames will be dropped");
        } else {
            log::info!("NDI sender created: \"{name}\"");
        }
        NdiSender {
            lib: Arc::clone(&self.lib),
            instance,
            buffers: [Vec::new(), Vec::new()],
            back: 0,
        }
    }
}

impl Drop for NdiRuntime {
    fn drop(&mut self) {
        unsafe { (self.lib.destroy)() };
    }
}

/// One named NDI send instance.
///
/// Frames go out through the asynchronous send call, which requires the
/// submitted buffer to stay untouched until the next send; the sender keeps
/// two buffers and alternates between them.
pub struct NdiSender {
    lib: Arc<sys::NdiLib>,
    instance: sys::SendInstance,
    buffers: [Vec<u8>; 2],
    back: usize,
}

// The instance pointer is only used by the owning thread; NDI send instances
// themselves are not thread-affine.
unsafe impl Send for NdiSender {}

impl VideoSink for NdiSender {
    fn send(&mut self, image: &BgraImage) -> Result<()> {
        if self.instance.is_null() {
            return Ok(());
        }

        // Fill the back buffer; the front buffer may still be in flight from
        // the previous async send and is only reclaimed by this call.
        let buffer = &mut self.buffers[self.back];
        buffer.clear();
        buffer.extend_from_slice(&image.data);

        let frame = sys::VideoFrame {
            xres: image.width as c_int,
            yres: image.height as c_int,
            fourcc: sys::FOURCC_BGRX,
            frame_rate_n: FRAME_RATE_N,
            frame_rate_d: FRAME_RATE_D,
            picture_aspect_ratio: image.aspect_ratio(),
            frame_format_type: sys::FRAME_FORMAT_PROGRESSIVE,
            timecode: sys::SEND_TIMECODE_SYNTHESIZE,
            p_data: buffer.as_ptr(),
            line_stride_in_bytes: image.stride() as c_int,
            p_metadata: ptr::null(),
            timestamp: 0,
        };
        unsafe { (self.lib.send_video_async)(self.instance, &frame) };
        self.back = 1 - self.back;
        Ok(())
    }
}

impl Drop for NdiSender {
    fn drop(&mut self) {
        if self.instance.is_null() {
            return;
        }
        unsafe {
            // A null frame flushes the buffer still in flight
            (self.lib.send_video_async)(self.instance, ptr::null());
            (self.lib.send_destroy)(self.instance);
        }
    }
}
