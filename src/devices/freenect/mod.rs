//! Kinect camera backend over libfreenect.
//!
//! Owns the driver context and device handle for one connection cycle and
//! routes the driver's C callbacks into the frame exchange through a small
//! adapter pinned for the lifetime of the streams. Everything here is torn
//! down and rebuilt by the supervisor on every reconnect.

pub mod sys;

use crate::config::StreamConfig;
use crate::core::camera::DepthCamera;
use crate::core::types::{VideoMode, FRAME_PIXELS};
use crate::error::{Error, Result};
use crate::exchange::FrameExchange;
use std::os::raw::c_void;
use std::ptr;
use std::sync::Arc;

/// Adapter handed to the driver as its user pointer; the callbacks run on
/// the driver's thread and only touch the exchange.
struct CallbackShim {
    exchange: Arc<FrameExchange>,
    /// Expected raw video frame length in bytes; 0 when video is off
    video_len: usize,
}

/// Kinect device driven through libfreenect
pub struct FreenectCamera {
    ctx: *mut sys::FreenectContext,
    dev: *mut sys::FreenectDevice,
    /// Kept boxed so the user pointer stays stable while streams run
    shim: Option<Box<CallbackShim>>,
    video_active: bool,
    depth_active: bool,
}

// The context and device are only ever touched from the supervisor thread;
// the driver invokes our callbacks on its own thread but those go through
// the shim, not through this struct.
unsafe impl Send for FreenectCamera {}

impl FreenectCamera {
    pub fn new() -> Self {
        Self {
            ctx: ptr::null_mut(),
            dev: ptr::null_mut(),
            shim: None,
            video_active: false,
            depth_active: false,
        }
    }

    /// Stop streams, close the device and shut the context down.
    /// Stop errors are logged only; teardown always completes.
    fn teardown(&mut self) {
        let lib = match sys::lib() {
            Ok(lib) => lib,
            Err(_) => return,
        };
        unsafe {
            if !self.dev.is_null() {
                if self.video_active {
                    let rc = (lib.stop_video)(self.dev);
                    if rc < 0 {
                        log::warn!("freenect_stop_video failed with status {rc}");
                    }
                    self.video_active = false;
                }
                if self.depth_active {
                    let rc = (lib.stop_depth)(self.dev);
                    if rc < 0 {
                        log::warn!("freenect_stop_depth failed with status {rc}");
                    }
                    self.depth_active = false;
                }
                (lib.close_device)(self.dev);
                self.dev = ptr::null_mut();
            }
            if !self.ctx.is_null() {
                (lib.shutdown)(self.ctx);
                self.ctx = ptr::null_mut();
            }
        }
        // No callbacks can fire once the device is closed
        self.shim = None;
    }
}

impl Default for FreenectCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl DepthCamera for FreenectCamera {
    fn open(&mut self) -> Result<()> {
        let lib = sys::lib()?;

        let mut ctx = ptr::null_mut();
        let rc = unsafe { (lib.init)(&mut ctx, ptr::null_mut()) };
        if rc < 0 {
            return Err(Error::DeviceCall {
                call: "freenect_init",
                status: rc,
            });
        }
        self.ctx = ctx;

        let count = unsafe { (lib.num_devices)(ctx) };
        log::debug!("{count} Kinect device(s) detected");

        let mut dev = ptr::null_mut();
        let rc = unsafe { (lib.open_device)(ctx, &mut dev, 0) };
        if rc < 0 {
            self.teardown();
            return Err(Error::NoDevice);
        }
        self.dev = dev;
        Ok(())
    }

    fn start_streams(&mut self, config: &StreamConfig, exchange: Arc<FrameExchange>) -> Result<()> {
        let lib = sys::lib()?;
        if self.dev.is_null() {
            return Err(Error::Other("device not open".to_string()));
        }

        let shim = Box::new(CallbackShim {
            exchange,
            video_len: config.video.map(|mode| mode.frame_len()).unwrap_or(0),
        });
        unsafe {
            (lib.set_user)(self.dev, &*shim as *const CallbackShim as *mut c_void);
        }
        self.shim = Some(shim);

        if let Some(mode) = config.video {
            let format = match mode {
                VideoMode::Infrared => sys::VIDEO_IR_8BIT,
                VideoMode::Color => sys::VIDEO_RGB,
            };
            unsafe {
                (lib.set_video_callback)(self.dev, Some(video_callback));
                let frame_mode = (lib.find_video_mode)(sys::RESOLUTION_MEDIUM, format);
                if frame_mode.is_valid == 0 {
                    return Err(Error::UnsupportedMode("video"));
                }
                let rc = (lib.set_video_mode)(self.dev, frame_mode);
                if rc < 0 {
                    return Err(Error::DeviceCall {
                        call: "freenect_set_video_mode",
                        status: rc,
                    });
                }
                let rc = (lib.start_video)(self.dev);
                if rc < 0 {
                    return Err(Error::DeviceCall {
                        call: "freenect_start_video",
                        status: rc,
                    });
                }
            }
            self.video_active = true;
        }

        if config.depth {
            unsafe {
                (lib.set_depth_callback)(self.dev, Some(depth_callback));
                let frame_mode = (lib.find_depth_mode)(sys::RESOLUTION_MEDIUM, sys::DEPTH_11BIT);
                if frame_mode.is_valid == 0 {
                    return Err(Error::UnsupportedMode("depth"));
                }
                let rc = (lib.set_depth_mode)(self.dev, frame_mode);
                if rc < 0 {
                    return Err(Error::DeviceCall {
                        call: "freenect_set_depth_mode",
                        status: rc,
                    });
                }
                let rc = (lib.start_depth)(self.dev);
                if rc < 0 {
                    return Err(Error::DeviceCall {
                        call: "freenect_start_depth",
                        status: rc,
                    });
                }
            }
            self.depth_active = true;
        }

        Ok(())
    }

    fn process_events(&mut self) -> Result<()> {
        let lib = sys::lib()?;
        let rc = unsafe { (lib.process_events)(self.ctx) };
        if rc < 0 {
            Err(Error::Disconnected(rc))
        } else {
            Ok(())
        }
    }

    fn shutdown(&mut self) {
        self.teardown();
    }
}

impl Drop for FreenectCamera {
    fn drop(&mut self) {
        self.teardown();
    }
}

unsafe extern "C" fn video_callback(dev: *mut sys::FreenectDevice, data: *mut c_void, _timestamp: u32) {
    let lib = match sys::lib() {
        Ok(lib) => lib,
        Err(_) => return,
    };
    let shim = (lib.get_user)(dev) as *const CallbackShim;
    if shim.is_null() || data.is_null() {
        return;
    }
    let shim = &*shim;
    if shim.video_len == 0 {
        return;
    }
    let frame = std::slice::from_raw_parts(data as *const u8, shim.video_len);
    shim.exchange.put_video(frame);
}

unsafe extern "C" fn depth_callback(dev: *mut sys::FreenectDevice, data: *mut c_void, _timestamp: u32) {
    let lib = match sys::lib() {
        Ok(lib) => lib,
        Err(_) => return,
    };
    let shim = (lib.get_user)(dev) as *const CallbackShim;
    if shim.is_null() || data.is_null() {
        return;
    }
    let shim = &*shim;
    let frame = std::slice::from_raw_parts(data as *const u16, FRAME_PIXELS);
    shim.exchange.put_depth(frame);
}
