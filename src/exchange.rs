//! Single-slot frame handoff between the driver callbacks and the publish loop.
//!
//! The device driver invokes the acquisition callbacks on its own thread
//! whenever a frame is ready; the publish loop polls from the main thread.
//! Each frame kind gets exactly one slot behind its own lock together with a
//! freshness flag, so video and depth never block each other and the newest
//! frame always wins over a not-yet-consumed older one. Frame loss under
//! contention is expected; there is no queue.
//!
//! Locks are held only for the duration of a buffer copy, never across sink
//! I/O, so the callback thread is never blocked by slow network sends.

use parking_lot::Mutex;

/// One latest-frame slot with a freshness flag
struct FrameSlot<T> {
    data: Vec<T>,
    fresh: bool,
}

impl<T: Copy> FrameSlot<T> {
    fn new() -> Self {
        Self {
            data: Vec::new(),
            fresh: false,
        }
    }

    fn put(&mut self, frame: &[T]) {
        // Backing storage follows the incoming frame size; it only actually
        // reallocates when the size changes.
        self.data.clear();
        self.data.extend_from_slice(frame);
        self.fresh = true;
    }

    fn take(&mut self) -> Option<Vec<T>> {
        if self.fresh {
            self.fresh = false;
            Some(self.data.clone())
        } else {
            None
        }
    }
}

/// Latest video and depth frames, one slot per kind.
///
/// Shared between the driver callback thread (put side) and the publish loop
/// (take side). Both sides return immediately.
pub struct FrameExchange {
    video: Mutex<FrameSlot<u8>>,
    depth: Mutex<FrameSlot<u16>>,
}

impl FrameExchange {
    /// Create an exchange with empty slots
    pub fn new() -> Self {
        Self {
            video: Mutex::new(FrameSlot::new()),
            depth: Mutex::new(FrameSlot::new()),
        }
    }

    /// Store the latest raw video frame; called from driver callback context
    pub fn put_video(&self, frame: &[u8]) {
        self.video.lock().put(frame);
    }

    /// Store the latest raw depth frame; called from driver callback context
    pub fn put_depth(&self, frame: &[u16]) {
        self.depth.lock().put(frame);
    }

    /// Return a private copy of the video frame if one arrived since the
    /// last take
    pub fn take_video(&self) -> Option<Vec<u8>> {
        self.video.lock().take()
    }

    /// Return a private copy of the depth frame if one arrived since the
    /// last take
    pub fn take_depth(&self) -> Option<Vec<u16>> {
        self.depth.lock().take()
    }
}

impl Default for FrameExchange {
    fn default() -> Self {
        Self::new()
    }
}
