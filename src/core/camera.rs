//! DepthCamera trait definition

use crate::config::StreamConfig;
use crate::error::Result;
use crate::exchange::FrameExchange;
use std::sync::Arc;

/// Depth camera driver trait for hardware abstraction.
///
/// The supervisor drives implementations through the connection lifecycle:
/// `open` (context + device), `start_streams` (modes, callbacks, start),
/// then repeated `process_events` while streaming, and `shutdown` on loss.
/// A fresh instance is created for every connection attempt.
pub trait DepthCamera: Send {
    /// Acquire the driver context and open the first available device.
    fn open(&mut self) -> Result<()>;

    /// Select the fixed modes for the requested streams, install the
    /// acquisition callbacks writing into `exchange`, and start streaming.
    ///
    /// Frames arrive on the driver's own thread; the exchange is the only
    /// state shared with it. On failure, whatever was already started is
    /// left for `shutdown` to tear down.
    fn start_streams(&mut self, config: &StreamConfig, exchange: Arc<FrameExchange>) -> Result<()>;

    /// Pump pending device events. Bounded and non-blocking; an `Err`
    /// means the device is lost and the connection must be rebuilt.
    fn process_events(&mut self) -> Result<()>;

    /// Best-effort stop of active streams and device teardown. Errors are
    /// logged, never escalated. Must be safe to call more than once.
    fn shutdown(&mut self);
}
