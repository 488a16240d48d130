//! Connection supervisor: open/configure/stream lifecycle with reconnection.
//!
//! The machine runs `Disconnected → Connecting → Configuring → Streaming`
//! and falls back to `Disconnected` on any failure. There is no retry
//! limit, no backoff and no circuit breaker: the bridge targets unattended
//! appliance deployments and reconnects forever at a fixed interval. A
//! fresh camera is built from the injected factory on every attempt, so the
//! machine is testable against mock collaborators at millisecond timing.

use crate::config::StreamConfig;
use crate::core::camera::DepthCamera;
use crate::error::Result;
use crate::exchange::FrameExchange;
use crate::streaming::Publisher;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Delay between reconnection attempts
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Publish-loop polling cadence. This bounds CPU usage, it is not a frame
/// clock: the actual publish rate is capacity-bound by the device callback
/// rate and sink throughput.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Connection lifecycle states; the active device travels with the state
enum ConnectionState {
    /// No device; waiting out the reconnect delay
    Disconnected,
    /// Acquiring a context and opening the device
    Connecting,
    /// Device open; selecting modes and starting streams
    Configuring(Box<dyn DepthCamera>),
    /// Event-processing and publishing until the device is lost
    Streaming(Box<dyn DepthCamera>),
}

/// Drives the connection lifecycle and the publish loop
pub struct Supervisor<F> {
    config: StreamConfig,
    exchange: Arc<FrameExchange>,
    publisher: Publisher,
    running: Arc<AtomicBool>,
    factory: F,
    retry_delay: Duration,
    poll_interval: Duration,
}

impl<F> Supervisor<F>
where
    F: FnMut() -> Result<Box<dyn DepthCamera>>,
{
    /// Create a supervisor with the production timing constants
    pub fn new(
        config: StreamConfig,
        exchange: Arc<FrameExchange>,
        publisher: Publisher,
        running: Arc<AtomicBool>,
        factory: F,
    ) -> Self {
        Self {
            config,
            exchange,
            publisher,
            running,
            factory,
            retry_delay: RECONNECT_DELAY,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Override the reconnect delay and poll interval (tests)
    pub fn with_timing(mut self, retry_delay: Duration, poll_interval: Duration) -> Self {
        self.retry_delay = retry_delay;
        self.poll_interval = poll_interval;
        self
    }

    /// Run until the running flag drops.
    ///
    /// Starts directly in `Connecting`: the first attempt is immediate, the
    /// fixed delay applies after failures.
    pub fn run(&mut self) {
        let mut state = ConnectionState::Connecting;
        while self.running.load(Ordering::Relaxed) {
            state = self.step(state);
        }
        if let ConnectionState::Configuring(mut camera) | ConnectionState::Streaming(mut camera) =
            state
        {
            camera.shutdown();
        }
    }

    /// The single state-transition function
    fn step(&mut self, state: ConnectionState) -> ConnectionState {
        match state {
            ConnectionState::Disconnected => {
                self.wait(self.retry_delay);
                ConnectionState::Connecting
            }
            ConnectionState::Connecting => {
                let opened =
                    (self.factory)().and_then(|mut camera| camera.open().map(|()| camera));
                match opened {
                    Ok(camera) => ConnectionState::Configuring(camera),
                    Err(e) => {
                        log::error!(
                            "could not open Kinect device: {e}; retrying in {:?}",
                            self.retry_delay
                        );
                        ConnectionState::Disconnected
                    }
                }
            }
            ConnectionState::Configuring(mut camera) => {
                match camera.start_streams(&self.config, Arc::clone(&self.exchange)) {
                    Ok(()) => {
                        log::info!("Kinect connected, streaming data over NDI");
                        ConnectionState::Streaming(camera)
                    }
                    Err(e) => {
                        log::error!(
                            "could not start streams: {e}; retrying in {:?}",
                            self.retry_delay
                        );
                        camera.shutdown();
                        ConnectionState::Disconnected
                    }
                }
            }
            ConnectionState::Streaming(mut camera) => {
                self.stream(camera.as_mut());
                camera.shutdown();
                if self.running.load(Ordering::Relaxed) {
                    log::error!(
                        "Kinect connection lost, reconnecting in {:?}",
                        self.retry_delay
                    );
                }
                ConnectionState::Disconnected
            }
        }
    }

    /// Inner publish loop; returns when the device reports loss or the
    /// running flag drops
    fn stream(&mut self, camera: &mut dyn DepthCamera) {
        while self.running.load(Ordering::Relaxed) {
            if let Err(e) = camera.process_events() {
                log::error!("Kinect disconnected or error encountered: {e}");
                return;
            }
            self.publisher.pump(&self.exchange);
            std::thread::sleep(self.poll_interval);
        }
    }

    /// Sleep for `total`, waking early if the running flag drops
    fn wait(&self, total: Duration) {
        let deadline = Instant::now() + total;
        while self.running.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep((deadline - now).min(Duration::from_millis(50)));
        }
    }
}
