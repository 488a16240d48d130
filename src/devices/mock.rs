//! Mock depth camera for hardware-free operation and tests.
//!
//! Two flavors share one type:
//!
//! - the default free-running camera (selected with `--device mock`) spawns a
//!   worker thread that synthesizes moving test-pattern frames at roughly the
//!   hardware rate, exercising the real callback-thread → exchange path;
//! - a scripted camera delivers a fixed set of frames during
//!   `start_streams`, which keeps pipeline tests fully deterministic.
//!
//! Failure injection (`fail_open`, `fail_start`, `disconnect_after`) lets the
//! supervisor's reconnect machine be tested without hardware.

use crate::config::StreamConfig;
use crate::core::camera::DepthCamera;
use crate::core::types::{DEPTH_MAX, FRAME_PIXELS};
use crate::error::{Error, Result};
use crate::exchange::FrameExchange;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Interval between synthetic frames in free-running mode (~30 Hz)
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Simulated depth camera
pub struct MockCamera {
    fail_open: bool,
    fail_start: bool,
    /// Report disconnection after this many event pumps
    disconnect_after: Option<u64>,
    /// Scripted frames, delivered once during `start_streams`
    script_video: Vec<Vec<u8>>,
    script_depth: Vec<Vec<u16>>,
    /// Free-running generator when no script is set
    free_running: bool,
    /// Set to true when `shutdown` runs, for teardown assertions
    shutdown_probe: Option<Arc<AtomicBool>>,

    opened: bool,
    events: u64,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl MockCamera {
    /// Free-running camera generating synthetic frames at ~30 Hz
    pub fn new() -> Self {
        Self {
            fail_open: false,
            fail_start: false,
            disconnect_after: None,
            script_video: Vec::new(),
            script_depth: Vec::new(),
            free_running: true,
            shutdown_probe: None,
            opened: false,
            events: 0,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Camera that delivers exactly the given frames during `start_streams`
    /// and then goes quiet
    pub fn scripted(video: Vec<Vec<u8>>, depth: Vec<Vec<u16>>) -> Self {
        Self {
            fail_open: false,
            fail_start: false,
            disconnect_after: None,
            script_video: video,
            script_depth: depth,
            free_running: false,
            shutdown_probe: None,
            opened: false,
            events: 0,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Make `open` fail (simulates no device / device busy)
    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Make `start_streams` fail (simulates mode or stream-start refusal)
    pub fn fail_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Report disconnection from `process_events` after `n` pumps
    pub fn disconnect_after(mut self, n: u64) -> Self {
        self.disconnect_after = Some(n);
        self
    }

    /// Flag to raise when `shutdown` is called
    pub fn shutdown_probe(mut self, probe: Arc<AtomicBool>) -> Self {
        self.shutdown_probe = Some(probe);
        self
    }
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl DepthCamera for MockCamera {
    fn open(&mut self) -> Result<()> {
        if self.fail_open {
            return Err(Error::NoDevice);
        }
        self.opened = true;
        Ok(())
    }

    fn start_streams(&mut self, config: &StreamConfig, exchange: Arc<FrameExchange>) -> Result<()> {
        if !self.opened {
            return Err(Error::Other("mock device not opened".to_string()));
        }
        if self.fail_start {
            return Err(Error::UnsupportedMode("simulated video"));
        }

        // Scripted frames go straight through the exchange, honoring the
        // stream selection the same way real callback registration would.
        if config.video.is_some() {
            for frame in &self.script_video {
                exchange.put_video(frame);
            }
        }
        if config.depth {
            for frame in &self.script_depth {
                exchange.put_depth(frame);
            }
        }

        if self.free_running {
            self.running.store(true, Ordering::Relaxed);
            let running = Arc::clone(&self.running);
            let config = *config;
            let worker = std::thread::Builder::new()
                .name("mock-camera".to_string())
                .spawn(move || generate_frames(config, exchange, running))
                .map_err(|e| Error::Other(format!("failed to spawn mock camera: {e}")))?;
            self.worker = Some(worker);
        }

        Ok(())
    }

    fn process_events(&mut self) -> Result<()> {
        self.events += 1;
        match self.disconnect_after {
            Some(n) if self.events > n => Err(Error::Other("mock device disconnected".to_string())),
            _ => Ok(()),
        }
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.opened = false;
        if let Some(ref probe) = self.shutdown_probe {
            probe.store(true, Ordering::Relaxed);
        }
    }
}

impl Drop for MockCamera {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Worker loop: push a moving test pattern into the exchange at ~30 Hz
fn generate_frames(config: StreamConfig, exchange: Arc<FrameExchange>, running: Arc<AtomicBool>) {
    log::debug!("mock camera worker started");
    let mut tick: u64 = 0;
    let mut video = Vec::new();
    let mut depth = Vec::new();

    while running.load(Ordering::Relaxed) {
        if let Some(mode) = config.video {
            video.clear();
            video.resize(mode.frame_len(), 0);
            let channels = mode.channels();
            for (i, px) in video.chunks_exact_mut(channels).enumerate() {
                // Diagonal gradient that drifts one pixel per frame
                let base = ((i + tick as usize) % 256) as u8;
                for (c, sample) in px.iter_mut().enumerate() {
                    *sample = base.wrapping_add((c as u8) * 64);
                }
            }
            exchange.put_video(&video);
        }
        if config.depth {
            depth.clear();
            depth.resize(FRAME_PIXELS, 0);
            for (i, sample) in depth.iter_mut().enumerate() {
                *sample = ((i as u64 + tick * 16) % (DEPTH_MAX as u64 + 1)) as u16;
            }
            exchange.put_depth(&depth);
        }
        tick += 1;
        std::thread::sleep(FRAME_INTERVAL);
    }
    log::debug!("mock camera worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::VideoMode;
    use crate::devices::DeviceKind;

    fn ir_config() -> StreamConfig {
        StreamConfig {
            video: Some(VideoMode::Infrared),
            depth: false,
            device: DeviceKind::Mock,
        }
    }

    #[test]
    fn test_scripted_frames_land_in_exchange() {
        let exchange = Arc::new(FrameExchange::new());
        let mut camera = MockCamera::scripted(vec![vec![42u8; 4]], vec![]);
        camera.open().unwrap();
        camera.start_streams(&ir_config(), Arc::clone(&exchange)).unwrap();
        assert_eq!(exchange.take_video(), Some(vec![42u8; 4]));
        assert_eq!(exchange.take_video(), None);
    }

    #[test]
    fn test_script_respects_stream_selection() {
        let exchange = Arc::new(FrameExchange::new());
        let mut camera = MockCamera::scripted(vec![vec![1u8]], vec![vec![2u16]]);
        camera.open().unwrap();
        // Depth not requested: the depth script must not be delivered
        camera.start_streams(&ir_config(), Arc::clone(&exchange)).unwrap();
        assert!(exchange.take_video().is_some());
        assert_eq!(exchange.take_depth(), None);
    }

    #[test]
    fn test_failure_injection() {
        assert!(MockCamera::new().fail_open().open().is_err());

        let exchange = Arc::new(FrameExchange::new());
        let mut camera = MockCamera::new().fail_start();
        camera.open().unwrap();
        assert!(camera.start_streams(&ir_config(), exchange).is_err());
    }

    #[test]
    fn test_disconnect_after_n_events() {
        let mut camera = MockCamera::scripted(vec![], vec![]).disconnect_after(2);
        camera.open().unwrap();
        assert!(camera.process_events().is_ok());
        assert!(camera.process_events().is_ok());
        assert!(camera.process_events().is_err());
    }

    #[test]
    fn test_free_running_worker_delivers_frames() {
        let exchange = Arc::new(FrameExchange::new());
        let mut camera = MockCamera::new();
        camera.open().unwrap();
        camera.start_streams(&ir_config(), Arc::clone(&exchange)).unwrap();

        let mut frame = None;
        for _ in 0..100 {
            frame = exchange.take_video();
            if frame.is_some() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        camera.shutdown();

        let frame = frame.expect("worker should have produced a frame");
        assert_eq!(frame.len(), VideoMode::Infrared.frame_len());
    }
}
