//! Video sink abstraction.
//!
//! The publisher hands each converted image to a sink without knowing what is
//! behind it: the NDI sender in production, an in-memory recorder in tests.

use crate::core::types::BgraImage;
use crate::error::Result;
use std::sync::{Arc, Mutex};

/// Outbound frame sink
pub trait VideoSink: Send {
    /// Transmit one converted frame. Implementations must not block on a
    /// lost receiver; frame delivery is best-effort.
    fn send(&mut self, image: &BgraImage) -> Result<()>;
}

/// Recording sink for tests
#[derive(Clone, Default)]
pub struct MemorySink {
    frames: Arc<Mutex<Vec<BgraImage>>>,
}

impl MemorySink {
    /// Create an empty recording sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All frames received so far
    pub fn frames(&self) -> Vec<BgraImage> {
        self.frames.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of frames received so far
    pub fn frame_count(&self) -> usize {
        self.frames.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl VideoSink for MemorySink {
    fn send(&mut self, image: &BgraImage) -> Result<()> {
        self.frames
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(image.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_frames() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        let image = BgraImage {
            width: 2,
            height: 1,
            data: vec![1, 2, 3, 255, 4, 5, 6, 255],
        };
        writer.send(&image).unwrap();
        assert_eq!(sink.frame_count(), 1);
        assert_eq!(sink.frames()[0], image);
    }
}
