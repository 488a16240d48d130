//! Frame publisher: drains the exchange, converts, and forwards to the sinks.
//!
//! Runs on the supervisor thread as part of the streaming loop. At most one
//! video and one depth frame move per cycle; a frame the loop has not
//! consumed by the time the next one arrives is silently dropped by the
//! exchange. Send failures are logged and never escalate; delivery is
//! best-effort.

use crate::convert;
use crate::core::types::VideoMode;
use crate::exchange::FrameExchange;
use crate::streaming::sink::VideoSink;

/// Owns the per-stream sinks for the process lifetime
pub struct Publisher {
    video: Option<(VideoMode, Box<dyn VideoSink>)>,
    depth: Option<Box<dyn VideoSink>>,
}

impl Publisher {
    /// Create a publisher for the configured streams.
    ///
    /// `video` carries the active mode together with its sink; `depth` is the
    /// independent depth sink.
    pub fn new(
        video: Option<(VideoMode, Box<dyn VideoSink>)>,
        depth: Option<Box<dyn VideoSink>>,
    ) -> Self {
        Self { video, depth }
    }

    /// Drain and publish pending frames. Returns how many frames were sent.
    pub fn pump(&mut self, exchange: &FrameExchange) -> usize {
        let mut sent = 0;

        if let Some((mode, sink)) = self.video.as_mut() {
            if let Some(raw) = exchange.take_video() {
                let image = convert::video_to_bgra(&raw, *mode);
                match sink.send(&image) {
                    Ok(()) => sent += 1,
                    Err(e) => log::warn!("failed to send video frame: {e}"),
                }
            }
        }

        if let Some(sink) = self.depth.as_mut() {
            if let Some(raw) = exchange.take_depth() {
                let image = convert::depth_to_bgra(&raw);
                match sink.send(&image) {
                    Ok(()) => sent += 1,
                    Err(e) => log::warn!("failed to send depth frame: {e}"),
                }
            }
        }

        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DEPTH_MAX, FRAME_PIXELS};
    use crate::streaming::sink::MemorySink;

    #[test]
    fn test_pump_with_empty_exchange_sends_nothing() {
        let sink = MemorySink::new();
        let mut publisher = Publisher::new(
            Some((VideoMode::Infrared, Box::new(sink.clone()))),
            Some(Box::new(sink.clone())),
        );
        let exchange = FrameExchange::new();
        assert_eq!(publisher.pump(&exchange), 0);
        assert_eq!(sink.frame_count(), 0);
    }

    #[test]
    fn test_pump_moves_video_and_depth_independently() {
        let video_sink = MemorySink::new();
        let depth_sink = MemorySink::new();
        let mut publisher = Publisher::new(
            Some((VideoMode::Infrared, Box::new(video_sink.clone()))),
            Some(Box::new(depth_sink.clone())),
        );
        let exchange = FrameExchange::new();

        exchange.put_video(&vec![64u8; FRAME_PIXELS]);
        assert_eq!(publisher.pump(&exchange), 1);
        assert_eq!(video_sink.frame_count(), 1);
        assert_eq!(depth_sink.frame_count(), 0);

        exchange.put_depth(&vec![DEPTH_MAX; FRAME_PIXELS]);
        exchange.put_video(&vec![65u8; FRAME_PIXELS]);
        assert_eq!(publisher.pump(&exchange), 2);
        assert_eq!(video_sink.frame_count(), 2);
        assert_eq!(depth_sink.frame_count(), 1);
    }

    #[test]
    fn test_unconfigured_streams_are_ignored() {
        let sink = MemorySink::new();
        let mut publisher = Publisher::new(None, Some(Box::new(sink.clone())));
        let exchange = FrameExchange::new();

        // A video frame with no video sink configured stays in the slot
        exchange.put_video(&[1, 2, 3]);
        assert_eq!(publisher.pump(&exchange), 0);
        assert_eq!(sink.frame_count(), 0);
        assert!(exchange.take_video().is_some());
    }
}
