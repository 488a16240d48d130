//! End-to-end pipeline tests: scripted camera → frame exchange → publisher
//! → in-memory sink.
//!
//! These exercise the same acquisition/conversion/publish path the daemon
//! runs, with both SDKs replaced by their mock collaborators, so they need
//! no hardware and no NDI runtime.

use kinect_ndi::config::StreamConfig;
use kinect_ndi::core::camera::DepthCamera;
use kinect_ndi::core::types::{VideoMode, DEPTH_MAX, FRAME_PIXELS};
use kinect_ndi::devices::mock::MockCamera;
use kinect_ndi::devices::DeviceKind;
use kinect_ndi::exchange::FrameExchange;
use kinect_ndi::streaming::{MemorySink, Publisher};
use std::sync::Arc;

#[test]
fn infrared_frame_reaches_the_sink_exactly_once() {
    let config = StreamConfig {
        video: Some(VideoMode::Infrared),
        depth: false,
        device: DeviceKind::Mock,
    };
    let exchange = Arc::new(FrameExchange::new());
    let sink = MemorySink::new();
    let mut publisher = Publisher::new(
        Some((VideoMode::Infrared, Box::new(sink.clone()))),
        None,
    );

    let mut camera = MockCamera::scripted(vec![vec![128u8; FRAME_PIXELS]], vec![]);
    camera.open().unwrap();
    camera.start_streams(&config, Arc::clone(&exchange)).unwrap();
    camera.process_events().unwrap();

    assert_eq!(publisher.pump(&exchange), 1);

    let frames = sink.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].width, 640);
    assert_eq!(frames[0].height, 480);
    assert_eq!(frames[0].data.len(), FRAME_PIXELS * 4);
    assert!(frames[0]
        .data
        .chunks_exact(4)
        .all(|px| px == [128, 128, 128, 255]));

    // No new frame arrived: the next cycle publishes nothing
    assert_eq!(publisher.pump(&exchange), 0);
    assert_eq!(sink.frame_count(), 1);
}

#[test]
fn color_frame_is_reordered_to_bgrx() {
    let config = StreamConfig {
        video: Some(VideoMode::Color),
        depth: false,
        device: DeviceKind::Mock,
    };
    let exchange = Arc::new(FrameExchange::new());
    let sink = MemorySink::new();
    let mut publisher = Publisher::new(Some((VideoMode::Color, Box::new(sink.clone()))), None);

    let mut raw = vec![0u8; FRAME_PIXELS * 3];
    for rgb in raw.chunks_exact_mut(3) {
        rgb[0] = 200; // R
        rgb[1] = 100; // G
        rgb[2] = 50; // B
    }
    let mut camera = MockCamera::scripted(vec![raw], vec![]);
    camera.open().unwrap();
    camera.start_streams(&config, Arc::clone(&exchange)).unwrap();

    assert_eq!(publisher.pump(&exchange), 1);
    let frames = sink.frames();
    assert!(frames[0]
        .data
        .chunks_exact(4)
        .all(|px| px == [50, 100, 200, 255]));
}

#[test]
fn depth_only_configuration_streams_depth() {
    let config = StreamConfig {
        video: None,
        depth: true,
        device: DeviceKind::Mock,
    };
    let exchange = Arc::new(FrameExchange::new());
    let sink = MemorySink::new();
    let mut publisher = Publisher::new(None, Some(Box::new(sink.clone())));

    let mut camera = MockCamera::scripted(vec![], vec![vec![DEPTH_MAX; FRAME_PIXELS]]);
    camera.open().unwrap();
    camera.start_streams(&config, Arc::clone(&exchange)).unwrap();

    assert_eq!(publisher.pump(&exchange), 1);
    let frames = sink.frames();
    assert_eq!(frames.len(), 1);
    assert!(frames[0]
        .data
        .chunks_exact(4)
        .all(|px| px == [255, 255, 255, 255]));
}

#[test]
fn video_and_depth_streams_are_published_independently() {
    let config = StreamConfig {
        video: Some(VideoMode::Infrared),
        depth: true,
        device: DeviceKind::Mock,
    };
    let exchange = Arc::new(FrameExchange::new());
    let video_sink = MemorySink::new();
    let depth_sink = MemorySink::new();
    let mut publisher = Publisher::new(
        Some((VideoMode::Infrared, Box::new(video_sink.clone()))),
        Some(Box::new(depth_sink.clone())),
    );

    let mut camera = MockCamera::scripted(
        vec![vec![10u8; FRAME_PIXELS]],
        vec![vec![0u16; FRAME_PIXELS]],
    );
    camera.open().unwrap();
    camera.start_streams(&config, Arc::clone(&exchange)).unwrap();

    assert_eq!(publisher.pump(&exchange), 2);
    assert_eq!(video_sink.frame_count(), 1);
    assert_eq!(depth_sink.frame_count(), 1);
    assert!(video_sink.frames()[0]
        .data
        .chunks_exact(4)
        .all(|px| px == [10, 10, 10, 255]));
    assert!(depth_sink.frames()[0]
        .data
        .chunks_exact(4)
        .all(|px| px == [0, 0, 0, 255]));
}
