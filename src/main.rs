//! Kinect to NDI bridge daemon.
//!
//! Streams infrared/color and depth frames from a Kinect onto the local
//! network as NDI video sources. Stream selection is fixed at startup from
//! the command line; device loss is handled by reconnecting forever at a
//! fixed interval.

use kinect_ndi::config::{self, CliCommand};
use kinect_ndi::core::types::VideoMode;
use kinect_ndi::devices;
use kinect_ndi::exchange::FrameExchange;
use kinect_ndi::streaming::ndi::NdiRuntime;
use kinect_ndi::streaming::{Publisher, VideoSink, DEPTH_STREAM_NAME, IR_STREAM_NAME, RGB_STREAM_NAME};
use kinect_ndi::supervisor::Supervisor;
use std::env;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("kinect-ndi");

    let config = match config::parse_args(&args) {
        Ok(CliCommand::Usage) => {
            println!("{}", config::usage(program));
            return ExitCode::SUCCESS;
        }
        Ok(CliCommand::Run(config)) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!();
            eprintln!("{}", config::usage(program));
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // The NDI runtime and its senders live for the whole process; only the
    // device side is torn down and rebuilt on reconnect. The runtime is
    // declared before the supervisor so the senders drop first.
    let ndi = match NdiRuntime::init() {
        Ok(ndi) => ndi,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let video = config.video.map(|mode| {
        let name = match mode {
            VideoMode::Infrared => IR_STREAM_NAME,
            VideoMode::Color => RGB_STREAM_NAME,
        };
        (mode, Box::new(ndi.create_sender(name)) as Box<dyn VideoSink>)
    });
    let depth = config
        .depth
        .then(|| Box::new(ndi.create_sender(DEPTH_STREAM_NAME)) as Box<dyn VideoSink>);
    let publisher = Publisher::new(video, depth);

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    if let Err(e) = ctrlc::set_handler(move || {
        log::info!("received shutdown signal");
        flag.store(false, Ordering::Relaxed);
    }) {
        log::warn!("failed to install signal handler: {e}");
    }

    log::info!(
        "starting Kinect streaming with auto-detection and reconnection (device: {:?})",
        config.device
    );

    let exchange = Arc::new(FrameExchange::new());
    let device = config.device;
    let mut supervisor = Supervisor::new(config, exchange, publisher, running, move || {
        devices::create_camera(device)
    });
    supervisor.run();

    log::info!("kinect-ndi stopped");
    ExitCode::SUCCESS
}
