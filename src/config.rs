//! Stream configuration from command-line arguments.
//!
//! The selection is made once at startup and is immutable afterwards: which
//! of infrared/color/depth to stream, and which camera backend to use. There
//! is no configuration file; the CLI is the whole surface.

use crate::core::types::VideoMode;
use crate::devices::DeviceKind;
use crate::error::{Error, Result};

/// Immutable stream selection made once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Active video stream, if any (infrared and color are exclusive)
    pub video: Option<VideoMode>,
    /// Whether the depth stream is active
    pub depth: bool,
    /// Camera backend to drive
    pub device: DeviceKind,
}

/// Outcome of argument parsing
#[derive(Debug, PartialEq, Eq)]
pub enum CliCommand {
    /// Run the bridge with the given configuration
    Run(StreamConfig),
    /// Print usage and exit successfully
    Usage,
}

/// Parse command-line arguments (`args[0]` is the program name).
///
/// Supports:
/// - `--ir` / `--rgb`: video stream flavor (mutually exclusive)
/// - `--depth`: depth stream (independent)
/// - `--device <kinect|mock>`: camera backend, default `kinect`
/// - `--help` / `-h` or no arguments at all: usage
///
/// Any unknown flag, a missing stream selection, or `--ir` together with
/// `--rgb` is a validation error.
pub fn parse_args(args: &[String]) -> Result<CliCommand> {
    if args.len() < 2 {
        return Ok(CliCommand::Usage);
    }

    let mut ir = false;
    let mut rgb = false;
    let mut depth = false;
    let mut device = DeviceKind::Kinect;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Ok(CliCommand::Usage),
            "--ir" => ir = true,
            "--rgb" => rgb = true,
            "--depth" => depth = true,
            "--device" => {
                i += 1;
                let value = args.get(i).ok_or_else(|| {
                    Error::InvalidArguments("--device requires a value".to_string())
                })?;
                device = value.parse()?;
            }
            other => {
                return Err(Error::InvalidArguments(format!("unknown argument: {other}")));
            }
        }
        i += 1;
    }

    if ir && rgb {
        return Err(Error::InvalidArguments(
            "cannot enable both --ir and --rgb streaming simultaneously".to_string(),
        ));
    }
    if !ir && !rgb && !depth {
        return Err(Error::InvalidArguments(
            "no streaming mode enabled; use --ir, --rgb, and/or --depth".to_string(),
        ));
    }

    let video = if ir {
        Some(VideoMode::Infrared)
    } else if rgb {
        Some(VideoMode::Color)
    } else {
        None
    };

    Ok(CliCommand::Run(StreamConfig {
        video,
        depth,
        device,
    }))
}

/// Usage text printed for `--help` or argument errors
pub fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [--ir | --rgb] [--depth] [--device <kinect|mock>] [--help]\n\
         Options:\n\
         \x20 --ir      Enable infrared (IR) streaming (8-bit grayscale).\n\
         \x20 --rgb     Enable RGB video streaming.\n\
         \x20 --depth   Enable depth streaming.\n\
         \x20 --device  Camera backend: \"kinect\" (default) or \"mock\".\n\
         \x20 --help    Display this help message.\n\
         \n\
         You can enable either --ir or --rgb for the video stream (not both\n\
         simultaneously). Depth streaming can be enabled along with either\n\
         video mode."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Result<CliCommand> {
        let mut args = vec!["kinect-ndi".to_string()];
        args.extend(extra.iter().map(|s| s.to_string()));
        parse_args(&args)
    }

    fn parse_config(extra: &[&str]) -> StreamConfig {
        match parse(extra).unwrap() {
            CliCommand::Run(config) => config,
            CliCommand::Usage => panic!("expected a run configuration"),
        }
    }

    #[test]
    fn test_no_arguments_prints_usage() {
        assert_eq!(parse(&[]).unwrap(), CliCommand::Usage);
    }

    #[test]
    fn test_help_flags_print_usage() {
        assert_eq!(parse(&["--help"]).unwrap(), CliCommand::Usage);
        assert_eq!(parse(&["-h"]).unwrap(), CliCommand::Usage);
        // --help wins even when combined with stream flags
        assert_eq!(parse(&["--ir", "--help"]).unwrap(), CliCommand::Usage);
    }

    #[test]
    fn test_ir_only() {
        let config = parse_config(&["--ir"]);
        assert_eq!(config.video, Some(VideoMode::Infrared));
        assert!(!config.depth);
        assert_eq!(config.device, DeviceKind::Kinect);
    }

    #[test]
    fn test_rgb_with_depth() {
        let config = parse_config(&["--rgb", "--depth"]);
        assert_eq!(config.video, Some(VideoMode::Color));
        assert!(config.depth);
    }

    #[test]
    fn test_depth_only_is_accepted() {
        let config = parse_config(&["--depth"]);
        assert_eq!(config.video, None);
        assert!(config.depth);
    }

    #[test]
    fn test_ir_and_rgb_conflict() {
        assert!(parse(&["--ir", "--rgb"]).is_err());
    }

    #[test]
    fn test_no_stream_selected_is_an_error() {
        assert!(parse(&["--device", "mock"]).is_err());
    }

    #[test]
    fn test_unknown_flag_is_an_error() {
        assert!(parse(&["--bogus"]).is_err());
    }

    #[test]
    fn test_device_selection() {
        let config = parse_config(&["--depth", "--device", "mock"]);
        assert_eq!(config.device, DeviceKind::Mock);
    }

    #[test]
    fn test_device_requires_a_valid_value() {
        assert!(parse(&["--depth", "--device"]).is_err());
        assert!(parse(&["--depth", "--device", "webcam"]).is_err());
    }
}
