//! Camera backend implementations

pub mod freenect;
pub mod mock;

use crate::core::camera::DepthCamera;
use crate::error::{Error, Result};
use freenect::FreenectCamera;
use mock::MockCamera;
use std::str::FromStr;

/// Selectable camera backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Real Kinect hardware via libfreenect
    Kinect,
    /// Synthetic frame generator, no hardware required
    Mock,
}

impl FromStr for DeviceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kinect" => Ok(DeviceKind::Kinect),
            "mock" => Ok(DeviceKind::Mock),
            other => Err(Error::UnknownDevice(other.to_string())),
        }
    }
}

/// Create a camera backend for one connection attempt.
///
/// The supervisor calls this at the start of every cycle; backends are
/// single-use and torn down on disconnect.
pub fn create_camera(kind: DeviceKind) -> Result<Box<dyn DepthCamera>> {
    match kind {
        DeviceKind::Kinect => Ok(Box::new(FreenectCamera::new())),
        DeviceKind::Mock => Ok(Box::new(MockCamera::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_kind_parsing() {
        assert_eq!("kinect".parse::<DeviceKind>().unwrap(), DeviceKind::Kinect);
        assert_eq!("mock".parse::<DeviceKind>().unwrap(), DeviceKind::Mock);
        assert!("webcam".parse::<DeviceKind>().is_err());
    }
}
