//! Error types for the Kinect/NDI bridge

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Bridge error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Runtime shared library could not be loaded or is missing symbols
    #[error("runtime library error: {0}")]
    Library(String),

    /// No Kinect device could be opened
    #[error("no Kinect device found")]
    NoDevice,

    /// A driver SDK call returned a failure status
    #[error("{call} failed with status {status}")]
    DeviceCall {
        /// Name of the SDK function that failed
        call: &'static str,
        /// Status code returned by the SDK
        status: i32,
    },

    /// Device lost while streaming
    #[error("device disconnected (status {0})")]
    Disconnected(i32),

    /// Requested stream mode is not offered by the driver
    #[error("no matching {0} mode")]
    UnsupportedMode(&'static str),

    /// NDI library refused to initialize
    #[error("NDI initialization failed (is the NDI runtime installed?)")]
    NdiInit,

    /// Unknown device backend name
    #[error("unknown device backend: {0}")]
    UnknownDevice(String),

    /// Command-line validation failure
    #[error("{0}")]
    InvalidArguments(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
