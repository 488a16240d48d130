//! Publish-side plumbing: sink abstraction, NDI binding, frame publisher

pub mod ndi;
pub mod publisher;
pub mod sink;

pub use publisher::Publisher;
pub use sink::{MemorySink, VideoSink};

/// NDI sender name for the infrared stream
pub const IR_STREAM_NAME: &str = "Kinect IR Stream";
/// NDI sender name for the color stream
pub const RGB_STREAM_NAME: &str = "Kinect RGB Stream";
/// NDI sender name for the depth stream
pub const DEPTH_STREAM_NAME: &str = "Kinect Depth Stream";
