//! Raw frame to BGRX pixel conversion.
//!
//! The sink consumes 4-channel 8-bit images in B-G-R-X order with the fourth
//! channel fixed at 255. Every conversion is a pure function from one raw
//! frame to one [`BgraImage`]; output buffers are transient and rebuilt each
//! publish cycle.

use crate::core::types::{BgraImage, VideoMode, DEPTH_MAX, FRAME_HEIGHT, FRAME_PIXELS, FRAME_WIDTH};

/// Convert a raw video frame (infrared or color) to a BGRX image.
///
/// Infrared samples are replicated into the blue, green and red slots; color
/// input is interpreted as R-G-B and reordered. `raw` is expected to hold
/// `mode.frame_len()` bytes; a short frame leaves trailing pixels black.
pub fn video_to_bgra(raw: &[u8], mode: VideoMode) -> BgraImage {
    let mut data = vec![0u8; FRAME_PIXELS * 4];
    match mode {
        VideoMode::Infrared => {
            for (px, &gray) in data.chunks_exact_mut(4).zip(raw.iter()) {
                px[0] = gray;
                px[1] = gray;
                px[2] = gray;
                px[3] = 255;
            }
        }
        VideoMode::Color => {
            for (px, rgb) in data.chunks_exact_mut(4).zip(raw.chunks_exact(3)) {
                px[0] = rgb[2];
                px[1] = rgb[1];
                px[2] = rgb[0];
                px[3] = 255;
            }
        }
    }
    BgraImage {
        width: FRAME_WIDTH,
        height: FRAME_HEIGHT,
        data,
    }
}

/// Convert a raw 11-bit depth frame to a grayscale BGRX image.
///
/// Each sample is mapped linearly from [0, 2047] to [0, 255] and replicated
/// into the color slots. The device mode guarantees the domain, but samples
/// above 2047 are still clamped rather than wrapped.
pub fn depth_to_bgra(raw: &[u16]) -> BgraImage {
    let mut data = vec![0u8; FRAME_PIXELS * 4];
    for (px, &sample) in data.chunks_exact_mut(4).zip(raw.iter()) {
        let depth = sample.min(DEPTH_MAX) as u32;
        let gray = (depth * 255 / DEPTH_MAX as u32) as u8;
        px[0] = gray;
        px[1] = gray;
        px[2] = gray;
        px[3] = 255;
    }
    BgraImage {
        width: FRAME_WIDTH,
        height: FRAME_HEIGHT,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infrared_replicates_into_bgr() {
        let raw = vec![128u8; FRAME_PIXELS];
        let image = video_to_bgra(&raw, VideoMode::Infrared);
        assert_eq!(image.width, FRAME_WIDTH);
        assert_eq!(image.height, FRAME_HEIGHT);
        assert_eq!(image.data.len(), FRAME_PIXELS * 4);
        assert!(image.data.chunks_exact(4).all(|px| px == [128, 128, 128, 255]));
    }

    #[test]
    fn test_infrared_preserves_per_pixel_intensity() {
        let mut raw = vec![0u8; FRAME_PIXELS];
        raw[0] = 0;
        raw[1] = 17;
        raw[FRAME_PIXELS - 1] = 255;
        let image = video_to_bgra(&raw, VideoMode::Infrared);
        assert_eq!(&image.data[0..4], &[0, 0, 0, 255]);
        assert_eq!(&image.data[4..8], &[17, 17, 17, 255]);
        let last = (FRAME_PIXELS - 1) * 4;
        assert_eq!(&image.data[last..last + 4], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_color_swaps_red_and_blue() {
        let mut raw = vec![0u8; FRAME_PIXELS * 3];
        for rgb in raw.chunks_exact_mut(3) {
            rgb[0] = 10; // R
            rgb[1] = 20; // G
            rgb[2] = 30; // B
        }
        let image = video_to_bgra(&raw, VideoMode::Color);
        assert!(image.data.chunks_exact(4).all(|px| px == [30, 20, 10, 255]));
    }

    #[test]
    fn test_depth_endpoints() {
        let mut raw = vec![0u16; FRAME_PIXELS];
        raw[1] = DEPTH_MAX;
        let image = depth_to_bgra(&raw);
        assert_eq!(&image.data[0..4], &[0, 0, 0, 255]);
        assert_eq!(&image.data[4..8], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_depth_midpoint_rounds_down() {
        let mut raw = vec![0u16; FRAME_PIXELS];
        raw[0] = 1024;
        let image = depth_to_bgra(&raw);
        // floor(1024 * 255 / 2047) = 127
        assert_eq!(&image.data[0..4], &[127, 127, 127, 255]);
    }

    #[test]
    fn test_depth_clamps_out_of_range_samples() {
        let mut raw = vec![0u16; FRAME_PIXELS];
        raw[0] = 4095;
        let image = depth_to_bgra(&raw);
        assert_eq!(&image.data[0..4], &[255, 255, 255, 255]);
    }
}
