// SPDX-License-Identifier: GPL-3.0-only

//! Snapshot rendering
//!
//! Freezing the capture surface means encoding the current frame as a
//! PNG data URI the UI collaborator can drop straight into its photo
//! element. Clearing renders a solid placeholder instead.

use crate::capture::source::VideoFrame;
use crate::constants::snapshot::PLACEHOLDER_FILL;
use crate::errors::SnapshotError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Local};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

/// An encoded still image ready for the UI collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    /// `data:image/png;base64,...` payload
    pub data_uri: String,
}

/// Encode a video frame as a PNG data URI
pub fn render_frame(frame: &VideoFrame) -> Result<Snapshot, SnapshotError> {
    if frame.is_empty() {
        return Err(SnapshotError::EmptyFrame);
    }
    encode_rgba(frame.width, frame.height, &frame.pixels)
}

/// Render the cleared-photo placeholder at the given size
pub fn placeholder(width: u32, height: u32) -> Result<Snapshot, SnapshotError> {
    if width == 0 || height == 0 {
        return Err(SnapshotError::EmptyFrame);
    }
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for _ in 0..(width as usize * height as usize) {
        pixels.extend_from_slice(&PLACEHOLDER_FILL);
    }
    encode_rgba(width, height, &pixels)
}

/// Timestamped filename for snapshot downloads
pub fn download_filename(now: DateTime<Local>) -> String {
    format!("Snap {}.png", now.format("%Y-%m-%d %H.%M.%S"))
}

fn encode_rgba(width: u32, height: u32, pixels: &[u8]) -> Result<Snapshot, SnapshotError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| SnapshotError::EncodingFailed(e.to_string()))?;

    Ok(Snapshot {
        width,
        height,
        data_uri: format!("data:image/png;base64,{}", BASE64.encode(&png)),
    })
}
