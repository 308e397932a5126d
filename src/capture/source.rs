// SPDX-License-Identifier: GPL-3.0-only

//! Read-only frame access for stream consumers
//!
//! The capture loop and the snapshot path never hold the stream handle
//! itself; they read frames through a shared [`FrameSource`], the
//! Rust-side equivalent of drawing from a playing video element.

use std::sync::Arc;

/// Snapshot of one video frame in RGBA order
///
/// The pixel buffer is immutable once created; cloning shares it.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA pixels, `width * height * 4` bytes
    pub pixels: Arc<[u8]>,
}

impl VideoFrame {
    pub fn new(width: u32, height: u32, pixels: Arc<[u8]>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// True when the frame cannot be sampled (stream not ready)
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

/// Read-only view of an active stream's frames
pub trait FrameSource: Send + Sync {
    /// Intrinsic dimensions reported by the stream; (0, 0) until the
    /// first frame is available
    fn intrinsic_size(&self) -> (u32, u32);

    /// Snapshot of the most recent frame, or None while the stream has
    /// nothing to show yet
    fn latest_frame(&self) -> Option<VideoFrame>;
}

/// Frame source backed by a single still frame
///
/// Used by the file camera and by tests: the "stream" plays the same
/// frame forever, which is exactly what the sampler needs.
pub struct StillFrameSource {
    frame: VideoFrame,
}

impl StillFrameSource {
    pub fn new(frame: VideoFrame) -> Self {
        Self { frame }
    }
}

impl FrameSource for StillFrameSource {
    fn intrinsic_size(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }

    fn latest_frame(&self) -> Option<VideoFrame> {
        if self.frame.is_empty() {
            return None;
        }
        Some(self.frame.clone())
    }
}
