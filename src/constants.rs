// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Timing constants
pub mod timing {
    use super::Duration;

    /// Fixed cadence at which frames are sampled for decoding
    pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(250);

    /// Window during which only the most recent decode result survives
    pub const RESULT_DEBOUNCE: Duration = Duration::from_millis(500);

    /// Delay before the stream is re-acquired after a resize settles
    pub const RESIZE_RESTART_DEBOUNCE: Duration = Duration::from_millis(250);
}

/// Viewport-fit sizing constants
pub mod sizing {
    /// Hard cap on the computed capture height in pixels
    pub const MAX_CAPTURE_HEIGHT: u32 = 725;

    /// Horizontal margin subtracted from the viewport width when the
    /// aspect-fit width would overflow the viewport
    pub const VIEWPORT_WIDTH_MARGIN: u32 = 50;

    /// Aspect ratio assumed when the stream reports no usable dimensions
    pub const FALLBACK_ASPECT: f64 = 4.0 / 3.0;
}

/// Worker channel constants
pub mod channel {
    /// Buffered capacity of the broadcast conduit between the capture
    /// side and the decode worker. Overflow skips the oldest messages;
    /// the protocol tolerates loss.
    pub const CHANNEL_CAPACITY: usize = 16;
}

/// Snapshot constants
pub mod snapshot {
    /// RGBA fill used for the cleared-photo placeholder (#457B9D)
    pub const PLACEHOLDER_FILL: [u8; 4] = [0x45, 0x7B, 0x9D, 0xFF];
}

/// Offline asset cache defaults
pub mod assets {
    /// Version string folded into the cache name. Must change whenever
    /// the manifest entries change so activation evicts stale caches.
    pub const CACHE_VERSION: &str = "1.2";

    /// Default manifest entries cached for offline use: the scanner
    /// page assets and the decoder bundle shipped alongside the binary.
    pub const DEFAULT_ENTRIES: &[&str] = &[
        "capture.js",
        "offline.html",
        "css/scanner.css",
        "lib/decoder.wasm",
        "lib/decoder.js",
    ];
}
