// SPDX-License-Identifier: GPL-3.0-only

//! Viewport-fit sizing for the capture surface
//!
//! Given the viewport and the stream's intrinsic dimensions, computes
//! the display size for the camera panel: height capped at 725 px or
//! two thirds of the viewport height (whichever is smaller), width
//! from the intrinsic aspect ratio, re-fit against the viewport width
//! when the aspect-fit width would overflow.

use crate::constants::sizing::{FALLBACK_ASPECT, MAX_CAPTURE_HEIGHT, VIEWPORT_WIDTH_MARGIN};

/// Size of the window or screen area hosting the capture surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Computed display size for the capture surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureSize {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for CaptureSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Fit the capture surface into the viewport.
///
/// `intrinsic` is the stream's reported (width, height); either being
/// zero marks the aspect ratio as indeterminate and the 4:3 fallback
/// applies (height 600 yields width 450).
pub fn fit_capture_size(viewport: ViewportSize, intrinsic: (u32, u32)) -> CaptureSize {
    let two_thirds = viewport.height as f64 * 2.0 / 3.0;
    let mut height = (MAX_CAPTURE_HEIGHT as f64).min(two_thirds);

    let aspect = intrinsic_aspect(intrinsic);
    let mut width = match aspect {
        Some(aspect) => height * aspect,
        None => height / FALLBACK_ASPECT,
    };

    // Aspect-fit width may be wider than the screen; pin the width to
    // the viewport minus the margin and recompute the height instead.
    let max_width = viewport.width.saturating_sub(VIEWPORT_WIDTH_MARGIN) as f64;
    if width > max_width {
        width = max_width;
        height = match aspect {
            Some(aspect) => width / aspect,
            None => width / FALLBACK_ASPECT,
        };
    }

    CaptureSize {
        width: width.round() as u32,
        height: height.round() as u32,
    }
}

fn intrinsic_aspect(intrinsic: (u32, u32)) -> Option<f64> {
    let (width, height) = intrinsic;
    if width == 0 || height == 0 {
        return None;
    }
    Some(width as f64 / height as f64)
}
