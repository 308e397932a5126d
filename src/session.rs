// SPDX-License-Identifier: GPL-3.0-only

//! Capture session context
//!
//! One [`CaptureSession`] replaces the original's global mutable
//! state: it carries the viewport, the facing preference, the computed
//! display size, the reading gate, and exclusive ownership of the
//! active stream handle.

use crate::backends::ActiveStream;
use crate::capture::source::FrameSource;
use crate::sizing::{CaptureSize, ViewportSize};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Camera-facing preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FacingMode {
    /// Front camera, facing the user
    #[default]
    User,
    /// Rear camera, facing the environment
    Environment,
}

impl FacingMode {
    /// The opposite facing, for flip requests
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacingMode::User => write!(f, "user"),
            FacingMode::Environment => write!(f, "environment"),
        }
    }
}

/// Shared flag gating whether new sample tasks may be created
///
/// Cloned into the sampler task; cheap to read on every tick.
#[derive(Debug, Clone)]
pub struct ReadingGate(Arc<AtomicBool>);

impl ReadingGate {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn enable(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn disable(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_reading(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for ReadingGate {
    fn default() -> Self {
        Self::new()
    }
}

/// State for one capture session
pub struct CaptureSession {
    /// Viewport the capture surface is fit into; updated on resize
    pub viewport: ViewportSize,
    /// Current facing preference
    pub facing: FacingMode,
    /// Whether the platform honors facing-mode constraints
    pub supports_facing_switch: bool,
    /// Display size computed by the sizing algorithm
    pub frame_size: CaptureSize,
    /// Gate the sampler checks before creating sample tasks
    pub gate: ReadingGate,
    /// Exclusively owned stream; None while stopped
    stream: Option<ActiveStream>,
}

impl CaptureSession {
    pub fn new(viewport: ViewportSize, facing: FacingMode) -> Self {
        Self {
            viewport,
            facing,
            supports_facing_switch: false,
            frame_size: CaptureSize::default(),
            gate: ReadingGate::new(),
            stream: None,
        }
    }

    /// True while a stream handle is installed
    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    /// Install a freshly acquired stream, dropping any previous one
    pub fn install_stream(&mut self, stream: ActiveStream) {
        // A leftover handle means a missed stop; release it first
        self.stop_stream();
        self.stream = Some(stream);
    }

    /// Stop the device tracks and clear the handle
    pub fn stop_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            debug!(device = %stream.handle.device_label(), "Stopping stream tracks");
            stream.handle.stop();
        }
    }

    /// Shared frame source of the active stream, if any
    pub fn frame_source(&self) -> Option<Arc<dyn FrameSource>> {
        self.stream.as_ref().map(|s| Arc::clone(&s.source))
    }

    /// Label of the active device, if streaming
    pub fn device_label(&self) -> Option<&str> {
        self.stream.as_ref().map(|s| s.handle.device_label())
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop_stream();
    }
}
