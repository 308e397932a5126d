// SPDX-License-Identifier: GPL-3.0-only

//! Camera platform abstraction
//!
//! The scanner never talks to a device API directly; it acquires
//! streams through the [`CameraBackend`] trait. The built-in
//! [`FileCamera`](file::FileCamera) backend streams still frames from
//! image files, which is what the CLI and the tests use.

pub mod file;

use crate::capture::source::FrameSource;
use crate::errors::CameraError;
use crate::session::FacingMode;
use async_trait::async_trait;
use std::sync::Arc;

/// A camera device visible to the backend
#[derive(Debug, Clone)]
pub struct CameraDevice {
    /// Backend-specific identifier, stable across enumerations
    pub id: String,
    /// Human-readable label; used by the facing-flip heuristic to
    /// exclude the currently active device
    pub label: String,
}

/// Constraint features the backend can honor
#[derive(Debug, Clone, Copy, Default)]
pub struct SupportedConstraints {
    /// True when the backend can select a device by facing mode
    pub facing_mode: bool,
}

/// Requested properties for a stream acquisition
///
/// The default value means "any video device", the equivalent of a
/// bare `{ video: true }` request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamConstraints {
    pub facing: Option<FacingMode>,
    pub device_id: Option<String>,
}

impl StreamConstraints {
    /// Constrain by facing mode (backends that support it)
    pub fn facing(mode: FacingMode) -> Self {
        Self {
            facing: Some(mode),
            device_id: None,
        }
    }

    /// Constrain to an explicit device
    pub fn device(id: String) -> Self {
        Self {
            facing: None,
            device_id: Some(id),
        }
    }
}

/// Exclusive handle on an acquired stream's device tracks
///
/// Owned by the capture session; `stop` releases the device. Dropping
/// the handle without stopping is allowed but backends must release
/// resources either way.
pub trait StreamHandle: Send {
    /// Label of the device backing this stream
    fn device_label(&self) -> &str;

    /// Stop all tracks and release the device
    fn stop(&mut self);
}

/// An acquired stream: the exclusively-owned handle plus the shared
/// read-only frame source consumers sample from
pub struct ActiveStream {
    pub handle: Box<dyn StreamHandle>,
    pub source: Arc<dyn FrameSource>,
}

impl std::fmt::Debug for ActiveStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveStream")
            .field("handle", &self.handle.device_label())
            .finish_non_exhaustive()
    }
}

/// Camera backend boundary
#[async_trait]
pub trait CameraBackend: Send + Sync {
    /// Which constraint features this backend honors
    fn supported_constraints(&self) -> SupportedConstraints;

    /// Enumerate the video devices this backend can open
    async fn enumerate_devices(&self) -> Vec<CameraDevice>;

    /// Acquire a stream satisfying the constraints.
    ///
    /// Failures are fatal to the current attempt and are not retried
    /// by the backend; the lifecycle manager surfaces them.
    async fn open(&self, constraints: &StreamConstraints) -> Result<ActiveStream, CameraError>;
}
