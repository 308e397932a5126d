// SPDX-License-Identifier: GPL-3.0-only

//! UI collaborator boundary
//!
//! The core never owns UI state; it issues requests through this trait
//! and trusts the collaborator to render them. [`LogUi`] is the
//! default headless implementation, narrating every request through
//! tracing.

use crate::sizing::CaptureSize;
use crate::snapshot::Snapshot;
use tracing::{info, warn};

/// Requests the core makes of its UI collaborator
pub trait UiBridge: Send + Sync {
    /// Show the live camera panel, hiding the frozen output
    fn show_camera(&self);

    /// Show the frozen output panel, hiding the live camera
    fn show_output(&self);

    /// Render a snapshot into the photo surface
    fn render_photo(&self, snapshot: &Snapshot);

    /// Begin the transition indicator (opaque overlay)
    fn transition_start(&self);

    /// End the transition indicator
    fn transition_end(&self);

    /// Present a transient toast with decoded text
    fn toast(&self, text: &str);

    /// Offer a snapshot for download under the given filename
    fn offer_download(&self, snapshot: &Snapshot, filename: &str);

    /// Apply the computed display dimensions to the capture surface
    fn apply_dimensions(&self, size: CaptureSize);

    /// Enable or hide the camera-flip control
    fn set_flip_available(&self, available: bool);

    /// Surface a stream-acquisition failure; the start control is
    /// disabled until the collaborator decides otherwise
    fn stream_failed(&self);
}

/// Tracing-backed collaborator for headless runs
#[derive(Debug, Default)]
pub struct LogUi;

impl UiBridge for LogUi {
    fn show_camera(&self) {
        info!("UI: camera panel visible");
    }

    fn show_output(&self) {
        info!("UI: output panel visible");
    }

    fn render_photo(&self, snapshot: &Snapshot) {
        info!(
            width = snapshot.width,
            height = snapshot.height,
            bytes = snapshot.data_uri.len(),
            "UI: photo rendered"
        );
    }

    fn transition_start(&self) {
        info!("UI: transition start");
    }

    fn transition_end(&self) {
        info!("UI: transition end");
    }

    fn toast(&self, text: &str) {
        info!(text = %text, "UI: toast");
    }

    fn offer_download(&self, snapshot: &Snapshot, filename: &str) {
        info!(
            filename = %filename,
            width = snapshot.width,
            height = snapshot.height,
            "UI: download offered"
        );
    }

    fn apply_dimensions(&self, size: CaptureSize) {
        info!(width = size.width, height = size.height, "UI: capture surface sized");
    }

    fn set_flip_available(&self, available: bool) {
        info!(available, "UI: flip control availability");
    }

    fn stream_failed(&self) {
        warn!("UI: stream failed, start control disabled");
    }
}
