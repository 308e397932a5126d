// SPDX-License-Identifier: GPL-3.0-only

//! Stream lifecycle management
//!
//! State machine over `stopped / acquiring / streaming`. Explicit
//! start, visibility changes, debounced resize restarts, and
//! facing-flip requests all funnel through here; the active stream
//! handle is owned by the session inside this manager and released on
//! every stop path together with the sampler.

use crate::backends::{CameraBackend, StreamConstraints};
use crate::capture::Sampler;
use crate::channel::DecodeChannel;
use crate::session::CaptureSession;
use crate::sizing::{self, ViewportSize};
use crate::ui::UiBridge;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lifecycle states of the camera stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// No stream and no restart pending
    #[default]
    Stopped,
    /// Acquisition in progress, or a debounced restart pending
    Acquiring,
    /// Stream live, sampler armed
    Streaming,
}

/// Owner of the camera stream and its transitions
pub struct StreamLifecycle {
    backend: Arc<dyn CameraBackend>,
    ui: Arc<dyn UiBridge>,
    pub session: CaptureSession,
    state: StreamState,
    resize_debounce: Duration,
    restart_timer: Option<JoinHandle<()>>,
    restart_tx: mpsc::UnboundedSender<()>,
}

impl StreamLifecycle {
    /// `restart_tx` fires once per settled resize; the orchestrator
    /// answers it by calling [`StreamLifecycle::initiate`] again.
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        ui: Arc<dyn UiBridge>,
        session: CaptureSession,
        resize_debounce: Duration,
        restart_tx: mpsc::UnboundedSender<()>,
    ) -> Self {
        Self {
            backend,
            ui,
            session,
            state: StreamState::Stopped,
            resize_debounce,
            restart_timer: None,
            restart_tx,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Probe flip support: facing-mode constraints if the backend has
    /// them, otherwise more than one enumerable device.
    pub async fn detect_flip_support(&mut self) {
        if self.backend.supported_constraints().facing_mode {
            self.session.supports_facing_switch = true;
            self.ui.set_flip_available(true);
            return;
        }
        let devices = self.backend.enumerate_devices().await;
        if devices.len() > 1 {
            self.ui.set_flip_available(true);
        }
    }

    /// Acquire a stream and arm the sampler.
    ///
    /// `None` constraints request any video device. On failure the
    /// state returns to stopped, the failure is surfaced through the
    /// UI collaborator, and nothing is retried.
    pub async fn initiate(
        &mut self,
        constraints: Option<StreamConstraints>,
        sampler: &mut Sampler,
        channel: &DecodeChannel,
    ) {
        let constraints = constraints.unwrap_or_default();
        self.state = StreamState::Acquiring;
        debug!(?constraints, "Acquiring camera stream");

        match self.backend.open(&constraints).await {
            Ok(stream) => {
                self.session.install_stream(stream);
                let intrinsic = self
                    .session
                    .frame_source()
                    .map(|s| s.intrinsic_size())
                    .unwrap_or((0, 0));
                self.session.frame_size =
                    sizing::fit_capture_size(self.session.viewport, intrinsic);
                self.ui.apply_dimensions(self.session.frame_size);
                self.ui.transition_end();

                if let Some(source) = self.session.frame_source() {
                    sampler.restart(self.session.gate.clone(), source, channel.clone());
                }
                self.state = StreamState::Streaming;
                info!(
                    device = self.session.device_label().unwrap_or("unknown"),
                    size = %self.session.frame_size,
                    "Camera stream live"
                );
            }
            Err(e) => {
                warn!(error = %e, "Camera acquisition failed");
                self.ui.stream_failed();
                self.state = StreamState::Stopped;
            }
        }
    }

    /// Viewport changed. While streaming, stop immediately and
    /// debounce the restart so a resize storm costs one re-acquisition.
    pub fn handle_resize(&mut self, viewport: ViewportSize, sampler: &mut Sampler) {
        self.session.viewport = viewport;
        if !self.session.is_streaming() {
            return;
        }

        self.ui.transition_start();
        self.stop_tracks(sampler);
        self.state = StreamState::Acquiring;

        // Cancel-then-create: a pending restart never overlaps a new one
        if let Some(timer) = self.restart_timer.take() {
            timer.abort();
        }
        let tx = self.restart_tx.clone();
        let delay = self.resize_debounce;
        self.restart_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(());
        }));
    }

    /// Page went to the background: stop immediately, no restart until
    /// it becomes visible again.
    pub fn handle_hidden(&mut self, sampler: &mut Sampler) {
        if !self.session.is_streaming() {
            return;
        }
        self.ui.transition_start();
        self.stop_tracks(sampler);
        self.state = StreamState::Stopped;
    }

    /// Toggle the facing preference and re-acquire.
    ///
    /// Backends without facing-mode constraints fall back to picking
    /// the first enumerated device whose label differs from the one
    /// that was active; a heuristic, not a guaranteed selection.
    pub async fn flip(&mut self, sampler: &mut Sampler, channel: &DecodeChannel) {
        self.session.facing = self.session.facing.toggled();
        let previous_label = self.session.device_label().map(str::to_string);

        if self.session.is_streaming() {
            self.ui.transition_start();
            self.stop_tracks(sampler);
        }

        let constraints = if self.session.supports_facing_switch {
            StreamConstraints::facing(self.session.facing)
        } else {
            let devices = self.backend.enumerate_devices().await;
            devices
                .iter()
                .find(|d| Some(d.label.as_str()) != previous_label.as_deref())
                .map(|d| StreamConstraints::device(d.id.clone()))
                .unwrap_or_default()
        };

        self.initiate(Some(constraints), sampler, channel).await;
    }

    /// Release everything: pending restart, sampler, stream tracks.
    pub fn teardown(&mut self, sampler: &mut Sampler) {
        if let Some(timer) = self.restart_timer.take() {
            timer.abort();
        }
        self.stop_tracks(sampler);
        self.state = StreamState::Stopped;
    }

    fn stop_tracks(&mut self, sampler: &mut Sampler) {
        sampler.cancel();
        self.session.stop_stream();
    }
}

impl Drop for StreamLifecycle {
    fn drop(&mut self) {
        if let Some(timer) = self.restart_timer.take() {
            timer.abort();
        }
    }
}
