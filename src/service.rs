// SPDX-License-Identifier: GPL-3.0-only

//! Scan service orchestration
//!
//! `ScanService` owns the whole pipeline: the lifecycle manager (and
//! with it the session), the sampler, the decode worker on the far
//! side of the worker channel, and the result handshake. External
//! drivers steer it through [`ScanHandle`] commands; timers report
//! back through internal channels so every piece of work happens on
//! the service loop.

use crate::backends::CameraBackend;
use crate::capture::Sampler;
use crate::channel::{ChannelMessage, DecodeChannel, DecodeResult};
use crate::clipboard::{self, ClipboardWriter};
use crate::config::Config;
use crate::constants::channel::CHANNEL_CAPACITY;
use crate::decoder::{SymbolDecoder, spawn_decode_worker};
use crate::handshake::ResultHandshake;
use crate::lifecycle::StreamLifecycle;
use crate::session::CaptureSession;
use crate::sizing::ViewportSize;
use crate::snapshot::{self, Snapshot};
use crate::ui::UiBridge;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Requests an external driver can make of the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Acquire the stream and start scanning
    Start,
    /// The hosting viewport changed size
    Resize { width: u32, height: u32 },
    /// The hosting page went to or returned from the background
    VisibilityChanged { hidden: bool },
    /// Switch between user- and environment-facing cameras
    FlipCamera,
    /// Freeze the current frame into the output panel
    TakePicture,
    /// Clear the frozen photo and resume scanning
    ClearPhoto,
    /// Offer the current photo for download
    DownloadSnapshot,
    /// Stop everything and exit the service loop
    Shutdown,
}

/// Cloneable handle for steering a running service
#[derive(Debug, Clone)]
pub struct ScanHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl ScanHandle {
    /// Send a command; false if the service already exited
    pub fn send(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }
}

/// The assembled scanning pipeline
pub struct ScanService {
    config: Config,
    ui: Arc<dyn UiBridge>,
    clipboard: Arc<dyn ClipboardWriter>,
    channel: DecodeChannel,
    lifecycle: StreamLifecycle,
    sampler: Sampler,
    handshake: ResultHandshake,
    decode_worker: JoinHandle<()>,
    last_snapshot: Option<Snapshot>,
    commands: mpsc::UnboundedReceiver<Command>,
    settled_rx: mpsc::UnboundedReceiver<DecodeResult>,
    restart_rx: mpsc::UnboundedReceiver<()>,
}

impl ScanService {
    pub fn new(
        config: Config,
        viewport: ViewportSize,
        backend: Arc<dyn CameraBackend>,
        ui: Arc<dyn UiBridge>,
        clipboard: Arc<dyn ClipboardWriter>,
        decoder: Arc<dyn SymbolDecoder>,
    ) -> (Self, ScanHandle) {
        let channel = DecodeChannel::new(CHANNEL_CAPACITY);
        let decode_worker = spawn_decode_worker(channel.clone(), decoder);

        let (command_tx, commands) = mpsc::unbounded_channel();
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let (restart_tx, restart_rx) = mpsc::unbounded_channel();

        let session = CaptureSession::new(viewport, config.facing);
        let lifecycle = StreamLifecycle::new(
            backend,
            Arc::clone(&ui),
            session,
            config.resize_debounce(),
            restart_tx,
        );
        let sampler = Sampler::new(config.sample_interval());
        let handshake = ResultHandshake::new(config.result_debounce(), settled_tx);

        let service = Self {
            config,
            ui,
            clipboard,
            channel,
            lifecycle,
            sampler,
            handshake,
            decode_worker,
            last_snapshot: None,
            commands,
            settled_rx,
            restart_rx,
        };
        (service, ScanHandle { tx: command_tx })
    }

    /// Run the service loop until shutdown.
    ///
    /// The stream is acquired on entry, mirroring a page-load start;
    /// an explicit `Start` command re-acquires after a failure or a
    /// hide.
    pub async fn run(mut self) {
        let mut messages = self.channel.subscribe();

        self.lifecycle.detect_flip_support().await;
        self.ui.transition_start();
        self.lifecycle
            .initiate(None, &mut self.sampler, &self.channel)
            .await;

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        None | Some(Command::Shutdown) => break,
                        Some(command) => self.handle_command(command).await,
                    }
                }
                Some(()) = self.restart_rx.recv() => {
                    debug!("Resize settled, re-acquiring stream");
                    self.lifecycle
                        .initiate(None, &mut self.sampler, &self.channel)
                        .await;
                }
                Some(result) = self.settled_rx.recv() => {
                    self.on_result_settled(result).await;
                }
                message = messages.recv() => self.on_channel_message(message),
            }
        }

        self.teardown();
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start => {
                self.ui.transition_start();
                self.lifecycle
                    .initiate(None, &mut self.sampler, &self.channel)
                    .await;
            }
            Command::Resize { width, height } => {
                self.lifecycle
                    .handle_resize(ViewportSize::new(width, height), &mut self.sampler);
            }
            Command::VisibilityChanged { hidden } => {
                if hidden {
                    self.lifecycle.handle_hidden(&mut self.sampler);
                } else {
                    self.lifecycle
                        .initiate(None, &mut self.sampler, &self.channel)
                        .await;
                }
            }
            Command::FlipCamera => {
                self.lifecycle.flip(&mut self.sampler, &self.channel).await;
            }
            Command::TakePicture => self.take_picture(),
            Command::ClearPhoto => self.clear_photo(),
            Command::DownloadSnapshot => self.download_snapshot(),
            // Handled by the run loop before we get here
            Command::Shutdown => {}
        }
    }

    fn on_channel_message(&mut self, message: Result<ChannelMessage, RecvError>) {
        match message {
            Ok(ChannelMessage::Qr(result)) => {
                self.handshake.on_result(
                    result,
                    &self.lifecycle.session.gate,
                    &mut self.sampler,
                );
            }
            // Our own outbound sample traffic echoes back; not for us
            Ok(ChannelMessage::Process(_)) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Service lagged on channel traffic");
            }
            Err(RecvError::Closed) => {}
        }
    }

    /// A decode result survived the debounce window: copy, freeze,
    /// notify.
    async fn on_result_settled(&mut self, result: DecodeResult) {
        info!(request_id = result.request_id, text = %result.text, "QR code data settled");

        if self.config.copy_to_clipboard {
            let writer = Arc::clone(&self.clipboard);
            let text = result.text.clone();
            // Clipboard access can block on some platforms
            let _ = tokio::task::spawn_blocking(move || {
                clipboard::copy_text(writer.as_ref(), &text)
            })
            .await;
        }

        self.take_picture();
        self.ui.toast(&result.text);
    }

    /// Freeze the current frame into the output panel. Without a
    /// usable frame this degrades to the cleared state.
    fn take_picture(&mut self) {
        self.ui.transition_start();
        let frame = self
            .lifecycle
            .session
            .frame_source()
            .and_then(|source| source.latest_frame());

        match frame.map(|f| snapshot::render_frame(&f)) {
            Some(Ok(snap)) => {
                self.ui.render_photo(&snap);
                self.ui.show_output();
                self.ui.transition_end();
                self.last_snapshot = Some(snap);
            }
            _ => self.clear_photo(),
        }
    }

    /// Clear the photo, re-open the gate, and re-arm the sampler.
    fn clear_photo(&mut self) {
        self.ui.transition_start();

        let size = self.lifecycle.session.frame_size;
        match snapshot::placeholder(size.width, size.height) {
            Ok(snap) => {
                self.ui.render_photo(&snap);
                self.last_snapshot = Some(snap);
            }
            Err(_) => debug!("No capture size yet, placeholder skipped"),
        }

        self.ui.show_camera();
        self.lifecycle.session.gate.enable();
        if let Some(source) = self.lifecycle.session.frame_source() {
            self.sampler.restart(
                self.lifecycle.session.gate.clone(),
                source,
                self.channel.clone(),
            );
        }
        self.ui.transition_end();
    }

    fn download_snapshot(&self) {
        let Some(snap) = self.last_snapshot.as_ref() else {
            debug!("No snapshot to download");
            return;
        };
        let filename = snapshot::download_filename(chrono::Local::now());
        self.ui.offer_download(snap, &filename);
    }

    fn teardown(&mut self) {
        self.handshake.cancel();
        self.lifecycle.teardown(&mut self.sampler);
        self.decode_worker.abort();
        info!("Scan service stopped");
    }
}
