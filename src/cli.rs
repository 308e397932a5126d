// SPDX-License-Identifier: GPL-3.0-only

//! CLI command implementations

use qrsnap::assets::{AssetCache, AssetManifest, DirFetcher};
use qrsnap::backends::file::FileCamera;
use qrsnap::clipboard::SystemClipboard;
use qrsnap::decoder::qr::QrDecoder;
use qrsnap::errors::{AppError, AppResult};
use qrsnap::sizing::{CaptureSize, ViewportSize};
use qrsnap::snapshot::Snapshot;
use qrsnap::ui::{LogUi, UiBridge};
use qrsnap::{Config, ScanService};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Parse a `WIDTHxHEIGHT` viewport argument
pub fn parse_viewport(arg: &str) -> AppResult<ViewportSize> {
    let (width, height) = arg
        .split_once(['x', 'X'])
        .ok_or_else(|| AppError::Other(format!("invalid viewport '{}', expected WxH", arg)))?;
    let width = width
        .trim()
        .parse()
        .map_err(|_| AppError::Other(format!("invalid viewport width '{}'", width)))?;
    let height = height
        .trim()
        .parse()
        .map_err(|_| AppError::Other(format!("invalid viewport height '{}'", height)))?;
    Ok(ViewportSize::new(width, height))
}

/// UI collaborator that also hands toasts to the CLI so `--once` can
/// exit on the first decoded result
struct CliUi {
    inner: LogUi,
    toast_tx: mpsc::UnboundedSender<String>,
}

impl UiBridge for CliUi {
    fn show_camera(&self) {
        self.inner.show_camera();
    }

    fn show_output(&self) {
        self.inner.show_output();
    }

    fn render_photo(&self, snapshot: &Snapshot) {
        self.inner.render_photo(snapshot);
    }

    fn transition_start(&self) {
        self.inner.transition_start();
    }

    fn transition_end(&self) {
        self.inner.transition_end();
    }

    fn toast(&self, text: &str) {
        self.inner.toast(text);
        let _ = self.toast_tx.send(text.to_string());
    }

    fn offer_download(&self, snapshot: &Snapshot, filename: &str) {
        self.inner.offer_download(snapshot, filename);
    }

    fn apply_dimensions(&self, size: CaptureSize) {
        self.inner.apply_dimensions(size);
    }

    fn set_flip_available(&self, available: bool) {
        self.inner.set_flip_available(available);
    }

    fn stream_failed(&self) {
        self.inner.stream_failed();
    }
}

/// Run the scanning pipeline over image files acting as cameras.
pub async fn scan(
    images: Vec<PathBuf>,
    viewport: ViewportSize,
    once: bool,
    mut config: Config,
    no_clipboard: bool,
) -> AppResult<()> {
    if no_clipboard {
        config.copy_to_clipboard = false;
    }

    let backend = Arc::new(FileCamera::new(&images));
    let (toast_tx, mut toast_rx) = mpsc::unbounded_channel();
    let ui = Arc::new(CliUi {
        inner: LogUi,
        toast_tx,
    });
    let (service, handle) = ScanService::new(
        config,
        viewport,
        backend,
        ui,
        Arc::new(SystemClipboard),
        Arc::new(QrDecoder::new()),
    );

    // Ctrl-C goes through the same command surface as everything else
    let signal_handle = handle.clone();
    ctrlc::set_handler(move || {
        signal_handle.shutdown();
    })
    .map_err(|e| AppError::Other(format!("signal handler: {}", e)))?;

    let runner = tokio::spawn(service.run());

    if once {
        if let Some(text) = toast_rx.recv().await {
            println!("{}", text);
            handle.shutdown();
        }
    }

    runner
        .await
        .map_err(|e| AppError::Other(format!("service task: {}", e)))?;
    Ok(())
}

/// Install the built-in manifest from a local bundle directory.
pub fn install_assets(bundle: PathBuf) -> AppResult<()> {
    let manifest = AssetManifest::builtin();
    let cache = AssetCache::default_location()?;
    let report = cache.install(&manifest, &DirFetcher::new(bundle))?;
    println!(
        "{}: {} cached, {} failed",
        manifest.cache_name(),
        report.cached,
        report.failed
    );
    Ok(())
}

/// Evict caches left behind by previous manifest versions.
pub fn activate_assets() -> AppResult<()> {
    let manifest = AssetManifest::builtin();
    let cache = AssetCache::default_location()?;
    let evicted = cache.activate(&manifest)?;
    println!("{}: {} stale caches removed", manifest.cache_name(), evicted);
    Ok(())
}
