// SPDX-License-Identifier: GPL-3.0-only

//! Result handshake
//!
//! Consumes decode results from the worker channel. An accepted result
//! immediately stops further sampling (gate off, sampler cancelled)
//! and arms a single-slot debounce timer: any newer result arriving
//! inside the window replaces the pending one, so only the most recent
//! result within 500 ms settles. Settled results are delivered to the
//! orchestrator, which performs the clipboard copy and the freeze +
//! toast sequence.
//!
//! Results carry the request id of the sample that produced them; a
//! result older than the newest already-accepted one is discarded as
//! stale. A result arriving after sampling was manually restarted is
//! still accepted.

use crate::capture::Sampler;
use crate::channel::DecodeResult;
use crate::session::ReadingGate;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Debounced consumer of decode results
pub struct ResultHandshake {
    debounce: Duration,
    settled_tx: mpsc::UnboundedSender<DecodeResult>,
    pending: Option<JoinHandle<()>>,
    newest_request: u64,
}

impl ResultHandshake {
    /// `settled_tx` receives the surviving result once the debounce
    /// window elapses.
    pub fn new(debounce: Duration, settled_tx: mpsc::UnboundedSender<DecodeResult>) -> Self {
        Self {
            debounce,
            settled_tx,
            pending: None,
            newest_request: 0,
        }
    }

    /// Handle one decode result from the channel.
    pub fn on_result(&mut self, result: DecodeResult, gate: &ReadingGate, sampler: &mut Sampler) {
        if result.request_id < self.newest_request {
            debug!(
                request_id = result.request_id,
                newest = self.newest_request,
                "Stale decode result discarded"
            );
            return;
        }
        self.newest_request = result.request_id;

        debug!(request_id = result.request_id, "Decode result accepted");
        gate.disable();
        sampler.cancel();

        // Single-slot debounce: replace, never queue
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        let tx = self.settled_tx.clone();
        let window = self.debounce;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let _ = tx.send(result);
        }));
    }

    /// Drop any pending debounce without delivering it
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl Drop for ResultHandshake {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::timing::{RESULT_DEBOUNCE, SAMPLE_INTERVAL};

    fn result(request_id: u64, text: &str) -> DecodeResult {
        DecodeResult {
            request_id,
            text: text.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_settles_after_window() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handshake = ResultHandshake::new(RESULT_DEBOUNCE, tx);
        let gate = ReadingGate::new();
        let mut sampler = Sampler::new(SAMPLE_INTERVAL);

        handshake.on_result(result(1, "HELLO"), &gate, &mut sampler);
        assert!(!gate.is_reading());

        let settled = rx.recv().await.unwrap();
        assert_eq!(settled.text, "HELLO");
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_result_replaces_pending() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handshake = ResultHandshake::new(RESULT_DEBOUNCE, tx);
        let gate = ReadingGate::new();
        let mut sampler = Sampler::new(SAMPLE_INTERVAL);

        handshake.on_result(result(1, "first"), &gate, &mut sampler);
        tokio::time::sleep(Duration::from_millis(200)).await;
        handshake.on_result(result(2, "second"), &gate, &mut sampler);

        // Only the most recent result within the window survives
        let settled = rx.recv().await.unwrap();
        assert_eq!(settled.text, "second");
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_result_discarded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handshake = ResultHandshake::new(RESULT_DEBOUNCE, tx);
        let gate = ReadingGate::new();
        let mut sampler = Sampler::new(SAMPLE_INTERVAL);

        handshake.on_result(result(5, "fresh"), &gate, &mut sampler);
        let settled = rx.recv().await.unwrap();
        assert_eq!(settled.text, "fresh");

        // Gate manually re-enabled, then an out-of-order result arrives
        gate.enable();
        handshake.on_result(result(3, "stale"), &gate, &mut sampler);
        assert!(gate.is_reading(), "stale result must not touch the gate");
        tokio::time::sleep(RESULT_DEBOUNCE * 2).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handshake = ResultHandshake::new(RESULT_DEBOUNCE, tx);
        let gate = ReadingGate::new();
        let mut sampler = Sampler::new(SAMPLE_INTERVAL);

        handshake.on_result(result(1, "x"), &gate, &mut sampler);
        handshake.cancel();
        tokio::time::sleep(RESULT_DEBOUNCE * 2).await;
        assert!(rx.try_recv().is_err());
    }
}
