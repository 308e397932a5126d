// SPDX-License-Identifier: GPL-3.0-only

//! Decode worker
//!
//! The isolated decode context: a single task that receives sample
//! tasks from the worker channel, runs the decoder capability over
//! each one, and publishes results back. Each sample is processed to
//! completion before the next message is received, so the decoder is
//! never reentrant even though the capture side may have several
//! samples in flight.

pub mod qr;

use crate::channel::{ChannelMessage, DecodeChannel, DecodeResult, SampleTask};
use crate::errors::DecodeError;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// The decoder capability: raw pixels in, decoded text out
///
/// Implementations must be cheap to share; the worker invokes them on
/// the blocking pool.
pub trait SymbolDecoder: Send + Sync {
    fn decode(&self, task: &SampleTask) -> Result<String, DecodeError>;
}

/// Spawn the decode worker task.
///
/// The worker runs until the channel closes. Decode failures are
/// expected and silent: no result message is published for them.
pub fn spawn_decode_worker(
    channel: DecodeChannel,
    decoder: Arc<dyn SymbolDecoder>,
) -> JoinHandle<()> {
    let mut rx = channel.subscribe();
    tokio::spawn(async move {
        debug!("Decode worker started");
        loop {
            match rx.recv().await {
                Ok(ChannelMessage::Process(task)) => {
                    process_sample(&channel, &decoder, task).await;
                }
                // Result traffic on the same conduit is not for us
                Ok(ChannelMessage::Qr(_)) => {}
                Err(RecvError::Lagged(skipped)) => {
                    // Loss is tolerated; stale samples are not worth decoding
                    warn!(skipped, "Decode worker lagged, samples dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("Decode worker exiting");
    })
}

async fn process_sample(
    channel: &DecodeChannel,
    decoder: &Arc<dyn SymbolDecoder>,
    task: SampleTask,
) {
    // An empty sample can never decode; skip without emitting anything
    if task.width == 0 || task.height == 0 || task.pixels.is_empty() {
        trace!(request_id = task.request_id, "Empty sample, skipped");
        return;
    }

    let request_id = task.request_id;
    let decoder = Arc::clone(decoder);
    // Detection is CPU-heavy; run it on the blocking pool but await it
    // inline so samples are still handled strictly one at a time.
    let outcome = tokio::task::spawn_blocking(move || decoder.decode(&task)).await;

    match outcome {
        Ok(Ok(text)) => {
            debug!(request_id, "QR symbol decoded");
            channel.publish_result(DecodeResult { request_id, text });
        }
        Ok(Err(DecodeError::NoSymbol)) => {
            // The frequent case: nothing in frame, nothing to report
            trace!(request_id, "No symbol in sample");
        }
        Ok(Err(e)) => {
            trace!(request_id, error = %e, "Decode failed");
        }
        Err(e) => {
            warn!(request_id, error = %e, "Decode task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedDecoder {
        text: &'static str,
        calls: AtomicUsize,
    }

    impl SymbolDecoder for FixedDecoder {
        fn decode(&self, _task: &SampleTask) -> Result<String, DecodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.to_string())
        }
    }

    struct NeverDecoder;

    impl SymbolDecoder for NeverDecoder {
        fn decode(&self, _task: &SampleTask) -> Result<String, DecodeError> {
            Err(DecodeError::NoSymbol)
        }
    }

    fn sample(channel: &DecodeChannel, width: u32, height: u32) -> u64 {
        use crate::capture::source::VideoFrame;
        let pixels: Arc<[u8]> = Arc::from(vec![0u8; (width * height * 4) as usize].as_slice());
        channel.submit(VideoFrame::new(width, height, pixels))
    }

    #[tokio::test]
    async fn test_result_echoes_request_id() {
        let channel = DecodeChannel::new(16);
        let decoder = Arc::new(FixedDecoder {
            text: "HELLO",
            calls: AtomicUsize::new(0),
        });
        let worker = spawn_decode_worker(channel.clone(), decoder);
        let mut rx = channel.subscribe();

        let id = sample(&channel, 8, 8);
        loop {
            match rx.recv().await.unwrap() {
                ChannelMessage::Qr(result) => {
                    assert_eq!(result.request_id, id);
                    assert_eq!(result.text, "HELLO");
                    break;
                }
                ChannelMessage::Process(_) => {}
            }
        }
        worker.abort();
    }

    #[tokio::test]
    async fn test_zero_dimension_sample_never_decodes() {
        let channel = DecodeChannel::new(16);
        let decoder = Arc::new(FixedDecoder {
            text: "x",
            calls: AtomicUsize::new(0),
        });
        let worker = spawn_decode_worker(channel.clone(), Arc::clone(&decoder) as _);
        let mut rx = channel.subscribe();

        use crate::capture::source::VideoFrame;
        channel.submit(VideoFrame::new(0, 0, Arc::from(&[][..])));
        // Follow with a real sample so we can tell the worker is past
        // the empty one
        let id = sample(&channel, 8, 8);
        loop {
            match rx.recv().await.unwrap() {
                ChannelMessage::Qr(result) => {
                    assert_eq!(result.request_id, id);
                    break;
                }
                ChannelMessage::Process(_) => {}
            }
        }
        assert_eq!(decoder.calls.load(Ordering::SeqCst), 1);
        worker.abort();
    }

    #[tokio::test]
    async fn test_no_symbol_emits_no_message() {
        let channel = DecodeChannel::new(16);
        let worker = spawn_decode_worker(channel.clone(), Arc::new(NeverDecoder));
        let mut rx = channel.subscribe();

        sample(&channel, 8, 8);
        // The only traffic seen is our own Process message
        match rx.recv().await.unwrap() {
            ChannelMessage::Process(_) => {}
            other => panic!("unexpected message: {:?}", other),
        }
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        worker.abort();
    }
}
