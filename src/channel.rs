// SPDX-License-Identifier: GPL-3.0-only

//! Worker channel between the capture side and the decode worker
//!
//! A broadcast-style conduit carrying tagged messages in both
//! directions. Delivery is fire-and-forget: a send with no live
//! receiver is dropped silently, and a receiver that falls behind
//! skips the missed messages. No message is ever retried.
//!
//! Every sample task carries a monotonically increasing request id,
//! echoed in the decode result, so the consumer can recognize stale
//! or out-of-order results.

use crate::capture::source::VideoFrame;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::trace;

/// One frame submitted for decoding
///
/// The pixel buffer is a snapshot taken at sampling time, never a live
/// reference; it is consumed exactly once by the decode worker and
/// never mutated after creation.
#[derive(Debug, Clone)]
pub struct SampleTask {
    /// Monotonic id stamped by the channel at submit time
    pub request_id: u64,
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA pixels
    pub pixels: Arc<[u8]>,
}

/// A successful decode, flowing back from the decode worker
#[derive(Debug, Clone)]
pub struct DecodeResult {
    /// Echo of the sample task's request id
    pub request_id: u64,
    /// Decoded text payload
    pub text: String,
}

/// Tagged message crossing the capture/decode boundary
#[derive(Debug, Clone)]
pub enum ChannelMessage {
    /// Capture side -> decode worker: one frame to scan
    Process(SampleTask),
    /// Decode worker -> capture side: decoded payload
    Qr(DecodeResult),
}

/// Duplex broadcast conduit with request-id stamping
#[derive(Clone)]
pub struct DecodeChannel {
    tx: broadcast::Sender<ChannelMessage>,
    next_request: Arc<AtomicU64>,
}

impl DecodeChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            next_request: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Subscribe to all traffic on the channel. Each subscriber sees
    /// every message sent after it subscribed; consumers ignore the
    /// message kinds they did not ask for.
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelMessage> {
        self.tx.subscribe()
    }

    /// Submit a frame for decoding and return its request id.
    ///
    /// If the decode worker is not (yet) listening the message is
    /// dropped; no error is surfaced to the sender.
    pub fn submit(&self, frame: VideoFrame) -> u64 {
        let request_id = self.next_request.fetch_add(1, Ordering::Relaxed);
        let task = SampleTask {
            request_id,
            width: frame.width,
            height: frame.height,
            pixels: frame.pixels,
        };
        if self.tx.send(ChannelMessage::Process(task)).is_err() {
            trace!(request_id, "No decode context listening, sample dropped");
        }
        request_id
    }

    /// Publish a decode result back to the capture side.
    pub fn publish_result(&self, result: DecodeResult) {
        let request_id = result.request_id;
        if self.tx.send(ChannelMessage::Qr(result)).is_err() {
            trace!(request_id, "No consumer listening, result dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32, height: u32) -> VideoFrame {
        let pixels: Arc<[u8]> = Arc::from(vec![0u8; (width * height * 4) as usize].as_slice());
        VideoFrame::new(width, height, pixels)
    }

    #[test]
    fn test_request_ids_are_monotonic() {
        let channel = DecodeChannel::new(8);
        let _rx = channel.subscribe();
        let first = channel.submit(frame(2, 2));
        let second = channel.submit(frame(2, 2));
        assert!(second > first);
    }

    #[test]
    fn test_send_without_receiver_is_silent() {
        let channel = DecodeChannel::new(8);
        // No subscriber exists; the message is dropped without error
        channel.submit(frame(2, 2));
        channel.publish_result(DecodeResult {
            request_id: 1,
            text: "x".into(),
        });
    }

    #[tokio::test]
    async fn test_round_trip() {
        let channel = DecodeChannel::new(8);
        let mut rx = channel.subscribe();
        let id = channel.submit(frame(4, 4));
        match rx.recv().await.unwrap() {
            ChannelMessage::Process(task) => {
                assert_eq!(task.request_id, id);
                assert_eq!(task.width, 4);
                assert_eq!(task.pixels.len(), 64);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
