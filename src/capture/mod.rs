// SPDX-License-Identifier: GPL-3.0-only

//! Frame sampling loop
//!
//! The sampler ticks on a fixed cadence and, while the reading gate is
//! open, snapshots the current frame and submits it to the decode
//! worker. Re-arming is always cancel-then-create so at most one
//! sampler task exists per session; the handle also aborts its task on
//! drop so no timer survives a teardown path.

pub mod source;

use crate::channel::DecodeChannel;
use crate::session::ReadingGate;
use self::source::FrameSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

/// Controller for the sampling task
pub struct Sampler {
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl Sampler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            task: None,
        }
    }

    /// Arm the sampling loop, cancelling any previous one first.
    ///
    /// Cancel-then-create rather than check-then-create: two calls in
    /// a row can never leave two live timers behind.
    pub fn restart(
        &mut self,
        gate: ReadingGate,
        source: Arc<dyn FrameSource>,
        channel: DecodeChannel,
    ) {
        self.cancel();
        debug!(interval_ms = self.interval.as_millis() as u64, "Arming sampler");
        self.task = Some(tokio::spawn(run_sampling_loop(
            self.interval,
            gate,
            source,
            channel,
        )));
    }

    /// Cancel the sampling loop if one is armed
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Sampler cancelled");
        }
    }

    /// True while a sampling task is armed
    pub fn is_armed(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_sampling_loop(
    interval: Duration,
    gate: ReadingGate,
    source: Arc<dyn FrameSource>,
    channel: DecodeChannel,
) {
    let mut ticker = tokio::time::interval(interval);
    // A missed tick means the system was busy; sampling is periodic
    // best-effort work, so skip rather than burst.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        if !gate.is_reading() {
            continue;
        }

        // Stream not ready yet: the tick is a no-op, the next one retries
        let Some(frame) = source.latest_frame() else {
            trace!("No frame available, tick skipped");
            continue;
        };
        if frame.is_empty() {
            trace!("Frame has no usable dimensions, tick skipped");
            continue;
        }

        let request_id = channel.submit(frame);
        trace!(request_id, "Sample submitted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelMessage;
    use crate::capture::source::{StillFrameSource, VideoFrame};

    fn still_source(width: u32, height: u32) -> Arc<dyn FrameSource> {
        let pixels: Arc<[u8]> = Arc::from(vec![0u8; (width * height * 4) as usize].as_slice());
        Arc::new(StillFrameSource::new(VideoFrame::new(width, height, pixels)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampler_submits_on_cadence() {
        let channel = DecodeChannel::new(16);
        let mut rx = channel.subscribe();
        let gate = ReadingGate::new();
        let mut sampler = Sampler::new(Duration::from_millis(250));

        sampler.restart(gate, still_source(4, 4), channel.clone());

        // Three ticks within ~750ms of virtual time
        for _ in 0..3 {
            match rx.recv().await.unwrap() {
                ChannelMessage::Process(task) => assert_eq!(task.width, 4),
                other => panic!("unexpected message: {:?}", other),
            }
        }
        sampler.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_gate_suppresses_samples() {
        let channel = DecodeChannel::new(16);
        let mut rx = channel.subscribe();
        let gate = ReadingGate::new();
        gate.disable();
        let mut sampler = Sampler::new(Duration::from_millis(250));

        sampler.restart(gate.clone(), still_source(4, 4), channel.clone());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());

        // Re-opening the gate resumes sampling on the next tick
        gate.enable();
        match rx.recv().await.unwrap() {
            ChannelMessage::Process(_) => {}
            other => panic!("unexpected message: {:?}", other),
        }
        sampler.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_previous_task() {
        let channel = DecodeChannel::new(16);
        let _rx = channel.subscribe();
        let gate = ReadingGate::new();
        let mut sampler = Sampler::new(Duration::from_millis(250));

        sampler.restart(gate.clone(), still_source(4, 4), channel.clone());
        assert!(sampler.is_armed());
        sampler.restart(gate, still_source(4, 4), channel.clone());
        assert!(sampler.is_armed());

        sampler.cancel();
        tokio::task::yield_now().await;
        assert!(!sampler.is_armed());
    }
}
