use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OwnedSemaphorePermit;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::call_slot::CallSlot;
use crate::application::ports::{Detector, FrameSource};
use crate::domain::{Detection, PipelineError, SessionId};

pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// Receives what each tick produced, tagged with the session that asked.
#[async_trait]
pub trait DetectionSink: Send + Sync + 'static {
    async fn accept(&self, session_id: SessionId, detections: Vec<Detection>);

    /// Called at most once per loop run, on the first failed capture.
    async fn acquisition_failed(&self, session_id: SessionId, error: PipelineError);
}

struct RunningLoop {
    session_id: SessionId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Periodic capture + detect while a session is active.
///
/// The detector slot belongs to the device, not to one run: a detector call
/// left over from a stopped session still blocks new calls until it returns.
pub struct SamplingLoop {
    frames: Arc<dyn FrameSource>,
    detector: Arc<dyn Detector>,
    detector_slot: CallSlot,
    running: Option<RunningLoop>,
}

impl SamplingLoop {
    pub fn new(
        frames: Arc<dyn FrameSource>,
        detector: Arc<dyn Detector>,
        detector_slot: CallSlot,
    ) -> Self {
        Self {
            frames,
            detector,
            detector_slot,
            running: None,
        }
    }

    /// Begin ticking for `session_id`. A loop already running is stopped first.
    pub fn start(&mut self, session_id: SessionId, tick: Duration, sink: Arc<dyn DetectionSink>) {
        self.stop();

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(
            session_id,
            tick,
            Arc::clone(&self.frames),
            Arc::clone(&self.detector),
            self.detector_slot.clone(),
            sink,
            cancel.clone(),
        ));
        debug!("[session {}] sampling every {:?}", session_id, tick);

        self.running = Some(RunningLoop {
            session_id,
            cancel,
            task,
        });
    }

    /// Halt ticking. Safe to call repeatedly; an outstanding detector call is
    /// left to finish and its result is dropped by the sink.
    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
            debug!("[session {}] sampling stopped", running.session_id);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .map(|r| !r.cancel.is_cancelled() && !r.task.is_finished())
            .unwrap_or(false)
    }

    pub fn detection_in_flight(&self) -> bool {
        self.detector_slot.is_busy()
    }
}

impl Drop for SamplingLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    session_id: SessionId,
    tick: Duration,
    frames: Arc<dyn FrameSource>,
    detector: Arc<dyn Detector>,
    detector_slot: CallSlot,
    sink: Arc<dyn DetectionSink>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let reported = Arc::new(AtomicBool::new(false));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        // drop, don't queue: only the freshest frame matters
        let Some(permit) = detector_slot.try_claim() else {
            trace!("[session {}] detector busy, tick skipped", session_id);
            continue;
        };

        tokio::spawn(sample_once(
            session_id,
            Arc::clone(&frames),
            Arc::clone(&detector),
            Arc::clone(&sink),
            Arc::clone(&reported),
            permit,
        ));
    }
}

async fn sample_once(
    session_id: SessionId,
    frames: Arc<dyn FrameSource>,
    detector: Arc<dyn Detector>,
    sink: Arc<dyn DetectionSink>,
    reported: Arc<AtomicBool>,
    _permit: OwnedSemaphorePermit,
) {
    let frame = match frames.capture().await {
        Ok(frame) => frame,
        Err(e) => {
            if !reported.swap(true, Ordering::AcqRel) {
                warn!("[session {}] frame capture failed: {}", session_id, e);
                sink.acquisition_failed(session_id, e).await;
            } else {
                trace!("[session {}] frame capture failed again: {}", session_id, e);
            }
            return;
        }
    };

    match detector.detect(&frame).await {
        Ok(detections) => sink.accept(session_id, detections).await,
        Err(e) => warn!("[session {}] detection failed, tick dropped: {}", session_id, e),
    }
}
