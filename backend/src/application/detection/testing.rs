//! Hand-written doubles for scripting detector and classifier timelines.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{oneshot, Mutex};

use super::sampling_loop::DetectionSink;
use crate::application::ports::{
    ClassificationPayload, ClassificationPort, Detector, FrameSource,
};
use crate::domain::{BoundingBox, CameraFacing, Detection, Frame, PipelineError, SessionId};

pub fn det(label: &str, confidence: f32) -> Detection {
    Detection::new(label, confidence, BoundingBox::default())
}

/// Always returns the same tiny JPEG-ish buffer.
#[derive(Default)]
pub struct StaticFrames {
    facing: StdMutex<CameraFacing>,
}

#[async_trait]
impl FrameSource for StaticFrames {
    async fn capture(&self) -> Result<Frame, PipelineError> {
        let facing = *self.facing.lock().unwrap();
        Ok(Frame::new(vec![0xff, 0xd8, 0xff, 0xd9], facing))
    }

    async fn switch_facing(&self, facing: CameraFacing) -> Result<(), PipelineError> {
        *self.facing.lock().unwrap() = facing;
        Ok(())
    }
}

/// Replays a script of results, then returns empty detection lists.
pub struct ScriptedDetector {
    script: StdMutex<VecDeque<Result<Vec<Detection>, PipelineError>>>,
    delay: Duration,
    calls: AtomicUsize,
    current: AtomicUsize,
    max_concurrent: AtomicUsize,
}

impl ScriptedDetector {
    pub fn new(script: Vec<Result<Vec<Detection>, PipelineError>>) -> Self {
        Self {
            script: StdMutex::new(script.into()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            current: AtomicUsize::new(0),
            max_concurrent: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Detector for ScriptedDetector {
    async fn detect(&self, _frame: &Frame) -> Result<Vec<Detection>, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();

        self.current.fetch_sub(1, Ordering::SeqCst);
        next.unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    batches: Mutex<Vec<(SessionId, Vec<Detection>)>>,
    failures: Mutex<Vec<(SessionId, PipelineError)>>,
}

impl RecordingSink {
    pub async fn batches(&self) -> Vec<(SessionId, Vec<Detection>)> {
        self.batches.lock().await.clone()
    }

    pub async fn failures(&self) -> Vec<(SessionId, PipelineError)> {
        self.failures.lock().await.clone()
    }
}

#[async_trait]
impl DetectionSink for RecordingSink {
    async fn accept(&self, session_id: SessionId, detections: Vec<Detection>) {
        self.batches.lock().await.push((session_id, detections));
    }

    async fn acquisition_failed(&self, session_id: SessionId, error: PipelineError) {
        self.failures.lock().await.push((session_id, error));
    }
}

/// Classifier whose calls block until the test releases them, in call order.
#[derive(Default)]
pub struct GatedClassifier {
    waiting: StdMutex<VecDeque<oneshot::Sender<Result<String, PipelineError>>>>,
    payloads: StdMutex<Vec<ClassificationPayload>>,
    calls: AtomicUsize,
    current: AtomicUsize,
    max_concurrent: AtomicUsize,
}

impl GatedClassifier {
    /// Answer the oldest outstanding call. Returns false if that call was
    /// already dropped (its future cancelled) or no call is outstanding.
    pub fn answer(&self, result: Result<String, PipelineError>) -> bool {
        let next = self.waiting.lock().unwrap().pop_front();
        match next {
            Some(tx) => tx.send(result).is_ok(),
            None => false,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.load(Ordering::SeqCst)
    }

    pub fn payloads(&self) -> Vec<ClassificationPayload> {
        self.payloads.lock().unwrap().clone()
    }
}

struct Outstanding<'a>(&'a AtomicUsize);

impl Drop for Outstanding<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClassificationPort for GatedClassifier {
    async fn classify(&self, payload: &ClassificationPayload) -> Result<String, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload.clone());
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(now, Ordering::SeqCst);
        let _outstanding = Outstanding(&self.current);

        let (tx, rx) = oneshot::channel();
        self.waiting.lock().unwrap().push_back(tx);
        match rx.await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Classification("gate dropped".into())),
        }
    }
}
