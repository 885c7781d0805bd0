use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::call_slot::CallSlot;
use super::label_merge::LabelMergePolicy;
use crate::application::ports::{ClassificationPayload, ClassificationPort, Detector, FrameSource};
use crate::domain::{AggregatedLabelSet, Frame, PipelineError, SessionId};

pub const DEFAULT_CLASSIFICATION_TIMEOUT: Duration = Duration::from_secs(15);

/// Built once per session, at finalization.
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    pub session_id: SessionId,
    pub frame: Option<Frame>,
    pub labels: AggregatedLabelSet,
    pub secondary_labels: Option<Vec<String>>,
}

/// Exactly one of these is produced per finalized session.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub session_id: SessionId,
    pub outcome: Result<String, PipelineError>,
}

/// Independent detector consulted once on the frozen frame.
#[derive(Clone)]
pub struct SecondarySource {
    pub detector: Arc<dyn Detector>,
    pub confidence_threshold: f32,
}

/// Turns a finished session's labels into one classification call.
///
/// Single attempt per session; failures and timeouts become an error result
/// instead of propagating.
pub struct ClassificationCoordinator {
    frames: Arc<dyn FrameSource>,
    classifier: Arc<dyn ClassificationPort>,
    secondary: Option<SecondarySource>,
    detector_slot: CallSlot,
    merge: LabelMergePolicy,
    timeout: Duration,
}

impl ClassificationCoordinator {
    pub fn new(
        frames: Arc<dyn FrameSource>,
        classifier: Arc<dyn ClassificationPort>,
        merge: LabelMergePolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            frames,
            classifier,
            secondary: None,
            detector_slot: CallSlot::new(),
            merge,
            timeout,
        }
    }

    pub fn with_secondary(mut self, secondary: SecondarySource) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Share the device's detector slot so the secondary call waits for any
    /// sampling call still outstanding.
    pub fn with_detector_slot(mut self, slot: CallSlot) -> Self {
        self.detector_slot = slot;
        self
    }

    /// Freeze a frame and, if configured, ask the secondary source about it.
    pub async fn prepare(&self, session_id: SessionId, labels: AggregatedLabelSet) -> ClassificationRequest {
        let frame = match self.bounded(self.frames.capture()).await {
            Ok(frame) if !frame.is_empty() => Some(frame),
            Ok(_) => None,
            Err(e) => {
                warn!("[session {}] no frame to freeze, classifying labels only: {}", session_id, e);
                None
            }
        };

        let secondary_labels = match (&self.secondary, &frame) {
            (Some(secondary), Some(frame)) => {
                let detection = self.bounded(async {
                    let _permit = self.detector_slot.claim().await;
                    secondary.detector.detect(frame).await
                });
                match detection.await {
                    Ok(detections) => {
                        let mut names: Vec<String> = Vec::new();
                        for d in detections
                            .into_iter()
                            .filter(|d| d.confidence >= secondary.confidence_threshold)
                        {
                            if !names.contains(&d.label) {
                                names.push(d.label);
                            }
                        }
                        Some(names)
                    }
                    Err(e) => {
                        warn!("[session {}] secondary detection unavailable: {}", session_id, e);
                        None
                    }
                }
            }
            _ => None,
        };

        ClassificationRequest {
            session_id,
            frame,
            labels,
            secondary_labels,
        }
    }

    /// Submit the request and tag whatever comes back with its session.
    pub async fn finalize(&self, request: ClassificationRequest) -> ClassificationResult {
        let session_id = request.session_id;
        let merged = self
            .merge
            .merge(&request.labels, request.secondary_labels.as_deref());
        let payload = ClassificationPayload {
            image: request.frame.map(|f| f.data().clone()),
            labels: merged.labels,
            secondary_labels: merged.secondary,
        };

        if payload.image.is_none() && payload.labels.is_empty() {
            info!("[session {}] nothing detected and no frame, skipping classification", session_id);
            return ClassificationResult {
                session_id,
                outcome: Err(PipelineError::NothingToClassify),
            };
        }

        debug!(
            "[session {}] classifying labels={:?} secondary={:?} image={}",
            session_id,
            payload.labels,
            payload.secondary_labels,
            payload.image.is_some()
        );
        let outcome = self.bounded(self.classifier.classify(&payload)).await;
        match &outcome {
            Ok(text) => info!("[session {}] classified: {}", session_id, text),
            Err(e) => warn!("[session {}] classification failed: {}", session_id, e),
        }

        ClassificationResult { session_id, outcome }
    }

    /// Freeze, cross-check and classify in one go.
    pub async fn run(&self, session_id: SessionId, labels: AggregatedLabelSet) -> ClassificationResult {
        let request = self.prepare(session_id, labels).await;
        self.finalize(request).await
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, PipelineError>>,
    ) -> Result<T, PipelineError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::detection::label_merge::MergeMode;
    use crate::application::detection::testing::{det, ScriptedDetector, StaticFrames};
    use crate::application::ports::{MockClassificationPort, MockFrameSource};
    use crate::domain::CameraFacing;

    fn labels(items: &[&str]) -> AggregatedLabelSet {
        items.iter().copied().collect()
    }

    fn coordinator(classifier: MockClassificationPort) -> ClassificationCoordinator {
        ClassificationCoordinator::new(
            Arc::new(StaticFrames::default()),
            Arc::new(classifier),
            LabelMergePolicy::default(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_classifies_once_with_frame_and_labels() {
        let mut classifier = MockClassificationPort::new();
        classifier
            .expect_classify()
            .withf(|p| {
                p.labels == vec!["bottle".to_string(), "banana peel".to_string()]
                    && p.image.is_some()
                    && p.secondary_labels.is_none()
            })
            .times(1)
            .returning(|_| Ok("Bottle: Recyclables".to_string()));

        let session = SessionId::generate();
        let result = coordinator(classifier)
            .run(session, labels(&["bottle", "banana peel"]))
            .await;

        assert_eq!(result.session_id, session);
        assert_eq!(result.outcome, Ok("Bottle: Recyclables".to_string()));
    }

    #[tokio::test]
    async fn test_upstream_failure_becomes_error_result() {
        let mut classifier = MockClassificationPort::new();
        classifier
            .expect_classify()
            .times(1)
            .returning(|_| Err(PipelineError::Classification("connection reset".into())));

        let session = SessionId::generate();
        let result = coordinator(classifier).run(session, labels(&["bottle"])).await;

        assert_eq!(result.session_id, session);
        assert!(matches!(result.outcome, Err(PipelineError::Classification(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_upstream_times_out() {
        struct Hanging;

        #[async_trait::async_trait]
        impl ClassificationPort for Hanging {
            async fn classify(&self, _: &ClassificationPayload) -> Result<String, PipelineError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("late".into())
            }
        }

        let coordinator = ClassificationCoordinator::new(
            Arc::new(StaticFrames::default()),
            Arc::new(Hanging),
            LabelMergePolicy::default(),
            Duration::from_secs(2),
        );
        let result = coordinator.run(SessionId::generate(), labels(&["cup"])).await;
        assert_eq!(result.outcome, Err(PipelineError::Timeout(2000)));
    }

    #[tokio::test]
    async fn test_nothing_to_classify_skips_the_call() {
        let mut frames = MockFrameSource::new();
        frames
            .expect_capture()
            .returning(|| Err(PipelineError::Acquisition("camera gone".into())));
        let mut classifier = MockClassificationPort::new();
        classifier.expect_classify().never();

        let coordinator = ClassificationCoordinator::new(
            Arc::new(frames),
            Arc::new(classifier),
            LabelMergePolicy::default(),
            Duration::from_secs(5),
        );
        let result = coordinator.run(SessionId::generate(), labels(&["person"])).await;
        assert_eq!(result.outcome, Err(PipelineError::NothingToClassify));
    }

    #[tokio::test]
    async fn test_missing_frame_still_sends_labels() {
        let mut frames = MockFrameSource::new();
        frames
            .expect_capture()
            .returning(|| Err(PipelineError::Acquisition("camera gone".into())));
        let mut classifier = MockClassificationPort::new();
        classifier
            .expect_classify()
            .withf(|p| p.image.is_none() && p.labels == vec!["cup".to_string()])
            .times(1)
            .returning(|_| Ok("Cup: Recyclables".into()));

        let coordinator = ClassificationCoordinator::new(
            Arc::new(frames),
            Arc::new(classifier),
            LabelMergePolicy::default(),
            Duration::from_secs(5),
        );
        let result = coordinator.run(SessionId::generate(), labels(&["cup"])).await;
        assert!(result.outcome.is_ok());
    }

    #[tokio::test]
    async fn test_secondary_source_is_merged_before_sending() {
        let secondary = Arc::new(ScriptedDetector::new(vec![Ok(vec![
            det("cup", 1.0),
            det("person", 1.0),
            det("napkin", 0.2),
        ])]));
        let mut classifier = MockClassificationPort::new();
        classifier
            .expect_classify()
            .withf(|p| {
                p.labels == vec!["cup".to_string()]
                    && p.secondary_labels == Some(vec!["cup".to_string()])
            })
            .times(1)
            .returning(|_| Ok("Cup: Recyclables".into()));

        let coordinator = ClassificationCoordinator::new(
            Arc::new(StaticFrames::default()),
            Arc::new(classifier),
            LabelMergePolicy::new(MergeMode::Agreement, vec!["person".to_string()]),
            Duration::from_secs(5),
        )
        .with_secondary(SecondarySource {
            detector: secondary.clone(),
            confidence_threshold: 0.5,
        });

        let request = coordinator
            .prepare(SessionId::generate(), labels(&["bottle", "cup"]))
            .await;
        assert_eq!(
            request.frame.as_ref().map(|f| f.facing()),
            Some(CameraFacing::Back)
        );
        assert_eq!(
            request.secondary_labels,
            Some(vec!["cup".to_string(), "person".to_string()])
        );

        let result = coordinator.finalize(request).await;
        assert!(result.outcome.is_ok());
        assert_eq!(secondary.calls(), 1);
    }
}
