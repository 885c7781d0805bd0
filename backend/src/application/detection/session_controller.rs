use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use super::call_slot::CallSlot;
use super::classification_coordinator::{ClassificationCoordinator, ClassificationResult};
use super::label_aggregator::{AggregationPolicy, LabelAggregator};
use super::sampling_loop::{DetectionSink, SamplingLoop, DEFAULT_TICK};
use super::score_side_effect::ScoreSideEffect;
use crate::application::ports::{Detector, FrameSource};
use crate::domain::{
    ActorId, AggregatedLabelSet, CameraFacing, Detection, DetectionSession, PipelineError,
    SessionId, SessionOutcome, SessionPhase,
};

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub tick: Duration,
    /// Releases shorter than this cancel the session instead of classifying.
    pub min_dwell: Duration,
    pub aggregation: AggregationPolicy,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            min_dwell: Duration::ZERO,
            aggregation: AggregationPolicy::default(),
        }
    }
}

/// Everything the UI needs to render the current session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Option<SessionId>,
    pub phase: SessionPhase,
    pub labels: Vec<String>,
    pub outcome: Option<SessionOutcome>,
    /// Camera problem reported during this session, if any.
    pub notice: Option<String>,
}

impl SessionView {
    pub fn idle() -> Self {
        Self {
            session_id: None,
            phase: SessionPhase::Idle,
            labels: Vec::new(),
            outcome: None,
            notice: None,
        }
    }
}

/// Whether a classification result changed what is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultDisposition {
    Applied,
    /// Belonged to a superseded session and was dropped.
    Stale,
}

struct PendingClassification {
    session_id: SessionId,
    task: JoinHandle<()>,
}

struct ControllerState {
    session: Option<DetectionSession>,
    started: Option<Instant>,
    aggregator: LabelAggregator,
    sampling: SamplingLoop,
    actor: Option<ActorId>,
    notice: Option<String>,
    classification: Option<PendingClassification>,
}

impl ControllerState {
    fn view(&self) -> SessionView {
        match &self.session {
            None => SessionView::idle(),
            Some(session) => SessionView {
                session_id: Some(session.id()),
                phase: session.phase(),
                labels: self.aggregator.labels().to_vec(),
                outcome: session.outcome().cloned(),
                notice: self.notice.clone(),
            },
        }
    }
}

struct Shared {
    state: Mutex<ControllerState>,
    frames: Arc<dyn FrameSource>,
    coordinator: ClassificationCoordinator,
    classification_slot: CallSlot,
    score: ScoreSideEffect,
    settings: ControllerSettings,
    view_tx: watch::Sender<SessionView>,
}

/// Owns the press-and-hold session lifecycle for one device:
/// `Idle -> Active -> Finalizing -> Settled`, then `Active` again on the next
/// press.
///
/// Every start allocates a fresh session id. Detections and classification
/// results are tagged with the id they were produced for and are only
/// applied while that id is still current, so a late answer for a
/// superseded session never touches what is displayed.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
}

impl SessionController {
    pub fn new(
        frames: Arc<dyn FrameSource>,
        detector: Arc<dyn Detector>,
        coordinator: ClassificationCoordinator,
        score: ScoreSideEffect,
        settings: ControllerSettings,
    ) -> Self {
        let (view_tx, _) = watch::channel(SessionView::idle());
        let detector_slot = CallSlot::new();
        let coordinator = coordinator.with_detector_slot(detector_slot.clone());
        let state = ControllerState {
            session: None,
            started: None,
            aggregator: LabelAggregator::new(settings.aggregation.clone()),
            sampling: SamplingLoop::new(Arc::clone(&frames), detector, detector_slot),
            actor: None,
            notice: None,
            classification: None,
        };

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                frames,
                coordinator,
                classification_slot: CallSlot::new(),
                score,
                settings,
                view_tx,
            }),
        }
    }

    /// Press: open a new session and begin sampling.
    ///
    /// Allowed from any phase. An active session is superseded without being
    /// classified; a pending classification is left to finish and its result
    /// is dropped on arrival.
    pub async fn start(&self) -> SessionId {
        let mut state = self.shared.state.lock().await;

        if let Some(previous) = &state.session {
            match previous.phase() {
                SessionPhase::Active => {
                    info!("[session {}] superseded while still sampling", previous.id())
                }
                SessionPhase::Finalizing => debug!(
                    "[session {}] superseded while classifying, its result will be dropped",
                    previous.id()
                ),
                _ => {}
            }
        }
        state.sampling.stop();

        let session = DetectionSession::start();
        let session_id = session.id();
        state.aggregator.reset(session_id);
        state.notice = None;
        state.started = Some(Instant::now());
        state.session = Some(session);

        let sink: Arc<dyn DetectionSink> = Arc::new(SinkHandle(Arc::downgrade(&self.shared)));
        state.sampling.start(session_id, self.shared.settings.tick, sink);

        info!("[session {}] started", session_id);
        self.shared.publish(&state);
        session_id
    }

    /// Release: stop sampling and hand the labels off for classification.
    ///
    /// Returns the finalized session id, or `None` when there was nothing to
    /// finalize (no active session, or a release shorter than the dwell).
    pub async fn stop(&self) -> Option<SessionId> {
        let shared = &self.shared;
        let mut state = shared.state.lock().await;

        let session_id = match &state.session {
            Some(session) if session.is_active() => session.id(),
            _ => {
                trace!("release ignored, no active session");
                return None;
            }
        };
        state.sampling.stop();

        let held = state.started.map(|t| t.elapsed()).unwrap_or_default();
        if held < shared.settings.min_dwell {
            info!(
                "[session {}] released after {:?}, under the {:?} dwell, cancelled",
                session_id, held, shared.settings.min_dwell
            );
            state.aggregator.seal();
            state.session = None;
            state.started = None;
            shared.publish(&state);
            return None;
        }

        let labels = state.aggregator.seal();
        if let Some(session) = state.session.as_mut() {
            if let Err(e) = session.finalize() {
                warn!("[session {}] {}", session_id, e);
                return None;
            }
        }
        info!("[session {}] finalizing with labels {:?}", session_id, labels.as_slice());

        shared.score.notify(session_id, state.actor.as_ref());

        if let Some(previous) = state.classification.take() {
            if !previous.task.is_finished() {
                debug!(
                    "[session {}] aborting classification of session {}",
                    session_id, previous.session_id
                );
                previous.task.abort();
            }
        }
        let task = tokio::spawn(classify_session(Arc::clone(shared), session_id, labels));
        state.classification = Some(PendingClassification { session_id, task });

        shared.publish(&state);
        Some(session_id)
    }

    /// Apply a classification result if it belongs to the session being
    /// finalized; anything else is dropped.
    pub async fn apply_result(&self, result: ClassificationResult) -> ResultDisposition {
        self.shared.apply_result(result).await
    }

    pub async fn switch_facing(&self, facing: CameraFacing) -> Result<(), PipelineError> {
        self.shared.frames.switch_facing(facing).await?;
        info!("camera switched to {}", facing.as_str());
        Ok(())
    }

    /// Signed-in actor credited when a session finalizes.
    pub async fn set_actor(&self, actor: Option<ActorId>) {
        self.shared.state.lock().await.actor = actor;
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.shared.view_tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionView {
        self.shared.view_tx.borrow().clone()
    }

    /// Stop sampling and abandon any pending classification.
    pub async fn shutdown(&self) {
        let mut state = self.shared.state.lock().await;
        state.sampling.stop();
        if let Some(pending) = state.classification.take() {
            pending.task.abort();
            debug!("[session {}] pending classification aborted", pending.session_id);
        }
    }
}

impl Shared {
    fn publish(&self, state: &ControllerState) {
        self.view_tx.send_replace(state.view());
    }

    async fn ingest(&self, session_id: SessionId, detections: Vec<Detection>) {
        let mut state = self.state.lock().await;
        let is_current = matches!(
            &state.session,
            Some(session) if session.id() == session_id && session.is_active()
        );
        if !is_current {
            trace!("[session {}] late detections dropped", session_id);
            return;
        }

        let before = state.aggregator.labels().len();
        let grew = state
            .aggregator
            .ingest(session_id, &detections)
            .map(|labels| labels.len() > before)
            .unwrap_or(false);
        if grew {
            debug!(
                "[session {}] labels now {:?}",
                session_id,
                state.aggregator.labels().as_slice()
            );
            self.publish(&state);
        }
    }

    async fn report_acquisition(&self, session_id: SessionId, error: PipelineError) {
        let mut state = self.state.lock().await;
        let is_current = matches!(&state.session, Some(s) if s.id() == session_id && s.is_active());
        if is_current && state.notice.is_none() {
            state.notice = Some(error.to_string());
            self.publish(&state);
        }
    }

    async fn apply_result(&self, result: ClassificationResult) -> ResultDisposition {
        let mut state = self.state.lock().await;

        let settled = match state.session.as_mut() {
            Some(session)
                if session.id() == result.session_id
                    && session.phase() == SessionPhase::Finalizing =>
            {
                let outcome = match result.outcome {
                    Ok(text) => SessionOutcome::Classified { text },
                    Err(e) => SessionOutcome::Failed {
                        message: e.to_string(),
                    },
                };
                session.settle(outcome).is_ok()
            }
            _ => false,
        };

        if !settled {
            debug!("[session {}] stale classification result dropped", result.session_id);
            return ResultDisposition::Stale;
        }

        if matches!(&state.classification, Some(p) if p.session_id == result.session_id) {
            state.classification = None;
        }
        info!("[session {}] settled", result.session_id);
        self.publish(&state);
        ResultDisposition::Applied
    }
}

async fn classify_session(
    shared: Arc<Shared>,
    session_id: SessionId,
    labels: AggregatedLabelSet,
) {
    // an aborted predecessor holds the slot until its future is dropped
    let Some(_permit) = shared.classification_slot.claim().await else {
        return;
    };
    let result = shared.coordinator.run(session_id, labels).await;
    shared.apply_result(result).await;
}

/// Routes sampling output back into the controller without keeping it alive.
struct SinkHandle(Weak<Shared>);

#[async_trait]
impl DetectionSink for SinkHandle {
    async fn accept(&self, session_id: SessionId, detections: Vec<Detection>) {
        if let Some(shared) = self.0.upgrade() {
            shared.ingest(session_id, detections).await;
        }
    }

    async fn acquisition_failed(&self, session_id: SessionId, error: PipelineError) {
        if let Some(shared) = self.0.upgrade() {
            shared.report_acquisition(session_id, error).await;
        }
    }
}
