use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::errors::TransitionError;
use crate::domain::value_objects::SessionId;

/// Lifecycle of one press-and-hold interaction.
///
/// `Idle` is never stored on a session; it is what the controller reports
/// when it holds no session at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Active,
    Finalizing,
    Settled,
}

/// What a settled session shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SessionOutcome {
    Classified { text: String },
    Failed { message: String },
}

/// Detection session aggregate root
#[derive(Debug, Clone)]
pub struct DetectionSession {
    id: SessionId,
    phase: SessionPhase,
    finalized_at: Option<DateTime<Utc>>,
    settled_at: Option<DateTime<Utc>>,
    outcome: Option<SessionOutcome>,
}

impl DetectionSession {
    /// Open a new session, already sampling.
    pub fn start() -> Self {
        Self {
            id: SessionId::generate(),
            phase: SessionPhase::Active,
            finalized_at: None,
            settled_at: None,
            outcome: None,
        }
    }

    /// Active -> Finalizing
    pub fn finalize(&mut self) -> Result<(), TransitionError> {
        if self.phase != SessionPhase::Active {
            return Err(TransitionError {
                from: self.phase,
                action: "finalize",
            });
        }
        self.phase = SessionPhase::Finalizing;
        self.finalized_at = Some(Utc::now());
        Ok(())
    }

    /// Finalizing -> Settled
    pub fn settle(&mut self, outcome: SessionOutcome) -> Result<(), TransitionError> {
        if self.phase != SessionPhase::Finalizing {
            return Err(TransitionError {
                from: self.phase,
                action: "settle",
            });
        }
        self.phase = SessionPhase::Settled;
        self.settled_at = Some(Utc::now());
        self.outcome = Some(outcome);
        Ok(())
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn finalized_at(&self) -> Option<DateTime<Utc>> {
        self.finalized_at
    }

    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.settled_at
    }

    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, SessionPhase::Active)
    }
}
