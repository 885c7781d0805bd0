use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::ports::ScoreStore;
use crate::domain::{ActorId, SessionId};

/// Fire-and-forget score credit for a finished session.
#[derive(Clone, Default)]
pub struct ScoreSideEffect {
    store: Option<Arc<dyn ScoreStore>>,
}

impl ScoreSideEffect {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self { store: Some(store) }
    }

    /// No store configured: every notification is a no-op.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Credit `actor` in the background. Anonymous sessions are skipped.
    /// Failures are logged and never reach the caller.
    pub fn notify(&self, session_id: SessionId, actor: Option<&ActorId>) -> Option<JoinHandle<()>> {
        let (store, actor) = match (&self.store, actor) {
            (Some(store), Some(actor)) => (Arc::clone(store), actor.clone()),
            (None, _) => return None,
            (_, None) => {
                debug!("[session {}] anonymous session, no score update", session_id);
                return None;
            }
        };

        Some(tokio::spawn(async move {
            match store.increment(&actor).await {
                Ok(()) => debug!("[session {}] score credited to {}", session_id, actor),
                Err(e) => warn!("[session {}] score update for {} failed: {}", session_id, actor, e),
            }
        }))
    }
}
