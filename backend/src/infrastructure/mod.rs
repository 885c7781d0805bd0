// Infrastructure layer - external concerns (HTTP, database, model API, camera)
// Implements interfaces defined in application layer

use std::sync::Arc;

use crate::application::classify::{ClassifyObjectsHandler, RecognizeObjectsHandler};
use crate::application::scoreboard::{IncrementScoreHandler, LeaderboardQuery};

pub mod driven;    // Output adapters (repositories, external services)
pub mod driving;   // Input adapters (HTTP)

#[derive(Clone)]
pub struct AppState {
    pub classify: Arc<ClassifyObjectsHandler>,
    pub recognize: Arc<RecognizeObjectsHandler>,
    pub increment_score: Arc<IncrementScoreHandler>,
    pub leaderboard: Arc<LeaderboardQuery>,
    pub jwt_secret: String,
}
