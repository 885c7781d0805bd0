// Server-side score use cases

pub mod increment_score;
pub mod leaderboard;

pub use increment_score::{IncrementScoreCommand, IncrementScoreHandler};
pub use leaderboard::LeaderboardQuery;
