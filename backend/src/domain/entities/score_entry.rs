use crate::domain::value_objects::ActorId;

/// Row of the leaderboard read model.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub actor_id: ActorId,
    pub name: String,
    pub score: i64,
}
