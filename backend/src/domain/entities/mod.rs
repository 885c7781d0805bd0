pub mod detection;
pub mod frame;
pub mod score_entry;

pub use detection::{BoundingBox, Detection};
pub use frame::Frame;
pub use score_entry::ScoreEntry;
