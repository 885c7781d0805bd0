pub mod label_set;
pub mod detection_session;

pub use label_set::AggregatedLabelSet;
pub use detection_session::{DetectionSession, SessionOutcome, SessionPhase};
