// Domain layer - session state, detections, labels
// No dependencies on other layers

pub mod entities;
pub mod aggregates;
pub mod value_objects;
pub mod errors;

pub use entities::*;
pub use aggregates::*;
pub use value_objects::*;
pub use errors::{PipelineError, TransitionError};
