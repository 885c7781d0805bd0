// Server-side classification use cases

pub mod prompts;
pub mod classify_objects;
pub mod recognize_objects;

pub use classify_objects::{ClassifyObjectsCommand, ClassifyObjectsHandler};
pub use recognize_objects::RecognizeObjectsHandler;
