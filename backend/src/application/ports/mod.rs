// Application ports - Driven ports (output ports implemented by infrastructure)

pub mod camera_ports;
pub mod classification_port;
pub mod score_ports;
pub mod language_model;

pub use camera_ports::{Detector, FrameSource};
pub use classification_port::{ClassificationPayload, ClassificationPort};
pub use score_ports::{ScoreRepository, ScoreStore};
pub use language_model::LanguageModelPort;

#[cfg(test)]
pub use camera_ports::{MockDetector, MockFrameSource};
#[cfg(test)]
pub use classification_port::MockClassificationPort;
#[cfg(test)]
pub use score_ports::{MockScoreRepository, MockScoreStore};
#[cfg(test)]
pub use language_model::MockLanguageModelPort;
