// Driven adapters - implementations of application ports

pub mod camera;
pub mod gemini;
pub mod persistence;
pub mod remote;

pub use camera::ImageDirectoryFrameSource;
pub use gemini::GeminiClient;
pub use persistence::{InMemoryScoreRepository, PostgresScoreRepository};
pub use remote::{HttpClassificationClient, HttpRecognitionDetector, HttpScoreStore, ServerEndpoint};
