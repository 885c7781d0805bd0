// Application layer - use cases
// Orchestrates domain logic, depends on domain layer only

pub mod detection;
pub mod classify;
pub mod scoreboard;
pub mod ports;
pub mod errors;

pub use errors::ServiceError;
