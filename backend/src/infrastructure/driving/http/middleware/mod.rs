pub mod auth;

pub use auth::AuthenticatedActor;
