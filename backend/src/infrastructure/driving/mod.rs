// Driving adapters - entry points into the application

pub mod console;
pub mod http;
