// Trashcam: press-and-hold detection sessions and the classification server behind them.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
