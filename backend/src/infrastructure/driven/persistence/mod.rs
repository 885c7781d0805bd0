pub mod in_memory_score_repository;
pub mod postgres_score_repository;

pub use in_memory_score_repository::InMemoryScoreRepository;
pub use postgres_score_repository::PostgresScoreRepository;
