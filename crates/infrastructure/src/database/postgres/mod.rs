pub mod postgres_job_registry;
pub mod postgres_run_history_repository;

pub use postgres_job_registry::*;
pub use postgres_run_history_repository::*;
