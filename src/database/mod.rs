pub mod pool;
pub mod user_repository;
