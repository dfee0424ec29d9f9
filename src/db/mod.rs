#[cfg(test)]
pub mod mock_db;
pub mod postgres_token_repository;
pub mod postgres_user_repository;
pub mod schema;
pub mod token_repository;
pub mod user_repository;
