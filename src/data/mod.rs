pub mod memory;
pub mod mongo;
pub mod user_repository;
