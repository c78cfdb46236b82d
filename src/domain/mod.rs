pub mod error;
pub mod repository;
pub mod shopping;
pub mod user;
