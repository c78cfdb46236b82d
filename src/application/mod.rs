pub mod auth_service;
pub mod shopping_service;
