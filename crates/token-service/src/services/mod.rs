//! Business logic behind the HTTP handlers.

pub mod token_service;
