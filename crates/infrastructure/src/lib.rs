//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_session_repository;
mod redis_session_repository;

pub use in_memory_session_repository::InMemorySessionRepository;
pub use redis_session_repository::RedisSessionRepository;

/// Storage key for the structured credential record.
pub(crate) const TOKENS_KEY: &str = "auth_tokens";
/// Storage key for the plain-string credential mirror.
pub(crate) const TOKEN_KEY: &str = "auth_token";
/// Storage key for the persisted session record.
pub(crate) const SESSION_KEY: &str = "auth";
