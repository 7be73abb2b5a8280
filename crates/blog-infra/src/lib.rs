//! # Blog Infrastructure
//!
//! Concrete implementations of the ports defined in `blog-core`:
//! repositories, password hashing, session tokens and the session store.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - In-memory repositories and cache only
//! - `postgres` - PostgreSQL persistence via SeaORM
//! - `auth` - Argon2 password hashing + JWT session tokens

pub mod cache;
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

pub use cache::InMemoryCache;
pub use database::{DatabaseConfig, InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
pub use database::DatabaseConnections;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtSessionTokenService, SessionTokenConfig};
