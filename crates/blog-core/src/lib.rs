//! # Blog Core
//!
//! The domain layer of the blog site: users, posts, and the ports that
//! storage, password hashing and session handling must implement.
//! This crate has no infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::RepoError;
