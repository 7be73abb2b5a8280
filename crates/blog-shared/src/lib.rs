//! # Blog Shared
//!
//! Form payloads submitted by the site's HTML forms and the validation
//! rules they carry.

pub mod dto;
pub mod validation;

pub use dto::{AccountForm, LoginForm, PostForm, RegisterForm};
pub use validation::{EMAIL_IN_USE, FormErrors, normalize_email};
