//! Password hashing and session token implementations.

mod password;
mod session_token;

pub use password::Argon2PasswordService;
pub use session_token::{JwtSessionTokenService, SessionTokenConfig};
