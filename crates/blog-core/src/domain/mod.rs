//! Domain entities - the core business objects.

mod post;
mod user;

pub use post::{AuthoredPost, Post};
pub use user::User;
