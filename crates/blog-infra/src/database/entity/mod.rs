//! SeaORM entity definitions. The schema is created from these on startup.

pub mod post;
pub mod user;
