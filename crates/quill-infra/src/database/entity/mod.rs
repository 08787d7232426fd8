//! SeaORM entities.

pub mod body;
pub mod conclusion;
pub mod introduction;
pub mod post;
pub mod user;
pub mod user_post;
