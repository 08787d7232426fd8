//! Domain entities - the core business objects.

mod user;

mod post;

pub use post::{ComposedPost, Post, PostContent, PostParts};
pub use user::{User, UserPosts, UserProfile, mask_email};
