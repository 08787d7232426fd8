use async_trait::async_trait;

use crate::domain::{Post, PostParts, User, UserPosts, UserProfile};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Returns `false` when nothing matched.
    async fn delete(&self, id: ID) -> Result<bool, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i32> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Load only the public fields of a user.
    async fn find_profile(&self, id: i32) -> Result<Option<UserProfile>, RepoError>;

    /// Load a user with their favorite posts and the posts' contents.
    async fn find_with_posts(&self, id: i32) -> Result<Option<UserPosts>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i32> {}

/// Outcome of saving a post identified by its content triple.
#[derive(Debug, Clone)]
pub struct ComposedFavorite {
    pub post: Post,
    /// The post did not exist and was created.
    pub created: bool,
    /// The association was inserted (false when it already existed).
    pub added: bool,
}

/// User <-> post favorites relation.
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Link a user to an existing post. Returns `false` if already linked.
    async fn add(&self, user_id: i32, post_id: i32) -> Result<bool, RepoError>;

    /// Find or create the post built from `parts` and link it to the user,
    /// atomically.
    ///
    /// A concurrent creation of the same post is not an error: the existing
    /// post is returned with `created == false`.
    ///
    /// Fails with [`RepoError::ForeignKey`] when a content record is missing
    /// and with [`RepoError::NotFound`] when the user does not exist.
    async fn add_composed(
        &self,
        user_id: i32,
        parts: PostParts,
    ) -> Result<ComposedFavorite, RepoError>;

    /// Unlink a user from a post. Returns `false` if they were not linked.
    async fn remove(&self, user_id: i32, post_id: i32) -> Result<bool, RepoError>;
}
