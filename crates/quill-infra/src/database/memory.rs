//! In-memory repositories - used when no database is configured, and in tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use quill_core::domain::{
    ComposedPost, Post, PostContent, PostParts, User, UserPosts, UserProfile,
};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, ComposedFavorite, FavoriteRepository, PostRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    posts: BTreeMap<i32, Post>,
    introductions: BTreeMap<i32, String>,
    bodies: BTreeMap<i32, String>,
    conclusions: BTreeMap<i32, String>,
    /// (user_id, post_id) pairs.
    favorites: BTreeSet<(i32, i32)>,
}

impl Tables {
    fn next_id<V>(map: &BTreeMap<i32, V>) -> i32 {
        map.keys().next_back().map_or(1, |last| last + 1)
    }

    fn email_owner(&self, email: &str) -> Option<i32> {
        self.users
            .values()
            .find(|u| u.email == email)
            .map(|u| u.id)
    }

    fn post_by_parts(&self, parts: PostParts) -> Option<&Post> {
        self.posts.values().find(|p| p.parts() == parts)
    }

    fn has_contents(&self, parts: PostParts) -> bool {
        self.introductions.contains_key(&parts.introduction_id)
            && self.bodies.contains_key(&parts.body_id)
            && self.conclusions.contains_key(&parts.conclusion_id)
    }

    fn compose(&self, post: &Post) -> Result<ComposedPost, RepoError> {
        let lookup = |records: &BTreeMap<i32, String>, id: i32| {
            records
                .get(&id)
                .map(|content| PostContent {
                    id,
                    content: content.clone(),
                })
                .ok_or_else(|| {
                    RepoError::Query(format!("post {} references missing content {id}", post.id))
                })
        };

        Ok(ComposedPost {
            id: post.id,
            updated_at: post.updated_at,
            introduction: lookup(&self.introductions, post.introduction_id)?,
            body: lookup(&self.bodies, post.body_id)?,
            conclusion: lookup(&self.conclusions, post.conclusion_id)?,
        })
    }
}

/// In-memory store implementing every repository port.
///
/// Enforces the same rules as the database schema: unique emails, unique
/// content triples, foreign keys and cascading deletes.
/// Note: Data is lost on process restart.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user with the next free id.
    pub async fn create_user(
        &self,
        firstname: &str,
        lastname: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.email_owner(email).is_some() {
            return Err(RepoError::Unique(format!("email {email} already exists")));
        }

        let user = User::new(
            Tables::next_id(&tables.users),
            firstname.to_string(),
            lastname.to_string(),
            email.to_string(),
            password_hash.to_string(),
        );
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    /// Insert an introduction, body and conclusion; returns their ids.
    pub async fn create_contents(
        &self,
        introduction: &str,
        body: &str,
        conclusion: &str,
    ) -> PostParts {
        let mut tables = self.tables.write().await;

        let introduction_id = Tables::next_id(&tables.introductions);
        tables
            .introductions
            .insert(introduction_id, introduction.to_string());
        let body_id = Tables::next_id(&tables.bodies);
        tables.bodies.insert(body_id, body.to_string());
        let conclusion_id = Tables::next_id(&tables.conclusions);
        tables
            .conclusions
            .insert(conclusion_id, conclusion.to_string());

        PostParts {
            introduction_id,
            body_id,
            conclusion_id,
        }
    }

    pub async fn post_count(&self) -> usize {
        self.tables.read().await.posts.len()
    }

    /// Ids of the posts in a user's favorites, ascending.
    pub async fn favorite_post_ids(&self, user_id: i32) -> Vec<i32> {
        self.tables
            .read()
            .await
            .favorites
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, post_id)| *post_id)
            .collect()
    }
}

#[async_trait]
impl BaseRepository<User, i32> for InMemoryRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;

        // Updates only: a deleted account is never brought back.
        if !tables.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        if tables
            .email_owner(&user.email)
            .is_some_and(|owner| owner != user.id)
        {
            return Err(RepoError::Unique(format!(
                "email {} already exists",
                user.email
            )));
        }

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: i32) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;

        let deleted = tables.users.remove(&id).is_some();
        tables.favorites.retain(|(user_id, _)| *user_id != id);
        Ok(deleted)
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;

        Ok(tables
            .email_owner(email)
            .and_then(|id| tables.users.get(&id).cloned()))
    }

    async fn find_profile(&self, id: i32) -> Result<Option<UserProfile>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).map(User::profile))
    }

    async fn find_with_posts(&self, id: i32) -> Result<Option<UserPosts>, RepoError> {
        let tables = self.tables.read().await;
        let Some(owner) = tables.users.get(&id) else {
            return Ok(None);
        };

        let posts = tables
            .favorites
            .iter()
            .filter(|(user_id, _)| *user_id == id)
            .filter_map(|(_, post_id)| tables.posts.get(post_id))
            .map(|post| tables.compose(post))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(UserPosts {
            id: owner.id,
            firstname: owner.firstname.clone(),
            lastname: owner.lastname.clone(),
            posts,
        }))
    }
}

#[async_trait]
impl BaseRepository<Post, i32> for InMemoryRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.has_contents(post.parts()) {
            return Err(RepoError::ForeignKey("missing post content".to_string()));
        }
        if let Some(existing) = tables.post_by_parts(post.parts()) {
            if existing.id != post.id {
                return Err(RepoError::Unique(format!(
                    "post {} already uses this content",
                    existing.id
                )));
            }
        }

        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: i32) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;

        let deleted = tables.posts.remove(&id).is_some();
        tables.favorites.retain(|(_, post_id)| *post_id != id);
        Ok(deleted)
    }
}

#[async_trait]
impl PostRepository for InMemoryRepository {}

#[async_trait]
impl FavoriteRepository for InMemoryRepository {
    async fn add(&self, user_id: i32, post_id: i32) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&user_id) || !tables.posts.contains_key(&post_id) {
            return Err(RepoError::ForeignKey(format!(
                "favorite ({user_id}, {post_id}) references a missing row"
            )));
        }

        Ok(tables.favorites.insert((user_id, post_id)))
    }

    async fn add_composed(
        &self,
        user_id: i32,
        parts: PostParts,
    ) -> Result<ComposedFavorite, RepoError> {
        // One write guard for the whole operation keeps it atomic.
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&user_id) {
            return Err(RepoError::NotFound);
        }
        if !tables.has_contents(parts) {
            return Err(RepoError::ForeignKey(format!(
                "post content [i:{},b:{},c:{}] is missing",
                parts.introduction_id, parts.body_id, parts.conclusion_id
            )));
        }

        let existing = tables.post_by_parts(parts).cloned();
        let (post, created) = match existing {
            Some(existing) => (existing, false),
            None => {
                let now = Utc::now();
                let post = Post {
                    id: Tables::next_id(&tables.posts),
                    introduction_id: parts.introduction_id,
                    body_id: parts.body_id,
                    conclusion_id: parts.conclusion_id,
                    created_at: now,
                    updated_at: now,
                };
                tables.posts.insert(post.id, post.clone());
                (post, true)
            }
        };

        let added = tables.favorites.insert((user_id, post.id));

        Ok(ComposedFavorite {
            post,
            created,
            added,
        })
    }

    async fn remove(&self, user_id: i32, post_id: i32) -> Result<bool, RepoError> {
        Ok(self
            .tables
            .write()
            .await
            .favorites
            .remove(&(user_id, post_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_parts_reuse_the_post() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user("Ada", "Lovelace", "ada@x.com", "hash").await.unwrap();
        let parts = repo.create_contents("intro", "body", "outro").await;

        let first = repo.add_composed(user.id, parts).await.unwrap();
        let second = repo.add_composed(user.id, parts).await.unwrap();

        assert!(first.created && first.added);
        assert!(!second.created && !second.added);
        assert_eq!(first.post.id, second.post.id);
        assert_eq!(repo.post_count().await, 1);
    }

    #[tokio::test]
    async fn test_missing_content_is_a_foreign_key_error() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user("Ada", "Lovelace", "ada@x.com", "hash").await.unwrap();
        let parts = PostParts {
            introduction_id: 1,
            body_id: 1,
            conclusion_id: 99,
        };

        let result = repo.add_composed(user.id, parts).await;

        assert!(matches!(result, Err(RepoError::ForeignKey(_))));
        assert_eq!(repo.post_count().await, 0);
    }

    #[tokio::test]
    async fn test_deleting_a_user_drops_their_favorites() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user("Ada", "Lovelace", "ada@x.com", "hash").await.unwrap();
        let parts = repo.create_contents("intro", "body", "outro").await;
        repo.add_composed(user.id, parts).await.unwrap();

        assert!(BaseRepository::<User, i32>::delete(&repo, user.id).await.unwrap());

        assert!(repo.favorite_post_ids(user.id).await.is_empty());
        assert!(!BaseRepository::<User, i32>::delete(&repo, user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_saving_a_taken_email_fails() {
        let repo = InMemoryRepository::new();
        repo.create_user("Ada", "Lovelace", "ada@x.com", "hash").await.unwrap();
        let mut bob = repo.create_user("Bob", "Martin", "bob@x.com", "hash").await.unwrap();

        bob.email = "ada@x.com".to_string();
        let result = BaseRepository::<User, i32>::save(&repo, bob).await;

        assert!(matches!(result, Err(RepoError::Unique(_))));
    }

    #[tokio::test]
    async fn test_saving_a_deleted_user_does_not_recreate_it() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user("Ada", "Lovelace", "ada@x.com", "hash").await.unwrap();
        BaseRepository::<User, i32>::delete(&repo, user.id).await.unwrap();

        let result = BaseRepository::<User, i32>::save(&repo, user.clone()).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
        assert!(
            BaseRepository::<User, i32>::find_by_id(&repo, user.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_composing_for_an_unknown_user_is_not_found() {
        let repo = InMemoryRepository::new();
        let parts = repo.create_contents("intro", "body", "outro").await;

        let result = repo.add_composed(7, parts).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
        assert_eq!(repo.post_count().await, 0);
    }

    #[tokio::test]
    async fn test_find_with_posts_resolves_contents() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user("Ada", "Lovelace", "ada@x.com", "hash").await.unwrap();
        let parts = repo.create_contents("Once", "upon", "a time").await;
        repo.add_composed(user.id, parts).await.unwrap();

        let found = repo.find_with_posts(user.id).await.unwrap().unwrap();

        assert_eq!(found.firstname, "Ada");
        assert_eq!(found.posts.len(), 1);
        assert_eq!(found.posts[0].introduction.content, "Once");
        assert_eq!(found.posts[0].body.content, "upon");
        assert_eq!(found.posts[0].conclusion.content, "a time");
    }
}
