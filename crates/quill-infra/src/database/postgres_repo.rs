//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult,
    ModelTrait, NotSet, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use quill_core::domain::{
    ComposedPost, PostContent, PostParts, User, UserPosts, UserProfile, mask_email,
};
use quill_core::error::RepoError;
use quill_core::ports::{ComposedFavorite, FavoriteRepository, PostRepository, UserRepository};

use super::entity::body::{self, Entity as BodyEntity};
use super::entity::conclusion::{self, Entity as ConclusionEntity};
use super::entity::introduction::{self, Entity as IntroductionEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::entity::user_post::{self, Entity as UserPostEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL favorites repository, backed by the `user_posts` join table.
pub type PostgresFavoriteRepository = PostgresBaseRepository<UserPostEntity>;

#[derive(Debug, FromQueryResult)]
struct ProfileRow {
    firstname: String,
    lastname: String,
    email: String,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_profile(&self, id: i32) -> Result<Option<UserProfile>, RepoError> {
        let row = UserEntity::find_by_id(id)
            .select_only()
            .columns([
                user::Column::Firstname,
                user::Column::Lastname,
                user::Column::Email,
            ])
            .into_model::<ProfileRow>()
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(row.map(|row| UserProfile {
            firstname: row.firstname,
            lastname: row.lastname,
            email: row.email,
        }))
    }

    async fn find_with_posts(&self, id: i32) -> Result<Option<UserPosts>, RepoError> {
        let Some(owner) = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let posts = owner
            .find_related(PostEntity)
            .order_by_asc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let mut composed = Vec::with_capacity(posts.len());
        if !posts.is_empty() {
            let introductions: HashMap<i32, PostContent> = IntroductionEntity::find()
                .filter(introduction::Column::Id.is_in(posts.iter().map(|p| p.introduction_id)))
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|m| (m.id, m.into()))
                .collect();
            let bodies: HashMap<i32, PostContent> = BodyEntity::find()
                .filter(body::Column::Id.is_in(posts.iter().map(|p| p.body_id)))
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|m| (m.id, m.into()))
                .collect();
            let conclusions: HashMap<i32, PostContent> = ConclusionEntity::find()
                .filter(conclusion::Column::Id.is_in(posts.iter().map(|p| p.conclusion_id)))
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|m| (m.id, m.into()))
                .collect();

            for post in posts {
                composed.push(ComposedPost {
                    id: post.id,
                    updated_at: post.updated_at.into(),
                    introduction: content(&introductions, post.id, post.introduction_id)?,
                    body: content(&bodies, post.id, post.body_id)?,
                    conclusion: content(&conclusions, post.id, post.conclusion_id)?,
                });
            }
        }

        Ok(Some(UserPosts {
            id: owner.id,
            firstname: owner.firstname,
            lastname: owner.lastname,
            posts: composed,
        }))
    }
}

fn content(
    records: &HashMap<i32, PostContent>,
    post_id: i32,
    content_id: i32,
) -> Result<PostContent, RepoError> {
    records.get(&content_id).cloned().ok_or_else(|| {
        RepoError::Query(format!(
            "post {post_id} references missing content {content_id}"
        ))
    })
}

#[async_trait]
impl PostRepository for PostgresPostRepository {}

#[async_trait]
impl FavoriteRepository for PostgresFavoriteRepository {
    async fn add(&self, user_id: i32, post_id: i32) -> Result<bool, RepoError> {
        insert_favorite(&self.db, user_id, post_id)
            .await
            .map_err(map_db_err)
    }

    async fn add_composed(
        &self,
        user_id: i32,
        parts: PostParts,
    ) -> Result<ComposedFavorite, RepoError> {
        // Dropping the transaction on an early return rolls it back.
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let (post, created) = find_or_create_post(&txn, parts)
            .await
            .map_err(map_db_err)?;
        // The post row is ours; only the user reference can be dangling.
        let added = insert_favorite(&txn, user_id, post.id)
            .await
            .map_err(|err| match map_db_err(err) {
                RepoError::ForeignKey(_) => RepoError::NotFound,
                other => other,
            })?;

        txn.commit().await.map_err(map_db_err)?;

        if created {
            tracing::info!(post_id = post.id, "Created post from content triple");
        }

        Ok(ComposedFavorite {
            post: post.into(),
            created,
            added,
        })
    }

    async fn remove(&self, user_id: i32, post_id: i32) -> Result<bool, RepoError> {
        let result = UserPostEntity::delete_many()
            .filter(user_post::Column::UserId.eq(user_id))
            .filter(user_post::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected > 0)
    }
}

async fn find_post_by_parts<C: ConnectionTrait>(
    conn: &C,
    parts: PostParts,
) -> Result<Option<post::Model>, DbErr> {
    PostEntity::find()
        .filter(post::Column::IntroductionId.eq(parts.introduction_id))
        .filter(post::Column::BodyId.eq(parts.body_id))
        .filter(post::Column::ConclusionId.eq(parts.conclusion_id))
        .one(conn)
        .await
}

/// Returns the post for `parts` and whether this call inserted it.
///
/// The insert skips a row committed meanwhile by a concurrent request for the
/// same triple; that row is read back instead.
async fn find_or_create_post<C: ConnectionTrait>(
    conn: &C,
    parts: PostParts,
) -> Result<(post::Model, bool), DbErr> {
    if let Some(found) = find_post_by_parts(conn, parts).await? {
        return Ok((found, false));
    }

    let now = Utc::now();
    let row = post::ActiveModel {
        id: NotSet,
        introduction_id: Set(parts.introduction_id),
        body_id: Set(parts.body_id),
        conclusion_id: Set(parts.conclusion_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    let inserted = PostEntity::insert(row)
        .on_conflict(
            OnConflict::columns([
                post::Column::IntroductionId,
                post::Column::BodyId,
                post::Column::ConclusionId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let post = find_post_by_parts(conn, parts).await?.ok_or_else(|| {
        DbErr::RecordNotFound(format!(
            "post [i:{},b:{},c:{}]",
            parts.introduction_id, parts.body_id, parts.conclusion_id
        ))
    })?;

    Ok((post, inserted > 0))
}

/// Insert the pair, ignoring an existing one. Returns whether a row was written.
async fn insert_favorite<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    post_id: i32,
) -> Result<bool, DbErr> {
    let link = user_post::ActiveModel {
        user_id: Set(user_id),
        post_id: Set(post_id),
    };

    let inserted = UserPostEntity::insert(link)
        .on_conflict(
            OnConflict::columns([user_post::Column::UserId, user_post::Column::PostId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(inserted > 0)
}
