//! Account service - profile, credentials and favorites of the current user.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{Post, PostParts, UserPosts, UserProfile, mask_email};
use crate::error::{DomainError, RepoError};
use crate::ports::{FavoriteRepository, PasswordService, PostRepository, UserRepository};

/// Fields a user may change. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

/// An update request, authenticated again by the current email and password.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountCommand {
    pub email: Option<String>,
    pub password: Option<String>,
    pub update: AccountUpdate,
}

#[derive(Debug, Clone)]
pub struct AccountUpdated {
    /// Human-readable summary of what changed.
    pub message: String,
    pub profile: UserProfile,
}

/// Which post to add to the favorites.
#[derive(Debug, Clone, Copy)]
pub enum FavoriteTarget {
    /// A post that must already exist.
    Existing(i32),
    /// The post built from this triple, created if needed.
    Composed(PostParts),
}

#[derive(Debug, Clone)]
pub struct FavoriteAdded {
    pub post: Post,
    pub created: bool,
    pub added: bool,
}

impl FavoriteAdded {
    pub fn message(&self) -> String {
        let id = self.post.id;
        if !self.added {
            return format!("L'utilisateur a déjà enregistré le post {id}. Ajout impossible");
        }

        let created = if self.created {
            format!(
                "Création du post {id} [i:{},b:{},c:{}].",
                self.post.introduction_id, self.post.body_id, self.post.conclusion_id
            )
        } else {
            String::new()
        };

        format!("{created} Ajout du post {id} en favoris")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FavoriteRemoved {
    pub post_id: i32,
    pub removed: bool,
}

impl FavoriteRemoved {
    pub fn message(&self) -> String {
        if self.removed {
            format!("Suppression post {} OK", self.post_id)
        } else {
            "L'utilisateur n'a pas enregistré ce post. Suppression impossible".to_string()
        }
    }
}

/// Confirmation returned after an account deletion.
pub const ACCOUNT_DELETED: &str = "User Deleted";

/// Operations on the authenticated user's account.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    favorites: Arc<dyn FavoriteRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        favorites: Arc<dyn FavoriteRepository>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users,
            posts,
            favorites,
            passwords,
        }
    }

    /// Public fields of the user.
    pub async fn profile(&self, user_id: i32) -> Result<UserProfile, DomainError> {
        tracing::debug!(user_id, "Loading profile");

        self.users
            .find_profile(user_id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(user_id))
    }

    /// Change email, password or names after checking the current credentials.
    ///
    /// Nothing is written unless every check passes.
    pub async fn update_account(
        &self,
        user_id: i32,
        command: UpdateAccountCommand,
    ) -> Result<AccountUpdated, DomainError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(user_id))?;

        let (email, password) = match (command.email.as_deref(), command.password.as_deref()) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                (email, password)
            }
            _ => return Err(DomainError::MissingCredentials),
        };

        let valid_password = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        // One error for both cases: callers must not learn which field was wrong.
        if user.email != email || !valid_password {
            tracing::warn!(user_id, "Account update rejected: invalid credentials");
            return Err(DomainError::InvalidCredentials);
        }

        let changes = command.update;
        let mut message = String::new();
        let mut new_email = None;

        if let Some(next) = changes.email {
            if next == user.email {
                return Err(DomainError::EmailUnchanged);
            }
            if self.users.find_by_email(&next).await?.is_some() {
                return Err(DomainError::EmailTaken(next));
            }

            message.push_str(&format!("Nouvel email : {next}."));
            user.email = next.clone();
            new_email = Some(next);
        }

        if let Some(next) = changes.password {
            if changes.confirm_password.as_deref() != Some(next.as_str()) {
                return Err(DomainError::PasswordMismatch);
            }

            user.password_hash = self
                .passwords
                .hash(&next)
                .map_err(|e| DomainError::Internal(e.to_string()))?;
            message.push_str("Nouveau mot de passe.");
        }

        if let Some(firstname) = changes.firstname {
            user.firstname = firstname;
        }
        if let Some(lastname) = changes.lastname {
            user.lastname = lastname;
        }
        user.updated_at = Utc::now();

        if let Some(email) = &new_email {
            tracing::info!(user_id, new_email = %mask_email(email), "Changing account email");
        }

        // The unique index still wins a race against the lookup above, and
        // the row may have been deleted since it was read.
        let saved = self.users.save(user).await.map_err(|err| match (err, new_email) {
            (RepoError::Unique(_), Some(email)) => DomainError::EmailTaken(email),
            (RepoError::NotFound, _) => DomainError::user_not_found(user_id),
            (err, _) => err.into(),
        })?;

        message.push_str("Compte utilisateur mis à jour");
        tracing::info!(user_id, "Account updated");

        Ok(AccountUpdated {
            message,
            profile: saved.profile(),
        })
    }

    /// Delete the account. Deleting an unknown id is not an error.
    pub async fn delete_account(&self, user_id: i32) -> Result<(), DomainError> {
        let deleted = self.users.delete(user_id).await?;
        tracing::info!(user_id, deleted, "Account deletion requested");
        Ok(())
    }

    /// The user and every post in their favorites.
    pub async fn favorites(&self, user_id: i32) -> Result<UserPosts, DomainError> {
        tracing::debug!(user_id, "Loading favorites");

        self.users
            .find_with_posts(user_id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(user_id))
    }

    /// Add a post to the user's favorites.
    ///
    /// Adding a post that is already saved is reported through
    /// [`FavoriteAdded::added`], not as an error.
    pub async fn add_favorite(
        &self,
        user_id: i32,
        target: FavoriteTarget,
    ) -> Result<FavoriteAdded, DomainError> {
        self.ensure_user(user_id).await?;

        let outcome = match target {
            FavoriteTarget::Existing(post_id) => {
                let post = self
                    .posts
                    .find_by_id(post_id)
                    .await?
                    .ok_or_else(|| DomainError::post_not_found(post_id))?;
                let added = self.favorites.add(user_id, post.id).await?;

                FavoriteAdded {
                    post,
                    created: false,
                    added,
                }
            }
            FavoriteTarget::Composed(parts) => {
                let composed = self
                    .favorites
                    .add_composed(user_id, parts)
                    .await
                    .map_err(|err| match err {
                        RepoError::ForeignKey(_) => DomainError::MissingContent,
                        RepoError::NotFound => DomainError::user_not_found(user_id),
                        err => err.into(),
                    })?;

                FavoriteAdded {
                    post: composed.post,
                    created: composed.created,
                    added: composed.added,
                }
            }
        };

        tracing::info!(
            user_id,
            post_id = outcome.post.id,
            created = outcome.created,
            added = outcome.added,
            "Favorite requested"
        );

        Ok(outcome)
    }

    /// Remove a post from the user's favorites.
    pub async fn remove_favorite(
        &self,
        user_id: i32,
        post_id: i32,
    ) -> Result<FavoriteRemoved, DomainError> {
        self.ensure_user(user_id).await?;

        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(DomainError::post_not_found(post_id));
        }

        let removed = self.favorites.remove(user_id, post_id).await?;
        tracing::info!(user_id, post_id, removed, "Favorite removal requested");

        Ok(FavoriteRemoved { post_id, removed })
    }

    async fn ensure_user(&self, user_id: i32) -> Result<(), DomainError> {
        match self.users.find_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::user_not_found(user_id)),
        }
    }
}
