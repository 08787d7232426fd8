//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const NAME_MAX_LEN: usize = 100;
const PASSWORD_MIN_LEN: usize = 8;

/// `PUT /me` body: current credentials plus the fields to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub update: Option<UserUpdate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

impl UpdateUserRequest {
    /// Check the shape of the new values. Every violation is reported.
    ///
    /// Presence of the current credentials is checked by the account service.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Some(update) = &self.update {
            if let Some(email) = &update.email {
                if !is_valid_email(email) {
                    errors.push(format!("update.email: {email} n'est pas un email valide"));
                }
            }
            if let Some(password) = &update.password {
                if password.chars().count() < PASSWORD_MIN_LEN {
                    errors.push(format!(
                        "update.password: au moins {PASSWORD_MIN_LEN} caractères"
                    ));
                }
            }
            for (field, value) in [
                ("update.firstname", &update.firstname),
                ("update.lastname", &update.lastname),
            ] {
                if let Some(value) = value {
                    if value.trim().is_empty() {
                        errors.push(format!("{field}: ne peut pas être vide"));
                    } else if value.chars().count() > NAME_MAX_LEN {
                        errors.push(format!("{field}: {NAME_MAX_LEN} caractères maximum"));
                    }
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

/// `POST /me/posts` body: an existing post id, or a content triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddPostRequest {
    Existing {
        #[serde(rename = "postId")]
        post_id: i32,
    },
    Composed {
        #[serde(rename = "introductionId")]
        introduction_id: i32,
        #[serde(rename = "bodyId")]
        body_id: i32,
        #[serde(rename = "conclusionId")]
        conclusion_id: i32,
    },
}

impl AddPostRequest {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let ids = match self {
            AddPostRequest::Existing { post_id } => vec![("postId", *post_id)],
            AddPostRequest::Composed {
                introduction_id,
                body_id,
                conclusion_id,
            } => vec![
                ("introductionId", *introduction_id),
                ("bodyId", *body_id),
                ("conclusionId", *conclusion_id),
            ],
        };

        let errors: Vec<String> = ids
            .into_iter()
            .filter(|(_, id)| *id <= 0)
            .map(|(field, _)| format!("{field}: doit être un entier positif"))
            .collect();

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Public fields of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserResponse {
    pub msg: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub msg: String,
}

/// Result of `POST /me/posts`. `saved` is false when the post was already
/// in the favorites.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub msg: String,
    pub post_id: i32,
    pub created: bool,
    pub saved: bool,
}

/// Result of `DELETE /me/posts/{postId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFavoriteResponse {
    pub msg: String,
    pub post_id: i32,
    pub removed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPartResponse {
    pub id: i32,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i32,
    pub updated_at: DateTime<Utc>,
    pub introduction: PostPartResponse,
    pub body: PostPartResponse,
    pub conclusion: PostPartResponse,
}

/// `GET /me/posts`: the user and their favorite posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPostsResponse {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub posts: Vec<PostResponse>,
}
