use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::post::ComposedPost;

/// User entity - represents an account holder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a user with fresh timestamps. The id is assigned by the store.
    pub fn new(
        id: i32,
        firstname: String,
        lastname: String,
        email: String,
        password_hash: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            firstname,
            lastname,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            firstname: self.firstname.clone(),
            lastname: self.lastname.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public projection of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

/// A user together with the posts saved in their favorites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPosts {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub posts: Vec<ComposedPost>,
}

/// Mask an email for logging: `alice@x.com` becomes `a***@x.com`.
pub fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.chars().count() > 1 => format!("{first}***"),
                _ => "***".to_string(),
            };
            format!("{masked_local}{domain}")
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@x.com"), "a***@x.com");
        assert_eq!(mask_email("a@x.com"), "***@x.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }

    #[test]
    fn test_profile_projection() {
        let user = User::new(
            1,
            "Ada".to_string(),
            "Lovelace".to_string(),
            "ada@x.com".to_string(),
            "hash".to_string(),
        );
        let profile = user.profile();
        assert_eq!(profile.firstname, "Ada");
        assert_eq!(profile.lastname, "Lovelace");
        assert_eq!(profile.email, "ada@x.com");
    }
}
