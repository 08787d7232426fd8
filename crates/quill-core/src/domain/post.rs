use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity - one introduction, one body and one conclusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub introduction_id: i32,
    pub body_id: i32,
    pub conclusion_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn parts(&self) -> PostParts {
        PostParts {
            introduction_id: self.introduction_id,
            body_id: self.body_id,
            conclusion_id: self.conclusion_id,
        }
    }
}

/// The content triple a post is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostParts {
    pub introduction_id: i32,
    pub body_id: i32,
    pub conclusion_id: i32,
}

/// A single introduction, body or conclusion record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostContent {
    pub id: i32,
    pub content: String,
}

/// A post with its three content records resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposedPost {
    pub id: i32,
    pub updated_at: DateTime<Utc>,
    pub introduction: PostContent,
    pub body: PostContent,
    pub conclusion: PostContent,
}
