//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures.
///
/// The `Display` text is the message shown to end users; `code()` is the
/// stable identifier clients should match on.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity_type} introuvable")]
    NotFound { entity_type: &'static str, id: i32 },

    #[error("Vous devez renseigner votre email et votre mot de passe actuels")]
    MissingCredentials,

    #[error("Ancien mot de passe et/ou email invalide")]
    InvalidCredentials,

    #[error("Votre nouvel email est identique à votre ancien email.")]
    EmailUnchanged,

    #[error("{0} est déjà utilisé")]
    EmailTaken(String),

    #[error("Le nouveau mot de passe et sa confirmation ne sont pas identiques.")]
    PasswordMismatch,

    #[error("Introduction, corps ou conclusion introuvable")]
    MissingContent,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn user_not_found(id: i32) -> Self {
        Self::NotFound {
            entity_type: "Utilisateur",
            id,
        }
    }

    pub fn post_not_found(id: i32) -> Self {
        Self::NotFound {
            entity_type: "Post",
            id,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => "not-found",
            DomainError::MissingCredentials => "missing-credentials",
            DomainError::InvalidCredentials => "invalid-credentials",
            DomainError::EmailUnchanged => "email-unchanged",
            DomainError::EmailTaken(_) => "email-taken",
            DomainError::PasswordMismatch => "password-mismatch",
            DomainError::MissingContent => "content-not-found",
            DomainError::Internal(_) => "internal",
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Unique constraint violation: {0}")]
    Unique(String),

    #[error("Foreign key violation: {0}")]
    ForeignKey(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        DomainError::Internal(err.to_string())
    }
}
