//! Standardized error body (RFC 7807 problem details).

use serde::{Deserialize, Serialize};

/// RFC 7807 Problem Details for HTTP APIs.
///
/// See: https://datatracker.ietf.org/doc/html/rfc7807
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub error_type: String,

    /// A short, human-readable summary of the problem type.
    pub title: String,

    /// The HTTP status code.
    pub status: u16,

    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Stable machine-readable error code (extension member).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Every rule a request body broke (extension member).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            error_type: "about:blank".to_string(),
            title: title.into(),
            status,
            detail: None,
            code: None,
            errors: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    // Common error constructors
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(400, "Bad Request").with_detail(detail)
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error").with_code("internal")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_members_are_omitted() {
        let body = serde_json::to_value(ErrorResponse::new(401, "Unauthorized")).unwrap();

        assert_eq!(
            body,
            serde_json::json!({ "type": "about:blank", "title": "Unauthorized", "status": 401 })
        );
    }

    #[test]
    fn test_validation_errors_are_listed() {
        let body = serde_json::to_value(
            ErrorResponse::new(422, "Validation Failed")
                .with_code("validation-failed")
                .with_errors(vec!["a".to_string(), "b".to_string()]),
        )
        .unwrap();

        assert_eq!(body["code"], "validation-failed");
        assert_eq!(body["errors"], serde_json::json!(["a", "b"]));
    }
}
