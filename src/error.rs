//! Error taxonomy for page composition and the contact relay.
//!
//! Every error here is scoped to the request in flight. Content failures are
//! recovered with fallback content, notification failures are only logged,
//! and the rest are surfaced to the caller.

use std::fmt;
use thiserror::Error;

/// A read from the content service failed or returned malformed data.
///
/// Never surfaced to visitors: the content client logs it and reports the
/// content as absent.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content unavailable at {path}: {reason}")]
    Unavailable { path: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("no page '{slug}' for locale '{locale}'")]
    NotFound { slug: String, locale: String },
}

/// Contact form fields that can fail validation, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    Name,
    Email,
    Message,
}

impl ContactField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Email => "email",
            ContactField::Message => "message",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: ContactField,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: ContactField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to persist contact submission: {0}")]
    Persist(String),
}

/// Best-effort email delivery failed after the submission was stored.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("no recipient email configured")]
    NoRecipient,

    #[error("failed to send {kind} email: {reason}")]
    Send { kind: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new(ContactField::Name, "Name is required");
        assert_eq!(err.to_string(), "name: Name is required");
    }

    #[test]
    fn test_contact_field_names() {
        let names: Vec<&str> = [ContactField::Name, ContactField::Email, ContactField::Message]
            .iter()
            .map(ContactField::as_str)
            .collect();
        assert_eq!(names, vec!["name", "email", "message"]);
    }

    #[test]
    fn test_contact_error_from_validation() {
        let err: ContactError = ValidationError::new(ContactField::Email, "Invalid email").into();
        assert!(matches!(err, ContactError::Validation(ref v) if v.field == ContactField::Email));
        assert!(err.to_string().contains("Invalid email"));
    }

    #[test]
    fn test_not_found_display() {
        let err = PageError::NotFound {
            slug: "about".to_string(),
            locale: "fr".to_string(),
        };
        assert_eq!(err.to_string(), "no page 'about' for locale 'fr'");
    }

    #[test]
    fn test_content_error_display_includes_path() {
        let err = ContentError::Unavailable {
            path: "/pages".to_string(),
            reason: "timed out".to_string(),
        };
        assert!(err.to_string().contains("/pages"));
        assert!(err.to_string().contains("timed out"));
    }
}
