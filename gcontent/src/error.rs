//! Content and configuration errors raised before any network call.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorKind {
    Empty,
    MissingMimeType,
    InvalidReference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentError {
    pub kind: ContentErrorKind,
    pub message: String,
}

impl ContentError {
    pub fn new(kind: ContentErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(ContentErrorKind::Empty, message)
    }

    pub fn missing_mime_type(message: impl Into<String>) -> Self {
        Self::new(ContentErrorKind::MissingMimeType, message)
    }

    pub fn invalid_reference(message: impl Into<String>) -> Self {
        Self::new(ContentErrorKind::InvalidReference, message)
    }
}

impl Display for ContentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ContentError {}

/// Configuration resolution failure listing every violated constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub constraints: Vec<String>,
}

impl ConfigError {
    pub fn new(constraints: Vec<String>) -> Self {
        Self { constraints }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid generation config: {}",
            self.constraints.join("; ")
        )
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_error_display_includes_kind_and_message() {
        let error = ContentError::missing_mime_type("inline data has no mime type");
        let rendered = error.to_string();
        assert!(rendered.contains("MissingMimeType"));
        assert!(rendered.contains("inline data"));
    }

    #[test]
    fn config_error_lists_all_constraints() {
        let error = ConfigError::new(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(error.to_string(), "invalid generation config: a; b");
    }
}
