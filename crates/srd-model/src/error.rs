//! Validation errors for the domain model

/// A validation predicate failed
///
/// `field` is a dotted path naming the offending value, e.g.
/// `environment.landingZone.metadata.tenantAlias`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Required text field is empty
    #[error("{field} empty")]
    Empty { field: String },

    /// Region text is not a recognized region
    #[error("{field} unrecognized region '{value}'")]
    UnrecognizedRegion { field: String, value: String },

    /// Required list is empty
    #[error("{field} empty list")]
    EmptyList { field: String },
}

impl ValidationError {
    /// Create empty-field error
    pub fn empty(field: impl Into<String>) -> Self {
        Self::Empty {
            field: field.into(),
        }
    }

    /// Dotted path of the offending field
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Empty { field }
            | Self::UnrecognizedRegion { field, .. }
            | Self::EmptyList { field } => field,
        }
    }
}

/// Join a prefix and a field name with exactly one `.`
pub(crate) fn field_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else if prefix.ends_with('.') {
        format!("{prefix}{field}")
    } else {
        format!("{prefix}.{field}")
    }
}

/// Fail with [`ValidationError::Empty`] when `value` is empty
pub(crate) fn require_text(value: &str, prefix: &str, field: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::empty(field_path(prefix, field)))
    } else {
        Ok(())
    }
}
