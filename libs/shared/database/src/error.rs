use thiserror::Error;

/// Non-success answers from the store. Carried inside `anyhow::Error` so
/// callers that care can `downcast_ref` instead of reading message text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Authentication error: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
}

impl StoreError {
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => StoreError::Unauthorized(body),
            404 => StoreError::NotFound(body),
            409 => StoreError::Conflict(body),
            _ => StoreError::Api { status, body },
        }
    }

    /// True when `err` wraps a store conflict, e.g. a unique-constraint hit.
    pub fn is_conflict(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<StoreError>(), Some(StoreError::Conflict(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(StoreError::from_status(403, "rls".into()), StoreError::Unauthorized("rls".into()));
        assert_eq!(StoreError::from_status(409, "dup".into()), StoreError::Conflict("dup".into()));
        assert_eq!(
            StoreError::from_status(500, "boom".into()),
            StoreError::Api { status: 500, body: "boom".into() }
        );
    }

    #[test]
    fn test_conflict_survives_anyhow_wrapping() {
        let err: anyhow::Error = StoreError::Conflict("duplicate key".into()).into();
        assert!(StoreError::is_conflict(&err));

        let other: anyhow::Error = StoreError::NotFound("gone".into()).into();
        assert!(!StoreError::is_conflict(&other));
    }
}
