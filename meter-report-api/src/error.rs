use thiserror::Error;

/// Failure taxonomy surfaced by every lifecycle and query operation.
///
/// The transport layer maps these onto protocol codes; see [`ReportError::status_code`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReportError {
    /// Conventional HTTP status for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            ReportError::ValidationFailed(_) => 400,
            ReportError::NotFound(_) => 404,
            ReportError::Conflict(_) => 409,
            ReportError::Internal(_) => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ReportError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ReportError::Conflict(_))
    }
}

impl From<validator::ValidationErrors> for ReportError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reasons: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                format!("{field}: {}", reasons.join(", "))
            })
            .collect();
        fields.sort();
        ReportError::ValidationFailed(fields.join("; "))
    }
}

pub type ReportResult<T> = Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ReportError::ValidationFailed("x".into()).status_code(), 400);
        assert_eq!(ReportError::NotFound("x".into()).status_code(), 404);
        assert_eq!(ReportError::Conflict("x".into()).status_code(), 409);
        assert_eq!(ReportError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_display_keeps_context() {
        let err = ReportError::NotFound("Yantek report YT2025010001 not found".into());
        assert_eq!(err.to_string(), "Not found: Yantek report YT2025010001 not found");
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
    }
}
