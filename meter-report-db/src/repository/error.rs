use std::error::Error;

/// A write rejected by a uniqueness constraint.
///
/// Repository implementations box this instead of the driver error so callers
/// can tell a key collision apart from other failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Duplicate key violates unique constraint \"{constraint}\"")]
pub struct DuplicateKeyError {
    pub constraint: String,
}

impl DuplicateKeyError {
    pub fn new(constraint: impl Into<String>) -> Self {
        Self {
            constraint: constraint.into(),
        }
    }
}

/// Unique constraint names shared by every storage backend.
pub mod constraints {
    pub const YANTEK_REPORT_PKEY: &str = "yantek_report_pkey";
    pub const CONNECTION_REPORT_PKEY: &str = "connection_report_pkey";
    pub const CONNECTION_REPORT_PARENT_KEY: &str = "connection_report_yantek_report_id_key";
}

/// Returns the duplicate-key details if `err` is (or wraps) a [`DuplicateKeyError`].
pub fn as_duplicate_key<'a>(err: &'a (dyn Error + Send + Sync + 'static)) -> Option<&'a DuplicateKeyError> {
    let mut current: Option<&(dyn Error + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(dup) = e.downcast_ref::<DuplicateKeyError>() {
            return Some(dup);
        }
        current = e.source();
    }
    None
}

pub fn is_duplicate_key(err: &(dyn Error + Send + Sync + 'static)) -> bool {
    as_duplicate_key(err).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_boxed_duplicate_key() {
        let err: Box<dyn Error + Send + Sync> = Box::new(DuplicateKeyError::new(constraints::YANTEK_REPORT_PKEY));
        let dup = as_duplicate_key(err.as_ref()).unwrap();
        assert_eq!(dup.constraint, "yantek_report_pkey");
    }

    #[test]
    fn test_other_errors_are_not_duplicate_keys() {
        let err: Box<dyn Error + Send + Sync> = "Transaction has been consumed".into();
        assert!(!is_duplicate_key(err.as_ref()));
    }
}
