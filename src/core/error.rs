use thiserror::Error;

/// Boxed error preserved as the source of a wrapped failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by the persistence engine and its store collaborators.
///
/// Callers are expected to match on the variant, not the message text. Every
/// variant carries the name of the operation that raised it, so a wrapped
/// error stays matchable while still reading like
/// `"rowwise.update: primary key is not set: invalid parameter"`.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller misuse: incompatible options, empty batch, unresolved or
    /// mutated primary key, zero version token, and the like.
    #[error("{0}: {1}: invalid parameter")]
    InvalidParameter(&'static str, String),

    /// A field mask names a primary-key column, an unknown column, or the
    /// set and set-to-null lists intersect.
    #[error("{0}: {1}: invalid field mask")]
    InvalidFieldMask(&'static str, String),

    /// A single-row lookup found nothing.
    #[error("{0}: record not found")]
    RecordNotFound(&'static str),

    /// Introspection or store failure that is not the caller's fault.
    #[error("{0}: {1}")]
    Internal(&'static str, String),

    /// Unclassified failure bubbling up from a collaborator.
    #[error("{0}: {1}")]
    Unknown(&'static str, #[source] BoxError),

    /// A caller-supplied before-write hook rejected the operation. The
    /// original hook error is preserved as the source, never reclassified.
    #[error("{0}: error before write: {1}")]
    BeforeWrite(&'static str, #[source] BoxError),

    /// A caller-supplied after-write hook failed. The mutation has already
    /// happened; rolling back is the caller's transaction responsibility.
    #[error("{0}: error after write: {1}")]
    AfterWrite(&'static str, #[source] BoxError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_parameter(op: &'static str, msg: impl Into<String>) -> Self {
        Self::InvalidParameter(op, msg.into())
    }

    pub fn invalid_field_mask(op: &'static str, msg: impl Into<String>) -> Self {
        Self::InvalidFieldMask(op, msg.into())
    }

    pub fn record_not_found(op: &'static str) -> Self {
        Self::RecordNotFound(op)
    }

    pub fn internal(op: &'static str, msg: impl Into<String>) -> Self {
        Self::Internal(op, msg.into())
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter(..))
    }

    pub fn is_invalid_field_mask(&self) -> bool {
        matches!(self, Self::InvalidFieldMask(..))
    }

    pub fn is_record_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound(..))
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(..))
    }

    pub fn is_before_write(&self) -> bool {
        matches!(self, Self::BeforeWrite(..))
    }

    pub fn is_after_write(&self) -> bool {
        matches!(self, Self::AfterWrite(..))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_matching() {
        let err = Error::invalid_parameter("rowwise.create", "missing primary key");
        assert!(err.is_invalid_parameter());
        assert!(!err.is_invalid_field_mask());
        assert_eq!(
            err.to_string(),
            "rowwise.create: missing primary key: invalid parameter"
        );
    }

    #[test]
    fn test_hook_error_keeps_source() {
        let err = Error::BeforeWrite("rowwise.update", anyhow::anyhow!("veto").into());
        assert!(err.is_before_write());
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "veto");
    }
}
