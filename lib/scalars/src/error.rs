#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScalarError {
    /// The runtime kind of the input can never become the declared scalar.
    #[error("{scalar} must be {expected}, got {found}")]
    TypeMismatch {
        scalar: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    /// The input kind is acceptable, but this particular value does not convert losslessly.
    #[error("{scalar}: cannot convert '{value}': {reason}")]
    ConversionError {
        scalar: &'static str,
        value: String,
        reason: &'static str,
    },
}
