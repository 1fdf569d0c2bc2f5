//! Error taxonomy shared by the sketch and serve crates.
//!
//! - `InvalidArgument`: bad enum value, unparsable number or malformed JSON in
//!   the magic line. Raised before anything touches the filesystem.
//! - `ResourceExhausted`: no free port left in the reserved range.
//! - `Host`: the notebook host bridge could not answer (e.g. proxy URL).
//! - `Io`: filesystem or socket failure, propagated unchanged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MagicError {
    #[error("Invalid argument '{field}': {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    #[error("No free port in reserved range {start}-{end}")]
    ResourceExhausted { start: u16, end: u16 },

    #[error("Host bridge unavailable: {0}")]
    Host(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MagicError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        MagicError::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    /// Field name for `InvalidArgument`, `None` for every other kind.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            MagicError::InvalidArgument { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MagicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_message_names_field() {
        let err = MagicError::invalid("py_conf", "expected value at line 1 column 1");
        assert_eq!(err.field(), Some("py_conf"));
        assert!(err.to_string().contains("'py_conf'"));
    }

    #[test]
    fn test_resource_exhausted_message() {
        let err = MagicError::ResourceExhausted {
            start: 8000,
            end: 8099,
        };
        assert_eq!(err.field(), None);
        assert_eq!(err.to_string(), "No free port in reserved range 8000-8099");
    }
}
