//! Session error types.

use thiserror::Error;

/// Errors reported by a solver session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// `pop` asked for more scopes than are open.
    #[error("cannot pop {requested} scope(s): only {depth} open")]
    UnbalancedPop { requested: usize, depth: usize },

    /// A variable handle from another session was used.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),
}

impl From<SessionError> for seqarrange_core::Error {
    fn from(err: SessionError) -> Self {
        seqarrange_core::Error::Session(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_conversion() {
        let err = SessionError::UnbalancedPop {
            requested: 2,
            depth: 1,
        };
        assert_eq!(err.to_string(), "cannot pop 2 scope(s): only 1 open");
        let core: seqarrange_core::Error = err.into();
        assert!(matches!(core, seqarrange_core::Error::Session(_)));
    }
}
