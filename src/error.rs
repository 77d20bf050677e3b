//! Error types for the preprocessor

use thiserror::Error;

/// Failures raised while filtering directive blocks.
///
/// Every variant aborts the whole run; no partial output is produced.
/// Line numbers are 1-based and point at the offending directive line;
/// messages leave them out so callers can prefix `file:line:` themselves.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("maximum nesting depth of {max} exceeded")]
    MaxDepthExceeded { line: usize, max: usize },

    #[error("unbalanced directives: {open} block(s) left open")]
    UnbalancedDirectives { open: usize, line: usize },

    #[error("@endif without a matching @ifdef or @ifndef")]
    UnmatchedEndif { line: usize },
}

impl Error {
    /// Stable name of the variant, used by fixture files
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MaxDepthExceeded { .. } => "MaxDepthExceeded",
            Error::UnbalancedDirectives { .. } => "UnbalancedDirectives",
            Error::UnmatchedEndif { .. } => "UnmatchedEndif",
        }
    }

    /// Line of the directive that triggered the failure
    pub fn line(&self) -> usize {
        match self {
            Error::MaxDepthExceeded { line, .. }
            | Error::UnbalancedDirectives { line, .. }
            | Error::UnmatchedEndif { line } => *line,
        }
    }
}

/// Result type alias for preprocessing
pub type Result<T> = std::result::Result<T, Error>;
