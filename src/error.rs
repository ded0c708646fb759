use http::Method;
use std::fmt;

/// Routing error
///
/// Registration-time variants reject a malformed pattern before the tree is
/// touched, so a failed registration never corrupts existing routes. The
/// request-time variants (`ChainExhausted`, `ParamCountMismatch`) indicate a
/// configuration or construction bug and abort the single dispatch that
/// discovered them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// Pattern does not begin with `/`
    ///
    /// Every registered pattern is an absolute path; group prefixes are
    /// joined before insertion, so the tree only ever sees `/`-rooted
    /// patterns.
    PatternMustStartWithSlash {
        /// The rejected pattern
        pattern: String,
    },
    /// A `:` parameter token has no name
    ///
    /// `:` must be followed by at least one character before the next `/`
    /// or the end of the pattern.
    MissingParamName {
        /// The rejected pattern
        pattern: String,
    },
    /// A wildcard `*` appears anywhere but the final byte of the pattern
    ///
    /// The wildcard consumes the whole remainder of a matched path, so
    /// nothing may follow it.
    WildcardNotAtEnd {
        /// The rejected pattern
        pattern: String,
    },
    /// The same parameter name is bound twice in one pattern
    DuplicateParamName {
        /// The rejected pattern
        pattern: String,
        /// The repeated name
        name: String,
    },
    /// The route's method is not part of the registry
    ///
    /// The method set is fixed when the router is constructed; registering
    /// against any other method is an error rather than a silent no-op.
    UnregisteredMethod {
        /// The method the caller tried to register under
        method: Method,
    },
    /// `advance()` was called with no step left to run
    ///
    /// A handler expected a following step that was never registered. This
    /// is distinct from a middleware that simply declines to continue.
    ChainExhausted {
        /// Total number of steps in the chain
        steps: usize,
    },
    /// A matched node's parameter names and captured values disagree
    ///
    /// Internal consistency failure: the tree was built incorrectly.
    ParamCountMismatch {
        /// Number of parameter names bound at the matched node
        expected: usize,
        /// Number of values captured during the traversal
        found: usize,
    },
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::PatternMustStartWithSlash { pattern } => {
                write!(f, "malformed pattern '{}': must begin with '/'", pattern)
            }
            RouterError::MissingParamName { pattern } => {
                write!(
                    f,
                    "malformed pattern '{}': ':' must be followed by a parameter name",
                    pattern
                )
            }
            RouterError::WildcardNotAtEnd { pattern } => {
                write!(
                    f,
                    "malformed pattern '{}': wildcard '*' is only legal as the final token",
                    pattern
                )
            }
            RouterError::DuplicateParamName { pattern, name } => {
                write!(
                    f,
                    "malformed pattern '{}': parameter name '{}' is bound more than once",
                    pattern, name
                )
            }
            RouterError::UnregisteredMethod { method } => {
                write!(
                    f,
                    "method {} is not part of this router's method set",
                    method
                )
            }
            RouterError::ChainExhausted { steps } => {
                write!(
                    f,
                    "handler chain exhausted: advance() called past the final step ({} registered)",
                    steps
                )
            }
            RouterError::ParamCountMismatch { expected, found } => {
                write!(
                    f,
                    "parameter count mismatch: matched node binds {} name(s) but {} value(s) were captured",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for RouterError {}
