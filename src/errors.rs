//! Error types for query evaluation.
//!
//! Unresolvable analysis outcomes are not errors; the resolver models
//! them as `None`. Errors here are caller-facing faults only.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A filter named an attribute the accessor table does not know.
    #[error("unknown filter attribute `{0}`")]
    UnknownAttribute(String),
}
