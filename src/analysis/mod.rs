//! Analysis engines over the core AST model.
//!
//! The [`query`] engine selects reference and call nodes with attribute
//! filters; the [`resolution`] engine answers value questions about
//! individual nodes. The two are independent: resolution accepts any
//! node regardless of how it was obtained.

pub mod control_flow;
pub mod query;
pub mod resolution;

pub use control_flow::{get_control_depth, is_under_control_flow};
pub use query::Query;
pub use resolution::{resolve_expression, resolve_reference, Resolved, MAX_RESOLVE_DEPTH};
