//! Constant folding and def-use resolution over program ASTs.
//!
//! `defuse` is a read-only analysis layer for an arena-backed AST
//! model: a fluent [`Query`] engine for selecting reference and call
//! nodes, and a resolution engine that traces a reference to its most
//! recent visible write, propagates parameters through a single
//! unambiguous call site, folds constant arithmetic bottom-up, and
//! measures conditional/loop nesting depth.
//!
//! ```
//! use defuse::{AstBuilder, Query, RefTarget, Resolved, Value};
//! use defuse::resolve_reference;
//!
//! // int x = 2 + 3; use(x);
//! let mut b = AstBuilder::new();
//! let f = b.function(b.root(), "main");
//! let body = b.block(f);
//! let decl = b.statement(body);
//! let x = b.variable(decl, "x");
//! let init = b.operator(x, "+");
//! b.literal(init, Value::Int(2));
//! b.literal(init, Value::Int(3));
//! b.set_initial_value(x, init);
//! let s = b.statement(body);
//! let read = b.reference(s, "x", RefTarget::Variable(x));
//! let ast = b.build();
//!
//! assert_eq!(resolve_reference(&ast, read), Some(Resolved::Literal(Value::Int(5))));
//! let reads = Query::new(&ast, f).all_references().where_name("x").get().unwrap();
//! assert_eq!(reads, vec![read]);
//! ```
//!
//! All analysis is single-threaded and synchronous over an AST snapshot
//! that must not be mutated while a call is in flight.

pub mod analysis;
pub mod core;
pub mod errors;

pub use crate::analysis::{
    get_control_depth, is_under_control_flow, resolve_expression, resolve_reference, Query,
    Resolved,
};
pub use crate::core::{
    Ast, AstBuilder, Category, ControlKind, Expr, ExprKind, Function, NodeId, NodeKind, RefTarget,
    Statement, Value, Variable,
};
pub use crate::errors::QueryError;
