pub mod ast;
pub mod value;

pub use ast::{
    Ast, AstBuilder, Category, ControlKind, Expr, ExprKind, Function, NodeId, NodeKind, RefTarget,
    Statement, Variable,
};
pub use value::Value;
