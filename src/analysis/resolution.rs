//! Constant folding and reference resolution.
//!
//! `resolve_reference` answers "what value does this reference carry at
//! its program point", following syntactically traceable flow only:
//! statement-ordered write-sites within the same function, one level of
//! parameter propagation through a single unambiguous call site, and
//! bottom-up folding of constant arithmetic. The dominant outcome for
//! real programs is `None` — "cannot determine statically" — which is a
//! valid analysis result, not a fault.
//!
//! Writes through aliases or compound targets are not matched, and a
//! function with zero or several call sites always aborts parameter
//! propagation instead of guessing.

use log::{debug, trace, warn};
use serde::Serialize;

use crate::core::value::apply_binary;
use crate::core::{Ast, Category, ExprKind, NodeId, NodeKind, RefTarget, Value};

/// Bound on interprocedural resolution hops. Mutually recursive call
/// chains would otherwise recurse without limit; past the bound the
/// reference is reported unresolvable.
pub const MAX_RESOLVE_DEPTH: usize = 128;

/// Outcome of a resolution. The absent outcome ("cannot determine
/// statically") is `Option::None` at the API boundary.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum Resolved {
    /// Fully folded constant.
    Literal(Value),
    /// The original expression node, left unfolded.
    Expr(NodeId),
    /// A bare textual symbol the model never resolved to an entity.
    Symbol(String),
}

/// Resolve an expression to a literal where possible.
///
/// References defer entirely to [`resolve_reference`]. Operators fold
/// bottom-up, and only when every argument folds to a literal and the
/// operator is binary arithmetic (`+ - * / %`); in every other case the
/// original expression node is returned unchanged. Literals are already
/// resolved; calls and default-argument placeholders are deliberately
/// not folded.
///
/// # Panics
///
/// Panics if `expr` is not an expression node.
pub fn resolve_expression(ast: &Ast, expr: NodeId) -> Option<Resolved> {
    resolve_expression_at(ast, expr, 0)
}

fn resolve_expression_at(ast: &Ast, id: NodeId, depth: usize) -> Option<Resolved> {
    let expr = match ast.kind(id) {
        NodeKind::Expr(e) => e,
        other => panic!("resolve_expression called on a non-expression node: {other:?}"),
    };
    match &expr.kind {
        ExprKind::Reference(_) => resolve_reference_at(ast, id, depth),
        ExprKind::Operator => {
            let mut operands = Vec::with_capacity(ast.children(id).len());
            for &arg in ast.children(id) {
                match resolve_expression_at(ast, arg, depth) {
                    Some(Resolved::Literal(value)) => operands.push(value),
                    // Folding needs every argument literal.
                    _ => return Some(Resolved::Expr(id)),
                }
            }
            if ast.is_binary_operator(id) {
                if let Some(value) = apply_binary(&expr.name, &operands[0], &operands[1]) {
                    trace!(
                        "folded `{} {} {}` to {value}",
                        operands[0], expr.name, operands[1]
                    );
                    return Some(Resolved::Literal(value));
                }
            }
            Some(Resolved::Expr(id))
        }
        ExprKind::Literal(value) => Some(Resolved::Literal(value.clone())),
        ExprKind::Call { .. } | ExprKind::DefaultArgument => Some(Resolved::Expr(id)),
    }
}

/// Resolve a reference to its statically visible value.
///
/// Scans the target variable's write-sites with statement-index
/// tie-breaks (earlier statement: same-variable target applies; same
/// statement: only the write whose target is this very reference node;
/// later statement: not yet visible), then attempts single-call-site
/// parameter propagation for still-unwritten parameters, and finally
/// folds an expression-valued result.
///
/// # Panics
///
/// Panics if `reference` is not a reference node.
pub fn resolve_reference(ast: &Ast, reference: NodeId) -> Option<Resolved> {
    resolve_reference_at(ast, reference, 0)
}

fn resolve_reference_at(ast: &Ast, id: NodeId, depth: usize) -> Option<Resolved> {
    let expr = match ast.kind(id) {
        NodeKind::Expr(e) => e,
        other => panic!("resolve_reference called on a non-expression node: {other:?}"),
    };
    let target = match &expr.kind {
        ExprKind::Reference(target) => target,
        other => panic!("resolve_reference called on a non-reference expression: {other:?}"),
    };
    if depth >= MAX_RESOLVE_DEPTH {
        warn!("resolution depth limit hit at `{}`; assuming unresolvable", expr.name);
        return None;
    }

    // No statement context, no program point to resolve at.
    let statement = ast.enclosing_statement(id)?;
    let si = ast.statement_index(statement)?;

    let var_id = match target {
        RefTarget::Unresolved => return None,
        RefTarget::Symbol(symbol) => return Some(Resolved::Symbol(symbol.clone())),
        RefTarget::Variable(var) => *var,
    };
    let Some(var) = ast.variable(var_id) else {
        debug!("reference `{}` targets a non-variable node", expr.name);
        return None;
    };
    let function = ast.enclosing_function(id);

    // Most recent applicable write by statement index. The index
    // comparisons alone decide applicability; the order of the write
    // list does not.
    let mut reaching: Option<(usize, NodeId)> = None;
    for &write in &var.writes {
        // Writes in other functions are never visible here.
        if ast.enclosing_function(write) != function {
            continue;
        }
        let Some(ws) = ast
            .enclosing_statement(write)
            .and_then(|s| ast.statement_index(s))
        else {
            continue;
        };
        let args = ast.children(write);
        let (Some(&target_arg), Some(&rhs)) = (args.first(), args.get(1)) else {
            continue;
        };
        let applies = if ws < si {
            // Happens-before: applies when the write targets the same
            // variable. Aliased or compound targets are skipped.
            is_reference_to(ast, target_arg, var_id)
        } else if ws == si {
            // Same statement: only when the read is the write's target.
            target_arg == id
        } else {
            // Not yet visible.
            false
        };
        if applies && reaching.is_none_or(|(best, _)| ws >= best) {
            reaching = Some((ws, rhs));
        }
    }

    let value: Option<Resolved> = match reaching {
        Some((ws, rhs)) => {
            trace!("write at statement {ws} reaches `{}` at {si}", expr.name);
            resolve_expression_at(ast, rhs, depth)
        }
        None => var.value.map(Resolved::Expr),
    };

    if value.is_none() && var.is_parameter {
        return propagate_parameter(ast, var_id, function, depth);
    }

    match value {
        Some(Resolved::Expr(node)) => resolve_expression_at(ast, node, depth),
        other => other,
    }
}

/// Propagate a parameter's value through its function's single call
/// site. Zero or several call sites abort resolution; merging possible
/// values is deliberately out of scope.
fn propagate_parameter(
    ast: &Ast,
    var_id: NodeId,
    function: Option<NodeId>,
    depth: usize,
) -> Option<Resolved> {
    let func = ast.function(function?)?;
    let mut calls = func
        .references
        .iter()
        .copied()
        .filter(|&site| Category::Call.matches(ast.kind(site)));
    let (first, second) = (calls.next(), calls.next());
    let (Some(call), None) = (first, second) else {
        debug!(
            "parameter in `{}` not propagated: call graph is ambiguous or empty",
            func.name
        );
        return None;
    };

    let Some(position) = func.parameters.iter().position(|&p| p == var_id) else {
        debug!("parameter not declared by its own function `{}`", func.name);
        return None;
    };
    // Fewer actual arguments than the parameter's ordinal: malformed
    // or variadic call, not handled.
    let &actual = ast.children(call).get(position)?;
    match &ast.expr(actual)?.kind {
        ExprKind::Reference(_) => resolve_reference_at(ast, actual, depth + 1),
        ExprKind::Literal(value) => Some(Resolved::Literal(value.clone())),
        // Compound arguments come back as-is, not folded here.
        _ => Some(Resolved::Expr(actual)),
    }
}

fn is_reference_to(ast: &Ast, node: NodeId, var: NodeId) -> bool {
    matches!(
        ast.expr(node).map(|e| &e.kind),
        Some(ExprKind::Reference(RefTarget::Variable(v))) if *v == var
    )
}
