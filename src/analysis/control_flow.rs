//! Control-flow nesting depth.
//!
//! Depth is purely syntactic: each block owned by a conditional or loop
//! construct counts one level, reachability is never consulted. The
//! recursive mode adds one level of interprocedural context — the
//! deepest nesting among the enclosing function's call sites — and no
//! more; nested computations always walk non-recursively.

use crate::core::{Ast, Category, NodeId, NodeKind};

/// Whether `node` sits inside at least one conditional/loop block.
pub fn is_under_control_flow(ast: &Ast, node: NodeId, recursive: bool) -> bool {
    get_control_depth(ast, node, recursive) > 0
}

/// Number of conditional/loop blocks enclosing `node`, up to its
/// function boundary (or the root when there is none).
///
/// With `recursive` set, the maximum non-recursive depth over the
/// function's call sites is added at the boundary; a function nobody
/// calls gains nothing.
pub fn get_control_depth(ast: &Ast, node: NodeId, recursive: bool) -> usize {
    let mut depth = 0;
    let mut current = Some(node);
    while let Some(id) = current {
        match ast.kind(id) {
            NodeKind::Block => {
                let owned_by_control = matches!(
                    ast.parent(id).map(|p| ast.kind(p)),
                    Some(NodeKind::ControlFlow(_))
                );
                if owned_by_control {
                    depth += 1;
                }
            }
            NodeKind::Function(function) => {
                if recursive {
                    let call_depth = function
                        .references
                        .iter()
                        .filter(|&&site| Category::Call.matches(ast.kind(site)))
                        .map(|&site| get_control_depth(ast, site, false))
                        .max();
                    if let Some(max) = call_depth {
                        depth += max;
                    }
                }
                return depth;
            }
            _ => {}
        }
        current = ast.parent(id);
    }
    depth
}
