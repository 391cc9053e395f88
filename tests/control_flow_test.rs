//! Control-depth metrics, including the one-level interprocedural mode.

use defuse::{
    get_control_depth, is_under_control_flow, AstBuilder, ControlKind, NodeId, Value,
};
use pretty_assertions::assert_eq;

fn nested_ifs(levels: usize) -> (defuse::Ast, NodeId) {
    let mut b = AstBuilder::new();
    let f = b.function(b.root(), "f");
    let mut scope = b.block(f);
    for _ in 0..levels {
        let cf = b.control_flow(scope, ControlKind::If);
        scope = b.block(cf);
    }
    let s = b.statement(scope);
    let node = b.literal(s, Value::Int(0));
    (b.build(), node)
}

#[test]
fn depth_matches_nesting_level() {
    for levels in 0..4 {
        let (ast, node) = nested_ifs(levels);
        assert_eq!(get_control_depth(&ast, node, false), levels);
        assert_eq!(get_control_depth(&ast, node, true), levels);
    }
}

#[test]
fn under_control_flow_iff_depth_positive() {
    for levels in 0..4 {
        let (ast, node) = nested_ifs(levels);
        for recursive in [false, true] {
            assert_eq!(
                is_under_control_flow(&ast, node, recursive),
                get_control_depth(&ast, node, recursive) > 0
            );
        }
    }
}

#[test]
fn loop_blocks_count_like_conditionals() {
    let mut b = AstBuilder::new();
    let f = b.function(b.root(), "f");
    let body = b.block(f);
    let cf = b.control_flow(body, ControlKind::For);
    let loop_body = b.block(cf);
    let inner = b.control_flow(loop_body, ControlKind::Switch);
    let case_body = b.block(inner);
    let s = b.statement(case_body);
    let node = b.literal(s, Value::Int(0));

    let ast = b.build();
    assert_eq!(get_control_depth(&ast, node, false), 2);
}

#[test]
fn recursive_depth_crosses_one_call_edge_only() {
    // leaf is called by mid from inside an if; mid is called by main
    // from inside two nested ifs. Recursive depth from leaf adds only
    // mid's own call-site nesting, not main's.
    let mut b = AstBuilder::new();
    let leaf = b.function(b.root(), "leaf");
    let leaf_body = b.block(leaf);
    let s = b.statement(leaf_body);
    let probe = b.literal(s, Value::Int(0));

    let mid = b.function(b.root(), "mid");
    let mid_body = b.block(mid);
    let mid_if = b.control_flow(mid_body, ControlKind::If);
    let mid_branch = b.block(mid_if);
    let mid_s = b.statement(mid_branch);
    b.call(mid_s, "leaf", Some(leaf));

    let main = b.function(b.root(), "main");
    let main_body = b.block(main);
    let outer_if = b.control_flow(main_body, ControlKind::If);
    let outer = b.block(outer_if);
    let inner_if = b.control_flow(outer, ControlKind::If);
    let inner = b.block(inner_if);
    let main_s = b.statement(inner);
    b.call(main_s, "mid", Some(mid));

    let ast = b.build();
    assert_eq!(get_control_depth(&ast, probe, false), 0);
    // leaf's single call site sits one if deep inside mid; main's
    // deeper call of mid is beyond the single interprocedural hop.
    assert_eq!(get_control_depth(&ast, probe, true), 1);
}
