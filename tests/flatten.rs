//! Tests for the tree-to-linear flattening pass.

use minnow::{flatten, flatten_expr, BinaryOp, ExprType, Function, LinearNode};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn operands_come_before_operators() {
    init();
    let mut func = Function::new();
    let x = func.add_param(ExprType::I32);
    let ten = func.i32_const(10);
    let arg = func.local_get(x);
    let sum = func.binary(BinaryOp::I32Add, ten, arg);
    let body = func.block(None, vec![sum], ExprType::I32);
    func.set_body(body);

    let linear = flatten(&func);
    assert_eq!(
        linear.nodes(),
        &[
            LinearNode::Instr(ten),
            LinearNode::Instr(arg),
            LinearNode::Instr(sum),
        ]
    );
}

#[test]
fn labeled_block_keeps_its_markers() {
    init();
    let mut func = Function::new();
    let ten = func.i32_const(10);
    let body = func.block(Some("b"), vec![ten], ExprType::I32);
    func.set_body(body);

    let linear = flatten(&func);
    assert_eq!(
        linear.nodes(),
        &[
            LinearNode::Open(body),
            LinearNode::Instr(ten),
            LinearNode::End(body),
        ]
    );
}

#[test]
fn whole_node_mode_keeps_unlabeled_blocks() {
    init();
    let mut func = Function::new();
    let ten = func.i32_const(10);
    let block = func.block(None, vec![ten], ExprType::I32);
    func.set_body(block);

    // In body position the unlabeled block is spliced away...
    assert_eq!(flatten(&func).nodes(), &[LinearNode::Instr(ten)]);
    // ...but a whole-node flatten emits it as written.
    assert_eq!(
        flatten_expr(&func, block).nodes(),
        &[
            LinearNode::Open(block),
            LinearNode::Instr(ten),
            LinearNode::End(block),
        ]
    );
}

#[test]
fn if_arms_are_bracketed_by_markers() {
    init();
    let mut func = Function::new();
    let x = func.add_param(ExprType::I32);
    let cond = func.local_get(x);
    let then_nop = func.nop();
    let then_arm = func.block(None, vec![then_nop], ExprType::None);
    let else_nop = func.nop();
    let else_arm = func.block(None, vec![else_nop], ExprType::None);
    let body = func.if_(cond, then_arm, Some(else_arm), ExprType::None);
    func.set_body(body);

    let linear = flatten(&func);
    assert_eq!(
        linear.nodes(),
        &[
            LinearNode::Instr(cond),
            LinearNode::Open(body),
            LinearNode::Instr(then_nop),
            LinearNode::Else(body),
            LinearNode::Instr(else_nop),
            LinearNode::End(body),
        ]
    );
}

#[test]
fn if_with_unreachable_condition_loses_its_frame() {
    init();
    let mut func = Function::new();
    let cond = func.unreachable_();
    let then_arm = func.nop();
    let else_arm = func.nop();
    let body = func.if_(cond, then_arm, Some(else_arm), ExprType::Unreachable);
    func.set_body(body);

    let linear = flatten(&func);
    assert_eq!(
        linear.nodes(),
        &[LinearNode::Instr(cond), LinearNode::Unreachable]
    );
}

#[test]
fn unreachable_block_gets_synthetic_terminators() {
    init();
    let mut func = Function::new();
    let diverge = func.unreachable_();
    let body = func.block(Some("x"), vec![diverge], ExprType::Unreachable);
    func.set_body(body);

    let linear = flatten(&func);
    assert_eq!(
        linear.nodes(),
        &[
            LinearNode::Open(body),
            LinearNode::Instr(diverge),
            LinearNode::Unreachable,
            LinearNode::End(body),
            LinearNode::Unreachable,
        ]
    );
}

#[test]
fn spliced_loop_body_is_terminated_like_the_block_it_stands_for() {
    init();
    let mut func = Function::new();
    let br = func.br("out", None);
    let dead = func.i32_const(1);
    let inner = func.block(None, vec![br, dead], ExprType::Unreachable);
    let lp = func.loop_(None, inner);
    let outer = func.block(Some("out"), vec![lp], ExprType::None);
    func.set_body(outer);

    let linear = flatten(&func);
    assert_eq!(
        linear.nodes(),
        &[
            LinearNode::Open(outer),
            LinearNode::Open(lp),
            LinearNode::Instr(br),
            LinearNode::Instr(dead),
            // The spliced block's contents do not end in a diverging
            // instruction, so the splice is terminated...
            LinearNode::Unreachable,
            // ...and the loop itself can never be exited, so it is closed
            // with one synthetic terminator inside and one outside.
            LinearNode::Unreachable,
            LinearNode::End(lp),
            LinearNode::Unreachable,
            LinearNode::End(outer),
        ]
    );
}

#[test]
fn removal_leaves_an_empty_slot() {
    init();
    let mut func = Function::new();
    let nop = func.nop();
    let one = func.i32_const(1);
    let dropped = func.drop_(one);
    let body = func.block(None, vec![nop, dropped], ExprType::None);
    func.set_body(body);

    let mut linear = flatten(&func);
    assert_eq!(linear.len(), 3);
    linear.remove(0);
    assert_eq!(linear.len(), 3);
    assert_eq!(linear.get(0), Some(LinearNode::Nil));
    assert_eq!(
        linear.iter().collect::<Vec<_>>(),
        vec![
            LinearNode::Nil,
            LinearNode::Instr(one),
            LinearNode::Instr(dropped),
        ]
    );
}
