//! Byte-exact tests for the binary encoder, fused and linear.

use minnow::opcode::*;
use minnow::{
    flatten, AtomicOp, BinaryOp, DebugLocation, ExprType, Function, ModuleIndices, Writer,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_with(func: &Function, indices: &ModuleIndices) -> Vec<u8> {
    let mut bytes = Vec::new();
    Writer::new(func, indices, &mut bytes).write().unwrap();
    bytes
}

/// Encodes `func` through both paths and checks they agree.
fn write_both_ways(func: &Function, indices: &ModuleIndices) -> Vec<u8> {
    let fused = write_with(func, indices);
    let linear = flatten(func);
    let mut replayed = Vec::new();
    Writer::new(func, indices, &mut replayed)
        .write_linear(&linear)
        .unwrap();
    assert_eq!(fused, replayed, "fused and linear encodings diverged");
    fused
}

#[test]
fn labeled_block_is_not_elided() {
    init();
    let mut func = Function::new();
    let x = func.add_param(ExprType::I32);
    let ten = func.i32_const(10);
    let arg = func.local_get(x);
    let sum = func.binary(BinaryOp::I32Add, ten, arg);
    let body = func.block(Some("b"), vec![sum], ExprType::I32);
    func.set_body(body);

    // The label is untargeted, but only *unlabeled* blocks are elided.
    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [BLOCK, 0x7f, I32_CONST, 0x0a, LOCAL_GET, 0x00, 0x6a, END]
    );
}

#[test]
fn unlabeled_body_block_is_elided() {
    init();
    let mut func = Function::new();
    let x = func.add_param(ExprType::I32);
    let ten = func.i32_const(10);
    let arg = func.local_get(x);
    let sum = func.binary(BinaryOp::I32Add, ten, arg);
    let body = func.block(None, vec![sum], ExprType::I32);
    func.set_body(body);

    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [I32_CONST, 0x0a, LOCAL_GET, 0x00, 0x6a]
    );
}

#[test]
fn if_with_unreachable_condition_emits_no_frame() {
    init();
    let mut func = Function::new();
    let cond = func.unreachable_();
    let then_arm = func.nop();
    let else_arm = func.nop();
    let body = func.if_(cond, then_arm, Some(else_arm), ExprType::Unreachable);
    func.set_body(body);

    // Only the condition, then one synthetic unreachable; no if/else/end.
    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [UNREACHABLE, UNREACHABLE]
    );
}

#[test]
fn unreachable_loop_declares_no_result() {
    init();
    let mut func = Function::new();
    let br = func.br("out", None);
    let lp = func.loop_(None, br);
    let body = func.block(Some("out"), vec![lp], ExprType::None);
    func.set_body(body);

    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [
            BLOCK,
            0x40,
            LOOP,
            0x40, // declared empty although the loop type is unreachable
            BR,
            0x01,
            UNREACHABLE, // inside, right before the end
            END,
            UNREACHABLE, // outside, for whatever follows
            END,
        ]
    );
}

#[test]
fn unreachable_block_signature_rule() {
    init();
    let mut func = Function::new();
    let diverge = func.unreachable_();
    let body = func.block(Some("x"), vec![diverge], ExprType::Unreachable);
    func.set_body(body);

    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [BLOCK, 0x40, UNREACHABLE, UNREACHABLE, END, UNREACHABLE]
    );
}

#[test]
fn branch_depths_are_relative_to_nesting() {
    init();
    let mut func = Function::new();
    let br_b = func.br("b", None);
    let br_a = func.br("a", None);
    let inner = func.block(Some("b"), vec![br_b, br_a], ExprType::None);
    let outer = func.block(Some("a"), vec![inner], ExprType::None);
    func.set_body(outer);

    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [BLOCK, 0x40, BLOCK, 0x40, BR, 0x00, BR, 0x01, END, END]
    );
}

#[test]
fn branch_depths_cross_if_arm_frames() {
    init();
    let mut func = Function::new();
    let x = func.add_param(ExprType::I32);
    let cond = func.local_get(x);
    let br_then = func.br("out", None);
    let then_arm = func.block(None, vec![br_then], ExprType::Unreachable);
    let br_else = func.br("out", None);
    let else_arm = func.block(None, vec![br_else], ExprType::Unreachable);
    let body = func.if_(cond, then_arm, Some(else_arm), ExprType::Unreachable);
    let outer = func.block(Some("out"), vec![body], ExprType::None);
    func.set_body(outer);

    // The if arm owns one anonymous frame, so the branch skips it: depth 1.
    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [
            BLOCK,
            0x40,
            LOCAL_GET,
            0x00,
            IF,
            0x40,
            BR,
            0x01,
            ELSE,
            BR,
            0x01,
            UNREACHABLE,
            END,
            UNREACHABLE,
            END,
        ]
    );
}

#[test]
fn br_table_resolves_every_target() {
    init();
    let mut func = Function::new();
    let selector = func.i32_const(1);
    let sw = func.switch(&["b", "a"], "a", None, selector);
    let inner = func.block(Some("b"), vec![sw], ExprType::None);
    let outer = func.block(Some("a"), vec![inner], ExprType::None);
    func.set_body(outer);

    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [
            BLOCK, 0x40, BLOCK, 0x40, I32_CONST, 0x01, BR_TABLE, 0x02, 0x00, 0x01, 0x01, END,
            END,
        ]
    );
}

#[test]
fn br_table_with_unreachable_selector_is_abandoned() {
    init();
    let mut func = Function::new();
    let selector = func.unreachable_();
    let sw = func.switch(&["a"], "a", None, selector);
    let outer = func.block(Some("a"), vec![sw], ExprType::None);
    func.set_body(outer);

    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [BLOCK, 0x40, UNREACHABLE, UNREACHABLE, END]
    );
}

#[test]
fn if_else_with_results() {
    init();
    let mut func = Function::new();
    let x = func.add_param(ExprType::I32);
    let cond = func.local_get(x);
    let one = func.i32_const(1);
    let then_arm = func.block(None, vec![one], ExprType::I32);
    let two = func.i32_const(2);
    let else_arm = func.block(None, vec![two], ExprType::I32);
    let body = func.if_(cond, then_arm, Some(else_arm), ExprType::I32);
    func.set_body(body);

    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [
            LOCAL_GET, 0x00, IF, 0x7f, I32_CONST, 0x01, ELSE, I32_CONST, 0x02, END,
        ]
    );
}

#[test]
fn conditional_branch_with_unreachable_value() {
    init();
    let mut func = Function::new();
    let x = func.add_param(ExprType::I32);
    let value = func.unreachable_();
    let cond = func.local_get(x);
    let br = func.br_if("out", Some(value), cond);
    let outer = func.block(Some("out"), vec![br], ExprType::I32);
    func.set_body(outer);

    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [
            BLOCK,
            0x7f,
            UNREACHABLE,
            LOCAL_GET,
            0x00,
            BR_IF,
            0x00,
            UNREACHABLE, // the fall-through value never materialized
            END,
        ]
    );
}

#[test]
fn load_with_unreachable_address_is_abandoned() {
    init();
    let mut func = Function::new();
    let addr = func.unreachable_();
    let load = func.load(ExprType::I32, 4, false, 0, 0, addr);
    func.set_body(load);

    assert_eq!(write_both_ways(&func, &ModuleIndices::default()), [UNREACHABLE]);
}

#[test]
fn store_with_unreachable_value_keeps_its_opcode() {
    init();
    let mut func = Function::new();
    let addr = func.i32_const(0);
    let value = func.unreachable_();
    let store = func.store(ExprType::I32, 4, 0, 0, addr, value);
    func.set_body(store);

    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [
            I32_CONST,
            0x00,
            UNREACHABLE,
            I32_STORE,
            0x02,
            0x00,
            UNREACHABLE, // a plain instruction that never completes
        ]
    );
}

#[test]
fn atomic_store_with_unreachable_value_is_abandoned() {
    init();
    let mut func = Function::new();
    let addr = func.i32_const(0);
    let value = func.unreachable_();
    let store = func.atomic_store(ExprType::I32, 4, 0, addr, value);
    func.set_body(store);

    // Atomics abandon on any non-completing operand: no opcode at all.
    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [I32_CONST, 0x00, UNREACHABLE]
    );
}

#[test]
fn narrow_atomic_rmw_uses_extending_opcode() {
    init();
    let mut func = Function::new();
    let addr = func.i32_const(0);
    let value = func.i32_const(1);
    let rmw = func.atomic_rmw(AtomicOp::Add, ExprType::I32, 1, 16, addr, value);
    let body = func.drop_(rmw);
    func.set_body(body);

    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [
            I32_CONST,
            0x00,
            I32_CONST,
            0x01,
            ATOMIC_PREFIX,
            I32_ATOMIC_RMW8_ADD_U,
            0x00, // log2 of the one-byte natural alignment
            0x10,
            DROP,
        ]
    );
}

#[test]
fn atomic_cmpxchg_wait_and_notify() {
    init();
    let mut func = Function::new();
    let addr = func.i32_const(0);
    let expected = func.i64_const(0);
    let replacement = func.i64_const(1);
    let cas = func.atomic_cmpxchg(ExprType::I64, 4, 0, addr, expected, replacement);
    let body = func.drop_(cas);
    func.set_body(body);

    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [
            I32_CONST,
            0x00,
            I64_CONST,
            0x00,
            I64_CONST,
            0x01,
            ATOMIC_PREFIX,
            I64_ATOMIC_RMW32_CMPXCHG_U,
            0x02,
            0x00,
            DROP,
        ]
    );

    let mut func = Function::new();
    let addr = func.i32_const(0);
    let expected = func.i32_const(42);
    let timeout = func.i64_const(-1);
    let wait = func.atomic_wait(ExprType::I32, 0, addr, expected, timeout);
    let body = func.drop_(wait);
    func.set_body(body);

    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [
            I32_CONST,
            0x00,
            I32_CONST,
            0x2a,
            I64_CONST,
            0x7f,
            ATOMIC_PREFIX,
            I32_ATOMIC_WAIT,
            0x02,
            0x00,
            DROP,
        ]
    );

    let mut func = Function::new();
    let addr = func.i32_const(0);
    let count = func.i32_const(1);
    let notify = func.atomic_notify(0, addr, count);
    let body = func.drop_(notify);
    func.set_body(body);

    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [
            I32_CONST,
            0x00,
            I32_CONST,
            0x01,
            ATOMIC_PREFIX,
            ATOMIC_NOTIFY,
            0x02,
            0x00,
            DROP,
        ]
    );
}

#[test]
fn calls_and_globals_use_module_indices() {
    init();
    let mut indices = ModuleIndices::default();
    indices.push_func("helper");
    indices.push_type("sig");
    indices.push_global("counter");

    let mut func = Function::new();
    let seven = func.i32_const(7);
    let call = func.call("helper", vec![seven], ExprType::I32);
    let target = func.i32_const(3);
    let indirect = func.call_indirect("sig", target, vec![call], ExprType::None);
    func.set_body(indirect);

    assert_eq!(
        write_both_ways(&func, &indices),
        [
            I32_CONST,
            0x07,
            CALL,
            0x00,
            I32_CONST,
            0x03,
            CALL_INDIRECT,
            0x00,
            0x00, // reserved table index
        ]
    );

    let mut func = Function::new();
    let five = func.i32_const(5);
    let set = func.global_set("counter", five);
    func.set_body(set);
    assert_eq!(
        write_both_ways(&func, &indices),
        [I32_CONST, 0x05, GLOBAL_SET, 0x00]
    );
}

#[test]
fn local_tee_and_select() {
    init();
    let mut func = Function::new();
    let x = func.add_param(ExprType::I32);
    let nine = func.i32_const(9);
    let tee = func.local_tee(x, nine);
    let other = func.i32_const(2);
    let cond = func.i32_const(0);
    let select = func.select(tee, other, cond);
    let body = func.drop_(select);
    func.set_body(body);

    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [
            I32_CONST, 0x09, LOCAL_TEE, 0x00, I32_CONST, 0x02, I32_CONST, 0x00, SELECT, DROP,
        ]
    );
}

#[test]
fn memory_size_and_grow_reserve_a_memory_index() {
    init();
    let mut func = Function::new();
    let size = func.memory_size();
    let grown = func.memory_grow(size);
    let body = func.drop_(grown);
    func.set_body(body);

    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [MEMORY_SIZE, 0x00, MEMORY_GROW, 0x00, DROP]
    );
}

#[test]
fn float_constants_are_bit_patterns() {
    init();
    let mut func = Function::new();
    let one = func.f32_const(1.0);
    let body = func.drop_(one);
    func.set_body(body);

    assert_eq!(
        write_both_ways(&func, &ModuleIndices::default()),
        [F32_CONST, 0x00, 0x00, 0x80, 0x3f, DROP]
    );
}

#[test]
fn debug_markers_are_deduplicated() {
    init();
    let here = DebugLocation {
        file: 1,
        line: 10,
        column: 1,
    };
    let there = DebugLocation {
        file: 1,
        line: 20,
        column: 2,
    };

    let mut func = Function::new();
    let locations = [here, here, here, there, there, here];
    let mut exprs = Vec::new();
    for loc in locations.iter() {
        let nop = func.nop();
        func.debug_locations.insert(nop, *loc);
        exprs.push(nop);
    }
    let body = func.block(None, exprs, ExprType::None);
    func.set_body(body);

    let indices = ModuleIndices::default();
    let mut bytes = Vec::new();
    let mut writer = Writer::new(&func, &indices, &mut bytes);
    writer.enable_source_map();
    writer.write().unwrap();
    assert_eq!(
        writer.take_source_map(),
        vec![(0, here), (3, there), (5, here)]
    );
    assert_eq!(bytes, [NOP; 6]);

    // The linear path dedups the same way.
    let linear = flatten(&func);
    let mut bytes = Vec::new();
    let mut writer = Writer::new(&func, &indices, &mut bytes);
    writer.enable_source_map();
    writer.write_linear(&linear).unwrap();
    assert_eq!(
        writer.take_source_map(),
        vec![(0, here), (3, there), (5, here)]
    );
}

#[test]
fn source_map_is_off_by_default() {
    init();
    let mut func = Function::new();
    let nop = func.nop();
    func.debug_locations.insert(
        nop,
        DebugLocation {
            file: 0,
            line: 1,
            column: 1,
        },
    );
    func.set_body(nop);

    let indices = ModuleIndices::default();
    let mut bytes = Vec::new();
    let mut writer = Writer::new(&func, &indices, &mut bytes);
    writer.write().unwrap();
    assert!(writer.take_source_map().is_empty());
}

#[test]
fn unresolvable_branch_reports_label_and_function() {
    init();
    let mut func = Function::new();
    func.name = Some("broken".to_string());
    let br = func.br("nope", None);
    func.set_body(br);

    let indices = ModuleIndices::default();
    let mut bytes = Vec::new();
    let err = Writer::new(&func, &indices, &mut bytes)
        .write()
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("nope"), "got: {}", message);
    assert!(message.contains("broken"), "got: {}", message);
}

#[test]
fn undeclared_local_is_an_error() {
    init();
    let mut func = Function::new();
    let one = func.i32_const(1);
    let set = func.local_set(5, one);
    func.set_body(set);

    let indices = ModuleIndices::default();
    let mut bytes = Vec::new();
    let err = Writer::new(&func, &indices, &mut bytes)
        .write()
        .unwrap_err();
    assert!(err.to_string().contains("local 5"), "got: {}", err);
}

#[test]
fn tombstoned_slots_encode_to_nothing() {
    init();
    let mut func = Function::new();
    let nop = func.nop();
    let one = func.i32_const(1);
    let dropped = func.drop_(one);
    let body = func.block(None, vec![nop, dropped], ExprType::None);
    func.set_body(body);

    let mut linear = flatten(&func);
    linear.remove(0);

    let indices = ModuleIndices::default();
    let mut bytes = Vec::new();
    Writer::new(&func, &indices, &mut bytes)
        .write_linear(&linear)
        .unwrap();
    assert_eq!(bytes, [I32_CONST, 0x01, DROP]);
}

#[test]
#[should_panic(expected = "end marker without an open construct")]
fn dangling_end_marker_is_fatal() {
    let mut func = Function::new();
    let nop = func.nop();
    let body = func.block(Some("b"), vec![nop], ExprType::None);
    func.set_body(body);

    let mut linear = flatten(&func);
    // Tombstone the opening marker but keep the end marker.
    linear.remove(0);

    let indices = ModuleIndices::default();
    let mut bytes = Vec::new();
    let _ = Writer::new(&func, &indices, &mut bytes).write_linear(&linear);
}
