//! The WebAssembly binary opcode space, as named constants plus total
//! lookup tables from operation descriptors to opcode bytes.
//!
//! The tables are keyed by the full operand tuple of operation, numeric
//! type, byte width, signedness, and atomicity, and are spelled out case by
//! case;
//! nothing here derives an opcode arithmetically. Lookups over partial
//! spaces return `Option`, and callers treat `None` as a fatal internal
//! inconsistency: the tree IR guarantees the combinations it produces are
//! valid, so a missing entry is a bug in these tables, not bad input.

use crate::ir::{AtomicOp, BinaryOp, UnaryOp};
use crate::ty::ExprType;

// Control instructions.
pub const UNREACHABLE: u8 = 0x00;
pub const NOP: u8 = 0x01;
pub const BLOCK: u8 = 0x02;
pub const LOOP: u8 = 0x03;
pub const IF: u8 = 0x04;
pub const ELSE: u8 = 0x05;
pub const END: u8 = 0x0b;
pub const BR: u8 = 0x0c;
pub const BR_IF: u8 = 0x0d;
pub const BR_TABLE: u8 = 0x0e;
pub const RETURN: u8 = 0x0f;
pub const CALL: u8 = 0x10;
pub const CALL_INDIRECT: u8 = 0x11;

// Parametric instructions.
pub const DROP: u8 = 0x1a;
pub const SELECT: u8 = 0x1b;

// Variable access.
pub const LOCAL_GET: u8 = 0x20;
pub const LOCAL_SET: u8 = 0x21;
pub const LOCAL_TEE: u8 = 0x22;
pub const GLOBAL_GET: u8 = 0x23;
pub const GLOBAL_SET: u8 = 0x24;

// Plain memory access.
pub const I32_LOAD: u8 = 0x28;
pub const I64_LOAD: u8 = 0x29;
pub const F32_LOAD: u8 = 0x2a;
pub const F64_LOAD: u8 = 0x2b;
pub const I32_LOAD8_S: u8 = 0x2c;
pub const I32_LOAD8_U: u8 = 0x2d;
pub const I32_LOAD16_S: u8 = 0x2e;
pub const I32_LOAD16_U: u8 = 0x2f;
pub const I64_LOAD8_S: u8 = 0x30;
pub const I64_LOAD8_U: u8 = 0x31;
pub const I64_LOAD16_S: u8 = 0x32;
pub const I64_LOAD16_U: u8 = 0x33;
pub const I64_LOAD32_S: u8 = 0x34;
pub const I64_LOAD32_U: u8 = 0x35;
pub const I32_STORE: u8 = 0x36;
pub const I64_STORE: u8 = 0x37;
pub const F32_STORE: u8 = 0x38;
pub const F64_STORE: u8 = 0x39;
pub const I32_STORE8: u8 = 0x3a;
pub const I32_STORE16: u8 = 0x3b;
pub const I64_STORE8: u8 = 0x3c;
pub const I64_STORE16: u8 = 0x3d;
pub const I64_STORE32: u8 = 0x3e;
pub const MEMORY_SIZE: u8 = 0x3f;
pub const MEMORY_GROW: u8 = 0x40;

// Constants.
pub const I32_CONST: u8 = 0x41;
pub const I64_CONST: u8 = 0x42;
pub const F32_CONST: u8 = 0x43;
pub const F64_CONST: u8 = 0x44;

// The atomic opcode space lives behind a shared prefix byte.
pub const ATOMIC_PREFIX: u8 = 0xfe;
pub const ATOMIC_NOTIFY: u8 = 0x00;
pub const I32_ATOMIC_WAIT: u8 = 0x01;
pub const I64_ATOMIC_WAIT: u8 = 0x02;
pub const I32_ATOMIC_LOAD: u8 = 0x10;
pub const I64_ATOMIC_LOAD: u8 = 0x11;
pub const I32_ATOMIC_LOAD8_U: u8 = 0x12;
pub const I32_ATOMIC_LOAD16_U: u8 = 0x13;
pub const I64_ATOMIC_LOAD8_U: u8 = 0x14;
pub const I64_ATOMIC_LOAD16_U: u8 = 0x15;
pub const I64_ATOMIC_LOAD32_U: u8 = 0x16;
pub const I32_ATOMIC_STORE: u8 = 0x17;
pub const I64_ATOMIC_STORE: u8 = 0x18;
pub const I32_ATOMIC_STORE8: u8 = 0x19;
pub const I32_ATOMIC_STORE16: u8 = 0x1a;
pub const I64_ATOMIC_STORE8: u8 = 0x1b;
pub const I64_ATOMIC_STORE16: u8 = 0x1c;
pub const I64_ATOMIC_STORE32: u8 = 0x1d;
pub const I32_ATOMIC_RMW_ADD: u8 = 0x1e;
pub const I64_ATOMIC_RMW_ADD: u8 = 0x1f;
pub const I32_ATOMIC_RMW8_ADD_U: u8 = 0x20;
pub const I32_ATOMIC_RMW16_ADD_U: u8 = 0x21;
pub const I64_ATOMIC_RMW8_ADD_U: u8 = 0x22;
pub const I64_ATOMIC_RMW16_ADD_U: u8 = 0x23;
pub const I64_ATOMIC_RMW32_ADD_U: u8 = 0x24;
pub const I32_ATOMIC_RMW_SUB: u8 = 0x25;
pub const I64_ATOMIC_RMW_SUB: u8 = 0x26;
pub const I32_ATOMIC_RMW8_SUB_U: u8 = 0x27;
pub const I32_ATOMIC_RMW16_SUB_U: u8 = 0x28;
pub const I64_ATOMIC_RMW8_SUB_U: u8 = 0x29;
pub const I64_ATOMIC_RMW16_SUB_U: u8 = 0x2a;
pub const I64_ATOMIC_RMW32_SUB_U: u8 = 0x2b;
pub const I32_ATOMIC_RMW_AND: u8 = 0x2c;
pub const I64_ATOMIC_RMW_AND: u8 = 0x2d;
pub const I32_ATOMIC_RMW8_AND_U: u8 = 0x2e;
pub const I32_ATOMIC_RMW16_AND_U: u8 = 0x2f;
pub const I64_ATOMIC_RMW8_AND_U: u8 = 0x30;
pub const I64_ATOMIC_RMW16_AND_U: u8 = 0x31;
pub const I64_ATOMIC_RMW32_AND_U: u8 = 0x32;
pub const I32_ATOMIC_RMW_OR: u8 = 0x33;
pub const I64_ATOMIC_RMW_OR: u8 = 0x34;
pub const I32_ATOMIC_RMW8_OR_U: u8 = 0x35;
pub const I32_ATOMIC_RMW16_OR_U: u8 = 0x36;
pub const I64_ATOMIC_RMW8_OR_U: u8 = 0x37;
pub const I64_ATOMIC_RMW16_OR_U: u8 = 0x38;
pub const I64_ATOMIC_RMW32_OR_U: u8 = 0x39;
pub const I32_ATOMIC_RMW_XOR: u8 = 0x3a;
pub const I64_ATOMIC_RMW_XOR: u8 = 0x3b;
pub const I32_ATOMIC_RMW8_XOR_U: u8 = 0x3c;
pub const I32_ATOMIC_RMW16_XOR_U: u8 = 0x3d;
pub const I64_ATOMIC_RMW8_XOR_U: u8 = 0x3e;
pub const I64_ATOMIC_RMW16_XOR_U: u8 = 0x3f;
pub const I64_ATOMIC_RMW32_XOR_U: u8 = 0x40;
pub const I32_ATOMIC_RMW_XCHG: u8 = 0x41;
pub const I64_ATOMIC_RMW_XCHG: u8 = 0x42;
pub const I32_ATOMIC_RMW8_XCHG_U: u8 = 0x43;
pub const I32_ATOMIC_RMW16_XCHG_U: u8 = 0x44;
pub const I64_ATOMIC_RMW8_XCHG_U: u8 = 0x45;
pub const I64_ATOMIC_RMW16_XCHG_U: u8 = 0x46;
pub const I64_ATOMIC_RMW32_XCHG_U: u8 = 0x47;
pub const I32_ATOMIC_RMW_CMPXCHG: u8 = 0x48;
pub const I64_ATOMIC_RMW_CMPXCHG: u8 = 0x49;
pub const I32_ATOMIC_RMW8_CMPXCHG_U: u8 = 0x4a;
pub const I32_ATOMIC_RMW16_CMPXCHG_U: u8 = 0x4b;
pub const I64_ATOMIC_RMW8_CMPXCHG_U: u8 = 0x4c;
pub const I64_ATOMIC_RMW16_CMPXCHG_U: u8 = 0x4d;
pub const I64_ATOMIC_RMW32_CMPXCHG_U: u8 = 0x4e;

/// The opcode of a plain load with the given result type, access width in
/// bytes, and (for narrow integer loads) signedness of the extension.
pub(crate) fn load(ty: ExprType, bytes: u8, signed: bool) -> Option<u8> {
    Some(match (ty, bytes, signed) {
        (ExprType::I32, 1, true) => I32_LOAD8_S,
        (ExprType::I32, 1, false) => I32_LOAD8_U,
        (ExprType::I32, 2, true) => I32_LOAD16_S,
        (ExprType::I32, 2, false) => I32_LOAD16_U,
        (ExprType::I32, 4, _) => I32_LOAD,
        (ExprType::I64, 1, true) => I64_LOAD8_S,
        (ExprType::I64, 1, false) => I64_LOAD8_U,
        (ExprType::I64, 2, true) => I64_LOAD16_S,
        (ExprType::I64, 2, false) => I64_LOAD16_U,
        (ExprType::I64, 4, true) => I64_LOAD32_S,
        (ExprType::I64, 4, false) => I64_LOAD32_U,
        (ExprType::I64, 8, _) => I64_LOAD,
        (ExprType::F32, 4, _) => F32_LOAD,
        (ExprType::F64, 8, _) => F64_LOAD,
        _ => return None,
    })
}

/// The sub-opcode of an atomic load. Narrow atomic loads only exist
/// zero-extending, so there is no signedness axis.
pub(crate) fn atomic_load(ty: ExprType, bytes: u8) -> Option<u8> {
    Some(match (ty, bytes) {
        (ExprType::I32, 1) => I32_ATOMIC_LOAD8_U,
        (ExprType::I32, 2) => I32_ATOMIC_LOAD16_U,
        (ExprType::I32, 4) => I32_ATOMIC_LOAD,
        (ExprType::I64, 1) => I64_ATOMIC_LOAD8_U,
        (ExprType::I64, 2) => I64_ATOMIC_LOAD16_U,
        (ExprType::I64, 4) => I64_ATOMIC_LOAD32_U,
        (ExprType::I64, 8) => I64_ATOMIC_LOAD,
        _ => return None,
    })
}

/// The opcode of a plain store with the given value type and width.
pub(crate) fn store(ty: ExprType, bytes: u8) -> Option<u8> {
    Some(match (ty, bytes) {
        (ExprType::I32, 1) => I32_STORE8,
        (ExprType::I32, 2) => I32_STORE16,
        (ExprType::I32, 4) => I32_STORE,
        (ExprType::I64, 1) => I64_STORE8,
        (ExprType::I64, 2) => I64_STORE16,
        (ExprType::I64, 4) => I64_STORE32,
        (ExprType::I64, 8) => I64_STORE,
        (ExprType::F32, 4) => F32_STORE,
        (ExprType::F64, 8) => F64_STORE,
        _ => return None,
    })
}

/// The sub-opcode of an atomic store.
pub(crate) fn atomic_store(ty: ExprType, bytes: u8) -> Option<u8> {
    Some(match (ty, bytes) {
        (ExprType::I32, 1) => I32_ATOMIC_STORE8,
        (ExprType::I32, 2) => I32_ATOMIC_STORE16,
        (ExprType::I32, 4) => I32_ATOMIC_STORE,
        (ExprType::I64, 1) => I64_ATOMIC_STORE8,
        (ExprType::I64, 2) => I64_ATOMIC_STORE16,
        (ExprType::I64, 4) => I64_ATOMIC_STORE32,
        (ExprType::I64, 8) => I64_ATOMIC_STORE,
        _ => return None,
    })
}

/// The sub-opcode of an atomic read-modify-write. Sub-word widths use the
/// explicitly zero-extending variants; the natural width does not.
pub(crate) fn atomic_rmw(op: AtomicOp, ty: ExprType, bytes: u8) -> Option<u8> {
    use AtomicOp::*;
    Some(match (op, ty, bytes) {
        (Add, ExprType::I32, 1) => I32_ATOMIC_RMW8_ADD_U,
        (Add, ExprType::I32, 2) => I32_ATOMIC_RMW16_ADD_U,
        (Add, ExprType::I32, 4) => I32_ATOMIC_RMW_ADD,
        (Add, ExprType::I64, 1) => I64_ATOMIC_RMW8_ADD_U,
        (Add, ExprType::I64, 2) => I64_ATOMIC_RMW16_ADD_U,
        (Add, ExprType::I64, 4) => I64_ATOMIC_RMW32_ADD_U,
        (Add, ExprType::I64, 8) => I64_ATOMIC_RMW_ADD,
        (Sub, ExprType::I32, 1) => I32_ATOMIC_RMW8_SUB_U,
        (Sub, ExprType::I32, 2) => I32_ATOMIC_RMW16_SUB_U,
        (Sub, ExprType::I32, 4) => I32_ATOMIC_RMW_SUB,
        (Sub, ExprType::I64, 1) => I64_ATOMIC_RMW8_SUB_U,
        (Sub, ExprType::I64, 2) => I64_ATOMIC_RMW16_SUB_U,
        (Sub, ExprType::I64, 4) => I64_ATOMIC_RMW32_SUB_U,
        (Sub, ExprType::I64, 8) => I64_ATOMIC_RMW_SUB,
        (And, ExprType::I32, 1) => I32_ATOMIC_RMW8_AND_U,
        (And, ExprType::I32, 2) => I32_ATOMIC_RMW16_AND_U,
        (And, ExprType::I32, 4) => I32_ATOMIC_RMW_AND,
        (And, ExprType::I64, 1) => I64_ATOMIC_RMW8_AND_U,
        (And, ExprType::I64, 2) => I64_ATOMIC_RMW16_AND_U,
        (And, ExprType::I64, 4) => I64_ATOMIC_RMW32_AND_U,
        (And, ExprType::I64, 8) => I64_ATOMIC_RMW_AND,
        (Or, ExprType::I32, 1) => I32_ATOMIC_RMW8_OR_U,
        (Or, ExprType::I32, 2) => I32_ATOMIC_RMW16_OR_U,
        (Or, ExprType::I32, 4) => I32_ATOMIC_RMW_OR,
        (Or, ExprType::I64, 1) => I64_ATOMIC_RMW8_OR_U,
        (Or, ExprType::I64, 2) => I64_ATOMIC_RMW16_OR_U,
        (Or, ExprType::I64, 4) => I64_ATOMIC_RMW32_OR_U,
        (Or, ExprType::I64, 8) => I64_ATOMIC_RMW_OR,
        (Xor, ExprType::I32, 1) => I32_ATOMIC_RMW8_XOR_U,
        (Xor, ExprType::I32, 2) => I32_ATOMIC_RMW16_XOR_U,
        (Xor, ExprType::I32, 4) => I32_ATOMIC_RMW_XOR,
        (Xor, ExprType::I64, 1) => I64_ATOMIC_RMW8_XOR_U,
        (Xor, ExprType::I64, 2) => I64_ATOMIC_RMW16_XOR_U,
        (Xor, ExprType::I64, 4) => I64_ATOMIC_RMW32_XOR_U,
        (Xor, ExprType::I64, 8) => I64_ATOMIC_RMW_XOR,
        (Xchg, ExprType::I32, 1) => I32_ATOMIC_RMW8_XCHG_U,
        (Xchg, ExprType::I32, 2) => I32_ATOMIC_RMW16_XCHG_U,
        (Xchg, ExprType::I32, 4) => I32_ATOMIC_RMW_XCHG,
        (Xchg, ExprType::I64, 1) => I64_ATOMIC_RMW8_XCHG_U,
        (Xchg, ExprType::I64, 2) => I64_ATOMIC_RMW16_XCHG_U,
        (Xchg, ExprType::I64, 4) => I64_ATOMIC_RMW32_XCHG_U,
        (Xchg, ExprType::I64, 8) => I64_ATOMIC_RMW_XCHG,
        _ => return None,
    })
}

/// The sub-opcode of an atomic compare-exchange.
pub(crate) fn atomic_cmpxchg(ty: ExprType, bytes: u8) -> Option<u8> {
    Some(match (ty, bytes) {
        (ExprType::I32, 1) => I32_ATOMIC_RMW8_CMPXCHG_U,
        (ExprType::I32, 2) => I32_ATOMIC_RMW16_CMPXCHG_U,
        (ExprType::I32, 4) => I32_ATOMIC_RMW_CMPXCHG,
        (ExprType::I64, 1) => I64_ATOMIC_RMW8_CMPXCHG_U,
        (ExprType::I64, 2) => I64_ATOMIC_RMW16_CMPXCHG_U,
        (ExprType::I64, 4) => I64_ATOMIC_RMW32_CMPXCHG_U,
        (ExprType::I64, 8) => I64_ATOMIC_RMW_CMPXCHG,
        _ => return None,
    })
}

/// The opcode of a unary operator. Total: every `UnaryOp` has an entry.
pub(crate) fn unary(op: UnaryOp) -> u8 {
    use UnaryOp::*;
    match op {
        I32Eqz => 0x45,
        I32Clz => 0x67,
        I32Ctz => 0x68,
        I32Popcnt => 0x69,
        I64Eqz => 0x50,
        I64Clz => 0x79,
        I64Ctz => 0x7a,
        I64Popcnt => 0x7b,
        F32Abs => 0x8b,
        F32Neg => 0x8c,
        F32Ceil => 0x8d,
        F32Floor => 0x8e,
        F32Trunc => 0x8f,
        F32Nearest => 0x90,
        F32Sqrt => 0x91,
        F64Abs => 0x99,
        F64Neg => 0x9a,
        F64Ceil => 0x9b,
        F64Floor => 0x9c,
        F64Trunc => 0x9d,
        F64Nearest => 0x9e,
        F64Sqrt => 0x9f,
        I32WrapI64 => 0xa7,
        I32TruncSF32 => 0xa8,
        I32TruncUF32 => 0xa9,
        I32TruncSF64 => 0xaa,
        I32TruncUF64 => 0xab,
        I64ExtendSI32 => 0xac,
        I64ExtendUI32 => 0xad,
        I64TruncSF32 => 0xae,
        I64TruncUF32 => 0xaf,
        I64TruncSF64 => 0xb0,
        I64TruncUF64 => 0xb1,
        F32ConvertSI32 => 0xb2,
        F32ConvertUI32 => 0xb3,
        F32ConvertSI64 => 0xb4,
        F32ConvertUI64 => 0xb5,
        F32DemoteF64 => 0xb6,
        F64ConvertSI32 => 0xb7,
        F64ConvertUI32 => 0xb8,
        F64ConvertSI64 => 0xb9,
        F64ConvertUI64 => 0xba,
        F64PromoteF32 => 0xbb,
        I32ReinterpretF32 => 0xbc,
        I64ReinterpretF64 => 0xbd,
        F32ReinterpretI32 => 0xbe,
        F64ReinterpretI64 => 0xbf,
        I32Extend8S => 0xc0,
        I32Extend16S => 0xc1,
        I64Extend8S => 0xc2,
        I64Extend16S => 0xc3,
        I64Extend32S => 0xc4,
    }
}

/// The opcode of a binary operator. Total: every `BinaryOp` has an entry.
pub(crate) fn binary(op: BinaryOp) -> u8 {
    use BinaryOp::*;
    match op {
        I32Eq => 0x46,
        I32Ne => 0x47,
        I32LtS => 0x48,
        I32LtU => 0x49,
        I32GtS => 0x4a,
        I32GtU => 0x4b,
        I32LeS => 0x4c,
        I32LeU => 0x4d,
        I32GeS => 0x4e,
        I32GeU => 0x4f,
        I64Eq => 0x51,
        I64Ne => 0x52,
        I64LtS => 0x53,
        I64LtU => 0x54,
        I64GtS => 0x55,
        I64GtU => 0x56,
        I64LeS => 0x57,
        I64LeU => 0x58,
        I64GeS => 0x59,
        I64GeU => 0x5a,
        F32Eq => 0x5b,
        F32Ne => 0x5c,
        F32Lt => 0x5d,
        F32Gt => 0x5e,
        F32Le => 0x5f,
        F32Ge => 0x60,
        F64Eq => 0x61,
        F64Ne => 0x62,
        F64Lt => 0x63,
        F64Gt => 0x64,
        F64Le => 0x65,
        F64Ge => 0x66,
        I32Add => 0x6a,
        I32Sub => 0x6b,
        I32Mul => 0x6c,
        I32DivS => 0x6d,
        I32DivU => 0x6e,
        I32RemS => 0x6f,
        I32RemU => 0x70,
        I32And => 0x71,
        I32Or => 0x72,
        I32Xor => 0x73,
        I32Shl => 0x74,
        I32ShrS => 0x75,
        I32ShrU => 0x76,
        I32Rotl => 0x77,
        I32Rotr => 0x78,
        I64Add => 0x7c,
        I64Sub => 0x7d,
        I64Mul => 0x7e,
        I64DivS => 0x7f,
        I64DivU => 0x80,
        I64RemS => 0x81,
        I64RemU => 0x82,
        I64And => 0x83,
        I64Or => 0x84,
        I64Xor => 0x85,
        I64Shl => 0x86,
        I64ShrS => 0x87,
        I64ShrU => 0x88,
        I64Rotl => 0x89,
        I64Rotr => 0x8a,
        F32Add => 0x92,
        F32Sub => 0x93,
        F32Mul => 0x94,
        F32Div => 0x95,
        F32Min => 0x96,
        F32Max => 0x97,
        F32Copysign => 0x98,
        F64Add => 0xa0,
        F64Sub => 0xa1,
        F64Mul => 0xa2,
        F64Div => 0xa3,
        F64Min => 0xa4,
        F64Max => 0xa5,
        F64Copysign => 0xa6,
    }
}
