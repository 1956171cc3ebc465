//! Stack-ordered lowering and binary encoding for WebAssembly function
//! bodies.
//!
//! This crate is the back end of a wasm-producing toolchain: it takes one
//! tree-shaped, already-typed function body and turns it into the exact byte
//! sequence the binary format prescribes. It does this in two stages that
//! can also be fused into one:
//!
//! * [`stack::flatten`] linearizes the tree into stack-machine order, a
//!   flat sequence of instructions and structural markers that later
//!   peephole passes can edit cheaply;
//! * [`write::Writer`] emits the binary encoding, either by replaying a
//!   flattened sequence or by walking the tree directly, resolving branch
//!   labels to relative depths and bridging the IR's `unreachable` type to
//!   the binary format's stack-polymorphism rules with synthetic
//!   `unreachable` instructions.
//!
//! Each function body is encoded independently; the writer holds no state
//! across functions.
//!
//! ```
//! use minnow::{BinaryOp, ExprType, Function, ModuleIndices, Writer};
//!
//! let mut func = Function::new();
//! func.name = Some("demo".to_string());
//! let x = func.add_param(ExprType::I32);
//!
//! let ten = func.i32_const(10);
//! let arg = func.local_get(x);
//! let sum = func.binary(BinaryOp::I32Add, ten, arg);
//! let body = func.block(None, vec![sum], ExprType::I32);
//! func.set_body(body);
//!
//! let indices = ModuleIndices::default();
//! let mut bytes = Vec::new();
//! Writer::new(&func, &indices, &mut bytes).write()?;
//! // The unlabeled body block is spliced: i32.const, local.get, i32.add.
//! assert_eq!(bytes, [0x41, 0x0a, 0x20, 0x00, 0x6a]);
//! # Ok::<(), minnow::Error>(())
//! ```

pub mod encode;
pub mod error;
pub mod ir;
mod lower;
pub mod opcode;
pub mod stack;
pub mod ty;
pub mod write;

pub use crate::error::{Error, Result};
pub use crate::ir::branch::has_branch_to;
pub use crate::ir::{
    AtomicOp, BinaryOp, DebugLocation, Expr, ExprId, ExprKind, Function, UnaryOp, Value,
};
pub use crate::stack::{flatten, flatten_expr, LinearFunc, LinearNode};
pub use crate::ty::ExprType;
pub use crate::write::{ModuleIndices, Writer};
