//! The tree-shaped intermediate representation of a function body.
//!
//! A [`Function`] owns every expression node in an arena; everything else
//! (operand edges, the flattened form built by [`crate::stack`]) refers to
//! nodes by [`ExprId`] and never clones or mutates node contents. Types are
//! assigned when nodes are built (the construction helpers below apply the
//! purely local rules; anything that depends on module-level knowledge takes
//! the type as an argument) and are read-only afterwards.

pub mod branch;

use crate::ty::ExprType;
use id_arena::{Arena, Id};
use std::collections::HashMap;
use std::ops::Index;

/// The id of an expression node.
pub type ExprId = Id<Expr>;

/// A source location attached to an expression node, for source-map
/// generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebugLocation {
    pub file: u32,
    pub line: u32,
    pub column: u32,
}

/// An expression node: an operation plus its computed result type.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: ExprType,
}

/// An immediate constant value.
#[derive(Clone, Copy, Debug)]
pub enum Value {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Value {
    pub fn ty(&self) -> ExprType {
        match self {
            Value::I32(_) => ExprType::I32,
            Value::I64(_) => ExprType::I64,
            Value::F32(_) => ExprType::F32,
            Value::F64(_) => ExprType::F64,
        }
    }
}

/// Atomic read-modify-write operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AtomicOp {
    Add,
    Sub,
    And,
    Or,
    Xor,
    Xchg,
}

/// Unary operators, including the numeric conversions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    I32Eqz,
    I32Clz,
    I32Ctz,
    I32Popcnt,
    I64Eqz,
    I64Clz,
    I64Ctz,
    I64Popcnt,
    F32Abs,
    F32Neg,
    F32Ceil,
    F32Floor,
    F32Trunc,
    F32Nearest,
    F32Sqrt,
    F64Abs,
    F64Neg,
    F64Ceil,
    F64Floor,
    F64Trunc,
    F64Nearest,
    F64Sqrt,
    I32WrapI64,
    I32TruncSF32,
    I32TruncUF32,
    I32TruncSF64,
    I32TruncUF64,
    I64ExtendSI32,
    I64ExtendUI32,
    I64TruncSF32,
    I64TruncUF32,
    I64TruncSF64,
    I64TruncUF64,
    F32ConvertSI32,
    F32ConvertUI32,
    F32ConvertSI64,
    F32ConvertUI64,
    F32DemoteF64,
    F64ConvertSI32,
    F64ConvertUI32,
    F64ConvertSI64,
    F64ConvertUI64,
    F64PromoteF32,
    I32ReinterpretF32,
    I64ReinterpretF64,
    F32ReinterpretI32,
    F64ReinterpretI64,
    I32Extend8S,
    I32Extend16S,
    I64Extend8S,
    I64Extend16S,
    I64Extend32S,
}

impl UnaryOp {
    /// The result type of this operator when its operand completes.
    pub fn result_ty(&self) -> ExprType {
        use UnaryOp::*;
        match self {
            I32Eqz | I64Eqz | I32Clz | I32Ctz | I32Popcnt | I32WrapI64 | I32TruncSF32
            | I32TruncUF32 | I32TruncSF64 | I32TruncUF64 | I32ReinterpretF32 | I32Extend8S
            | I32Extend16S => ExprType::I32,
            I64Clz | I64Ctz | I64Popcnt | I64ExtendSI32 | I64ExtendUI32 | I64TruncSF32
            | I64TruncUF32 | I64TruncSF64 | I64TruncUF64 | I64ReinterpretF64 | I64Extend8S
            | I64Extend16S | I64Extend32S => ExprType::I64,
            F32Abs | F32Neg | F32Ceil | F32Floor | F32Trunc | F32Nearest | F32Sqrt
            | F32ConvertSI32 | F32ConvertUI32 | F32ConvertSI64 | F32ConvertUI64 | F32DemoteF64
            | F32ReinterpretI32 => ExprType::F32,
            F64Abs | F64Neg | F64Ceil | F64Floor | F64Trunc | F64Nearest | F64Sqrt
            | F64ConvertSI32 | F64ConvertUI32 | F64ConvertSI64 | F64ConvertUI64 | F64PromoteF32
            | F64ReinterpretI64 => ExprType::F64,
        }
    }
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    I32Eq,
    I32Ne,
    I32LtS,
    I32LtU,
    I32GtS,
    I32GtU,
    I32LeS,
    I32LeU,
    I32GeS,
    I32GeU,
    I64Eq,
    I64Ne,
    I64LtS,
    I64LtU,
    I64GtS,
    I64GtU,
    I64LeS,
    I64LeU,
    I64GeS,
    I64GeU,
    F32Eq,
    F32Ne,
    F32Lt,
    F32Gt,
    F32Le,
    F32Ge,
    F64Eq,
    F64Ne,
    F64Lt,
    F64Gt,
    F64Le,
    F64Ge,
    I32Add,
    I32Sub,
    I32Mul,
    I32DivS,
    I32DivU,
    I32RemS,
    I32RemU,
    I32And,
    I32Or,
    I32Xor,
    I32Shl,
    I32ShrS,
    I32ShrU,
    I32Rotl,
    I32Rotr,
    I64Add,
    I64Sub,
    I64Mul,
    I64DivS,
    I64DivU,
    I64RemS,
    I64RemU,
    I64And,
    I64Or,
    I64Xor,
    I64Shl,
    I64ShrS,
    I64ShrU,
    I64Rotl,
    I64Rotr,
    F32Add,
    F32Sub,
    F32Mul,
    F32Div,
    F32Min,
    F32Max,
    F32Copysign,
    F64Add,
    F64Sub,
    F64Mul,
    F64Div,
    F64Min,
    F64Max,
    F64Copysign,
}

impl BinaryOp {
    /// The result type of this operator when its operands complete.
    pub fn result_ty(&self) -> ExprType {
        use BinaryOp::*;
        match self {
            // All comparisons produce an i32 boolean.
            I32Eq | I32Ne | I32LtS | I32LtU | I32GtS | I32GtU | I32LeS | I32LeU | I32GeS
            | I32GeU | I64Eq | I64Ne | I64LtS | I64LtU | I64GtS | I64GtU | I64LeS | I64LeU
            | I64GeS | I64GeU | F32Eq | F32Ne | F32Lt | F32Gt | F32Le | F32Ge | F64Eq | F64Ne
            | F64Lt | F64Gt | F64Le | F64Ge => ExprType::I32,
            I32Add | I32Sub | I32Mul | I32DivS | I32DivU | I32RemS | I32RemU | I32And | I32Or
            | I32Xor | I32Shl | I32ShrS | I32ShrU | I32Rotl | I32Rotr => ExprType::I32,
            I64Add | I64Sub | I64Mul | I64DivS | I64DivU | I64RemS | I64RemU | I64And | I64Or
            | I64Xor | I64Shl | I64ShrS | I64ShrU | I64Rotl | I64Rotr => ExprType::I64,
            F32Add | F32Sub | F32Mul | F32Div | F32Min | F32Max | F32Copysign => ExprType::F32,
            F64Add | F64Sub | F64Mul | F64Div | F64Min | F64Max | F64Copysign => ExprType::F64,
        }
    }
}

/// Every kind of expression the tree IR can hold.
///
/// This is a closed set: each consumer matches on it exhaustively, so adding
/// a kind forces every traversal and the encoder to handle it.
#[derive(Clone, Debug)]
pub enum ExprKind {
    /// A sequence of expressions, optionally labeled as a branch target.
    Block {
        label: Option<String>,
        exprs: Vec<ExprId>,
    },
    If {
        condition: ExprId,
        if_true: ExprId,
        if_false: Option<ExprId>,
    },
    Loop {
        label: Option<String>,
        body: ExprId,
    },
    /// `br` when `condition` is absent, `br_if` when present.
    Br {
        label: String,
        value: Option<ExprId>,
        condition: Option<ExprId>,
    },
    /// `br_table`: a multi-way branch on `condition`.
    Switch {
        targets: Vec<String>,
        default: String,
        value: Option<ExprId>,
        condition: ExprId,
    },
    Call {
        func: String,
        args: Vec<ExprId>,
    },
    /// An indirect call through the function table; `ty` names the callee
    /// signature in the module's type section.
    CallIndirect {
        ty: String,
        target: ExprId,
        args: Vec<ExprId>,
    },
    LocalGet {
        local: u32,
    },
    /// `local.set`, or `local.tee` when the stored value is also left on the
    /// stack. Tee-ness is explicit: deriving it from the result type would
    /// misread a set whose operand never completes.
    LocalSet {
        local: u32,
        value: ExprId,
        tee: bool,
    },
    GlobalGet {
        global: String,
    },
    GlobalSet {
        global: String,
        value: ExprId,
    },
    /// A memory read. `align` of zero means the access's natural alignment.
    Load {
        bytes: u8,
        signed: bool,
        offset: u32,
        align: u32,
        atomic: bool,
        ptr: ExprId,
    },
    /// A memory write; `value_ty` is the declared type of the stored value,
    /// which stays concrete even when the value operand does not complete.
    Store {
        bytes: u8,
        offset: u32,
        align: u32,
        atomic: bool,
        ptr: ExprId,
        value: ExprId,
        value_ty: ExprType,
    },
    AtomicRmw {
        op: AtomicOp,
        bytes: u8,
        offset: u32,
        ptr: ExprId,
        value: ExprId,
    },
    AtomicCmpxchg {
        bytes: u8,
        offset: u32,
        ptr: ExprId,
        expected: ExprId,
        replacement: ExprId,
    },
    AtomicWait {
        ptr: ExprId,
        expected: ExprId,
        timeout: ExprId,
        expected_ty: ExprType,
        offset: u32,
    },
    AtomicNotify {
        ptr: ExprId,
        count: ExprId,
        offset: u32,
    },
    MemorySize,
    MemoryGrow {
        operand: ExprId,
    },
    Const {
        value: Value,
    },
    Unary {
        op: UnaryOp,
        value: ExprId,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Select {
        if_true: ExprId,
        if_false: ExprId,
        condition: ExprId,
    },
    Drop {
        value: ExprId,
    },
    Return {
        value: Option<ExprId>,
    },
    Nop,
    Unreachable,
}

impl Expr {
    /// Calls `f` on each operand, in semantic evaluation order: the order
    /// the stack machine pushes them. Left before right, pointer before
    /// value, operands before an indirect callee, a branch's value before
    /// its condition.
    pub fn visit_children(&self, mut f: impl FnMut(ExprId)) {
        match &self.kind {
            ExprKind::Block { exprs, .. } => exprs.iter().for_each(|&e| f(e)),
            ExprKind::If {
                condition,
                if_true,
                if_false,
            } => {
                f(*condition);
                f(*if_true);
                if let Some(e) = *if_false {
                    f(e);
                }
            }
            ExprKind::Loop { body, .. } => f(*body),
            ExprKind::Br {
                value, condition, ..
            } => {
                if let Some(e) = *value {
                    f(e);
                }
                if let Some(e) = *condition {
                    f(e);
                }
            }
            ExprKind::Switch {
                value, condition, ..
            } => {
                if let Some(e) = *value {
                    f(e);
                }
                f(*condition);
            }
            ExprKind::Call { args, .. } => args.iter().for_each(|&e| f(e)),
            ExprKind::CallIndirect { target, args, .. } => {
                args.iter().for_each(|&e| f(e));
                f(*target);
            }
            ExprKind::LocalSet { value, .. } => f(*value),
            ExprKind::GlobalSet { value, .. } => f(*value),
            ExprKind::Load { ptr, .. } => f(*ptr),
            ExprKind::Store { ptr, value, .. } => {
                f(*ptr);
                f(*value);
            }
            ExprKind::AtomicRmw { ptr, value, .. } => {
                f(*ptr);
                f(*value);
            }
            ExprKind::AtomicCmpxchg {
                ptr,
                expected,
                replacement,
                ..
            } => {
                f(*ptr);
                f(*expected);
                f(*replacement);
            }
            ExprKind::AtomicWait {
                ptr,
                expected,
                timeout,
                ..
            } => {
                f(*ptr);
                f(*expected);
                f(*timeout);
            }
            ExprKind::AtomicNotify { ptr, count, .. } => {
                f(*ptr);
                f(*count);
            }
            ExprKind::MemoryGrow { operand } => f(*operand),
            ExprKind::Unary { value, .. } => f(*value),
            ExprKind::Binary { left, right, .. } => {
                f(*left);
                f(*right);
            }
            ExprKind::Select {
                if_true,
                if_false,
                condition,
            } => {
                f(*if_true);
                f(*if_false);
                f(*condition);
            }
            ExprKind::Drop { value } => f(*value),
            ExprKind::Return { value } => {
                if let Some(e) = *value {
                    f(e);
                }
            }
            ExprKind::LocalGet { .. }
            | ExprKind::GlobalGet { .. }
            | ExprKind::MemorySize
            | ExprKind::Const { .. }
            | ExprKind::Nop
            | ExprKind::Unreachable => {}
        }
    }
}

/// A single function body: its parameter and local types, the expression
/// tree, and per-node source locations.
#[derive(Debug, Default)]
pub struct Function {
    /// An optional name, used in diagnostics.
    pub name: Option<String>,
    params: Vec<ExprType>,
    locals: Vec<ExprType>,
    arena: Arena<Expr>,
    body: Option<ExprId>,
    /// Source locations keyed by node, consumed when source-map tracking is
    /// enabled on the writer.
    pub debug_locations: HashMap<ExprId, DebugLocation>,
}

impl Index<ExprId> for Function {
    type Output = Expr;

    fn index(&self, id: ExprId) -> &Expr {
        &self.arena[id]
    }
}

impl Function {
    pub fn new() -> Function {
        Function::default()
    }

    pub(crate) fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    /// Declares the next parameter, returning its local index.
    pub fn add_param(&mut self, ty: ExprType) -> u32 {
        assert!(ty.is_concrete(), "parameters must have a value type");
        assert!(self.locals.is_empty(), "parameters come before locals");
        self.params.push(ty);
        self.params.len() as u32 - 1
    }

    /// Declares the next non-parameter local, returning its index.
    pub fn add_local(&mut self, ty: ExprType) -> u32 {
        assert!(ty.is_concrete(), "locals must have a value type");
        self.locals.push(ty);
        (self.params.len() + self.locals.len()) as u32 - 1
    }

    /// The type of the given local, or `None` if the index is out of range.
    pub fn local_ty(&self, local: u32) -> Option<ExprType> {
        let local = local as usize;
        if local < self.params.len() {
            Some(self.params[local])
        } else {
            self.locals.get(local - self.params.len()).copied()
        }
    }

    /// Is this local one of the function's parameters?
    pub fn is_param(&self, local: u32) -> bool {
        (local as usize) < self.params.len()
    }

    pub fn set_body(&mut self, body: ExprId) {
        self.body = Some(body);
    }

    pub fn body(&self) -> ExprId {
        self.body.expect("function has no body")
    }

    /// The computed type of the given node.
    pub fn ty(&self, id: ExprId) -> ExprType {
        self.arena[id].ty
    }

    /// Allocates a node with an explicitly assigned type. The typed helper
    /// methods below are usually more convenient.
    pub fn add(&mut self, kind: ExprKind, ty: ExprType) -> ExprId {
        self.arena.alloc(Expr { kind, ty })
    }

    fn any_unreachable(&self, ids: &[ExprId]) -> bool {
        ids.iter().any(|&id| self.ty(id).is_unreachable())
    }

    /// `ty` unless some operand never completes.
    fn unless_unreachable(&self, operands: &[ExprId], ty: ExprType) -> ExprType {
        if self.any_unreachable(operands) {
            ExprType::Unreachable
        } else {
            ty
        }
    }
}

/// Construction helpers, one per node kind.
///
/// Result types are inferred only where the rule is purely local (a fixed
/// operator result, or an operand that never completes poisoning the node).
/// Control constructs and calls take their type as an argument because it
/// depends on knowledge (branch values, signatures) only the producer has.
impl Function {
    pub fn i32_const(&mut self, value: i32) -> ExprId {
        self.const_(Value::I32(value))
    }

    pub fn i64_const(&mut self, value: i64) -> ExprId {
        self.const_(Value::I64(value))
    }

    pub fn f32_const(&mut self, value: f32) -> ExprId {
        self.const_(Value::F32(value))
    }

    pub fn f64_const(&mut self, value: f64) -> ExprId {
        self.const_(Value::F64(value))
    }

    pub fn const_(&mut self, value: Value) -> ExprId {
        let ty = value.ty();
        self.add(ExprKind::Const { value }, ty)
    }

    pub fn unary(&mut self, op: UnaryOp, value: ExprId) -> ExprId {
        let ty = self.unless_unreachable(&[value], op.result_ty());
        self.add(ExprKind::Unary { op, value }, ty)
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let ty = self.unless_unreachable(&[left, right], op.result_ty());
        self.add(ExprKind::Binary { op, left, right }, ty)
    }

    pub fn select(&mut self, if_true: ExprId, if_false: ExprId, condition: ExprId) -> ExprId {
        let ty = self.unless_unreachable(&[if_true, if_false, condition], self.ty(if_true));
        self.add(
            ExprKind::Select {
                if_true,
                if_false,
                condition,
            },
            ty,
        )
    }

    pub fn drop_(&mut self, value: ExprId) -> ExprId {
        let ty = self.unless_unreachable(&[value], ExprType::None);
        self.add(ExprKind::Drop { value }, ty)
    }

    pub fn return_(&mut self, value: Option<ExprId>) -> ExprId {
        self.add(ExprKind::Return { value }, ExprType::Unreachable)
    }

    pub fn nop(&mut self) -> ExprId {
        self.add(ExprKind::Nop, ExprType::None)
    }

    pub fn unreachable_(&mut self) -> ExprId {
        self.add(ExprKind::Unreachable, ExprType::Unreachable)
    }

    pub fn block(&mut self, label: Option<&str>, exprs: Vec<ExprId>, ty: ExprType) -> ExprId {
        self.add(
            ExprKind::Block {
                label: label.map(str::to_string),
                exprs,
            },
            ty,
        )
    }

    pub fn if_(
        &mut self,
        condition: ExprId,
        if_true: ExprId,
        if_false: Option<ExprId>,
        ty: ExprType,
    ) -> ExprId {
        self.add(
            ExprKind::If {
                condition,
                if_true,
                if_false,
            },
            ty,
        )
    }

    /// A loop produces whatever its body produces; branches to the loop
    /// label re-enter it rather than exit it.
    pub fn loop_(&mut self, label: Option<&str>, body: ExprId) -> ExprId {
        let ty = self.ty(body);
        self.add(
            ExprKind::Loop {
                label: label.map(str::to_string),
                body,
            },
            ty,
        )
    }

    pub fn br(&mut self, label: &str, value: Option<ExprId>) -> ExprId {
        self.add(
            ExprKind::Br {
                label: label.to_string(),
                value,
                condition: None,
            },
            ExprType::Unreachable,
        )
    }

    pub fn br_if(&mut self, label: &str, value: Option<ExprId>, condition: ExprId) -> ExprId {
        let fallthrough = value.map_or(ExprType::None, |v| self.ty(v));
        let mut operands = vec![condition];
        operands.extend(value);
        let ty = self.unless_unreachable(&operands, fallthrough);
        self.add(
            ExprKind::Br {
                label: label.to_string(),
                value,
                condition: Some(condition),
            },
            ty,
        )
    }

    pub fn switch(
        &mut self,
        targets: &[&str],
        default: &str,
        value: Option<ExprId>,
        condition: ExprId,
    ) -> ExprId {
        self.add(
            ExprKind::Switch {
                targets: targets.iter().map(|t| t.to_string()).collect(),
                default: default.to_string(),
                value,
                condition,
            },
            ExprType::Unreachable,
        )
    }

    pub fn call(&mut self, func: &str, args: Vec<ExprId>, result: ExprType) -> ExprId {
        let ty = self.unless_unreachable(&args, result);
        self.add(
            ExprKind::Call {
                func: func.to_string(),
                args,
            },
            ty,
        )
    }

    pub fn call_indirect(
        &mut self,
        ty_name: &str,
        target: ExprId,
        args: Vec<ExprId>,
        result: ExprType,
    ) -> ExprId {
        let mut operands = args.clone();
        operands.push(target);
        let ty = self.unless_unreachable(&operands, result);
        self.add(
            ExprKind::CallIndirect {
                ty: ty_name.to_string(),
                target,
                args,
            },
            ty,
        )
    }

    pub fn local_get(&mut self, local: u32) -> ExprId {
        let ty = self
            .local_ty(local)
            .unwrap_or_else(|| panic!("local {} is not declared", local));
        self.add(ExprKind::LocalGet { local }, ty)
    }

    pub fn local_set(&mut self, local: u32, value: ExprId) -> ExprId {
        let ty = self.unless_unreachable(&[value], ExprType::None);
        self.add(
            ExprKind::LocalSet {
                local,
                value,
                tee: false,
            },
            ty,
        )
    }

    pub fn local_tee(&mut self, local: u32, value: ExprId) -> ExprId {
        let result = self
            .local_ty(local)
            .unwrap_or_else(|| panic!("local {} is not declared", local));
        let ty = self.unless_unreachable(&[value], result);
        self.add(
            ExprKind::LocalSet {
                local,
                value,
                tee: true,
            },
            ty,
        )
    }

    pub fn global_get(&mut self, global: &str, ty: ExprType) -> ExprId {
        self.add(
            ExprKind::GlobalGet {
                global: global.to_string(),
            },
            ty,
        )
    }

    pub fn global_set(&mut self, global: &str, value: ExprId) -> ExprId {
        let ty = self.unless_unreachable(&[value], ExprType::None);
        self.add(
            ExprKind::GlobalSet {
                global: global.to_string(),
                value,
            },
            ty,
        )
    }

    pub fn load(
        &mut self,
        ty: ExprType,
        bytes: u8,
        signed: bool,
        offset: u32,
        align: u32,
        ptr: ExprId,
    ) -> ExprId {
        let ty = self.unless_unreachable(&[ptr], ty);
        self.add(
            ExprKind::Load {
                bytes,
                signed,
                offset,
                align,
                atomic: false,
                ptr,
            },
            ty,
        )
    }

    pub fn atomic_load(&mut self, ty: ExprType, bytes: u8, offset: u32, ptr: ExprId) -> ExprId {
        let ty = self.unless_unreachable(&[ptr], ty);
        self.add(
            ExprKind::Load {
                bytes,
                signed: false,
                offset,
                align: 0,
                atomic: true,
                ptr,
            },
            ty,
        )
    }

    pub fn store(
        &mut self,
        value_ty: ExprType,
        bytes: u8,
        offset: u32,
        align: u32,
        ptr: ExprId,
        value: ExprId,
    ) -> ExprId {
        let ty = self.unless_unreachable(&[ptr, value], ExprType::None);
        self.add(
            ExprKind::Store {
                bytes,
                offset,
                align,
                atomic: false,
                ptr,
                value,
                value_ty,
            },
            ty,
        )
    }

    pub fn atomic_store(
        &mut self,
        value_ty: ExprType,
        bytes: u8,
        offset: u32,
        ptr: ExprId,
        value: ExprId,
    ) -> ExprId {
        let ty = self.unless_unreachable(&[ptr, value], ExprType::None);
        self.add(
            ExprKind::Store {
                bytes,
                offset,
                align: 0,
                atomic: true,
                ptr,
                value,
                value_ty,
            },
            ty,
        )
    }

    pub fn atomic_rmw(
        &mut self,
        op: AtomicOp,
        ty: ExprType,
        bytes: u8,
        offset: u32,
        ptr: ExprId,
        value: ExprId,
    ) -> ExprId {
        let ty = self.unless_unreachable(&[ptr, value], ty);
        self.add(
            ExprKind::AtomicRmw {
                op,
                bytes,
                offset,
                ptr,
                value,
            },
            ty,
        )
    }

    pub fn atomic_cmpxchg(
        &mut self,
        ty: ExprType,
        bytes: u8,
        offset: u32,
        ptr: ExprId,
        expected: ExprId,
        replacement: ExprId,
    ) -> ExprId {
        let ty = self.unless_unreachable(&[ptr, expected, replacement], ty);
        self.add(
            ExprKind::AtomicCmpxchg {
                bytes,
                offset,
                ptr,
                expected,
                replacement,
            },
            ty,
        )
    }

    pub fn atomic_wait(
        &mut self,
        expected_ty: ExprType,
        offset: u32,
        ptr: ExprId,
        expected: ExprId,
        timeout: ExprId,
    ) -> ExprId {
        let ty = self.unless_unreachable(&[ptr, expected, timeout], ExprType::I32);
        self.add(
            ExprKind::AtomicWait {
                ptr,
                expected,
                timeout,
                expected_ty,
                offset,
            },
            ty,
        )
    }

    pub fn atomic_notify(&mut self, offset: u32, ptr: ExprId, count: ExprId) -> ExprId {
        let ty = self.unless_unreachable(&[ptr, count], ExprType::I32);
        self.add(ExprKind::AtomicNotify { ptr, count, offset }, ty)
    }

    pub fn memory_size(&mut self) -> ExprId {
        self.add(ExprKind::MemorySize, ExprType::I32)
    }

    pub fn memory_grow(&mut self, operand: ExprId) -> ExprId {
        let ty = self.unless_unreachable(&[operand], ExprType::I32);
        self.add(ExprKind::MemoryGrow { operand }, ty)
    }
}
