//! Encoding function bodies into the wasm binary instruction format.
//!
//! [`Writer`] is the per-function encoding context. It can consume the tree
//! directly (one fused pass) or replay a previously flattened
//! [`LinearFunc`]; both paths funnel through the same per-instruction byte
//! emission, so they produce identical output.

use crate::encode::Encoder;
use crate::error::Result;
use crate::ir::{DebugLocation, ExprId, ExprKind, Function, Value};
use crate::lower::{Driver, Emitter};
use crate::opcode;
use crate::stack::{LinearFunc, LinearNode};
use crate::ty::ExprType;
use anyhow::bail;
use std::collections::HashMap;

/// Maps user-level names to the index spaces of the final binary.
///
/// Owned and populated by the module-level writer as it lays sections out;
/// this crate only reads it.
#[derive(Debug, Default)]
pub struct ModuleIndices {
    funcs: HashMap<String, u32>,
    types: HashMap<String, u32>,
    globals: HashMap<String, u32>,
}

macro_rules! define_get_push_index {
    ( $get_name:ident, $push_name:ident, $member:ident, $desc:expr ) => {
        impl ModuleIndices {
            /// Get the index assigned to the given name.
            ///
            /// Panics when the name was never assigned one: that means the
            /// module writer emitted sections out of order or handed us a
            /// body referencing something it never declared.
            #[inline]
            pub fn $get_name(&self, name: &str) -> u32 {
                self.$member.get(name).cloned().unwrap_or_else(|| {
                    panic!("no {} named `{}` has been assigned an index", $desc, name)
                })
            }

            /// Assigns the next available index to the given name.
            #[inline]
            pub fn $push_name(&mut self, name: &str) {
                let idx = self.$member.len() as u32;
                self.$member.insert(name.to_string(), idx);
            }
        }
    };
}

define_get_push_index!(func_index, push_func, funcs, "function");
define_get_push_index!(type_index, push_type, types, "function type");
define_get_push_index!(global_index, push_global, globals, "global");

/// One frame of the branch-target stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BranchTarget<'a> {
    /// A labeled block or loop.
    Label(&'a str),
    /// An unlabeled block or loop; no branch can name it.
    Anonymous,
    /// The implicit frame of an if arm. The binary format gives it a depth
    /// like any other frame, but the tree IR has no way to branch to it, so
    /// resolving a branch here means the input was malformed.
    Impossible,
}

fn frame(label: &Option<String>) -> BranchTarget {
    match label {
        Some(name) => BranchTarget::Label(name),
        None => BranchTarget::Anonymous,
    }
}

/// Per-function encoding state: the branch-target stack and the
/// debug-location cursor, plus the output buffer. Construct one per function
/// body and discard it afterwards; nothing survives across functions.
#[derive(Debug)]
pub struct Writer<'a> {
    func: &'a Function,
    indices: &'a ModuleIndices,
    encoder: Encoder<'a>,
    targets: Vec<BranchTarget<'a>>,
    last_location: Option<DebugLocation>,
    source_map: Option<Vec<(u32, DebugLocation)>>,
}

impl<'a> Writer<'a> {
    pub fn new(
        func: &'a Function,
        indices: &'a ModuleIndices,
        out: &'a mut Vec<u8>,
    ) -> Writer<'a> {
        Writer {
            func,
            indices,
            encoder: Encoder::new(out),
            targets: Vec::new(),
            last_location: None,
            source_map: None,
        }
    }

    /// Records `(byte offset, source location)` pairs while writing. A pair
    /// is recorded at most once per contiguous run of the same location.
    pub fn enable_source_map(&mut self) {
        self.source_map = Some(Vec::new());
    }

    /// The recorded source-map entries, in emission order.
    pub fn take_source_map(&mut self) -> Vec<(u32, DebugLocation)> {
        self.source_map.take().unwrap_or_default()
    }

    /// Encodes the function body straight from the tree.
    pub fn write(&mut self) -> Result<()> {
        log::debug!("writing function {:?}", self.func.name);
        let func = self.func;
        Driver {
            func,
            emitter: &mut *self,
        }
        .recurse_body(func.body())?;
        debug_assert!(self.targets.is_empty());
        Ok(())
    }

    /// Replays a previously flattened body, skipping empty slots.
    pub fn write_linear(&mut self, linear: &LinearFunc) -> Result<()> {
        log::debug!("writing flattened function {:?}", self.func.name);
        for node in linear.iter() {
            match node {
                LinearNode::Instr(id) => {
                    self.node(id);
                    self.instr(id)?;
                }
                LinearNode::Open(id) => {
                    self.node(id);
                    self.open(id);
                }
                LinearNode::Else(id) => self.else_mark(id),
                LinearNode::End(id) => self.end(id),
                LinearNode::Unreachable => self.unreachable(),
                LinearNode::Nil => {}
            }
        }
        assert!(
            self.targets.is_empty(),
            "unclosed construct in flattened sequence"
        );
        Ok(())
    }

    /// Resolves a label to its relative depth: the number of frames between
    /// the innermost one and the frame carrying the label.
    fn branch_depth(&self, label: &str) -> Result<u32> {
        for (depth, target) in self.targets.iter().rev().enumerate() {
            if let BranchTarget::Label(name) = target {
                if *name == label {
                    return Ok(depth as u32);
                }
            }
        }
        bail!(
            "branch to nonexistent label `{}` in function {}",
            label,
            self.func.display_name()
        );
    }

    fn check_local(&self, local: u32) -> Result<()> {
        if self.func.local_ty(local).is_none() {
            bail!(
                "local {} is not declared in function {}",
                local,
                self.func.display_name()
            );
        }
        Ok(())
    }

    /// Alignment is encoded as the log2 of the explicit alignment, or of the
    /// access width when the alignment is natural.
    fn memory_immediates(&mut self, align: u32, bytes: u8, offset: u32) {
        let align = if align == 0 { u32::from(bytes) } else { align };
        debug_assert!(align.is_power_of_two());
        self.encoder.u32(align.trailing_zeros());
        self.encoder.u32(offset);
    }

    /// Emits the opcode and immediates of one plain instruction. Operands
    /// are already in the output; structured constructs never come through
    /// here.
    fn write_instr(&mut self, id: ExprId) -> Result<()> {
        let func = self.func;
        let expr = &func[id];
        match &expr.kind {
            ExprKind::Block { .. } | ExprKind::If { .. } | ExprKind::Loop { .. } => {
                unreachable!("structured constructs are emitted via open/end")
            }

            ExprKind::Br {
                label, condition, ..
            } => {
                let depth = self.branch_depth(label)?;
                self.encoder.byte(if condition.is_some() {
                    opcode::BR_IF
                } else {
                    opcode::BR
                });
                self.encoder.u32(depth);
            }

            ExprKind::Switch {
                targets, default, ..
            } => {
                let mut depths = Vec::with_capacity(targets.len());
                for target in targets {
                    depths.push(self.branch_depth(target)?);
                }
                let default = self.branch_depth(default)?;
                self.encoder.byte(opcode::BR_TABLE);
                self.encoder.u32(targets.len() as u32);
                for depth in depths {
                    self.encoder.u32(depth);
                }
                self.encoder.u32(default);
            }

            ExprKind::Call { func: callee, .. } => {
                let idx = self.indices.func_index(callee);
                self.encoder.byte(opcode::CALL);
                self.encoder.u32(idx);
            }

            ExprKind::CallIndirect { ty, .. } => {
                let idx = self.indices.type_index(ty);
                self.encoder.byte(opcode::CALL_INDIRECT);
                self.encoder.u32(idx);
                // Reserved table index.
                self.encoder.byte(0x00);
            }

            ExprKind::LocalGet { local } => {
                self.check_local(*local)?;
                self.encoder.byte(opcode::LOCAL_GET);
                self.encoder.u32(*local);
            }

            ExprKind::LocalSet { local, tee, .. } => {
                self.check_local(*local)?;
                self.encoder.byte(if *tee {
                    opcode::LOCAL_TEE
                } else {
                    opcode::LOCAL_SET
                });
                self.encoder.u32(*local);
            }

            ExprKind::GlobalGet { global } => {
                let idx = self.indices.global_index(global);
                self.encoder.byte(opcode::GLOBAL_GET);
                self.encoder.u32(idx);
            }

            ExprKind::GlobalSet { global, .. } => {
                let idx = self.indices.global_index(global);
                self.encoder.byte(opcode::GLOBAL_SET);
                self.encoder.u32(idx);
            }

            ExprKind::Load {
                bytes,
                signed,
                offset,
                align,
                atomic,
                ..
            } => {
                if *atomic {
                    let op = opcode::atomic_load(expr.ty, *bytes).unwrap_or_else(|| {
                        panic!("no atomic load opcode for {} width {}", expr.ty, bytes)
                    });
                    self.encoder.byte(opcode::ATOMIC_PREFIX);
                    self.encoder.byte(op);
                } else {
                    let op = opcode::load(expr.ty, *bytes, *signed).unwrap_or_else(|| {
                        panic!("no load opcode for {} width {}", expr.ty, bytes)
                    });
                    self.encoder.byte(op);
                }
                self.memory_immediates(*align, *bytes, *offset);
            }

            ExprKind::Store {
                bytes,
                offset,
                align,
                atomic,
                value_ty,
                ..
            } => {
                if *atomic {
                    let op = opcode::atomic_store(*value_ty, *bytes).unwrap_or_else(|| {
                        panic!("no atomic store opcode for {} width {}", value_ty, bytes)
                    });
                    self.encoder.byte(opcode::ATOMIC_PREFIX);
                    self.encoder.byte(op);
                } else {
                    let op = opcode::store(*value_ty, *bytes).unwrap_or_else(|| {
                        panic!("no store opcode for {} width {}", value_ty, bytes)
                    });
                    self.encoder.byte(op);
                }
                self.memory_immediates(*align, *bytes, *offset);
            }

            ExprKind::AtomicRmw {
                op, bytes, offset, ..
            } => {
                let byte = opcode::atomic_rmw(*op, expr.ty, *bytes).unwrap_or_else(|| {
                    panic!("no atomic rmw opcode for {:?} {} width {}", op, expr.ty, bytes)
                });
                self.encoder.byte(opcode::ATOMIC_PREFIX);
                self.encoder.byte(byte);
                self.memory_immediates(0, *bytes, *offset);
            }

            ExprKind::AtomicCmpxchg { bytes, offset, .. } => {
                let byte = opcode::atomic_cmpxchg(expr.ty, *bytes).unwrap_or_else(|| {
                    panic!("no atomic cmpxchg opcode for {} width {}", expr.ty, bytes)
                });
                self.encoder.byte(opcode::ATOMIC_PREFIX);
                self.encoder.byte(byte);
                self.memory_immediates(0, *bytes, *offset);
            }

            ExprKind::AtomicWait {
                expected_ty,
                offset,
                ..
            } => {
                self.encoder.byte(opcode::ATOMIC_PREFIX);
                match expected_ty {
                    ExprType::I32 => {
                        self.encoder.byte(opcode::I32_ATOMIC_WAIT);
                        self.memory_immediates(0, 4, *offset);
                    }
                    ExprType::I64 => {
                        self.encoder.byte(opcode::I64_ATOMIC_WAIT);
                        self.memory_immediates(0, 8, *offset);
                    }
                    other => panic!("no atomic wait opcode for {}", other),
                }
            }

            ExprKind::AtomicNotify { offset, .. } => {
                self.encoder.byte(opcode::ATOMIC_PREFIX);
                self.encoder.byte(opcode::ATOMIC_NOTIFY);
                self.memory_immediates(0, 4, *offset);
            }

            ExprKind::MemorySize => {
                self.encoder.byte(opcode::MEMORY_SIZE);
                // Reserved memory index.
                self.encoder.byte(0x00);
            }

            ExprKind::MemoryGrow { .. } => {
                self.encoder.byte(opcode::MEMORY_GROW);
                self.encoder.byte(0x00);
            }

            ExprKind::Const { value } => match *value {
                Value::I32(v) => {
                    self.encoder.byte(opcode::I32_CONST);
                    self.encoder.i32(v);
                }
                Value::I64(v) => {
                    self.encoder.byte(opcode::I64_CONST);
                    self.encoder.i64(v);
                }
                Value::F32(v) => {
                    self.encoder.byte(opcode::F32_CONST);
                    self.encoder.f32(v);
                }
                Value::F64(v) => {
                    self.encoder.byte(opcode::F64_CONST);
                    self.encoder.f64(v);
                }
            },

            ExprKind::Unary { op, .. } => self.encoder.byte(opcode::unary(*op)),
            ExprKind::Binary { op, .. } => self.encoder.byte(opcode::binary(*op)),
            ExprKind::Select { .. } => self.encoder.byte(opcode::SELECT),
            ExprKind::Drop { .. } => self.encoder.byte(opcode::DROP),
            ExprKind::Return { .. } => self.encoder.byte(opcode::RETURN),
            ExprKind::Nop => self.encoder.byte(opcode::NOP),
            ExprKind::Unreachable => self.encoder.byte(opcode::UNREACHABLE),
        }
        Ok(())
    }
}

impl<'a> Emitter for Writer<'a> {
    fn node(&mut self, id: ExprId) {
        let func = self.func;
        let map = match self.source_map.as_mut() {
            Some(map) => map,
            None => return,
        };
        let loc = match func.debug_locations.get(&id) {
            Some(loc) => *loc,
            None => return,
        };
        if self.last_location != Some(loc) {
            map.push((self.encoder.pos() as u32, loc));
            self.last_location = Some(loc);
        }
    }

    fn instr(&mut self, id: ExprId) -> Result<()> {
        self.write_instr(id)
    }

    fn open(&mut self, id: ExprId) {
        let func = self.func;
        let expr = &func[id];
        match &expr.kind {
            ExprKind::Block { label, .. } => {
                self.encoder.byte(opcode::BLOCK);
                self.encoder.byte(expr.ty.declared().binary());
                self.targets.push(frame(label));
            }
            ExprKind::Loop { label, .. } => {
                self.encoder.byte(opcode::LOOP);
                self.encoder.byte(expr.ty.declared().binary());
                self.targets.push(frame(label));
            }
            ExprKind::If { .. } => {
                self.encoder.byte(opcode::IF);
                self.encoder.byte(expr.ty.declared().binary());
                self.targets.push(BranchTarget::Impossible);
            }
            _ => unreachable!("not a structured construct"),
        }
    }

    fn else_mark(&mut self, _id: ExprId) {
        // The arm frames share one stack entry; it stays live across the
        // else and is popped at the end.
        self.encoder.byte(opcode::ELSE);
    }

    fn end(&mut self, _id: ExprId) {
        assert!(
            self.targets.pop().is_some(),
            "end marker without an open construct"
        );
        self.encoder.byte(opcode::END);
    }

    fn unreachable(&mut self) {
        self.encoder.byte(opcode::UNREACHABLE);
    }
}
