//! The shared stack-order traversal.
//!
//! Flattening a tree into the linear form and encoding the tree straight to
//! bytes must walk nodes in exactly the same order and apply exactly the
//! same structural policies: operand ordering, splicing of unlabeled
//! blocks, and the synthetic `unreachable` discipline that bridges the IR's
//! unreachable type and the binary format's stack-polymorphism rule. One
//! [`Driver`] owns that walk; it is parameterized by an [`Emitter`] that
//! receives the ordered events, so the two consumers cannot drift apart.

use crate::error::Result;
use crate::ir::{ExprId, ExprKind, Function};

/// Receives emission-order events from a [`Driver`].
pub(crate) trait Emitter {
    /// Called when a node is first visited, before any of its operands.
    fn node(&mut self, id: ExprId);
    /// A plain (non-structured) instruction; its operands have already been
    /// emitted.
    fn instr(&mut self, id: ExprId) -> Result<()>;
    /// Opens the given block, loop, or if.
    fn open(&mut self, id: ExprId);
    /// The `else` of the given if.
    fn else_mark(&mut self, id: ExprId);
    /// Closes the given construct.
    fn end(&mut self, id: ExprId);
    /// A synthetic `unreachable` instruction with no tree counterpart.
    fn unreachable(&mut self);
}

pub(crate) struct Driver<'a, E> {
    pub func: &'a Function,
    pub emitter: &'a mut E,
}

impl<'a, E: Emitter> Driver<'a, E> {
    /// Emits `id` in body position (the top of a function, an if arm, or a
    /// loop body). An unlabeled block there is spliced into its surroundings
    /// instead of opening a redundant frame; nothing can branch to a block
    /// without a label, so the frame would never be needed. A labeled block
    /// keeps its frame even when no branch currently targets it.
    pub fn recurse_body(&mut self, id: ExprId) -> Result<()> {
        let func = self.func;
        match &func[id].kind {
            ExprKind::Block { label: None, exprs } => {
                for &child in exprs {
                    self.recurse(child)?;
                }
                // The spliced contents still stand in for the block: if the
                // block could never be exited but its last instruction does
                // not say so, terminate the contents the way the block's own
                // frame would have been terminated.
                let last_diverges = exprs
                    .last()
                    .map_or(false, |&c| func.ty(c).is_unreachable());
                if func.ty(id).is_unreachable() && !last_diverges {
                    self.emitter.unreachable();
                }
                Ok(())
            }
            _ => self.recurse(id),
        }
    }

    /// Emits `id` whole, operands before operators.
    pub fn recurse(&mut self, id: ExprId) -> Result<()> {
        let func = self.func;
        let ty = func.ty(id);
        self.emitter.node(id);
        match &func[id].kind {
            ExprKind::Block { exprs, .. } => {
                self.emitter.open(id);
                for &child in exprs {
                    self.recurse(child)?;
                }
                self.close(id);
            }

            ExprKind::If {
                condition,
                if_true,
                if_false,
            } => {
                self.recurse(*condition)?;
                if func.ty(*condition).is_unreachable() {
                    // The dispatch value never materializes, so the if can
                    // never run and its frame cannot be declared; keep only
                    // the condition and mark the spot as non-completing.
                    self.emitter.unreachable();
                    return Ok(());
                }
                self.emitter.open(id);
                self.recurse_body(*if_true)?;
                if let Some(alt) = *if_false {
                    self.emitter.else_mark(id);
                    self.recurse_body(alt)?;
                }
                // An if can only be unreachable through its arms here, and a
                // single-armed if always has the fall-through exit.
                debug_assert!(!ty.is_unreachable() || if_false.is_some());
                self.close(id);
            }

            ExprKind::Loop { body, .. } => {
                self.emitter.open(id);
                self.recurse_body(*body)?;
                self.close(id);
            }

            ExprKind::Br {
                value, condition, ..
            } => {
                if let Some(v) = *value {
                    self.recurse(v)?;
                }
                if let Some(c) = *condition {
                    self.recurse(c)?;
                }
                self.emitter.instr(id)?;
                // A conditional branch is supposed to leave its value for
                // the fall-through path; with a non-completing operand there
                // is none, so the stack must be made polymorphic.
                if condition.is_some() && ty.is_unreachable() {
                    self.emitter.unreachable();
                }
            }

            ExprKind::Switch {
                value, condition, ..
            } => {
                if let Some(v) = *value {
                    self.recurse(v)?;
                }
                self.recurse(*condition)?;
                let broken = value.map_or(false, |v| func.ty(v).is_unreachable())
                    || func.ty(*condition).is_unreachable();
                if broken {
                    // The operand types at the dispatch are unknowable, so
                    // the table itself cannot be encoded soundly.
                    self.emitter.unreachable();
                    return Ok(());
                }
                self.emitter.instr(id)?;
            }

            ExprKind::Call { args, .. } => {
                for &arg in args {
                    self.recurse(arg)?;
                }
                self.plain(id)?;
            }

            ExprKind::CallIndirect { target, args, .. } => {
                for &arg in args {
                    self.recurse(arg)?;
                }
                self.recurse(*target)?;
                self.plain(id)?;
            }

            ExprKind::LocalSet { value, .. } => {
                self.recurse(*value)?;
                self.plain(id)?;
            }

            ExprKind::GlobalSet { value, .. } => {
                self.recurse(*value)?;
                self.plain(id)?;
            }

            ExprKind::Load { ptr, .. } => {
                self.recurse(*ptr)?;
                if func.ty(*ptr).is_unreachable() {
                    // The address never materializes; without it the access
                    // width and result type are meaningless, so no opcode.
                    return Ok(());
                }
                self.emitter.instr(id)?;
            }

            ExprKind::Store {
                ptr, value, atomic, ..
            } => {
                self.recurse(*ptr)?;
                if func.ty(*ptr).is_unreachable() {
                    return Ok(());
                }
                self.recurse(*value)?;
                if *atomic && func.ty(*value).is_unreachable() {
                    return Ok(());
                }
                self.plain(id)?;
            }

            ExprKind::AtomicRmw { ptr, value, .. } => {
                self.recurse(*ptr)?;
                if func.ty(*ptr).is_unreachable() {
                    return Ok(());
                }
                self.recurse(*value)?;
                if func.ty(*value).is_unreachable() {
                    return Ok(());
                }
                self.emitter.instr(id)?;
            }

            ExprKind::AtomicCmpxchg {
                ptr,
                expected,
                replacement,
                ..
            } => {
                for &operand in &[*ptr, *expected, *replacement] {
                    self.recurse(operand)?;
                    if func.ty(operand).is_unreachable() {
                        return Ok(());
                    }
                }
                self.emitter.instr(id)?;
            }

            ExprKind::AtomicWait {
                ptr,
                expected,
                timeout,
                ..
            } => {
                for &operand in &[*ptr, *expected, *timeout] {
                    self.recurse(operand)?;
                    if func.ty(operand).is_unreachable() {
                        return Ok(());
                    }
                }
                self.emitter.instr(id)?;
            }

            ExprKind::AtomicNotify { ptr, count, .. } => {
                for &operand in &[*ptr, *count] {
                    self.recurse(operand)?;
                    if func.ty(operand).is_unreachable() {
                        return Ok(());
                    }
                }
                self.emitter.instr(id)?;
            }

            ExprKind::MemoryGrow { operand } => {
                self.recurse(*operand)?;
                self.plain(id)?;
            }

            ExprKind::Unary { value, .. } => {
                self.recurse(*value)?;
                self.plain(id)?;
            }

            ExprKind::Binary { left, right, .. } => {
                self.recurse(*left)?;
                self.recurse(*right)?;
                self.plain(id)?;
            }

            ExprKind::Select {
                if_true,
                if_false,
                condition,
            } => {
                self.recurse(*if_true)?;
                self.recurse(*if_false)?;
                self.recurse(*condition)?;
                self.plain(id)?;
            }

            ExprKind::Drop { value } => {
                self.recurse(*value)?;
                self.plain(id)?;
            }

            ExprKind::Return { value } => {
                if let Some(v) = *value {
                    self.recurse(v)?;
                }
                self.emitter.instr(id)?;
            }

            ExprKind::LocalGet { .. }
            | ExprKind::GlobalGet { .. }
            | ExprKind::MemorySize
            | ExprKind::Const { .. }
            | ExprKind::Nop
            | ExprKind::Unreachable => {
                self.emitter.instr(id)?;
            }
        }
        Ok(())
    }

    /// A plain instruction: if its own type is unreachable, some operand
    /// never completes and downstream consumers may still expect a value, so
    /// a synthetic `unreachable` follows it.
    fn plain(&mut self, id: ExprId) -> Result<()> {
        self.emitter.instr(id)?;
        if self.func.ty(id).is_unreachable() {
            self.emitter.unreachable();
        }
        Ok(())
    }

    /// Closes a structured construct. One that can never be exited is
    /// declared without a result; a synthetic `unreachable` right before the
    /// `end` proves the body never falls through, and one right after lets
    /// whatever follows assume its value was produced.
    fn close(&mut self, id: ExprId) {
        let diverges = self.func.ty(id).is_unreachable();
        if diverges {
            self.emitter.unreachable();
        }
        self.emitter.end(id);
        if diverges {
            self.emitter.unreachable();
        }
    }
}
