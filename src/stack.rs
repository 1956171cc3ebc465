//! The flat, stack-machine-ordered form of a function body.
//!
//! The tree IR is good at being rewritten; this form is good at being
//! emitted. It is nothing more than an ordered vector where each slot is a
//! reference into the tree, a structural marker, a synthetic `unreachable`,
//! or an empty slot. For example, flattening
//!
//! ```text
//! (block $b (result i32)
//!  (i32.add
//!   (i32.const 10)
//!   (local.get 0)))
//! ```
//!
//! produces
//!
//! ```text
//! Open(block $b)
//! Instr(i32.const 10)
//! Instr(local.get 0)
//! Instr(i32.add)
//! End(block $b)
//! ```
//!
//! which is already in emission order: the encoder replays it front to back
//! with no further analysis. Empty slots exist so that a later peephole pass
//! can delete an instruction in constant time without re-indexing; the
//! encoder skips them with zero bytes emitted and zero effect on branch
//! resolution.

use crate::error::Result;
use crate::ir::{ExprId, Function};
use crate::lower::{Driver, Emitter};

/// One slot in the linear sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinearNode {
    /// A plain instruction from the tree; its operands precede it.
    Instr(ExprId),
    /// Opens the given block, loop, or if.
    Open(ExprId),
    /// The `else` of the given if.
    Else(ExprId),
    /// Closes the given construct. Always pairs with the nearest earlier
    /// unclosed `Open`.
    End(ExprId),
    /// A synthetic `unreachable` instruction with no tree counterpart.
    Unreachable,
    /// An empty slot left by [`LinearFunc::remove`]; encodes to nothing.
    Nil,
}

/// A flattened function body.
#[derive(Clone, Debug, Default)]
pub struct LinearFunc {
    nodes: Vec<LinearNode>,
}

impl LinearFunc {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, at: usize) -> Option<LinearNode> {
        self.nodes.get(at).copied()
    }

    pub fn nodes(&self) -> &[LinearNode] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = LinearNode> + '_ {
        self.nodes.iter().copied()
    }

    /// Replaces the slot at `at` with an empty one in constant time; every
    /// other slot keeps its index.
    pub fn remove(&mut self, at: usize) {
        self.nodes[at] = LinearNode::Nil;
    }
}

struct Flatten {
    nodes: Vec<LinearNode>,
}

impl Emitter for Flatten {
    fn node(&mut self, _id: ExprId) {}

    fn instr(&mut self, id: ExprId) -> Result<()> {
        self.nodes.push(LinearNode::Instr(id));
        Ok(())
    }

    fn open(&mut self, id: ExprId) {
        self.nodes.push(LinearNode::Open(id));
    }

    fn else_mark(&mut self, id: ExprId) {
        self.nodes.push(LinearNode::Else(id));
    }

    fn end(&mut self, id: ExprId) {
        self.nodes.push(LinearNode::End(id));
    }

    fn unreachable(&mut self) {
        self.nodes.push(LinearNode::Unreachable);
    }
}

/// Flattens a function body. The body is in block-contents position: an
/// unlabeled outermost block is spliced rather than wrapped in a frame of
/// its own.
pub fn flatten(func: &Function) -> LinearFunc {
    log::debug!("flattening function {:?}", func.name);
    let mut sink = Flatten { nodes: Vec::new() };
    Driver {
        func,
        emitter: &mut sink,
    }
    .recurse_body(func.body())
    .expect("flattening resolves no names and cannot fail");
    LinearFunc { nodes: sink.nodes }
}

/// Flattens a single expression in whole-node mode: `root` is emitted as
/// written, even when it is an unlabeled block.
pub fn flatten_expr(func: &Function, root: ExprId) -> LinearFunc {
    let mut sink = Flatten { nodes: Vec::new() };
    Driver {
        func,
        emitter: &mut sink,
    }
    .recurse(root)
    .expect("flattening resolves no names and cannot fail");
    LinearFunc { nodes: sink.nodes }
}
