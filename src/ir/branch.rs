//! Branch-target discovery.

use super::{ExprId, ExprKind, Function};

/// Does any branch inside `root` name `label`?
///
/// This is the query a transformation pass must answer before dropping a
/// block's label: only an unlabeled block is guaranteed to have no branches
/// into it and can be spliced into its parent when flattening. Labels are
/// assumed unique within a function, so the search does not track shadowing.
pub fn has_branch_to(func: &Function, root: ExprId, label: &str) -> bool {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let expr = &func[id];
        match &expr.kind {
            ExprKind::Br { label: l, .. } if l == label => return true,
            ExprKind::Switch {
                targets, default, ..
            } if default == label || targets.iter().any(|t| t == label) => return true,
            _ => {}
        }
        expr.visit_children(|child| stack.push(child));
    }
    false
}
