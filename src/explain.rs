//! Proof-tree rendering over the support graph.
//!
//! `explain` walks an item's support chains and renders a hierarchical
//! plain-text proof: the item's textual form, an `ASSERTED` marker for
//! directly asserted items, and one nested `SUPPORTED BY` block per
//! justification, naming the supporting fact and rule with each expanded
//! through its own support chain. Indentation grows by two spaces per
//! nesting step:
//!
//! ```text
//! fact: (can tweety fly)
//!   SUPPORTED BY
//!     fact: (isa tweety bird) ASSERTED
//!     rule: ((isa ?x bird)) -> (can ?x fly) ASSERTED
//! ```
//!
//! The walk keeps the recursion stack explicit: finding an item already on
//! the stack means the support graph has a cycle, which the invariants
//! forbid, so the walk aborts with an internal-consistency error instead of
//! looping.

use crate::error::KbError;
use crate::item::{ItemArena, ItemId};

/// Render the proof tree for a stored item.
///
/// Fails with [`KbError::ItemNotFound`] when the item is absent and
/// [`KbError::SupportCycle`] when a support chain revisits an item on the
/// current chain.
pub fn explain(arena: &ItemArena, id: ItemId) -> Result<String, KbError> {
    let mut out = String::new();
    let mut stack = Vec::new();
    render(arena, id, 0, &mut stack, &mut out)?;
    Ok(out)
}

fn render(
    arena: &ItemArena,
    id: ItemId,
    indent: usize,
    stack: &mut Vec<ItemId>,
    out: &mut String,
) -> Result<(), KbError> {
    let item = arena.get(id).ok_or_else(|| KbError::ItemNotFound {
        item: id.to_string(),
    })?;

    if stack.contains(&id) {
        return Err(KbError::SupportCycle { item_id: id.get() });
    }

    if !item.is_asserted() && item.supported_by().is_empty() {
        // I2 guarantees this never happens for stored items.
        return Err(KbError::UnsupportedUnasserted { item_id: id.get() });
    }

    let pad = " ".repeat(indent);
    out.push_str(&format!("{pad}{item}"));
    if item.is_asserted() {
        out.push_str(" ASSERTED");
    }
    out.push('\n');

    stack.push(id);
    for pair in item.supported_by() {
        let header_pad = " ".repeat(indent + 2);
        out.push_str(&format!("{header_pad}SUPPORTED BY\n"));
        render(arena, pair.fact, indent + 4, stack, out)?;
        render(arena, pair.rule, indent + 4, stack, out)?;
    }
    stack.pop();

    Ok(())
}
