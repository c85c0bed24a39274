//! One-directional statement matching.
//!
//! This is the collaborator seam the rest of the engine consumes: matching a
//! pattern statement against a target statement, producing the substitution
//! that makes them equal. The contract the core relies on:
//!
//! - Deterministic: one left-to-right pass over the argument positions.
//! - A variable on either side binds to the opposing term; when both sides
//!   are variables, the pattern's variable binds to the target's variable.
//! - A variable already bound must resolve to a term structurally equal to
//!   the opposing term, or the match fails.
//! - The returned substitution is exactly what instantiation applies to a
//!   rule's consequent and remaining antecedents.
//!
//! Terms are flat (constants and variables, no function symbols), so no
//! occurs check is needed.

use crate::bind::Bindings;
use crate::term::{Statement, Term};

/// Match `pattern` against `target`, extending an empty substitution.
///
/// Returns `None` when the predicates differ, the arities differ, or any
/// argument position fails to match.
pub fn match_statement(pattern: &Statement, target: &Statement) -> Option<Bindings> {
    match_statement_with(pattern, target, &Bindings::new())
}

/// Match `pattern` against `target`, extending an existing substitution.
pub fn match_statement_with(
    pattern: &Statement,
    target: &Statement,
    bindings: &Bindings,
) -> Option<Bindings> {
    if pattern.predicate != target.predicate || pattern.terms.len() != target.terms.len() {
        return None;
    }

    let mut bindings = bindings.clone();
    for (p, t) in pattern.terms.iter().zip(target.terms.iter()) {
        if !match_terms(p, t, &mut bindings) {
            return None;
        }
    }
    Some(bindings)
}

fn match_terms(pattern: &Term, target: &Term, bindings: &mut Bindings) -> bool {
    // Resolve both sides through the substitution accumulated so far, so a
    // repeated variable must agree with its earlier binding.
    let p = bindings.resolve(pattern);
    let t = bindings.resolve(target);

    match (&p, &t) {
        (Term::Constant(a), Term::Constant(b)) => a == b,
        (Term::Variable(a), Term::Variable(b)) if a == b => true,
        // Pattern variable binds first; otherwise the target's variable
        // absorbs the pattern's constant.
        (Term::Variable(name), other) | (other, Term::Variable(name)) => {
            bindings.add(name.clone(), other.clone());
            true
        }
    }
}
