//! One step of forward chaining.
//!
//! Combining one fact with one rule either derives nothing, a new fact
//! (when the rule had a single remaining antecedent), or a reduced rule
//! (when more antecedents remain). Matching only ever consumes `lhs[0]`:
//! that fixes the order in which a multi-antecedent rule's conditions are
//! satisfied, and therefore which partial-rule variants appear as
//! intermediate derivations.
//!
//! The binding produced by the match is applied to the derived item's
//! remaining antecedents and consequent only; the triggering rule is never
//! rewritten.

use crate::item::{Fact, Item, ItemId, Rule, SupportPair};
use crate::unify::match_statement;

/// Attempt to derive a new item from one fact and one rule.
///
/// Unifies the rule's first antecedent (as pattern) against the fact's
/// statement (as target). On success the derived item carries
/// `asserted = false` and the single support pair `(fact, rule)`; the
/// caller is responsible for inserting it back into the knowledge base,
/// which is what makes chaining recursive.
pub fn fc_infer(fact_id: ItemId, fact: &Fact, rule_id: ItemId, rule: &Rule) -> Option<Item> {
    let first = rule.lhs.first()?;
    let bindings = match_statement(first, &fact.statement)?;

    let support = SupportPair::new(fact_id, rule_id);
    let derived = if rule.lhs.len() == 1 {
        Item::Fact(Fact::derived(bindings.apply(&rule.rhs), support))
    } else {
        let remaining = rule.lhs[1..]
            .iter()
            .map(|antecedent| bindings.apply(antecedent))
            .collect();
        Item::Rule(Rule::derived(remaining, bindings.apply(&rule.rhs), support))
    };

    tracing::trace!(
        fact = %fact.statement,
        rule = %rule,
        derived = %derived,
        "forward-chaining step derived an item"
    );
    Some(derived)
}
