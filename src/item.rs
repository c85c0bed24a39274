//! Facts, rules, and the arena that stores them.
//!
//! Every fact and rule lives in an [`ItemArena`]: a dense, id-keyed store
//! with stable [`ItemId`] identifiers. Support references between items are
//! ids into the arena rather than direct references, which keeps the
//! reverse dependency index (see [`crate::tms`]) a simple id-keyed mapping
//! and sidesteps aliasing during retraction cascades.

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::KbError;
use crate::term::Statement;

/// Unique, niche-optimized identifier for a stored fact or rule.
///
/// Uses `NonZeroU64` so that `Option<ItemId>` is the same size as `ItemId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ItemId(NonZeroU64);

impl ItemId {
    /// Create an `ItemId` from a raw `u64`. Returns `None` if `raw` is zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(ItemId)
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item:{}", self.0)
    }
}

/// Monotonic item ID allocator, starting from 1.
#[derive(Debug)]
pub struct ItemIdAllocator {
    next: AtomicU64,
}

impl ItemIdAllocator {
    /// Create a new allocator.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocate the next item ID.
    pub fn next_id(&self) -> Result<ItemId, KbError> {
        let raw = self.next.fetch_add(1, Ordering::Relaxed);
        ItemId::new(raw).ok_or(KbError::IdSpaceExhausted)
    }
}

impl Default for ItemIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Facts and rules
// ---------------------------------------------------------------------------

/// One justification for a derived item: the specific fact and rule whose
/// combination produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupportPair {
    /// The triggering fact.
    pub fact: ItemId,
    /// The triggering rule.
    pub rule: ItemId,
}

impl SupportPair {
    /// Construct a support pair.
    pub fn new(fact: ItemId, rule: ItemId) -> Self {
        Self { fact, rule }
    }

    /// Whether this pair names the given item as a premise.
    pub fn depends_on(&self, id: ItemId) -> bool {
        self.fact == id || self.rule == id
    }
}

/// A statement held in the knowledge base, with truth-maintenance metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    /// The statement this fact asserts.
    pub statement: Statement,
    /// Whether the fact was directly asserted by an external caller.
    pub asserted: bool,
    /// The fact+rule combinations that derived this fact.
    pub supported_by: Vec<SupportPair>,
}

impl Fact {
    /// A directly asserted fact: asserted, no support.
    pub fn asserted(statement: Statement) -> Self {
        Self {
            statement,
            asserted: true,
            supported_by: Vec::new(),
        }
    }

    /// A derived fact: unasserted, justified by one support pair.
    pub fn derived(statement: Statement, support: SupportPair) -> Self {
        Self {
            statement,
            asserted: false,
            supported_by: vec![support],
        }
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.statement)
    }
}

/// An implication with an ordered antecedent list and one consequent.
///
/// The antecedent order matters: forward chaining only ever consumes
/// `lhs[0]`, so the order fixes which partial-rule variants appear as
/// intermediate derivations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// The not-yet-consumed antecedents, left to right.
    pub lhs: Vec<Statement>,
    /// The consequent.
    pub rhs: Statement,
    /// Whether the rule was directly asserted by an external caller.
    pub asserted: bool,
    /// The fact+rule combinations that derived this rule.
    pub supported_by: Vec<SupportPair>,
}

impl Rule {
    /// A directly asserted rule: asserted, no support.
    pub fn asserted(lhs: Vec<Statement>, rhs: Statement) -> Self {
        Self {
            lhs,
            rhs,
            asserted: true,
            supported_by: Vec::new(),
        }
    }

    /// A derived (reduced) rule: unasserted, justified by one support pair.
    pub fn derived(lhs: Vec<Statement>, rhs: Statement, support: SupportPair) -> Self {
        Self {
            lhs,
            rhs,
            asserted: false,
            supported_by: vec![support],
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, antecedent) in self.lhs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{antecedent}")?;
        }
        write!(f, ") -> {}", self.rhs)
    }
}

/// A stored item: either a fact or a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    Fact(Fact),
    Rule(Rule),
}

impl Item {
    /// Whether the item is directly asserted.
    pub fn is_asserted(&self) -> bool {
        match self {
            Item::Fact(f) => f.asserted,
            Item::Rule(r) => r.asserted,
        }
    }

    /// Set or clear the directly-asserted flag.
    pub fn set_asserted(&mut self, asserted: bool) {
        match self {
            Item::Fact(f) => f.asserted = asserted,
            Item::Rule(r) => r.asserted = asserted,
        }
    }

    /// The item's support pairs.
    pub fn supported_by(&self) -> &[SupportPair] {
        match self {
            Item::Fact(f) => &f.supported_by,
            Item::Rule(r) => &r.supported_by,
        }
    }

    /// Mutable access to the item's support pairs.
    pub fn supported_by_mut(&mut self) -> &mut Vec<SupportPair> {
        match self {
            Item::Fact(f) => &mut f.supported_by,
            Item::Rule(r) => &mut r.supported_by,
        }
    }

    /// The fact inside, if this is a fact.
    pub fn as_fact(&self) -> Option<&Fact> {
        match self {
            Item::Fact(f) => Some(f),
            Item::Rule(_) => None,
        }
    }

    /// The rule inside, if this is a rule.
    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Item::Fact(_) => None,
            Item::Rule(r) => Some(r),
        }
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Item::Fact(fact) => write!(f, "fact: {fact}"),
            Item::Rule(rule) => write!(f, "rule: {rule}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// Content key for rule deduplication: a rule's identity is its lhs + rhs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RuleKey {
    lhs: Vec<Statement>,
    rhs: Statement,
}

/// Dense store of facts and rules with stable ids.
///
/// Maintains insertion order per kind (used for deterministic iteration
/// during chaining and queries) and content indexes for duplicate
/// detection. Removal keeps order lists and indexes consistent.
#[derive(Debug, Default)]
pub struct ItemArena {
    items: HashMap<ItemId, Item>,
    fact_order: Vec<ItemId>,
    rule_order: Vec<ItemId>,
    fact_index: HashMap<Statement, ItemId>,
    rule_index: HashMap<RuleKey, ItemId>,
    allocator: ItemIdAllocator,
}

impl ItemArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new item, allocating its id.
    ///
    /// The caller is responsible for having checked `lookup_fact` /
    /// `lookup_rule` first; duplicate contents would shadow each other in
    /// the content indexes.
    pub fn insert(&mut self, item: Item) -> Result<ItemId, KbError> {
        let id = self.allocator.next_id()?;
        match &item {
            Item::Fact(fact) => {
                self.fact_order.push(id);
                self.fact_index.insert(fact.statement.clone(), id);
            }
            Item::Rule(rule) => {
                self.rule_order.push(id);
                self.rule_index.insert(
                    RuleKey {
                        lhs: rule.lhs.clone(),
                        rhs: rule.rhs.clone(),
                    },
                    id,
                );
            }
        }
        self.items.insert(id, item);
        Ok(id)
    }

    /// Look up an item by id.
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(&id)
    }

    /// Find the stored fact equal to the given statement.
    pub fn lookup_fact(&self, statement: &Statement) -> Option<ItemId> {
        self.fact_index.get(statement).copied()
    }

    /// Find the stored rule equal to the given lhs and rhs.
    pub fn lookup_rule(&self, lhs: &[Statement], rhs: &Statement) -> Option<ItemId> {
        let key = RuleKey {
            lhs: lhs.to_vec(),
            rhs: rhs.clone(),
        };
        self.rule_index.get(&key).copied()
    }

    /// Remove an item, keeping order lists and indexes consistent.
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        let item = self.items.remove(&id)?;
        match &item {
            Item::Fact(fact) => {
                self.fact_order.retain(|&fid| fid != id);
                self.fact_index.remove(&fact.statement);
            }
            Item::Rule(rule) => {
                self.rule_order.retain(|&rid| rid != id);
                self.rule_index.remove(&RuleKey {
                    lhs: rule.lhs.clone(),
                    rhs: rule.rhs.clone(),
                });
            }
        }
        Some(item)
    }

    /// Fact ids in insertion order.
    pub fn fact_ids(&self) -> &[ItemId] {
        &self.fact_order
    }

    /// Rule ids in insertion order.
    pub fn rule_ids(&self) -> &[ItemId] {
        &self.rule_order
    }

    /// Number of stored facts.
    pub fn fact_count(&self) -> usize {
        self.fact_order.len()
    }

    /// Number of stored rules.
    pub fn rule_count(&self) -> usize {
        self.rule_order.len()
    }

    /// Whether the arena holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;

    fn stmt(pred: &str, args: &[&str]) -> Statement {
        Statement::new(
            pred,
            args.iter().map(|a| Term::constant(*a)).collect(),
        )
    }

    #[test]
    fn item_id_niche_optimization() {
        assert_eq!(
            std::mem::size_of::<Option<ItemId>>(),
            std::mem::size_of::<ItemId>()
        );
        assert!(ItemId::new(0).is_none());
    }

    #[test]
    fn allocator_produces_sequential_ids() {
        let alloc = ItemIdAllocator::new();
        assert_eq!(alloc.next_id().unwrap().get(), 1);
        assert_eq!(alloc.next_id().unwrap().get(), 2);
    }

    #[test]
    fn insert_and_lookup_fact() {
        let mut arena = ItemArena::new();
        let s = stmt("isa", &["tweety", "bird"]);
        let id = arena.insert(Item::Fact(Fact::asserted(s.clone()))).unwrap();

        assert_eq!(arena.lookup_fact(&s), Some(id));
        assert_eq!(arena.fact_ids(), &[id]);
        assert!(arena.get(id).unwrap().is_asserted());
    }

    #[test]
    fn insert_and_lookup_rule() {
        let mut arena = ItemArena::new();
        let lhs = vec![stmt("isa", &["tweety", "bird"])];
        let rhs = stmt("can", &["tweety", "fly"]);
        let id = arena
            .insert(Item::Rule(Rule::asserted(lhs.clone(), rhs.clone())))
            .unwrap();

        assert_eq!(arena.lookup_rule(&lhs, &rhs), Some(id));
        assert_eq!(arena.lookup_rule(&[], &rhs), None);
    }

    #[test]
    fn remove_keeps_order_and_index_consistent() {
        let mut arena = ItemArena::new();
        let a = stmt("p", &["a"]);
        let b = stmt("p", &["b"]);
        let id_a = arena.insert(Item::Fact(Fact::asserted(a.clone()))).unwrap();
        let id_b = arena.insert(Item::Fact(Fact::asserted(b.clone()))).unwrap();

        arena.remove(id_a);
        assert_eq!(arena.lookup_fact(&a), None);
        assert_eq!(arena.lookup_fact(&b), Some(id_b));
        assert_eq!(arena.fact_ids(), &[id_b]);
        assert_eq!(arena.fact_count(), 1);
    }

    #[test]
    fn fact_and_rule_display() {
        let fact = Fact::asserted(stmt("isa", &["tweety", "bird"]));
        assert_eq!(fact.to_string(), "(isa tweety bird)");

        let rule = Rule::asserted(
            vec![
                Statement::new("isa", vec![Term::variable("x"), Term::constant("bird")]),
                Statement::new("not_penguin", vec![Term::variable("x")]),
            ],
            Statement::new("can", vec![Term::variable("x"), Term::constant("fly")]),
        );
        assert_eq!(
            rule.to_string(),
            "((isa ?x bird), (not_penguin ?x)) -> (can ?x fly)"
        );
        assert_eq!(
            Item::Rule(rule).to_string(),
            "rule: ((isa ?x bird), (not_penguin ?x)) -> (can ?x fly)"
        );
    }

    #[test]
    fn support_pair_depends_on() {
        let f = ItemId::new(1).unwrap();
        let r = ItemId::new(2).unwrap();
        let pair = SupportPair::new(f, r);
        assert!(pair.depends_on(f));
        assert!(pair.depends_on(r));
        assert!(!pair.depends_on(ItemId::new(3).unwrap()));
    }
}
