//! Knowledge base facade: assert, ask, retract, explain.
//!
//! The `KnowledgeBase` owns the item arena and the support graph, and is the
//! only place items are mutated. Asserting an item runs forward chaining
//! against every stored item of the opposite kind, recursively, so every
//! consequence of one external assertion is materialized before the call
//! returns; no partial derivation state is ever observable. All operations
//! are synchronous and single-threaded (`&mut self` on every mutation).

use crate::bind::Answers;
use crate::error::KbError;
use crate::explain;
use crate::export::{FactExport, KbExport, RuleExport};
use crate::infer::fc_infer;
use crate::item::{Fact, Item, ItemArena, ItemId, Rule, SupportPair};
use crate::term::Statement;
use crate::tms::{RetractionResult, SupportGraph};
use crate::unify::match_statement;

/// Configuration for a knowledge base.
///
/// Replaces the process-wide verbosity switch of ancestral rule engines with
/// an explicit per-instance value.
#[derive(Debug, Clone, Default)]
pub struct KbConfig {
    /// Emit a `tracing` event for every fact/rule pairing the chainer
    /// attempts, not just for successful derivations.
    pub trace_inference: bool,
}

/// An in-memory, forward-chaining knowledge base with truth maintenance.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    config: KbConfig,
    arena: ItemArena,
    supports: SupportGraph,
}

impl KnowledgeBase {
    /// Create an empty knowledge base.
    pub fn new(config: KbConfig) -> Self {
        Self {
            config,
            arena: ItemArena::new(),
            supports: SupportGraph::new(),
        }
    }

    /// Assert a fact directly.
    ///
    /// All forward-chaining consequences are derived before this returns.
    /// Asserting an already-known fact flips it to directly asserted
    /// instead of storing a duplicate.
    pub fn assert_fact(&mut self, statement: Statement) -> Result<ItemId, KbError> {
        tracing::debug!(%statement, "asserting fact");
        self.add_item(Item::Fact(Fact::asserted(statement)))
    }

    /// Assert a rule directly. Same duplicate and chaining behavior as
    /// [`assert_fact`](Self::assert_fact).
    pub fn assert_rule(&mut self, lhs: Vec<Statement>, rhs: Statement) -> Result<ItemId, KbError> {
        let rule = Rule::asserted(lhs, rhs);
        tracing::debug!(rule = %rule, "asserting rule");
        self.add_item(Item::Rule(rule))
    }

    /// Query the knowledge base.
    ///
    /// The query statement may contain variables; every stored fact it
    /// matches contributes one answer, in the facts' storage order. A
    /// malformed query (empty predicate or no arguments) is diagnosed via
    /// `tracing` and yields an empty result rather than an error.
    pub fn ask(&self, query: &Statement) -> Answers {
        if query.predicate.is_empty() || query.terms.is_empty() {
            let diagnostic = KbError::InvalidQuery {
                reason: format!("not a fact-shaped statement: {query}"),
            };
            tracing::warn!(%diagnostic, "rejecting ask");
            return Answers::new();
        }

        let mut answers = Answers::new();
        for &fact_id in self.arena.fact_ids() {
            if let Some(Item::Fact(fact)) = self.arena.get(fact_id) {
                if let Some(bindings) = match_statement(query, &fact.statement) {
                    answers.push(bindings, vec![fact_id]);
                }
            }
        }
        answers
    }

    /// Withdraw a direct assertion by item id, cascading removals through
    /// the support graph. See [`SupportGraph::retract`] for the exact
    /// semantics.
    pub fn retract(&mut self, id: ItemId) -> Result<RetractionResult, KbError> {
        tracing::debug!(%id, "retracting");
        self.supports.retract(&mut self.arena, id)
    }

    /// Withdraw the direct assertion of the fact equal to `statement`.
    pub fn retract_fact(&mut self, statement: &Statement) -> Result<RetractionResult, KbError> {
        let id = self
            .arena
            .lookup_fact(statement)
            .ok_or_else(|| KbError::ItemNotFound {
                item: statement.to_string(),
            })?;
        self.retract(id)
    }

    /// Withdraw the direct assertion of the rule equal to `lhs -> rhs`.
    pub fn retract_rule(
        &mut self,
        lhs: &[Statement],
        rhs: &Statement,
    ) -> Result<RetractionResult, KbError> {
        let id = self
            .arena
            .lookup_rule(lhs, rhs)
            .ok_or_else(|| KbError::ItemNotFound {
                item: format!("rule with consequent {rhs}"),
            })?;
        self.retract(id)
    }

    /// Render the proof tree for a stored item.
    pub fn explain(&self, id: ItemId) -> Result<String, KbError> {
        explain::explain(&self.arena, id)
    }

    /// Render the proof tree for the fact equal to `statement`.
    pub fn explain_fact(&self, statement: &Statement) -> Result<String, KbError> {
        let id = self
            .arena
            .lookup_fact(statement)
            .ok_or_else(|| KbError::ItemNotFound {
                item: statement.to_string(),
            })?;
        self.explain(id)
    }

    /// Render the proof tree for the rule equal to `lhs -> rhs`.
    pub fn explain_rule(&self, lhs: &[Statement], rhs: &Statement) -> Result<String, KbError> {
        let id = self
            .arena
            .lookup_rule(lhs, rhs)
            .ok_or_else(|| KbError::ItemNotFound {
                item: format!("rule with consequent {rhs}"),
            })?;
        self.explain(id)
    }

    // -- lookups and accessors ---------------------------------------------

    /// The id of the stored fact equal to `statement`, if any.
    pub fn get_fact(&self, statement: &Statement) -> Option<ItemId> {
        self.arena.lookup_fact(statement)
    }

    /// The id of the stored rule equal to `lhs -> rhs`, if any.
    pub fn get_rule(&self, lhs: &[Statement], rhs: &Statement) -> Option<ItemId> {
        self.arena.lookup_rule(lhs, rhs)
    }

    /// Whether a fact equal to `statement` is stored (asserted or derived).
    pub fn contains_fact(&self, statement: &Statement) -> bool {
        self.arena.lookup_fact(statement).is_some()
    }

    /// The stored item behind an id.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.arena.get(id)
    }

    /// The stored fact behind an id, if the id names a fact.
    pub fn fact(&self, id: ItemId) -> Option<&Fact> {
        self.arena.get(id).and_then(Item::as_fact)
    }

    /// The stored rule behind an id, if the id names a rule.
    pub fn rule(&self, id: ItemId) -> Option<&Rule> {
        self.arena.get(id).and_then(Item::as_rule)
    }

    /// Stored facts in insertion order.
    pub fn facts(&self) -> impl Iterator<Item = (ItemId, &Fact)> {
        self.arena
            .fact_ids()
            .iter()
            .filter_map(|&id| self.fact(id).map(|f| (id, f)))
    }

    /// Stored rules in insertion order.
    pub fn rules(&self) -> impl Iterator<Item = (ItemId, &Rule)> {
        self.arena
            .rule_ids()
            .iter()
            .filter_map(|&id| self.rule(id).map(|r| (id, r)))
    }

    /// Items whose justification directly involves the given item, in id
    /// order. These are the candidates a retraction of `id` would revisit.
    pub fn dependents_of(&self, id: ItemId) -> Vec<ItemId> {
        self.supports.direct_dependents(id)
    }

    /// Number of stored facts.
    pub fn fact_count(&self) -> usize {
        self.arena.fact_count()
    }

    /// Number of stored rules.
    pub fn rule_count(&self) -> usize {
        self.arena.rule_count()
    }

    /// The configuration this knowledge base was created with.
    pub fn config(&self) -> &KbConfig {
        &self.config
    }

    /// Snapshot the knowledge base into serde-friendly export types.
    pub fn export(&self) -> KbExport {
        KbExport {
            facts: self
                .facts()
                .map(|(id, fact)| FactExport::new(id, fact))
                .collect(),
            rules: self
                .rules()
                .map(|(id, rule)| RuleExport::new(id, rule))
                .collect(),
        }
    }

    // -- assertion internals -----------------------------------------------

    /// Insert or merge an item, then chain. This is the single entry point
    /// both external assertions and recursive derivations go through.
    fn add_item(&mut self, item: Item) -> Result<ItemId, KbError> {
        let existing = match &item {
            Item::Fact(fact) => self.arena.lookup_fact(&fact.statement),
            Item::Rule(rule) => self.arena.lookup_rule(&rule.lhs, &rule.rhs),
        };

        if let Some(id) = existing {
            self.merge_into_existing(id, item);
            return Ok(id);
        }

        let id = self.arena.insert(item)?;
        let pairs: Vec<SupportPair> = self
            .arena
            .get(id)
            .map(|item| item.supported_by().to_vec())
            .unwrap_or_default();
        for pair in pairs {
            self.supports.record(id, pair);
        }

        self.chain_from(id)?;
        Ok(id)
    }

    /// Merge a duplicate into the stored original: new support entries are
    /// appended (a new justification for a known conclusion); a
    /// support-free duplicate is a re-assertion and flips the asserted
    /// flag. Nothing is overwritten and no second copy is stored.
    fn merge_into_existing(&mut self, id: ItemId, incoming: Item) {
        let incoming_pairs = incoming.supported_by().to_vec();

        if incoming_pairs.is_empty() {
            if let Some(existing) = self.arena.get_mut(id) {
                existing.set_asserted(true);
                tracing::debug!(%id, "existing item re-asserted");
            }
            return;
        }

        for pair in incoming_pairs {
            if pair.depends_on(id)
                || self.supports_transitively(pair.fact, id)
                || self.supports_transitively(pair.rule, id)
            {
                // An item supporting itself, directly or through a chain,
                // would put a cycle in the support graph.
                tracing::warn!(%id, "skipping self-referential justification");
                continue;
            }
            let Some(existing) = self.arena.get_mut(id) else {
                return;
            };
            if existing.supported_by().contains(&pair) {
                continue;
            }
            existing.supported_by_mut().push(pair);
            self.supports.record(id, pair);
            tracing::debug!(%id, "merged new justification into existing item");
        }
    }

    /// Whether `target` appears anywhere in the support closure of `start`,
    /// i.e. `target` (transitively) helps justify `start`.
    fn supports_transitively(&self, start: ItemId, target: ItemId) -> bool {
        let mut stack = vec![start];
        let mut visited = std::collections::HashSet::new();
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(item) = self.arena.get(current) {
                for pair in item.supported_by() {
                    stack.push(pair.fact);
                    stack.push(pair.rule);
                }
            }
        }
        false
    }

    /// Pair a newly stored item against every existing item of the opposite
    /// kind, in insertion order, feeding each derivation back through
    /// [`add_item`](Self::add_item).
    fn chain_from(&mut self, id: ItemId) -> Result<(), KbError> {
        match self.arena.get(id) {
            Some(Item::Fact(_)) => {
                let rule_ids = self.arena.rule_ids().to_vec();
                for rule_id in rule_ids {
                    self.try_pair(id, rule_id)?;
                }
            }
            Some(Item::Rule(_)) => {
                let fact_ids = self.arena.fact_ids().to_vec();
                for fact_id in fact_ids {
                    self.try_pair(fact_id, id)?;
                }
            }
            None => {}
        }
        Ok(())
    }

    /// Run one forward-chaining step for a specific fact/rule pair.
    fn try_pair(&mut self, fact_id: ItemId, rule_id: ItemId) -> Result<(), KbError> {
        let (Some(Item::Fact(fact)), Some(Item::Rule(rule))) =
            (self.arena.get(fact_id), self.arena.get(rule_id))
        else {
            return Ok(());
        };

        if self.config.trace_inference {
            tracing::trace!(
                fact = %fact.statement,
                rule = %rule,
                "attempting forward-chaining step"
            );
        }

        if let Some(derived) = fc_infer(fact_id, fact, rule_id, rule) {
            self.add_item(derived)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Knowledge Base:")?;
        for (_, fact) in self.facts() {
            writeln!(f, "{fact}")?;
        }
        for (_, rule) in self.rules() {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}
