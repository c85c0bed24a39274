//! Export types for serializing knowledge-base state.
//!
//! Human-readable, text-resolved snapshots of facts, rules, and their
//! support links, suitable for JSON export.

use serde::{Deserialize, Serialize};

use crate::item::{Fact, ItemId, Rule, SupportPair};

/// A support pair with raw item ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportRef {
    /// Id of the triggering fact.
    pub fact: u64,
    /// Id of the triggering rule.
    pub rule: u64,
}

impl From<&SupportPair> for SupportRef {
    fn from(pair: &SupportPair) -> Self {
        Self {
            fact: pair.fact.get(),
            rule: pair.rule.get(),
        }
    }
}

/// Exported fact with its rendered statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactExport {
    /// Item id.
    pub id: u64,
    /// Rendered statement, e.g. `(isa tweety bird)`.
    pub statement: String,
    /// Whether the fact is directly asserted.
    pub asserted: bool,
    /// Justifications, as id pairs.
    pub supported_by: Vec<SupportRef>,
}

impl FactExport {
    /// Snapshot a stored fact.
    pub fn new(id: ItemId, fact: &Fact) -> Self {
        Self {
            id: id.get(),
            statement: fact.statement.to_string(),
            asserted: fact.asserted,
            supported_by: fact.supported_by.iter().map(SupportRef::from).collect(),
        }
    }
}

/// Exported rule with rendered antecedents and consequent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleExport {
    /// Item id.
    pub id: u64,
    /// Rendered antecedents, left to right.
    pub lhs: Vec<String>,
    /// Rendered consequent.
    pub rhs: String,
    /// Whether the rule is directly asserted.
    pub asserted: bool,
    /// Justifications, as id pairs.
    pub supported_by: Vec<SupportRef>,
}

impl RuleExport {
    /// Snapshot a stored rule.
    pub fn new(id: ItemId, rule: &Rule) -> Self {
        Self {
            id: id.get(),
            lhs: rule.lhs.iter().map(|s| s.to_string()).collect(),
            rhs: rule.rhs.to_string(),
            asserted: rule.asserted,
            supported_by: rule.supported_by.iter().map(SupportRef::from).collect(),
        }
    }
}

/// Full knowledge-base snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbExport {
    /// Facts in storage order.
    pub facts: Vec<FactExport>,
    /// Rules in storage order.
    pub rules: Vec<RuleExport>,
}
