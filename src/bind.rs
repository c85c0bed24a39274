//! Substitutions and query answers.
//!
//! A [`Bindings`] is a finite substitution mapping variable names to terms.
//! It is produced transiently by matching and applied when instantiating a
//! rule's consequent or remaining antecedents — it is never persisted on a
//! fact or rule. Insertion order is preserved so that display and iteration
//! are deterministic.

use serde::{Deserialize, Serialize};

use crate::item::ItemId;
use crate::term::{Statement, Term};

/// A finite substitution from variable names to terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bindings {
    // Kept as an ordered list: substitutions are small (one entry per
    // distinct variable in a statement) and iteration order matters for
    // deterministic output.
    pairs: Vec<(String, Term)>,
}

impl Bindings {
    /// Create an empty substitution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the term bound to a variable name.
    pub fn bound(&self, variable: &str) -> Option<&Term> {
        self.pairs
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, term)| term)
    }

    /// Bind a variable to a term. Overwriting an existing binding is a
    /// caller error; matching checks consistency before calling this.
    pub fn add(&mut self, variable: impl Into<String>, term: Term) {
        self.pairs.push((variable.into(), term));
    }

    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no variables are bound.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over `(variable, term)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.pairs.iter().map(|(name, term)| (name.as_str(), term))
    }

    /// Resolve a single term through this substitution.
    ///
    /// Bound variables are replaced by their bindings (followed through
    /// variable-to-variable links); unbound variables and constants pass
    /// through unchanged.
    pub fn resolve(&self, term: &Term) -> Term {
        let mut current = term.clone();
        // Chase variable-to-variable links. Substitutions are acyclic by
        // construction (a variable is bound at most once), so this halts.
        while let Term::Variable(name) = &current {
            match self.bound(name) {
                Some(next) if next != &current => current = next.clone(),
                _ => break,
            }
        }
        current
    }

    /// Apply this substitution to every term of a statement.
    pub fn apply(&self, statement: &Statement) -> Statement {
        Statement::new(
            statement.predicate.clone(),
            statement.terms.iter().map(|t| self.resolve(t)).collect(),
        )
    }

    /// Compose two substitutions: apply `other` to every bound term of
    /// `self`, then append bindings of `other` for variables `self` leaves
    /// free. `compose` then `apply` is equivalent to applying `self` first
    /// and `other` second.
    pub fn compose(&self, other: &Bindings) -> Bindings {
        let mut out = Bindings::new();
        for (name, term) in &self.pairs {
            out.add(name.clone(), other.resolve(term));
        }
        for (name, term) in &other.pairs {
            if out.bound(name).is_none() {
                out.add(name.clone(), term.clone());
            }
        }
        out
    }
}

impl std::fmt::Display for Bindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (name, term)) in self.pairs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "?{name} -> {term}")?;
        }
        write!(f, "}}")
    }
}

// ---------------------------------------------------------------------------
// Query answers
// ---------------------------------------------------------------------------

/// One successful match of a query against a stored fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// The substitution making the query equal to the matched fact.
    pub bindings: Bindings,
    /// The facts supporting this answer (the matched fact).
    pub facts: Vec<ItemId>,
}

/// Result of a query: every `(bindings, matched facts)` pair, in the facts'
/// storage order. Empty when nothing matched or the query was invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answers {
    entries: Vec<Answer>,
}

impl Answers {
    /// Create an empty answer list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one answer.
    pub fn push(&mut self, bindings: Bindings, facts: Vec<ItemId>) {
        self.entries.push(Answer { bindings, facts });
    }

    /// Number of answers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no answers were found.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over answers in match order.
    pub fn iter(&self) -> std::slice::Iter<'_, Answer> {
        self.entries.iter()
    }

    /// Access answers as a slice.
    pub fn as_slice(&self) -> &[Answer] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a Answers {
    type Item = &'a Answer;
    type IntoIter = std::slice::Iter<'a, Answer>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
