//! Statement and term model: the atomic data the engine reasons over.
//!
//! A [`Statement`] is a predicate symbol applied to an ordered sequence of
//! [`Term`]s, where each term is either a constant or a logic variable.
//! Equality is structural everywhere — two statements are equal iff their
//! predicates and every term match exactly; no unification is implied.

use serde::{Deserialize, Serialize};

/// A single argument position in a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// A ground symbol, e.g. `tweety`.
    Constant(String),
    /// A logic variable, e.g. `?x` (stored without the `?` sigil).
    Variable(String),
}

impl Term {
    /// Construct a constant term.
    pub fn constant(name: impl Into<String>) -> Self {
        Term::Constant(name.into())
    }

    /// Construct a variable term. A leading `?` sigil is stripped so that
    /// `Term::variable("?x")` and `Term::variable("x")` are the same term.
    pub fn variable(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.strip_prefix('?') {
            Some(stripped) => Term::Variable(stripped.to_owned()),
            None => Term::Variable(name),
        }
    }

    /// Whether this term is a variable.
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Constant(name) => write!(f, "{name}"),
            Term::Variable(name) => write!(f, "?{name}"),
        }
    }
}

/// A predicate applied to ordered terms, e.g. `(isa tweety bird)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    /// The predicate symbol.
    pub predicate: String,
    /// The ordered argument terms.
    pub terms: Vec<Term>,
}

impl Statement {
    /// Construct a statement from a predicate and terms.
    pub fn new(predicate: impl Into<String>, terms: Vec<Term>) -> Self {
        Self {
            predicate: predicate.into(),
            terms,
        }
    }

    /// Whether every term is a constant.
    pub fn is_ground(&self) -> bool {
        self.terms.iter().all(|t| !t.is_variable())
    }

    /// The variable names occurring in this statement, in order of first
    /// appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for term in &self.terms {
            if let Term::Variable(name) = term {
                if !seen.contains(&name.as_str()) {
                    seen.push(name.as_str());
                }
            }
        }
        seen
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.predicate)?;
        for term in &self.terms {
            write!(f, " {term}")?;
        }
        write!(f, ")")
    }
}
