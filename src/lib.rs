//! # rekh
//!
//! A forward-chaining, rule-based inference engine over a knowledge base of
//! typed statements and implication rules, with a truth-maintenance layer
//! that tracks *why* each derived item exists so it can be retracted and
//! explained later.
//!
//! ## Architecture
//!
//! - **Statement model** (`term`, `bind`): predicates over constants and
//!   logic variables; substitutions and query answers
//! - **Matching** (`unify`): one-directional statement unification, the
//!   primitive the chainer consumes
//! - **Storage** (`item`): arena of facts and rules with stable ids;
//!   support references are ids, never direct references
//! - **Chaining** (`infer`, `kb`): one fact + one rule derives a new fact
//!   or a reduced rule, fed back recursively until closure
//! - **Truth maintenance** (`tms`): reverse dependency index and the
//!   retraction cascade
//! - **Proofs** (`explain`): hierarchical `SUPPORTED BY` renderings over
//!   the support graph
//!
//! ## Library usage
//!
//! ```
//! use rekh::kb::KnowledgeBase;
//! use rekh::term::{Statement, Term};
//!
//! let mut kb = KnowledgeBase::default();
//! kb.assert_rule(
//!     vec![Statement::new("isa", vec![Term::variable("x"), Term::constant("bird")])],
//!     Statement::new("can", vec![Term::variable("x"), Term::constant("fly")]),
//! ).unwrap();
//! kb.assert_fact(Statement::new(
//!     "isa",
//!     vec![Term::constant("tweety"), Term::constant("bird")],
//! )).unwrap();
//!
//! let query = Statement::new("can", vec![Term::constant("tweety"), Term::variable("what")]);
//! let answers = kb.ask(&query);
//! assert_eq!(answers.len(), 1);
//! ```

pub mod bind;
pub mod error;
pub mod explain;
pub mod export;
pub mod infer;
pub mod item;
pub mod kb;
pub mod term;
pub mod tms;
pub mod unify;
