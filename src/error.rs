//! Rich diagnostic error types for the rekh engine.
//!
//! Errors carry miette `#[diagnostic]` derives with error codes and help
//! text, so callers see exactly what went wrong and how to fix it. The
//! invariant-violation variants should never surface in a healthy knowledge
//! base: they indicate the truth-maintenance bookkeeping was corrupted
//! upstream, not a recoverable runtime condition.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the rekh engine.
#[derive(Debug, Error, Diagnostic)]
pub enum RekhError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Kb(#[from] KbError),
}

// ---------------------------------------------------------------------------
// Knowledge-base errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum KbError {
    #[error("item not found in the knowledge base: {item}")]
    #[diagnostic(
        code(rekh::kb::not_found),
        help(
            "No fact or rule with this identity is stored. It may have been \
             removed by a retraction cascade, or it was never asserted. \
             Check `get_fact`/`get_rule` before explaining or retracting."
        )
    )]
    ItemNotFound { item: String },

    #[error("invalid query: {reason}")]
    #[diagnostic(
        code(rekh::kb::invalid_query),
        help(
            "An `ask` query must be a fact-shaped statement: a non-empty \
             predicate applied to at least one term."
        )
    )]
    InvalidQuery { reason: String },

    #[error("support cycle detected at item {item_id}")]
    #[diagnostic(
        code(rekh::kb::support_cycle),
        help(
            "A fact or rule transitively supports itself, which the support \
             graph must never allow. This indicates the truth-maintenance \
             invariants were broken upstream — file a bug report."
        )
    )]
    SupportCycle { item_id: u64 },

    #[error("item {item_id} is neither asserted nor supported")]
    #[diagnostic(
        code(rekh::kb::unsupported_unasserted),
        help(
            "A stored item must either be directly asserted or carry at \
             least one support pair. Finding one with neither means the \
             retraction cascade missed it — file a bug report."
        )
    )]
    UnsupportedUnasserted { item_id: u64 },

    #[error("item identifier space exhausted")]
    #[diagnostic(
        code(rekh::kb::id_exhausted),
        help(
            "The item ID allocator ran out after 2^64 - 1 allocations. This \
             is practically unreachable — if you see it, check for an \
             allocation loop."
        )
    )]
    IdSpaceExhausted,
}

/// Convenience alias for functions returning rekh results.
pub type RekhResult<T> = std::result::Result<T, RekhError>;
