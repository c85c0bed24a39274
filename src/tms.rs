//! Truth maintenance: the support index and retraction cascade.
//!
//! Every derived item records the `(fact, rule)` pairs that justify it, and
//! the [`SupportGraph`] keeps the reverse index from each premise to the
//! items it supports. Withdrawing a direct assertion then becomes a graph
//! walk: an item whose last justification disappears is removed, and the
//! removal cascades through the entire dependency graph. Items with
//! alternative justifications, and items that are themselves directly
//! asserted, survive the cascade.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::KbError;
use crate::item::{ItemArena, ItemId, SupportPair};

/// Result of a retraction cascade.
#[derive(Debug, Clone, Default)]
pub struct RetractionResult {
    /// Items removed from the knowledge base, in cascade (BFS) order; the
    /// retracted root comes first when it was removed.
    pub retracted: Vec<ItemId>,
    /// Items that lost at least one justification but survive, either on
    /// remaining support or because they are directly asserted.
    pub weakened: Vec<ItemId>,
    /// Maximum cascade depth reached.
    pub cascade_depth: usize,
}

/// Reverse dependency index over the support graph.
///
/// Maps each premise (a fact or rule appearing in some [`SupportPair`]) to
/// the set of items it helps justify. The forward direction — which pairs
/// justify an item — lives on the items themselves in the arena.
#[derive(Debug, Clone, Default)]
pub struct SupportGraph {
    dependents: HashMap<ItemId, HashSet<ItemId>>,
}

impl SupportGraph {
    /// Create an empty support graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `dependent` is justified by `pair`.
    ///
    /// Call once per pair appended to the dependent's `supported_by`.
    pub fn record(&mut self, dependent: ItemId, pair: SupportPair) {
        self.dependents.entry(pair.fact).or_default().insert(dependent);
        self.dependents.entry(pair.rule).or_default().insert(dependent);
    }

    /// Items directly justified (in part) by the given premise, in id order
    /// for deterministic cascades.
    pub fn direct_dependents(&self, premise: ItemId) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self
            .dependents
            .get(&premise)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Withdraw the direct assertion of `root` and cascade.
    ///
    /// - `root` absent from the arena: [`KbError::ItemNotFound`].
    /// - `root` present but not directly asserted: nothing to withdraw,
    ///   returns an empty result.
    /// - Otherwise the asserted flag is cleared. If support remains the item
    ///   survives as a derived item. If not, it is removed, and every item
    ///   listing it in a support pair drops that pair; a dependent left with
    ///   no support and no direct assertion is removed too, transitively.
    ///
    /// The walk is a BFS with an explicit visited set, so diamond-shaped
    /// support never processes an item twice and the traversal is bounded
    /// by the support-graph depth.
    pub fn retract(
        &mut self,
        arena: &mut ItemArena,
        root: ItemId,
    ) -> Result<RetractionResult, KbError> {
        let item = arena.get_mut(root).ok_or_else(|| KbError::ItemNotFound {
            item: root.to_string(),
        })?;

        if !item.is_asserted() {
            tracing::warn!(%root, "retract: item is not directly asserted, nothing to withdraw");
            return Ok(RetractionResult::default());
        }

        item.set_asserted(false);

        if !item.supported_by().is_empty() {
            // Still derivable from other premises; only the assertion goes.
            tracing::debug!(%root, "retract: assertion withdrawn, item survives on support");
            return Ok(RetractionResult {
                retracted: Vec::new(),
                weakened: vec![root],
                cascade_depth: 0,
            });
        }

        let mut result = RetractionResult::default();
        let mut queue: VecDeque<(ItemId, usize)> = VecDeque::new();
        let mut visited: HashSet<ItemId> = HashSet::new();
        queue.push_back((root, 0));
        visited.insert(root);

        while let Some((current, depth)) = queue.pop_front() {
            result.cascade_depth = result.cascade_depth.max(depth);
            self.remove_item(arena, current);
            result.retracted.push(current);

            for dependent in self.take_dependents(current) {
                let Some(dep_item) = arena.get_mut(dependent) else {
                    continue;
                };

                let dropped = drop_pairs_naming(dep_item.supported_by_mut(), current);
                if dropped.is_empty() {
                    continue;
                }

                let now_unsupported = dep_item.supported_by().is_empty();
                let dep_asserted = dep_item.is_asserted();

                // Premises that only appeared in the dropped pairs no longer
                // point at this dependent.
                self.prune_edges(arena, dependent, current, &dropped);

                if now_unsupported && !dep_asserted {
                    if visited.insert(dependent) {
                        // An earlier step may have marked this dependent as a
                        // survivor; losing its last justification supersedes
                        // that.
                        result.weakened.retain(|&id| id != dependent);
                        queue.push_back((dependent, depth + 1));
                    }
                } else if !result.weakened.contains(&dependent) {
                    result.weakened.push(dependent);
                }
            }
        }

        tracing::debug!(
            %root,
            retracted = result.retracted.len(),
            weakened = result.weakened.len(),
            depth = result.cascade_depth,
            "retraction cascade complete"
        );
        Ok(result)
    }

    /// Remove an item from the arena, clearing the edges its own support
    /// pairs contributed to the reverse index.
    fn remove_item(&mut self, arena: &mut ItemArena, id: ItemId) {
        let Some(item) = arena.remove(id) else {
            return;
        };
        for pair in item.supported_by() {
            if let Some(set) = self.dependents.get_mut(&pair.fact) {
                set.remove(&id);
            }
            if let Some(set) = self.dependents.get_mut(&pair.rule) {
                set.remove(&id);
            }
        }
    }

    /// Take the dependents of a removed premise, sorted for determinism.
    fn take_dependents(&mut self, premise: ItemId) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self
            .dependents
            .remove(&premise)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// After dropping pairs from `dependent`, remove reverse edges from
    /// premises that no longer justify it through any remaining pair.
    fn prune_edges(
        &mut self,
        arena: &ItemArena,
        dependent: ItemId,
        removed: ItemId,
        dropped: &[SupportPair],
    ) {
        let remaining: Vec<SupportPair> = arena
            .get(dependent)
            .map(|item| item.supported_by().to_vec())
            .unwrap_or_default();

        for pair in dropped {
            for premise in [pair.fact, pair.rule] {
                if premise == removed {
                    continue;
                }
                if !remaining.iter().any(|p| p.depends_on(premise)) {
                    if let Some(set) = self.dependents.get_mut(&premise) {
                        set.remove(&dependent);
                    }
                }
            }
        }
    }
}

/// Drop every pair naming `id`, returning the dropped pairs.
fn drop_pairs_naming(pairs: &mut Vec<SupportPair>, id: ItemId) -> Vec<SupportPair> {
    let mut dropped = Vec::new();
    pairs.retain(|pair| {
        if pair.depends_on(id) {
            dropped.push(*pair);
            false
        } else {
            true
        }
    });
    dropped
}
