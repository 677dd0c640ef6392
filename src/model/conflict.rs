//! Blocking relation derived from the conflict graph and the accepted set.
//!
//! Conflicts are symmetric and precomputed upstream; the engine never infers
//! them from content. A conflict only has teeth once one side is accepted:
//! the other side becomes blocked until the acceptance is undone or
//! committed. Two pending proposals that conflict are both still acceptable
//! (first one in wins).
//!
//! The relation is cheap and pure, so callers recompute it eagerly on every
//! accepted-set change instead of maintaining incremental state.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::proposal::ReviewProposal;
use crate::model::types::ProposalId;

/// The accepted conflict neighbors blocking a single proposal.
///
/// Sorted; empty when the proposal is free to accept.
#[must_use]
pub fn blockers_for(
    proposal: &ReviewProposal,
    accepted: &BTreeSet<ProposalId>,
) -> Vec<ProposalId> {
    proposal
        .conflicts_with
        .iter()
        .filter(|id| accepted.contains(*id))
        .cloned()
        .collect()
}

/// Compute the full blocking map for a proposal set.
///
/// For each proposal, the sorted list of *accepted* proposals it conflicts
/// with. Only non-empty entries are present, so `map.contains_key(id)` is
/// the blocked predicate. Proposals that are themselves accepted are never
/// reported as blocked.
#[must_use]
pub fn blocked_by_accepted(
    proposals: &[ReviewProposal],
    accepted: &BTreeSet<ProposalId>,
) -> BTreeMap<ProposalId, Vec<ProposalId>> {
    let mut blocked = BTreeMap::new();
    for rp in proposals {
        if accepted.contains(rp.id()) {
            continue;
        }
        let blockers = blockers_for(rp, accepted);
        if !blockers.is_empty() {
            blocked.insert(rp.id().clone(), blockers);
        }
    }
    blocked
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
