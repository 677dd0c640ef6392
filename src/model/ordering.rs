//! Total apply order and display numbering for proposals.
//!
//! The engine orders proposals by `(created_at_ms, id)` — draft time
//! ascending, ties broken by proposal id (lexicographic). The secondary key
//! is explicit so the order is total: equal timestamps never fall back to
//! input order, which would leak nondeterminism into the fold.
//!
//! # Ordering semantics
//!
//! `created_at_ms` is the authoritative primary key. The id tie-break only
//! matters for proposals drafted in the same millisecond, but it guarantees
//! the same fold result on every run and every host.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::proposal::{ChangeProposal, ReviewProposal};
use crate::model::types::ProposalId;

// ---------------------------------------------------------------------------
// Apply order
// ---------------------------------------------------------------------------

/// The composite apply-order key for a proposal.
#[must_use]
pub fn order_key(proposal: &ChangeProposal) -> (u64, &ProposalId) {
    (proposal.created_at_ms, &proposal.id)
}

/// Compare two proposals in apply order: `created_at_ms` ascending, ties
/// broken by id.
#[must_use]
pub fn cmp_apply_order(a: &ChangeProposal, b: &ChangeProposal) -> Ordering {
    a.created_at_ms
        .cmp(&b.created_at_ms)
        .then_with(|| a.id.cmp(&b.id))
}

/// Collect proposals into a view sorted by apply order.
///
/// The result is invariant to the input iteration order.
#[must_use]
pub fn sorted_for_apply<'a, I>(proposals: I) -> Vec<&'a ChangeProposal>
where
    I: IntoIterator<Item = &'a ChangeProposal>,
{
    let mut sorted: Vec<&ChangeProposal> = proposals.into_iter().collect();
    sorted.sort_by(|a, b| cmp_apply_order(a, b));
    sorted
}

// ---------------------------------------------------------------------------
// Display numbering
// ---------------------------------------------------------------------------

/// Assign 1-based display numbers to proposals in apply order.
///
/// Numbers are stable for a given proposal set: adding or removing a proposal
/// renumbers, but reordering the input does not. Every proposal in the input
/// gets exactly one number in `1..=n`.
#[must_use]
pub fn compute_proposal_numbers(proposals: &[ReviewProposal]) -> BTreeMap<ProposalId, u32> {
    let sorted = sorted_for_apply(proposals.iter().map(|rp| &rp.proposal));
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let n = u32::try_from(i + 1).unwrap_or(u32::MAX);
            (p.id.clone(), n)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::proposal::{ItemFields, ProposalOp, ProposalStatus};
    use crate::model::types::{ArtefactId, ArtefactVersion, UserId};

    fn pid(s: &str) -> ProposalId {
        ProposalId::new(s).unwrap()
    }

    fn proposal(id: &str, created_at_ms: u64) -> ChangeProposal {
        ChangeProposal {
            id: pid(id),
            artefact_id: ArtefactId::new("std-1").unwrap(),
            artefact_version: ArtefactVersion::new(1),
            op: ProposalOp::CollectionAdd {
                item: ItemFields::new(),
            },
            status: ProposalStatus::Pending,
            created_by: UserId::new("user-1").unwrap(),
            created_at_ms,
            resolved_by: None,
            resolved_at_ms: None,
        }
    }

    fn review(id: &str, created_at_ms: u64) -> ReviewProposal {
        ReviewProposal::unconflicted(proposal(id, created_at_ms))
    }

    // -----------------------------------------------------------------------
    // Apply order
    // -----------------------------------------------------------------------

    #[test]
    fn orders_by_timestamp() {
        let a = proposal("cp-z", 100);
        let b = proposal("cp-a", 200);
        assert_eq!(cmp_apply_order(&a, &b), Ordering::Less);
    }

    #[test]
    fn ties_broken_by_id() {
        let a = proposal("cp-a", 100);
        let b = proposal("cp-b", 100);
        assert_eq!(cmp_apply_order(&a, &b), Ordering::Less);
        assert_eq!(cmp_apply_order(&b, &a), Ordering::Greater);
    }

    #[test]
    fn order_key_exposes_composite() {
        let p = proposal("cp-1", 42);
        let (ts, id) = order_key(&p);
        assert_eq!(ts, 42);
        assert_eq!(id, &pid("cp-1"));
    }

    #[test]
    fn sorted_for_apply_invariant_to_input_order() {
        let p1 = proposal("cp-1", 300);
        let p2 = proposal("cp-2", 100);
        let p3 = proposal("cp-3", 200);

        let forward = sorted_for_apply([&p1, &p2, &p3]);
        let backward = sorted_for_apply([&p3, &p2, &p1]);

        let ids =
            |v: &[&ChangeProposal]| v.iter().map(|p| p.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&forward), vec![pid("cp-2"), pid("cp-3"), pid("cp-1")]);
        assert_eq!(ids(&forward), ids(&backward));
    }

    #[test]
    fn ordering_is_total_with_equal_timestamps() {
        let a = proposal("cp-a", 50);
        let b = proposal("cp-b", 50);
        let c = proposal("cp-c", 50);
        assert_eq!(cmp_apply_order(&a, &b), Ordering::Less);
        assert_eq!(cmp_apply_order(&b, &c), Ordering::Less);
        assert_eq!(cmp_apply_order(&a, &c), Ordering::Less);
    }

    // -----------------------------------------------------------------------
    // Display numbering
    // -----------------------------------------------------------------------

    #[test]
    fn numbering_follows_apply_order() {
        let proposals = vec![review("cp-late", 900), review("cp-early", 100)];
        let numbers = compute_proposal_numbers(&proposals);
        assert_eq!(numbers[&pid("cp-early")], 1);
        assert_eq!(numbers[&pid("cp-late")], 2);
    }

    #[test]
    fn numbering_tie_break_by_id() {
        let proposals = vec![review("cp-b", 100), review("cp-a", 100)];
        let numbers = compute_proposal_numbers(&proposals);
        assert_eq!(numbers[&pid("cp-a")], 1);
        assert_eq!(numbers[&pid("cp-b")], 2);
    }

    #[test]
    fn numbering_is_bijection() {
        let proposals = vec![
            review("cp-1", 300),
            review("cp-2", 100),
            review("cp-3", 200),
            review("cp-4", 100),
        ];
        let numbers = compute_proposal_numbers(&proposals);
        assert_eq!(numbers.len(), proposals.len());
        let mut assigned: Vec<u32> = numbers.values().copied().collect();
        assigned.sort_unstable();
        assert_eq!(assigned, vec![1, 2, 3, 4]);
    }

    #[test]
    fn numbering_empty_input() {
        let numbers = compute_proposal_numbers(&[]);
        assert!(numbers.is_empty());
    }

    #[test]
    fn numbering_invariant_to_input_order() {
        let mut proposals = vec![
            review("cp-1", 300),
            review("cp-2", 100),
            review("cp-3", 200),
        ];
        let forward = compute_proposal_numbers(&proposals);
        proposals.reverse();
        let backward = compute_proposal_numbers(&proposals);
        assert_eq!(forward, backward);
    }
}
