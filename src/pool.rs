//! The decision pool — staged accept/reject state over one artifact.
//!
//! A pool holds the proposal list for a single artifact and accumulates
//! reviewer decisions until they are committed in one batch. Decisions are
//! staged, not authoritative: nothing outside the pool changes until
//! [`DecisionPool::commit`] hands the batch to a [`CommitService`].
//!
//! Invariant: the accepted and rejected sets are disjoint. Every mutation
//! that inserts into one set removes the id from the other, so the
//! invariant holds structurally rather than by audit.
//!
//! Blocking and staleness are enforced here, not just reported: `accept`
//! refuses ids that conflict with the current accepted set or were drafted
//! against an older artifact version. Refusals are typed outcomes, never
//! errors; errors are reserved for the commit boundary.

use std::collections::{BTreeMap, BTreeSet};

use crate::commit::{CommitReceipt, CommitRequest, CommitService};
use crate::error::ReviewError;
use crate::model::conflict::{blocked_by_accepted, blockers_for};
use crate::model::ordering::compute_proposal_numbers;
use crate::model::proposal::ReviewProposal;
use crate::model::types::{ArtefactId, ArtefactVersion, ProposalId};

// ---------------------------------------------------------------------------
// AcceptOutcome
// ---------------------------------------------------------------------------

/// The result of an accept attempt.
///
/// Refusals carry enough context to explain themselves to a reviewer; none
/// of them mutate the pool.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum AcceptOutcome {
    /// The proposal is now staged as accepted.
    Accepted,
    /// Refused: the proposal conflicts with these already-accepted ids.
    Blocked(Vec<ProposalId>),
    /// Refused: the proposal was drafted against an older artifact version.
    Outdated,
    /// The id is not in this pool.
    NotFound,
}

// ---------------------------------------------------------------------------
// DecisionPool
// ---------------------------------------------------------------------------

/// Staged review decisions over one artifact's proposal list.
#[derive(Clone, Debug)]
pub struct DecisionPool {
    artefact_id: ArtefactId,
    current_version: ArtefactVersion,
    proposals: Vec<ReviewProposal>,
    accepted: BTreeSet<ProposalId>,
    rejected: BTreeSet<ProposalId>,
}

impl DecisionPool {
    /// Create a pool for `artefact_id` at `current_version`.
    ///
    /// Every proposal must target this artifact and still be pending;
    /// resolved proposals belong to history, not to a review session.
    pub fn new(
        artefact_id: ArtefactId,
        current_version: ArtefactVersion,
        proposals: Vec<ReviewProposal>,
    ) -> Result<Self, ReviewError> {
        let mut pool = Self {
            artefact_id,
            current_version,
            proposals: Vec::with_capacity(proposals.len()),
            accepted: BTreeSet::new(),
            rejected: BTreeSet::new(),
        };
        for rp in proposals {
            pool.add_proposal(rp)?;
        }
        Ok(pool)
    }

    /// Add one more proposal to the pool (new proposals can arrive while a
    /// review session is open).
    pub fn add_proposal(&mut self, rp: ReviewProposal) -> Result<(), ReviewError> {
        if rp.proposal.artefact_id != self.artefact_id {
            return Err(ReviewError::ArtefactMismatch {
                expected: self.artefact_id.clone(),
                actual: rp.proposal.artefact_id.clone(),
            });
        }
        if !rp.proposal.status.is_pending() {
            return Err(ReviewError::ProposalNotPending {
                id: rp.id().clone(),
                status: rp.proposal.status,
            });
        }
        self.proposals.push(rp);
        Ok(())
    }

    // -- Staging --

    /// Stage `id` as accepted.
    ///
    /// Refuses without mutating when the id is unknown, blocked by an
    /// already-accepted conflict neighbor, or drafted against an older
    /// version. On success the id leaves the rejected set, so flipping a
    /// decision needs no explicit undo.
    pub fn accept(&mut self, id: &ProposalId) -> AcceptOutcome {
        let Some(rp) = self.proposals.iter().find(|rp| rp.id() == id) else {
            return AcceptOutcome::NotFound;
        };
        let blockers = blockers_for(rp, &self.accepted);
        if !blockers.is_empty() {
            return AcceptOutcome::Blocked(blockers);
        }
        if rp.proposal.is_outdated(self.current_version) {
            return AcceptOutcome::Outdated;
        }
        self.rejected.remove(id);
        self.accepted.insert(id.clone());
        AcceptOutcome::Accepted
    }

    /// Stage `id` as rejected. Unconditional; rejection never needs a
    /// precondition. Returns `false` only for unknown ids.
    pub fn reject(&mut self, id: &ProposalId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.accepted.remove(id);
        self.rejected.insert(id.clone());
        true
    }

    /// Return `id` to pending, whichever way it was staged. Returns `false`
    /// only for unknown ids.
    pub fn undo(&mut self, id: &ProposalId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.accepted.remove(id);
        self.rejected.remove(id);
        true
    }

    // -- Commit --

    /// Commit every staged decision as one batch.
    ///
    /// With nothing staged this is a local no-op acknowledging the current
    /// version; the service is not consulted. On success the committed
    /// proposals leave the pool and the staleness baseline advances to the
    /// receipt's version.
    ///
    /// On [`ReviewError::VersionConflict`] the baseline advances to the
    /// actual version and staged decisions for now-outdated proposals are
    /// undone, so they re-surface for review instead of silently merging
    /// onto content their drafters never saw. Any other failure leaves the
    /// pool exactly as it was, so the same commit can be retried.
    pub fn commit(
        &mut self,
        service: &mut dyn CommitService,
    ) -> Result<CommitReceipt, ReviewError> {
        if self.accepted.is_empty() && self.rejected.is_empty() {
            return Ok(CommitReceipt {
                new_version: self.current_version,
            });
        }

        let request = CommitRequest::new(
            self.artefact_id.clone(),
            self.current_version,
            self.accepted.iter().cloned().collect(),
            self.rejected.iter().cloned().collect(),
        );

        match service.commit(&request) {
            Ok(receipt) => {
                let committed: BTreeSet<ProposalId> =
                    self.accepted.union(&self.rejected).cloned().collect();
                self.proposals.retain(|rp| !committed.contains(rp.id()));
                self.accepted.clear();
                self.rejected.clear();
                self.current_version = receipt.new_version;
                Ok(receipt)
            }
            Err(ReviewError::VersionConflict { expected, actual }) => {
                self.current_version = actual;
                let stale: Vec<ProposalId> = self
                    .proposals
                    .iter()
                    .filter(|rp| rp.proposal.is_outdated(actual))
                    .map(|rp| rp.id().clone())
                    .collect();
                for id in &stale {
                    self.accepted.remove(id);
                    self.rejected.remove(id);
                }
                Err(ReviewError::VersionConflict { expected, actual })
            }
            Err(other) => Err(other),
        }
    }

    // -- Read accessors --

    /// The artifact this pool manages.
    #[must_use]
    pub const fn artefact_id(&self) -> &ArtefactId {
        &self.artefact_id
    }

    /// The staleness baseline decisions are staged against.
    #[must_use]
    pub const fn current_version(&self) -> ArtefactVersion {
        self.current_version
    }

    /// The pool's proposal list, in arrival order.
    #[must_use]
    pub fn proposals(&self) -> &[ReviewProposal] {
        &self.proposals
    }

    /// Look up one proposal by id.
    #[must_use]
    pub fn proposal(&self, id: &ProposalId) -> Option<&ReviewProposal> {
        self.proposals.iter().find(|rp| rp.id() == id)
    }

    /// Ids currently staged as accepted.
    #[must_use]
    pub const fn accepted_ids(&self) -> &BTreeSet<ProposalId> {
        &self.accepted
    }

    /// Ids currently staged as rejected.
    #[must_use]
    pub const fn rejected_ids(&self) -> &BTreeSet<ProposalId> {
        &self.rejected
    }

    /// Proposals blocked by the current accepted set, with their blockers.
    #[must_use]
    pub fn blocked_map(&self) -> BTreeMap<ProposalId, Vec<ProposalId>> {
        blocked_by_accepted(&self.proposals, &self.accepted)
    }

    /// Ids drafted against a version older than the baseline.
    #[must_use]
    pub fn outdated_ids(&self) -> BTreeSet<ProposalId> {
        self.proposals
            .iter()
            .filter(|rp| rp.proposal.is_outdated(self.current_version))
            .map(|rp| rp.id().clone())
            .collect()
    }

    /// Stable display numbers for the pool's proposals.
    #[must_use]
    pub fn proposal_numbers(&self) -> BTreeMap<ProposalId, u32> {
        compute_proposal_numbers(&self.proposals)
    }

    /// How many proposals have no staged decision.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.proposals
            .iter()
            .filter(|rp| !self.accepted.contains(rp.id()) && !self.rejected.contains(rp.id()))
            .count()
    }

    fn contains(&self, id: &ProposalId) -> bool {
        self.proposals.iter().any(|rp| rp.id() == id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::InMemoryCommitService;
    use crate::model::proposal::{ChangeProposal, ItemFields, ProposalOp, ProposalStatus};
    use crate::model::types::UserId;

    fn pid(s: &str) -> ProposalId {
        ProposalId::new(s).unwrap()
    }

    fn aid(s: &str) -> ArtefactId {
        ArtefactId::new(s).unwrap()
    }

    fn proposal(id: &str, version: u64) -> ChangeProposal {
        ChangeProposal {
            id: pid(id),
            artefact_id: aid("std-1"),
            artefact_version: ArtefactVersion::new(version),
            op: ProposalOp::CollectionAdd {
                item: ItemFields::new(),
            },
            status: ProposalStatus::Pending,
            created_by: UserId::new("user-1").unwrap(),
            created_at_ms: 0,
            resolved_by: None,
            resolved_at_ms: None,
        }
    }

    fn review(id: &str, version: u64, conflicts: &[&str]) -> ReviewProposal {
        ReviewProposal::new(
            proposal(id, version),
            conflicts.iter().map(|c| pid(c)).collect(),
        )
    }

    fn pool(proposals: Vec<ReviewProposal>) -> DecisionPool {
        DecisionPool::new(aid("std-1"), ArtefactVersion::new(4), proposals).unwrap()
    }

    #[test]
    fn new_rejects_foreign_artifact() {
        let mut rp = review("cp-1", 4, &[]);
        rp.proposal.artefact_id = aid("std-2");
        let err = DecisionPool::new(aid("std-1"), ArtefactVersion::new(4), vec![rp]).unwrap_err();
        assert!(matches!(err, ReviewError::ArtefactMismatch { .. }));
    }

    #[test]
    fn new_rejects_resolved_proposal() {
        let mut rp = review("cp-1", 4, &[]);
        rp.proposal.status = ProposalStatus::Applied;
        let err = DecisionPool::new(aid("std-1"), ArtefactVersion::new(4), vec![rp]).unwrap_err();
        assert_eq!(
            err,
            ReviewError::ProposalNotPending {
                id: pid("cp-1"),
                status: ProposalStatus::Applied,
            }
        );
    }

    #[test]
    fn accept_stages_id() {
        let mut pool = pool(vec![review("cp-1", 4, &[])]);
        assert_eq!(pool.accept(&pid("cp-1")), AcceptOutcome::Accepted);
        assert!(pool.accepted_ids().contains(&pid("cp-1")));
        assert_eq!(pool.pending_count(), 0);
    }

    #[test]
    fn accept_unknown_id_not_found() {
        let mut pool = pool(vec![review("cp-1", 4, &[])]);
        assert_eq!(pool.accept(&pid("cp-9")), AcceptOutcome::NotFound);
    }

    #[test]
    fn accept_refuses_blocked_id() {
        let mut pool = pool(vec![
            review("cp-1", 4, &["cp-2"]),
            review("cp-2", 4, &["cp-1"]),
        ]);
        assert_eq!(pool.accept(&pid("cp-1")), AcceptOutcome::Accepted);
        assert_eq!(
            pool.accept(&pid("cp-2")),
            AcceptOutcome::Blocked(vec![pid("cp-1")])
        );
        assert!(!pool.accepted_ids().contains(&pid("cp-2")));
    }

    #[test]
    fn undo_then_accept_other_side() {
        let mut pool = pool(vec![
            review("cp-1", 4, &["cp-2"]),
            review("cp-2", 4, &["cp-1"]),
        ]);
        assert_eq!(pool.accept(&pid("cp-1")), AcceptOutcome::Accepted);
        assert!(pool.undo(&pid("cp-1")));
        assert_eq!(pool.accept(&pid("cp-2")), AcceptOutcome::Accepted);
        assert_eq!(
            pool.accept(&pid("cp-1")),
            AcceptOutcome::Blocked(vec![pid("cp-2")])
        );
    }

    #[test]
    fn accept_refuses_outdated_id() {
        let mut pool = pool(vec![review("cp-1", 3, &[])]);
        assert_eq!(pool.accept(&pid("cp-1")), AcceptOutcome::Outdated);
        assert!(pool.accepted_ids().is_empty());
        assert_eq!(pool.outdated_ids(), BTreeSet::from([pid("cp-1")]));
    }

    #[test]
    fn reject_is_unconditional() {
        let mut pool = pool(vec![review("cp-1", 3, &["cp-2"])]);
        // Outdated and conflict-laden, but rejection always goes through.
        assert!(pool.reject(&pid("cp-1")));
        assert!(pool.rejected_ids().contains(&pid("cp-1")));
        assert!(!pool.reject(&pid("cp-9")));
    }

    #[test]
    fn accept_then_reject_flips_decision() {
        let mut pool = pool(vec![review("cp-1", 4, &[])]);
        assert_eq!(pool.accept(&pid("cp-1")), AcceptOutcome::Accepted);
        assert!(pool.reject(&pid("cp-1")));
        assert!(!pool.accepted_ids().contains(&pid("cp-1")));
        assert!(pool.rejected_ids().contains(&pid("cp-1")));

        assert_eq!(pool.accept(&pid("cp-1")), AcceptOutcome::Accepted);
        assert!(pool.accepted_ids().contains(&pid("cp-1")));
        assert!(!pool.rejected_ids().contains(&pid("cp-1")));
    }

    #[test]
    fn disjointness_under_arbitrary_flips() {
        let mut pool = pool(vec![review("cp-1", 4, &[]), review("cp-2", 4, &[])]);
        let _ = pool.accept(&pid("cp-1"));
        pool.reject(&pid("cp-1"));
        let _ = pool.accept(&pid("cp-1"));
        pool.reject(&pid("cp-2"));
        pool.undo(&pid("cp-2"));
        let _ = pool.accept(&pid("cp-2"));

        let overlap: Vec<_> = pool.accepted_ids().intersection(pool.rejected_ids()).collect();
        assert!(overlap.is_empty());
    }

    #[test]
    fn accepting_unblocks_after_blocker_undone() {
        let mut pool = pool(vec![
            review("cp-1", 4, &["cp-2"]),
            review("cp-2", 4, &["cp-1"]),
        ]);
        let _ = pool.accept(&pid("cp-1"));
        assert!(pool.blocked_map().contains_key(&pid("cp-2")));
        pool.undo(&pid("cp-1"));
        assert!(pool.blocked_map().is_empty());
        assert_eq!(pool.accept(&pid("cp-2")), AcceptOutcome::Accepted);
    }

    #[test]
    fn empty_commit_is_local_noop() {
        let mut pool = pool(vec![review("cp-1", 4, &[])]);
        let mut service = InMemoryCommitService::new(ArtefactVersion::new(4));
        let receipt = pool.commit(&mut service).unwrap();
        assert_eq!(receipt.new_version, ArtefactVersion::new(4));
        assert!(service.committed().is_empty());
    }

    #[test]
    fn successful_commit_clears_pool_and_advances_baseline() {
        let mut pool = pool(vec![
            review("cp-1", 4, &[]),
            review("cp-2", 4, &[]),
            review("cp-3", 4, &[]),
        ]);
        let _ = pool.accept(&pid("cp-1"));
        pool.reject(&pid("cp-2"));

        let mut service = InMemoryCommitService::new(ArtefactVersion::new(4));
        let receipt = pool.commit(&mut service).unwrap();

        assert_eq!(receipt.new_version, ArtefactVersion::new(5));
        assert_eq!(pool.current_version(), ArtefactVersion::new(5));
        assert!(pool.accepted_ids().is_empty());
        assert!(pool.rejected_ids().is_empty());
        // Committed proposals left; the undecided one remains.
        assert_eq!(pool.proposals().len(), 1);
        assert_eq!(pool.proposals()[0].id(), &pid("cp-3"));

        let committed = &service.committed()[0];
        assert_eq!(committed.accepted, vec![pid("cp-1")]);
        assert_eq!(committed.rejected, vec![pid("cp-2")]);
        assert_eq!(committed.expected_version, ArtefactVersion::new(4));
    }

    #[test]
    fn rejected_only_commit_keeps_baseline() {
        let mut pool = pool(vec![review("cp-1", 4, &[])]);
        pool.reject(&pid("cp-1"));

        let mut service = InMemoryCommitService::new(ArtefactVersion::new(4));
        let receipt = pool.commit(&mut service).unwrap();
        assert_eq!(receipt.new_version, ArtefactVersion::new(4));
        assert_eq!(pool.current_version(), ArtefactVersion::new(4));
        assert!(pool.proposals().is_empty());
    }

    #[test]
    fn version_conflict_resurfaces_outdated_decisions() {
        let mut pool = pool(vec![review("cp-1", 4, &[]), review("cp-2", 4, &[])]);
        let _ = pool.accept(&pid("cp-1"));
        pool.reject(&pid("cp-2"));

        // A concurrent writer moved the artifact to v5.
        let mut service = InMemoryCommitService::new(ArtefactVersion::new(5));
        let err = pool.commit(&mut service).unwrap_err();
        assert_eq!(
            err,
            ReviewError::VersionConflict {
                expected: ArtefactVersion::new(4),
                actual: ArtefactVersion::new(5),
            }
        );

        // Baseline advanced; both staged decisions were undone because their
        // proposals are now outdated against v5.
        assert_eq!(pool.current_version(), ArtefactVersion::new(5));
        assert!(pool.accepted_ids().is_empty());
        assert!(pool.rejected_ids().is_empty());
        assert_eq!(pool.proposals().len(), 2);
        assert_eq!(pool.outdated_ids().len(), 2);

        // Re-accepting is now refused until the proposals are redrafted.
        assert_eq!(pool.accept(&pid("cp-1")), AcceptOutcome::Outdated);
    }

    #[test]
    fn non_conflict_failure_leaves_pool_unchanged() {
        let mut pool = pool(vec![review("cp-1", 4, &[])]);
        let _ = pool.accept(&pid("cp-1"));

        let mut service = InMemoryCommitService::new(ArtefactVersion::new(4));
        service.fail_next_with(ReviewError::CommitFailed {
            detail: "store unreachable".to_owned(),
        });

        let err = pool.commit(&mut service).unwrap_err();
        assert!(matches!(err, ReviewError::CommitFailed { .. }));
        assert!(pool.accepted_ids().contains(&pid("cp-1")));
        assert_eq!(pool.current_version(), ArtefactVersion::new(4));

        // Retry succeeds with the same staged state.
        let receipt = pool.commit(&mut service).unwrap();
        assert_eq!(receipt.new_version, ArtefactVersion::new(5));
        assert!(pool.proposals().is_empty());
    }

    #[test]
    fn add_proposal_mid_session() {
        let mut pool = pool(vec![review("cp-1", 4, &[])]);
        pool.add_proposal(review("cp-2", 4, &[])).unwrap();
        assert_eq!(pool.proposals().len(), 2);
        assert_eq!(pool.accept(&pid("cp-2")), AcceptOutcome::Accepted);
    }

    #[test]
    fn proposal_numbers_are_stable_display_order() {
        let mut early = proposal("cp-b", 4);
        early.created_at_ms = 100;
        let mut late = proposal("cp-a", 4);
        late.created_at_ms = 200;
        let pool = pool(vec![
            ReviewProposal::new(late, Vec::new()),
            ReviewProposal::new(early, Vec::new()),
        ]);
        let numbers = pool.proposal_numbers();
        assert_eq!(numbers[&pid("cp-b")], 1);
        assert_eq!(numbers[&pid("cp-a")], 2);
    }

    #[test]
    fn pending_count_tracks_staging() {
        let mut pool = pool(vec![review("cp-1", 4, &[]), review("cp-2", 4, &[])]);
        assert_eq!(pool.pending_count(), 2);
        let _ = pool.accept(&pid("cp-1"));
        assert_eq!(pool.pending_count(), 1);
        pool.reject(&pid("cp-2"));
        assert_eq!(pool.pending_count(), 0);
        pool.undo(&pid("cp-1"));
        assert_eq!(pool.pending_count(), 1);
    }
}
