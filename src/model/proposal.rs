//! Change proposals — the immutable review units the engine folds.
//!
//! A [`ChangeProposal`] captures one edit drafted against a specific artifact
//! version. Proposals never mutate after creation; review decisions live in
//! the decision pool and the authoritative store, not on the proposal itself.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::types::{ArtefactId, ArtefactVersion, ItemId, ProposalId, UserId};

/// Field name → value map for a collection item carried in a proposal payload.
///
/// `BTreeMap` so iteration order is deterministic.
pub type ItemFields = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// ProposalStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a proposal in the authoritative store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Awaiting a review decision.
    #[default]
    Pending,
    /// Accepted and committed into the artifact.
    Applied,
    /// Rejected by a reviewer.
    Rejected,
}

impl ProposalStatus {
    /// Returns `true` if the proposal is still awaiting a decision.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns `true` if the proposal has been committed.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }

    /// Returns `true` if the proposal has been rejected.
    #[must_use]
    pub const fn is_rejected(self) -> bool {
        matches!(self, Self::Rejected)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Applied => write!(f, "applied"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

// ---------------------------------------------------------------------------
// ProposalOp
// ---------------------------------------------------------------------------

/// The edit a proposal carries, dispatched exhaustively by the fold.
///
/// Serialized as tagged JSON (`{"type": "scalar_update", ...}`). Payload
/// types arriving from newer producers deserialize to [`ProposalOp::Unknown`]
/// and are a no-op everywhere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProposalOp {
    /// Replace the value of one scalar field on the artifact.
    ScalarUpdate {
        /// The scalar field name.
        field: String,
        /// The value observed when the proposal was drafted.
        old_value: String,
        /// The proposed replacement value.
        new_value: String,
    },
    /// Append a new item to the artifact's child collection.
    CollectionAdd {
        /// Draft field values for the new item.
        item: ItemFields,
    },
    /// Replace the value of one field on an existing collection item.
    CollectionUpdate {
        /// The item being edited.
        target_id: ItemId,
        /// The item field name.
        field: String,
        /// The value observed when the proposal was drafted.
        old_value: String,
        /// The proposed replacement value.
        new_value: String,
    },
    /// Remove an existing collection item.
    CollectionDelete {
        /// The item being removed.
        target_id: ItemId,
        /// Snapshot of the item's fields as observed at draft time.
        item: ItemFields,
    },
    /// An op type this engine does not know. Never applied, never outdated,
    /// never blocking.
    #[serde(other)]
    Unknown,
}

impl ProposalOp {
    /// Returns `true` if this op targets the child collection.
    #[must_use]
    pub const fn is_collection_op(&self) -> bool {
        matches!(
            self,
            Self::CollectionAdd { .. } | Self::CollectionUpdate { .. } | Self::CollectionDelete { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// ChangeProposal
// ---------------------------------------------------------------------------

/// One proposed edit to an artifact, drafted against a specific version.
///
/// Immutable once created. `created_at_ms` participates in the total apply
/// order; `resolved_by`/`resolved_at_ms` are populated by the store when the
/// proposal leaves the pending state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeProposal {
    /// Unique proposal identifier.
    pub id: ProposalId,
    /// The artifact this proposal targets.
    pub artefact_id: ArtefactId,
    /// The artifact version this proposal was drafted against.
    pub artefact_version: ArtefactVersion,
    /// The edit payload.
    pub op: ProposalOp,
    /// Lifecycle status in the authoritative store.
    pub status: ProposalStatus,
    /// Who drafted the proposal.
    pub created_by: UserId,
    /// Draft time, milliseconds since Unix epoch.
    pub created_at_ms: u64,
    /// Who resolved the proposal, once resolved.
    pub resolved_by: Option<UserId>,
    /// When the proposal was resolved, milliseconds since Unix epoch.
    pub resolved_at_ms: Option<u64>,
}

impl ChangeProposal {
    /// Returns `true` if this proposal was drafted against a version other
    /// than `current`.
    ///
    /// This is the coarse version predicate; `merge::outdated` refines it by
    /// inspecting content drift.
    #[must_use]
    pub fn is_outdated(&self, current: ArtefactVersion) -> bool {
        self.artefact_version != current
    }
}

/// Free-function form of [`ChangeProposal::is_outdated`].
#[must_use]
pub fn is_outdated(proposal: &ChangeProposal, current: ArtefactVersion) -> bool {
    proposal.is_outdated(current)
}

// ---------------------------------------------------------------------------
// ReviewProposal
// ---------------------------------------------------------------------------

/// A proposal together with its precomputed conflict neighbors.
///
/// The conflict relation is symmetric and computed upstream; the engine
/// consumes it as ground truth. Neighbors are sorted and deduplicated on
/// construction for determinism.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewProposal {
    /// The underlying proposal.
    pub proposal: ChangeProposal,
    /// Ids of proposals this one conflicts with (symmetric relation).
    pub conflicts_with: Vec<ProposalId>,
}

impl ReviewProposal {
    /// Create a new `ReviewProposal`, sorting and deduplicating neighbors.
    #[must_use]
    pub fn new(proposal: ChangeProposal, mut conflicts_with: Vec<ProposalId>) -> Self {
        conflicts_with.sort();
        conflicts_with.dedup();
        Self {
            proposal,
            conflicts_with,
        }
    }

    /// A proposal with no conflict neighbors.
    #[must_use]
    pub const fn unconflicted(proposal: ChangeProposal) -> Self {
        Self {
            proposal,
            conflicts_with: Vec::new(),
        }
    }

    /// The proposal's id.
    #[must_use]
    pub const fn id(&self) -> &ProposalId {
        &self.proposal.id
    }

    /// Returns `true` if this proposal conflicts with `other`.
    #[must_use]
    pub fn has_conflict_with(&self, other: &ProposalId) -> bool {
        self.conflicts_with.binary_search(other).is_ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
