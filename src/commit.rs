//! The commit boundary.
//!
//! Everything upstream of this module is a pure preview: the pool stages
//! decisions and the fold computes what the artifact would look like.
//! [`CommitService`] is where staged decisions become authoritative, as a
//! single all-or-nothing write guarded by optimistic versioning.
//!
//! Implementations live outside the engine (a database, an HTTP backend).
//! [`InMemoryCommitService`] is the reference implementation used by tests
//! and by embedders that keep artifacts in process memory.

use serde::{Deserialize, Serialize};

use crate::error::ReviewError;
use crate::model::types::{ArtefactId, ArtefactVersion, ProposalId};

// ---------------------------------------------------------------------------
// CommitRequest / CommitReceipt
// ---------------------------------------------------------------------------

/// One batch of staged decisions, ready for the authoritative write.
///
/// Id lists are sorted on construction so equal decision sets produce
/// byte-identical requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRequest {
    /// The artifact the decisions apply to.
    pub artefact_id: ArtefactId,
    /// The version the decisions were staged against.
    pub expected_version: ArtefactVersion,
    /// Proposals to mark applied, sorted.
    pub accepted: Vec<ProposalId>,
    /// Proposals to mark rejected, sorted.
    pub rejected: Vec<ProposalId>,
}

impl CommitRequest {
    /// Build a request, sorting both id lists.
    #[must_use]
    pub fn new(
        artefact_id: ArtefactId,
        expected_version: ArtefactVersion,
        mut accepted: Vec<ProposalId>,
        mut rejected: Vec<ProposalId>,
    ) -> Self {
        accepted.sort();
        rejected.sort();
        Self {
            artefact_id,
            expected_version,
            accepted,
            rejected,
        }
    }

    /// Returns `true` if the request stages no decisions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty() && self.rejected.is_empty()
    }
}

/// Acknowledgement of a successful commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    /// The artifact version after the write.
    pub new_version: ArtefactVersion,
}

// ---------------------------------------------------------------------------
// CommitService
// ---------------------------------------------------------------------------

/// The authoritative all-or-nothing write.
///
/// Contract for implementations:
///
/// - Refuse with [`ReviewError::VersionConflict`] when the artifact has
///   moved past `request.expected_version`.
/// - On any failure, change nothing: the caller must be able to retry the
///   same request without data loss.
/// - A rejected-only request resolves proposals without changing content,
///   so the version stays put.
pub trait CommitService {
    /// Perform the write described by `request`.
    fn commit(&mut self, request: &CommitRequest) -> Result<CommitReceipt, ReviewError>;
}

// ---------------------------------------------------------------------------
// InMemoryCommitService
// ---------------------------------------------------------------------------

/// Reference [`CommitService`] holding the artifact's version in memory.
///
/// Records every committed request for inspection and supports scripted
/// failure injection so pool rollback behavior can be exercised.
#[derive(Debug)]
pub struct InMemoryCommitService {
    current_version: ArtefactVersion,
    committed: Vec<CommitRequest>,
    fail_next: Option<ReviewError>,
}

impl InMemoryCommitService {
    /// A service whose artifact currently sits at `version`.
    #[must_use]
    pub const fn new(version: ArtefactVersion) -> Self {
        Self {
            current_version: version,
            committed: Vec::new(),
            fail_next: None,
        }
    }

    /// The artifact's current version.
    #[must_use]
    pub const fn current_version(&self) -> ArtefactVersion {
        self.current_version
    }

    /// Every request committed so far, in order.
    #[must_use]
    pub fn committed(&self) -> &[CommitRequest] {
        &self.committed
    }

    /// Move the artifact version out from under the next caller, simulating
    /// a concurrent writer.
    pub fn advance_version(&mut self) {
        self.current_version = self.current_version.next();
    }

    /// Make the next `commit` call fail with `error` without touching state.
    pub fn fail_next_with(&mut self, error: ReviewError) {
        self.fail_next = Some(error);
    }
}

impl CommitService for InMemoryCommitService {
    fn commit(&mut self, request: &CommitRequest) -> Result<CommitReceipt, ReviewError> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }
        if request.expected_version != self.current_version {
            return Err(ReviewError::VersionConflict {
                expected: request.expected_version,
                actual: self.current_version,
            });
        }
        // Rejections resolve proposals without a content change, so a
        // rejected-only batch leaves the version alone.
        if !request.accepted.is_empty() {
            self.current_version = self.current_version.next();
        }
        self.committed.push(request.clone());
        Ok(CommitReceipt {
            new_version: self.current_version,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
