//! Error types for the review engine.
//!
//! Defines [`ReviewError`], the unified error type for pool and commit
//! operations. Error messages are designed to be agent-friendly: each
//! variant includes a clear description of what went wrong and actionable
//! guidance on how to fix it.
//!
//! The engine proper (ordering, staleness, blocking, the fold) has no fatal
//! paths. Malformed payload content degrades, referential misses skip, and
//! pool-level refusals are typed outcomes. The only hard failure in the
//! crate is the commit boundary, and that is what lives here.

use std::fmt;

use crate::model::proposal::ProposalStatus;
use crate::model::types::{ArtefactId, ArtefactVersion, ProposalId};

// ---------------------------------------------------------------------------
// ReviewError
// ---------------------------------------------------------------------------

/// Unified error type for review-pool and commit operations.
///
/// Each variant is designed to be self-contained: an agent receiving this
/// error should be able to understand what happened and what to do next
/// without additional context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReviewError {
    /// The requested proposal is not in the pool.
    ProposalNotFound {
        /// The proposal id that was not found.
        id: ProposalId,
    },

    /// A proposal targets a different artifact than the pool manages.
    ArtefactMismatch {
        /// The artifact the pool manages.
        expected: ArtefactId,
        /// The artifact the proposal targets.
        actual: ArtefactId,
    },

    /// The proposal has already been resolved and cannot be staged.
    ProposalNotPending {
        /// The proposal id.
        id: ProposalId,
        /// Its current status.
        status: ProposalStatus,
    },

    /// The artifact moved past the version the commit was staged against.
    VersionConflict {
        /// The version the caller expected to commit onto.
        expected: ArtefactVersion,
        /// The artifact's actual current version.
        actual: ArtefactVersion,
    },

    /// The commit backend failed for a reason other than a version conflict.
    CommitFailed {
        /// Human-readable description of the failure.
        detail: String,
    },
}

// ---------------------------------------------------------------------------
// Display — agent-friendly error messages
// ---------------------------------------------------------------------------

impl fmt::Display for ReviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProposalNotFound { id } => {
                write!(
                    f,
                    "proposal '{id}' not found in the pool.\n  To fix: check the pool's proposal list; the id may belong to a different artifact or an already-committed batch."
                )
            }
            Self::ArtefactMismatch { expected, actual } => {
                write!(
                    f,
                    "proposal targets artifact '{actual}' but this pool manages '{expected}'.\n  To fix: route the proposal to the pool for its own artifact."
                )
            }
            Self::ProposalNotPending { id, status } => {
                write!(
                    f,
                    "proposal '{id}' is already {status} and cannot be staged.\n  To fix: only pending proposals can be accepted or rejected."
                )
            }
            Self::VersionConflict { expected, actual } => {
                write!(
                    f,
                    "artifact moved from {expected} to {actual} since decisions were staged.\n  To fix: re-review staged decisions against the new version, then commit again."
                )
            }
            Self::CommitFailed { detail } => {
                write!(
                    f,
                    "commit failed: {detail}\n  To fix: the pool is unchanged; resolve the backend problem and retry."
                )
            }
        }
    }
}

impl std::error::Error for ReviewError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
