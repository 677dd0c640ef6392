//! redline — a deterministic change-proposal review engine.
//!
//! Reviewers stage accept/reject decisions over a list of change proposals
//! targeting a versioned artifact; the engine folds the accepted subset
//! onto the artifact's base snapshot deterministically, tracks provenance
//! for every touched field, surfaces conflicts and staleness, and commits
//! the whole batch through an optimistic version guard.
//!
//! The engine is synchronous, I/O-free, and pure up to the commit boundary:
//! everything before [`pool::DecisionPool::commit`] is a preview that can
//! be recomputed from inputs at any time.

pub mod commit;
pub mod error;
pub mod merge;
pub mod model;
pub mod pool;

pub use commit::{CommitReceipt, CommitRequest, CommitService, InMemoryCommitService};
pub use error::ReviewError;
pub use merge::{apply_proposals, compute_outdated_ids, AppliedArtifact, ArtifactKind};
pub use model::proposal::{ChangeProposal, ProposalOp, ProposalStatus, ReviewProposal};
pub use pool::{AcceptOutcome, DecisionPool};
