//! Deterministic proposal-fold engine.
//!
//! Folds the accepted subset of a proposal list onto a base artifact
//! snapshot, producing merged content plus a provenance tracker. The fold is
//! a pure function of its inputs.
//!
//! # Determinism guarantee
//!
//! The same base + proposal list + accepted set always produces the same
//! result, regardless of the order proposals arrive in:
//!
//! - Accepted proposals are folded in `(created_at_ms, id)` order.
//! - Membership is a set question; input order never matters.
//! - Provenance maps are `BTreeMap`s, so serialized output is stable too.

pub mod apply;
pub mod kind;
pub mod outdated;
pub mod types;

pub use apply::apply_proposals;
pub use kind::{ArtifactKind, KindSchema};
pub use outdated::compute_outdated_ids;
pub use types::{AppliedArtifact, ArtifactSnapshot, ChangeTracker, CollectionItem, FieldChange};
