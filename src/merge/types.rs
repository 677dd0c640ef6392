//! Core types for the proposal fold.
//!
//! Defines the data structures that flow through the fold: the base artifact
//! snapshot, collection items, and the provenance tracker recording which
//! proposals touched which fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::merge::kind::ArtifactKind;
use crate::model::proposal::ItemFields;
use crate::model::types::{ArtefactId, ArtefactVersion, ItemId, ProposalId};

// ---------------------------------------------------------------------------
// ArtifactSnapshot
// ---------------------------------------------------------------------------

/// The base artifact's scalar state at a specific version.
///
/// A field absent from `fields` reads as the empty string for provenance
/// purposes, so a first edit to a never-set field records `""` as its
/// original value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSnapshot {
    /// The artifact identifier.
    pub id: ArtefactId,
    /// The version this snapshot represents.
    pub version: ArtefactVersion,
    /// Scalar field values.
    pub fields: BTreeMap<String, String>,
}

impl ArtifactSnapshot {
    /// The current value of a scalar field; absent fields read as `""`.
    #[must_use]
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", String::as_str)
    }
}

// ---------------------------------------------------------------------------
// CollectionItem
// ---------------------------------------------------------------------------

/// One item in the artifact's ordered child collection.
///
/// Identity (`id`) is distinct from content (`fields`): two items with equal
/// fields are still different items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionItem {
    /// Stable item identifier (or a `temp:` id for items added in a fold).
    pub id: ItemId,
    /// Field values.
    pub fields: ItemFields,
}

impl CollectionItem {
    /// Create a new item.
    #[must_use]
    pub const fn new(id: ItemId, fields: ItemFields) -> Self {
        Self { id, fields }
    }

    /// The current value of an item field; absent fields read as `""`.
    #[must_use]
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", String::as_str)
    }
}

// ---------------------------------------------------------------------------
// FieldChange
// ---------------------------------------------------------------------------

/// Provenance for one field across a fold.
///
/// Invariant: `original_value` is fixed at first touch and never changes;
/// `final_value` and `proposal_ids` accumulate as later proposals touch the
/// same field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// The value before the first accepted edit touched the field.
    pub original_value: String,
    /// The value after the last accepted edit.
    pub final_value: String,
    /// Every proposal that touched the field, in apply order.
    pub proposal_ids: Vec<ProposalId>,
}

/// Record an edit into a field-change map with first-touch semantics:
/// the first touch fixes `original_value`, later touches only advance
/// `final_value` and append to `proposal_ids`.
fn record_field_change(
    slot: &mut BTreeMap<String, FieldChange>,
    field: &str,
    original: &str,
    new_value: &str,
    proposal: &ProposalId,
) {
    match slot.get_mut(field) {
        Some(change) => {
            change.final_value = new_value.to_owned();
            change.proposal_ids.push(proposal.clone());
        }
        None => {
            slot.insert(
                field.to_owned(),
                FieldChange {
                    original_value: original.to_owned(),
                    final_value: new_value.to_owned(),
                    proposal_ids: vec![proposal.clone()],
                },
            );
        }
    }
}

// ---------------------------------------------------------------------------
// CollectionChanges / ChangeTracker
// ---------------------------------------------------------------------------

/// Provenance for the child collection across a fold.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionChanges {
    /// Items added, keyed by their temporary id, with the creating proposal.
    pub added: BTreeMap<ItemId, ProposalId>,
    /// Per-item, per-field edits to pre-existing items.
    pub updated: BTreeMap<ItemId, BTreeMap<String, FieldChange>>,
    /// Items removed, with the deleting proposal.
    pub deleted: BTreeMap<ItemId, ProposalId>,
}

impl CollectionChanges {
    /// Returns `true` if no collection change was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}

/// Everything the fold changed, with provenance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeTracker {
    /// Scalar field edits, keyed by field name.
    pub scalars: BTreeMap<String, FieldChange>,
    /// Collection edits.
    pub collection: CollectionChanges,
}

impl ChangeTracker {
    /// Returns `true` if the fold changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty() && self.collection.is_empty()
    }

    /// Record a scalar edit with first-touch original semantics.
    pub fn record_scalar(
        &mut self,
        field: &str,
        original: &str,
        new_value: &str,
        proposal: &ProposalId,
    ) {
        record_field_change(&mut self.scalars, field, original, new_value, proposal);
    }

    /// Record an item-field edit with first-touch original semantics.
    pub fn record_item_update(
        &mut self,
        item: &ItemId,
        field: &str,
        original: &str,
        new_value: &str,
        proposal: &ProposalId,
    ) {
        let slot = self.collection.updated.entry(item.clone()).or_default();
        record_field_change(slot, field, original, new_value, proposal);
    }
}

// ---------------------------------------------------------------------------
// AppliedArtifact
// ---------------------------------------------------------------------------

/// The result of folding accepted proposals onto a base artifact.
///
/// `fields` holds the merged scalar state. A `Json` field whose final value
/// failed to parse is absent here (the tracker still records the raw value
/// the proposal carried).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedArtifact {
    /// The artifact kind that was folded.
    pub kind: ArtifactKind,
    /// Merged scalar fields.
    pub fields: BTreeMap<String, String>,
    /// Merged child collection, in order.
    pub collection: Vec<CollectionItem>,
    /// Provenance for everything that changed.
    pub changes: ChangeTracker,
}

impl AppliedArtifact {
    /// The merged value of a scalar field, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Find a collection item by id.
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&CollectionItem> {
        self.collection.iter().find(|item| &item.id == id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
