//! The fold — apply accepted proposals onto a base artifact.
//!
//! `apply_proposals` is the engine's core operation: filter to the accepted
//! set, sort into the total apply order, then fold each op over a copy of the
//! base state while recording provenance. Pure and total: malformed payloads
//! degrade, missing targets skip, unknown ops do nothing. The result for a
//! given input set never depends on input array order.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::warn;

use crate::merge::kind::{ArtifactKind, ValueKind};
use crate::merge::types::{AppliedArtifact, ArtifactSnapshot, ChangeTracker, CollectionItem};
use crate::model::ordering::sorted_for_apply;
use crate::model::proposal::{ItemFields, ProposalOp, ReviewProposal};
use crate::model::types::{ItemId, ProposalId};

/// Parse a string as a JSON object with string values.
///
/// Returns `None` for anything else: non-JSON, arrays, scalars, or objects
/// with non-string values.
pub(crate) fn parse_string_object(s: &str) -> Option<serde_json::Map<String, Value>> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) if map.values().all(Value::is_string) => Some(map),
        _ => None,
    }
}

/// Fold the accepted subset of `proposals` onto `base` and `collection`.
///
/// - Only proposals whose id is in `accepted` participate; `accepted` is a
///   set, so a duplicated id cannot double-apply.
/// - Participants are sorted by `(created_at_ms, id)` before folding, so the
///   output is invariant to the order of `proposals`.
/// - Ops that reference fields outside the kind's schema are no-ops; ops
///   that reference missing collection items skip silently.
/// - A `Json` scalar whose new value fails to parse as an object of strings
///   degrades the field to absent; the tracker still records the raw value.
/// - An add followed by a delete of the same temporary id within the fold
///   cancels both: the item and its provenance vanish.
#[must_use]
pub fn apply_proposals(
    kind: ArtifactKind,
    base: &ArtifactSnapshot,
    collection: &[CollectionItem],
    proposals: &[ReviewProposal],
    accepted: &BTreeSet<ProposalId>,
) -> AppliedArtifact {
    let schema = kind.schema();

    let selected = proposals
        .iter()
        .map(|rp| &rp.proposal)
        .filter(|p| accepted.contains(&p.id));
    let sorted = sorted_for_apply(selected);

    let mut fields = base.fields.clone();
    let mut items: Vec<CollectionItem> = collection.to_vec();
    let mut tracker = ChangeTracker::default();

    for proposal in sorted {
        match &proposal.op {
            ProposalOp::ScalarUpdate {
                field, new_value, ..
            } => {
                let Some(spec) = schema.scalar_field(field) else {
                    continue;
                };
                let original = fields.get(field).cloned().unwrap_or_default();
                match spec.value_kind {
                    ValueKind::Text => {
                        fields.insert(field.clone(), new_value.clone());
                    }
                    ValueKind::Json => {
                        if parse_string_object(new_value).is_some() {
                            fields.insert(field.clone(), new_value.clone());
                        } else {
                            warn!(
                                field = field.as_str(),
                                proposal = %proposal.id,
                                "unparsable JSON payload, degrading field to absent"
                            );
                            fields.remove(field);
                        }
                    }
                }
                // Tracker records the raw proposed value even when degraded.
                tracker.record_scalar(field, &original, new_value, &proposal.id);
            }
            ProposalOp::CollectionAdd { item } => {
                if schema.collection.is_none() {
                    continue;
                }
                let temp = ItemId::temporary(&proposal.id);
                let kept: ItemFields = item
                    .iter()
                    .filter(|(name, _)| schema.item_field_allowed(name))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect();
                items.push(CollectionItem::new(temp.clone(), kept));
                tracker.collection.added.insert(temp, proposal.id.clone());
            }
            ProposalOp::CollectionUpdate {
                target_id,
                field,
                new_value,
                ..
            } => {
                if !schema.item_field_allowed(field) {
                    continue;
                }
                let Some(item) = items.iter_mut().find(|i| &i.id == target_id) else {
                    continue;
                };
                let original = item.fields.get(field).cloned().unwrap_or_default();
                item.fields.insert(field.clone(), new_value.clone());
                tracker.record_item_update(target_id, field, &original, new_value, &proposal.id);
            }
            ProposalOp::CollectionDelete { target_id, .. } => {
                if schema.collection.is_none() {
                    continue;
                }
                let Some(pos) = items.iter().position(|i| &i.id == target_id) else {
                    continue;
                };
                items.remove(pos);
                if tracker.collection.added.remove(target_id).is_some() {
                    // Add-then-delete within this fold: the item never
                    // existed, so its provenance goes too.
                    tracker.collection.updated.remove(target_id);
                } else {
                    tracker
                        .collection
                        .deleted
                        .insert(target_id.clone(), proposal.id.clone());
                }
            }
            ProposalOp::Unknown => {}
        }
    }

    AppliedArtifact {
        kind,
        fields,
        collection: items,
        changes: tracker,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
