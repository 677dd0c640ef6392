//! Content-aware staleness refinement.
//!
//! The version predicate ([`crate::model::proposal::is_outdated`]) is a
//! coarse filter: it flags every proposal drafted against an older version,
//! even when the slot it targets never moved. This module refines it by
//! inspecting current content: a version-mismatched proposal is only
//! reported outdated when the field or item it targets has actually
//! drifted from the value observed at draft time.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::merge::kind::{ArtifactKind, KindSchema, ValueKind};
use crate::merge::types::{ArtifactSnapshot, CollectionItem};
use crate::model::proposal::{ItemFields, ProposalOp, ReviewProposal};
use crate::model::types::{ItemId, ProposalId};

/// Compute the set of proposals whose draft-time observations no longer
/// match current content.
///
/// Proposals drafted against `base.version` are fresh by definition and
/// their payloads are never inspected. For the rest, each op kind has its
/// own drift test; ops and fields outside the kind's schema are never
/// outdated (the fold ignores them anyway).
#[must_use]
pub fn compute_outdated_ids(
    kind: ArtifactKind,
    proposals: &[ReviewProposal],
    base: &ArtifactSnapshot,
    collection: &[CollectionItem],
) -> BTreeSet<ProposalId> {
    let schema = kind.schema();
    let mut outdated = BTreeSet::new();

    for rp in proposals {
        let proposal = &rp.proposal;
        if proposal.artefact_version == base.version {
            continue;
        }
        let drifted = match &proposal.op {
            ProposalOp::ScalarUpdate {
                field, old_value, ..
            } => scalar_drifted(schema, base, field, old_value),
            ProposalOp::CollectionUpdate {
                target_id,
                field,
                old_value,
                ..
            } => item_field_drifted(schema, collection, target_id, field, old_value),
            ProposalOp::CollectionDelete { target_id, item } => {
                delete_target_drifted(schema, collection, target_id, item)
            }
            ProposalOp::CollectionAdd { .. } | ProposalOp::Unknown => false,
        };
        if drifted {
            outdated.insert(proposal.id.clone());
        }
    }

    outdated
}

fn scalar_drifted(
    schema: &KindSchema,
    base: &ArtifactSnapshot,
    field: &str,
    old_value: &str,
) -> bool {
    let Some(spec) = schema.scalar_field(field) else {
        return false;
    };
    match spec.value_kind {
        ValueKind::Text => base.field(field) != old_value,
        ValueKind::Json => {
            // Absent JSON fields read as the empty object, so a draft that
            // observed "{}" against a never-set field is still fresh.
            let current = base.fields.get(field).map_or("{}", String::as_str);
            !json_equivalent(old_value, current)
        }
    }
}

fn item_field_drifted(
    schema: &KindSchema,
    collection: &[CollectionItem],
    target_id: &ItemId,
    field: &str,
    old_value: &str,
) -> bool {
    if !schema.item_field_allowed(field) {
        return false;
    }
    match collection.iter().find(|item| &item.id == target_id) {
        Some(item) => item.field(field) != old_value,
        None => true,
    }
}

fn delete_target_drifted(
    schema: &KindSchema,
    collection: &[CollectionItem],
    target_id: &ItemId,
    snapshot: &ItemFields,
) -> bool {
    let Some(collection_spec) = &schema.collection else {
        return false;
    };
    let Some(item) = collection.iter().find(|item| &item.id == target_id) else {
        return true;
    };
    // Only the fields the drafter actually observed participate: a sparse
    // snapshot does not flag drift in fields it never recorded.
    collection_spec
        .item_fields
        .iter()
        .filter_map(|field| snapshot.get(*field).map(|observed| (*field, observed)))
        .any(|(field, observed)| item.field(field) != observed)
}

/// Canonical JSON equality: both sides parsed to [`Value`] and compared
/// structurally (object keys are sorted by construction). A side that fails
/// to parse degrades the comparison to raw string equality.
fn json_equivalent(a: &str, b: &str) -> bool {
    match (
        serde_json::from_str::<Value>(a),
        serde_json::from_str::<Value>(b),
    ) {
        (Ok(left), Ok(right)) => left == right,
        _ => a == b,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
