//! Shared test helpers for redline integration tests.
//!
//! All tests are pure library tests — no side effects, no I/O. Each test
//! builds its own base snapshot and proposal list from these factories.

use std::collections::BTreeMap;

use redline::merge::types::{ArtifactSnapshot, CollectionItem};
use redline::model::proposal::{
    ChangeProposal, ItemFields, ProposalOp, ProposalStatus, ReviewProposal,
};
use redline::model::types::{ArtefactId, ArtefactVersion, ItemId, ProposalId, UserId};

pub fn pid(s: &str) -> ProposalId {
    ProposalId::new(s).expect("valid proposal id")
}

pub fn iid(s: &str) -> ItemId {
    ItemId::new(s).expect("valid item id")
}

pub fn aid() -> ArtefactId {
    ArtefactId::new("std-auth").expect("valid artefact id")
}

/// A standard's base snapshot at `version` with name, description, and
/// scope populated.
pub fn standard_base(version: u64) -> ArtifactSnapshot {
    let mut fields = BTreeMap::new();
    fields.insert("name".to_owned(), "Auth Standard".to_owned());
    fields.insert(
        "description".to_owned(),
        "How services authenticate".to_owned(),
    );
    fields.insert("scope".to_owned(), "backend".to_owned());
    ArtifactSnapshot {
        id: aid(),
        version: ArtefactVersion::new(version),
        fields,
    }
}

/// Two pre-existing rules for the standard's collection.
pub fn standard_rules() -> Vec<CollectionItem> {
    [
        ("rule-1", "Use OAuth2 for service-to-service calls"),
        ("rule-2", "Rotate credentials every 90 days"),
    ]
    .iter()
    .map(|(id, content)| {
        let mut fields = ItemFields::new();
        fields.insert("content".to_owned(), (*content).to_owned());
        CollectionItem::new(iid(id), fields)
    })
    .collect()
}

/// A pending proposal against `aid()` with explicit timestamp and version.
pub fn proposal(id: &str, created_at_ms: u64, version: u64, op: ProposalOp) -> ChangeProposal {
    ChangeProposal {
        id: pid(id),
        artefact_id: aid(),
        artefact_version: ArtefactVersion::new(version),
        op,
        status: ProposalStatus::Pending,
        created_by: UserId::new("reviewer-1").expect("valid user id"),
        created_at_ms,
        resolved_by: None,
        resolved_at_ms: None,
    }
}

/// Wrap a proposal with its precomputed conflict neighbors.
pub fn review(p: ChangeProposal, conflicts: &[&str]) -> ReviewProposal {
    ReviewProposal::new(p, conflicts.iter().map(|c| pid(c)).collect())
}

pub fn scalar_update(field: &str, old: &str, new: &str) -> ProposalOp {
    ProposalOp::ScalarUpdate {
        field: field.to_owned(),
        old_value: old.to_owned(),
        new_value: new.to_owned(),
    }
}

pub fn collection_add(content: &str) -> ProposalOp {
    let mut item = ItemFields::new();
    item.insert("content".to_owned(), content.to_owned());
    ProposalOp::CollectionAdd { item }
}

pub fn collection_update(target: &str, old: &str, new: &str) -> ProposalOp {
    ProposalOp::CollectionUpdate {
        target_id: iid(target),
        field: "content".to_owned(),
        old_value: old.to_owned(),
        new_value: new.to_owned(),
    }
}

pub fn collection_delete(target: &str, observed_content: &str) -> ProposalOp {
    let mut item = ItemFields::new();
    item.insert("content".to_owned(), observed_content.to_owned());
    ProposalOp::CollectionDelete {
        target_id: iid(target),
        item,
    }
}
