//! Artifact kind schemas — the declarative tables driving the generic fold.
//!
//! One fold serves every artifact kind. The per-kind differences (which
//! scalar fields exist, whether there is a child collection, which fields a
//! collection item carries) live in static [`KindSchema`] tables instead of
//! per-kind engine code. Ops naming fields outside the schema are no-ops.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ArtifactKind
// ---------------------------------------------------------------------------

/// The kind of artifact under review.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// A standard: named guidance document with an ordered list of rules.
    Standard,
    /// A command: named executable snippet with body content.
    Command,
    /// A skill: prompt package with metadata and an ordered list of files.
    Skill,
}

impl ArtifactKind {
    /// The static schema for this kind.
    #[must_use]
    pub const fn schema(self) -> &'static KindSchema {
        match self {
            Self::Standard => &STANDARD,
            Self::Command => &COMMAND,
            Self::Skill => &SKILL,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Command => write!(f, "command"),
            Self::Skill => write!(f, "skill"),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema tables
// ---------------------------------------------------------------------------

/// How a scalar field's value is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// Opaque text; compared byte-for-byte.
    Text,
    /// A JSON object of string pairs; compared canonically, degraded to
    /// absent when unparsable.
    Json,
}

/// One scalar field an artifact kind carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name as it appears in proposals and snapshots.
    pub name: &'static str,
    /// Value interpretation.
    pub value_kind: ValueKind,
}

/// The child collection an artifact kind carries, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectionSpec {
    /// Collection name (display only; ops address items by id).
    pub name: &'static str,
    /// Field names a collection item carries. Draft fields outside this
    /// list are dropped on add and no-ops on update.
    pub item_fields: &'static [&'static str],
}

/// The full declarative shape of one artifact kind.
#[derive(Clone, Copy, Debug)]
pub struct KindSchema {
    /// The kind this schema describes.
    pub kind: ArtifactKind,
    /// Scalar fields, in display order.
    pub scalar_fields: &'static [FieldSpec],
    /// The child collection, if the kind has one.
    pub collection: Option<CollectionSpec>,
}

impl KindSchema {
    /// Look up a scalar field by name.
    #[must_use]
    pub fn scalar_field(&self, name: &str) -> Option<&FieldSpec> {
        self.scalar_fields.iter().find(|f| f.name == name)
    }

    /// Returns `true` if `name` is a scalar field of this kind.
    #[must_use]
    pub fn has_scalar_field(&self, name: &str) -> bool {
        self.scalar_field(name).is_some()
    }

    /// Returns `true` if `name` is a field collection items carry.
    /// Always `false` for kinds without a collection.
    #[must_use]
    pub fn item_field_allowed(&self, name: &str) -> bool {
        self.collection
            .as_ref()
            .is_some_and(|c| c.item_fields.contains(&name))
    }
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        value_kind: ValueKind::Text,
    }
}

static STANDARD: KindSchema = KindSchema {
    kind: ArtifactKind::Standard,
    scalar_fields: &[text("name"), text("description"), text("scope")],
    collection: Some(CollectionSpec {
        name: "rules",
        item_fields: &["content"],
    }),
};

static COMMAND: KindSchema = KindSchema {
    kind: ArtifactKind::Command,
    scalar_fields: &[text("name"), text("content")],
    collection: None,
};

static SKILL: KindSchema = KindSchema {
    kind: ArtifactKind::Skill,
    scalar_fields: &[
        text("name"),
        text("description"),
        text("prompt"),
        text("license"),
        text("compatibility"),
        text("allowed_tools"),
        FieldSpec {
            name: "metadata",
            value_kind: ValueKind::Json,
        },
    ],
    collection: Some(CollectionSpec {
        name: "files",
        item_fields: &["path", "content", "permissions"],
    }),
};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
