//! Core identifier types for the review engine.
//!
//! Foundation types used throughout the crate: proposal identifiers, artifact
//! identifiers, user identifiers, collection-item identifiers (including the
//! temporary-id scheme for items added within a fold), and artifact versions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum length of any identifier string.
const MAX_ID_LEN: usize = 128;

/// Shared validation for identifier strings: non-empty, bounded length,
/// no whitespace or control characters.
fn validate_id(kind: ErrorKind, s: &str) -> Result<(), ValidationError> {
    if s.is_empty() {
        return Err(ValidationError {
            kind,
            value: s.to_owned(),
            reason: "identifier must not be empty".to_owned(),
        });
    }
    if s.len() > MAX_ID_LEN {
        return Err(ValidationError {
            kind,
            value: s.to_owned(),
            reason: format!(
                "identifier must be at most {MAX_ID_LEN} characters, got {}",
                s.len()
            ),
        });
    }
    if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError {
            kind,
            value: s.to_owned(),
            reason: "identifier must not contain whitespace or control characters".to_owned(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ProposalId
// ---------------------------------------------------------------------------

/// A validated change-proposal identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProposalId(String);

impl ProposalId {
    /// Create a new `ProposalId` from a string, validating format.
    ///
    /// # Errors
    /// Returns an error if the string is empty, too long, or contains
    /// whitespace or control characters.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        validate_id(ErrorKind::ProposalId, s)?;
        Ok(Self(s.to_owned()))
    }

    /// Return the identifier as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProposalId {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ProposalId {
    type Error = ValidationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        validate_id(ErrorKind::ProposalId, &s)?;
        Ok(Self(s))
    }
}

impl From<ProposalId> for String {
    fn from(id: ProposalId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// ArtefactId
// ---------------------------------------------------------------------------

/// A validated artifact identifier — the document a proposal targets.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtefactId(String);

impl ArtefactId {
    /// Create a new `ArtefactId` from a string, validating format.
    ///
    /// # Errors
    /// Returns an error if the string is empty, too long, or contains
    /// whitespace or control characters.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        validate_id(ErrorKind::ArtefactId, s)?;
        Ok(Self(s.to_owned()))
    }

    /// Return the identifier as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtefactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ArtefactId {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ArtefactId {
    type Error = ValidationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        validate_id(ErrorKind::ArtefactId, &s)?;
        Ok(Self(s))
    }
}

impl From<ArtefactId> for String {
    fn from(id: ArtefactId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// A validated user identifier — who authored or resolved a proposal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new `UserId` from a string, validating format.
    ///
    /// # Errors
    /// Returns an error if the string is empty, too long, or contains
    /// whitespace or control characters.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        validate_id(ErrorKind::UserId, s)?;
        Ok(Self(s.to_owned()))
    }

    /// Return the identifier as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = ValidationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        validate_id(ErrorKind::UserId, &s)?;
        Ok(Self(s))
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// ItemId
// ---------------------------------------------------------------------------

/// Prefix marking an item created by a proposal within the current fold,
/// before the authoritative store has assigned it a real identity.
const TEMP_PREFIX: &str = "temp:";

/// A validated collection-item identifier.
///
/// Items added by a proposal carry a temporary id derived from the creating
/// proposal (`temp:<proposal-id>`) until a commit assigns a real one. A later
/// delete targeting the temporary id cancels the add within the same fold.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Create a new `ItemId` from a string, validating format.
    ///
    /// Temporary ids (`temp:<proposal-id>`) are accepted; the part after the
    /// prefix is validated as an identifier.
    ///
    /// # Errors
    /// Returns an error if the string (or the part after `temp:`) is empty,
    /// too long, or contains whitespace or control characters.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        Self::validate(s)?;
        Ok(Self(s.to_owned()))
    }

    /// Construct the temporary id for an item added by `proposal`.
    #[must_use]
    pub fn temporary(proposal: &ProposalId) -> Self {
        Self(format!("{TEMP_PREFIX}{proposal}"))
    }

    /// Returns `true` if this is a temporary id assigned within a fold.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_PREFIX)
    }

    /// Return the identifier as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), ValidationError> {
        match s.strip_prefix(TEMP_PREFIX) {
            Some(rest) => validate_id(ErrorKind::ItemId, rest).map_err(|mut e| {
                e.value = s.to_owned();
                e
            }),
            None => validate_id(ErrorKind::ItemId, s),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemId {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ItemId {
    type Error = ValidationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// ArtefactVersion
// ---------------------------------------------------------------------------

/// A monotonically increasing artifact version number.
///
/// Every successful commit that changes content advances the version by one.
/// Proposals record the version they were drafted against; a mismatch against
/// the current version marks the proposal as potentially outdated.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ArtefactVersion(u64);

impl ArtefactVersion {
    /// Create a version from a raw number.
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    /// The raw version number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The next version (current + 1).
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ArtefactVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u64> for ArtefactVersion {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// The kind of value that failed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A [`ProposalId`] validation error.
    ProposalId,
    /// An [`ArtefactId`] validation error.
    ArtefactId,
    /// A [`UserId`] validation error.
    UserId,
    /// An [`ItemId`] validation error.
    ItemId,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProposalId => write!(f, "ProposalId"),
            Self::ArtefactId => write!(f, "ArtefactId"),
            Self::UserId => write!(f, "UserId"),
            Self::ItemId => write!(f, "ItemId"),
        }
    }
}

/// A validation error for review-engine core types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    /// What kind of value was being validated.
    pub kind: ErrorKind,
    /// The invalid value.
    pub value: String,
    /// Human-readable explanation.
    pub reason: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {}: {:?} — {}",
            self.kind, self.value, self.reason
        )
    }
}

impl std::error::Error for ValidationError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
