//! Deleted-record events consumed from the deletion-capture mechanism.

use super::ParseRecordStatusError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a persisted deleted-record event.
///
/// Identifiers are assigned by the capture mechanism from a monotone
/// sequence, so batch ordering follows insertion order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Wraps a persisted identifier value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the wrapped identifier value.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Processing status of a deleted-record event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Captured but not yet cleaned up.
    Pending,
    /// Cleanup ran for every relationship of the parent table; the event is
    /// retired and never revisited.
    Processed,
}

impl RecordStatus {
    /// Returns the persisted smallint representation.
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::Pending => 1,
            Self::Processed => 2,
        }
    }
}

impl TryFrom<i16> for RecordStatus {
    type Error = ParseRecordStatusError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Pending),
            2 => Ok(Self::Processed),
            other => Err(ParseRecordStatusError(other)),
        }
    }
}

/// Primary key value(s) of a deleted parent row.
///
/// Serialises untagged so single-column keys persist as plain numbers.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(untagged)]
pub enum ParentKey {
    /// Single-column parent primary key.
    Scalar(i64),
    /// Multi-column parent primary key, in definition column order.
    Composite(Vec<i64>),
}

impl ParentKey {
    /// Returns the number of columns this key value spans.
    #[must_use]
    pub const fn arity(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Composite(values) => values.len(),
        }
    }

    /// Returns the key's column values in definition order.
    #[must_use]
    pub fn values(&self) -> &[i64] {
        match self {
            Self::Scalar(value) => std::slice::from_ref(value),
            Self::Composite(values) => values,
        }
    }
}

impl From<i64> for ParentKey {
    fn from(value: i64) -> Self {
        Self::Scalar(value)
    }
}

/// A recorded parent-row deletion awaiting downstream cleanup.
///
/// Records are created by the capture mechanism; this engine only reads
/// pending ones and transitions their status to [`RecordStatus::Processed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedRecord {
    id: RecordId,
    fully_qualified_table_name: String,
    primary_key_value: ParentKey,
    status: RecordStatus,
    created_at: DateTime<Utc>,
}

impl DeletedRecord {
    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn new(
        id: RecordId,
        fully_qualified_table_name: impl Into<String>,
        primary_key_value: impl Into<ParentKey>,
        status: RecordStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            fully_qualified_table_name: fully_qualified_table_name.into(),
            primary_key_value: primary_key_value.into(),
            status,
            created_at,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the schema-qualified name of the parent table.
    #[must_use]
    pub fn fully_qualified_table_name(&self) -> &str {
        &self.fully_qualified_table_name
    }

    /// Returns the deleted parent row's primary key value(s).
    #[must_use]
    pub const fn primary_key_value(&self) -> &ParentKey {
        &self.primary_key_value
    }

    /// Returns the processing status.
    #[must_use]
    pub const fn status(&self) -> RecordStatus {
        self.status
    }

    /// Returns true while the record still awaits cleanup.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, RecordStatus::Pending)
    }

    /// Returns the capture timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Retires the record. The transition is one-way.
    pub const fn mark_processed(&mut self) {
        self.status = RecordStatus::Processed;
    }
}
