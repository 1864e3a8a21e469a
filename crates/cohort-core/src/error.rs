//! Error types for `cohort-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::catalog::CodedField;

#[derive(Debug, Error)]
pub enum Error {
  #[error("organization not found: {0}")]
  OrganizationNotFound(Uuid),

  #[error("participant not found: {0}")]
  ParticipantNotFound(Uuid),

  #[error("record not found: {0}")]
  RecordNotFound(Uuid),

  #[error("participants must have a username")]
  EmptyUsername,

  /// A coded field carries a value that is not in its catalog.
  /// Raised at write time; the record is not persisted.
  #[error("invalid value {value:?} for field {field}")]
  InvalidFieldValue { field: CodedField, value: String },

  /// A stored code is no longer in its catalog. Raised at read time.
  #[error("unknown code {code:?} for field {field}")]
  UnknownCode { field: CodedField, code: String },

  /// `previous` points at a record owned by a different participant.
  #[error("record {record_id} belongs to participant {owner}, expected {expected}")]
  ForeignPrevious {
    record_id: Uuid,
    owner:     Uuid,
    expected:  Uuid,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
