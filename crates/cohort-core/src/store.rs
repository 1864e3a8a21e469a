//! The `DemographicStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `cohort-store-sqlite`).
//! Higher layers (`cohort-report`, `cohort-cli`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  participant::{NewOrganization, NewParticipant, Organization, Participant},
  record::{DemographicRecord, NewDemographicRecord},
};

/// Abstraction over a Cohort store backend.
///
/// Records are append-only: there is no update or delete. A resubmission is
/// a new record chained onto the old one via `previous`.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait DemographicStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Organizations ─────────────────────────────────────────────────────

  /// Create and persist a new organization.
  fn add_organization(
    &self,
    input: NewOrganization,
  ) -> impl Future<Output = Result<Organization, Self::Error>> + Send + '_;

  /// Retrieve an organization by UUID. Returns `None` if not found.
  fn get_organization(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Organization>, Self::Error>> + Send + '_;

  // ── Participants ──────────────────────────────────────────────────────

  /// Create and persist a new participant. The username is normalized
  /// before storage and must be unique.
  fn add_participant(
    &self,
    input: NewParticipant,
  ) -> impl Future<Output = Result<Participant, Self::Error>> + Send + '_;

  /// Create and persist a participant with a caller-supplied UUID.
  ///
  /// Used when importing accounts from an external identity system so the
  /// UUID matches the external one. Returns an error if the UUID is taken.
  fn add_participant_with_id(
    &self,
    id: Uuid,
    input: NewParticipant,
  ) -> impl Future<Output = Result<Participant, Self::Error>> + Send + '_;

  /// Retrieve a participant by UUID. Returns `None` if not found.
  fn get_participant(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Participant>, Self::Error>> + Send + '_;

  /// List all participants.
  fn list_participants(
    &self,
  ) -> impl Future<Output = Result<Vec<Participant>, Self::Error>> + Send + '_;

  // ── Records — append-only writes ──────────────────────────────────────

  /// Validate and persist a new demographic record.
  ///
  /// Every coded field must be a key in its catalog
  /// ([`crate::Error::InvalidFieldValue`]). The owner must exist, and
  /// `previous` (when set) must name an existing record owned by the same
  /// participant ([`crate::Error::ForeignPrevious`]). `created_at` is set
  /// by the store.
  fn create_record(
    &self,
    input: NewDemographicRecord,
  ) -> impl Future<Output = Result<DemographicRecord, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a record by UUID, failing if it does not exist.
  fn get_record(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<DemographicRecord, Self::Error>> + Send + '_;

  /// Retrieve a record by UUID. Returns `None` if not found.
  fn find_record(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<DemographicRecord>, Self::Error>> + Send + '_;

  /// The most recently created record for a participant, or `None`.
  /// Callers pass its id as `previous` on the next submission to extend
  /// the chain.
  fn latest_for(
    &self,
    participant_id: Uuid,
  ) -> impl Future<Output = Result<Option<DemographicRecord>, Self::Error>> + Send + '_;

  /// All records for a participant, newest first. Unlike chain traversal
  /// this lists every record, so forked histories are fully visible.
  fn records_for(
    &self,
    participant_id: Uuid,
  ) -> impl Future<Output = Result<Vec<DemographicRecord>, Self::Error>> + Send + '_;
}
