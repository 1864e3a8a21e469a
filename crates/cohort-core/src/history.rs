//! Lazy traversal of a participant's record chain.
//!
//! A [`History`] cursor walks `previous` links from newest to oldest, one
//! record per call, so consumers can stop early without paying for the whole
//! chain. Traversal is read-only; abandoning a cursor has no side effects.
//!
//! The store validates chain links at write time, but the cursor re-checks
//! them anyway: data written out-of-band can still contain cycles, dangling
//! links, or links that cross participants.

use std::collections::HashSet;

use thiserror::Error;
use uuid::Uuid;

use crate::{record::DemographicRecord, store::DemographicStore};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A chain traversal failure. `E` is the backend's error type.
#[derive(Debug, Error)]
pub enum ChainError<E: std::error::Error> {
  #[error("store error: {0}")]
  Store(#[source] E),

  /// A `previous` link led back to a record already visited.
  #[error("history chain cycles back to record {record_id}")]
  Cycle { record_id: Uuid },

  /// A `previous` link crossed into another participant's records.
  #[error("record {record_id} belongs to participant {owner}, expected {expected}")]
  ForeignOwner {
    record_id: Uuid,
    owner:     Uuid,
    expected:  Uuid,
  },

  /// A `previous` link names a record that does not exist.
  #[error("chained record {record_id} does not exist")]
  MissingRecord { record_id: Uuid },
}

pub type ChainResult<T, E> = Result<T, ChainError<E>>;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// A lazy cursor over one backward chain of records.
pub struct History<'a, S: DemographicStore> {
  store: &'a S,
  owner: Uuid,
  next:  Option<Uuid>,
  seen:  HashSet<Uuid>,
}

impl<'a, S: DemographicStore> History<'a, S> {
  /// The next record in the chain (newest to oldest), or `None` once the
  /// chain ends.
  pub async fn next_record(
    &mut self,
  ) -> ChainResult<Option<DemographicRecord>, S::Error> {
    let Some(record_id) = self.next else {
      return Ok(None);
    };

    if !self.seen.insert(record_id) {
      return Err(ChainError::Cycle { record_id });
    }

    let record = self
      .store
      .find_record(record_id)
      .await
      .map_err(ChainError::Store)?
      .ok_or(ChainError::MissingRecord { record_id })?;

    if record.participant_id != self.owner {
      return Err(ChainError::ForeignOwner {
        record_id,
        owner: record.participant_id,
        expected: self.owner,
      });
    }

    self.next = record.previous;
    Ok(Some(record))
  }

  /// Drain the cursor into a vector, newest first.
  pub async fn collect(mut self) -> ChainResult<Vec<DemographicRecord>, S::Error> {
    let mut records = Vec::new();
    while let Some(record) = self.next_record().await? {
      records.push(record);
    }
    Ok(records)
  }
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// A cursor over `participant_id`'s chain, starting at their latest record.
/// The cursor is empty if the participant has no records.
pub async fn history_for<S>(
  store: &S,
  participant_id: Uuid,
) -> ChainResult<History<'_, S>, S::Error>
where
  S: DemographicStore,
{
  let latest = store
    .latest_for(participant_id)
    .await
    .map_err(ChainError::Store)?;

  Ok(History {
    store,
    owner: participant_id,
    next: latest.map(|r| r.record_id),
    seen: HashSet::new(),
  })
}

/// A cursor starting at an explicit record — the entry point for walking a
/// forked chain from a tip other than `latest_for`'s.
pub async fn history_from<S>(
  store: &S,
  record_id: Uuid,
) -> ChainResult<History<'_, S>, S::Error>
where
  S: DemographicStore,
{
  let record = store
    .find_record(record_id)
    .await
    .map_err(ChainError::Store)?
    .ok_or(ChainError::MissingRecord { record_id })?;

  Ok(History {
    store,
    owner: record.participant_id,
    next: Some(record.record_id),
    seen: HashSet::new(),
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use chrono::{NaiveDate, TimeZone, Utc};

  use super::*;
  use crate::{
    Error,
    participant::{NewOrganization, NewParticipant, Organization, Participant},
    record::{NewDemographicRecord, SurveyFields},
  };

  /// Map-backed store exposing only what traversal needs; every other
  /// method is unreachable in these tests.
  struct MapStore {
    records: HashMap<Uuid, DemographicRecord>,
  }

  impl DemographicStore for MapStore {
    type Error = Error;

    async fn add_organization(
      &self,
      _input: NewOrganization,
    ) -> Result<Organization, Error> {
      unimplemented!()
    }

    async fn get_organization(
      &self,
      _id: Uuid,
    ) -> Result<Option<Organization>, Error> {
      unimplemented!()
    }

    async fn add_participant(
      &self,
      _input: NewParticipant,
    ) -> Result<Participant, Error> {
      unimplemented!()
    }

    async fn add_participant_with_id(
      &self,
      _id: Uuid,
      _input: NewParticipant,
    ) -> Result<Participant, Error> {
      unimplemented!()
    }

    async fn get_participant(
      &self,
      _id: Uuid,
    ) -> Result<Option<Participant>, Error> {
      unimplemented!()
    }

    async fn list_participants(&self) -> Result<Vec<Participant>, Error> {
      unimplemented!()
    }

    async fn create_record(
      &self,
      _input: NewDemographicRecord,
    ) -> Result<DemographicRecord, Error> {
      unimplemented!()
    }

    async fn get_record(&self, id: Uuid) -> Result<DemographicRecord, Error> {
      self.find_record(id).await?.ok_or(Error::RecordNotFound(id))
    }

    async fn find_record(
      &self,
      id: Uuid,
    ) -> Result<Option<DemographicRecord>, Error> {
      Ok(self.records.get(&id).cloned())
    }

    async fn latest_for(
      &self,
      participant_id: Uuid,
    ) -> Result<Option<DemographicRecord>, Error> {
      Ok(
        self
          .records
          .values()
          .filter(|r| r.participant_id == participant_id)
          .max_by_key(|r| r.created_at)
          .cloned(),
      )
    }

    async fn records_for(
      &self,
      _participant_id: Uuid,
    ) -> Result<Vec<DemographicRecord>, Error> {
      unimplemented!()
    }
  }

  fn fields() -> SurveyFields {
    SurveyFields {
      number_of_children: "0".into(),
      child_birthdays: vec![NaiveDate::from_ymd_opt(2015, 3, 9).unwrap()],
      languages_spoken_at_home: "English".into(),
      number_of_guardians: "2".into(),
      number_of_guardians_explanation: String::new(),
      race_identification: "asian".into(),
      age: "25-29".into(),
      gender: "m".into(),
      education_level: "grad".into(),
      spouse_education_level: "bach".into(),
      annual_income: "90000".into(),
      number_of_books: 12,
      additional_comments: String::new(),
      country: "US".into(),
      state: "CA".into(),
      density: "suburban".into(),
      extra: None,
    }
  }

  fn record(
    owner: Uuid,
    previous: Option<Uuid>,
    minute: u32,
  ) -> DemographicRecord {
    DemographicRecord {
      record_id: Uuid::new_v4(),
      participant_id: owner,
      previous,
      created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
      fields: fields(),
    }
  }

  fn store_of(records: &[&DemographicRecord]) -> MapStore {
    MapStore {
      records: records
        .iter()
        .map(|r| (r.record_id, (*r).clone()))
        .collect(),
    }
  }

  #[tokio::test]
  async fn empty_history_for_unknown_participant() {
    let store = MapStore { records: HashMap::new() };
    let mut history = history_for(&store, Uuid::new_v4()).await.unwrap();
    assert!(history.next_record().await.unwrap().is_none());
  }

  #[tokio::test]
  async fn chain_yields_newest_to_oldest() {
    let owner = Uuid::new_v4();
    let a = record(owner, None, 0);
    let b = record(owner, Some(a.record_id), 1);
    let c = record(owner, Some(b.record_id), 2);
    let store = store_of(&[&a, &b, &c]);

    let history = history_for(&store, owner).await.unwrap();
    let records = history.collect().await.unwrap();

    let ids: Vec<_> = records.iter().map(|r| r.record_id).collect();
    assert_eq!(ids, vec![c.record_id, b.record_id, a.record_id]);
    assert!(records.last().unwrap().previous.is_none());
    assert!(
      records.windows(2).all(|w| w[0].created_at > w[1].created_at),
      "creation order must be strictly descending"
    );
  }

  #[tokio::test]
  async fn cursor_can_be_abandoned_mid_chain() {
    let owner = Uuid::new_v4();
    let a = record(owner, None, 0);
    let b = record(owner, Some(a.record_id), 1);
    let store = store_of(&[&a, &b]);

    let mut history = history_for(&store, owner).await.unwrap();
    let first = history.next_record().await.unwrap().unwrap();
    assert_eq!(first.record_id, b.record_id);
    drop(history);
  }

  #[tokio::test]
  async fn history_from_walks_a_fork_tip() {
    let owner = Uuid::new_v4();
    let a = record(owner, None, 0);
    // Two records fork off the same parent; latest_for sees only `c`.
    let b = record(owner, Some(a.record_id), 1);
    let c = record(owner, Some(a.record_id), 2);
    let store = store_of(&[&a, &b, &c]);

    let from_b = history_from(&store, b.record_id)
      .await
      .unwrap()
      .collect()
      .await
      .unwrap();
    let ids: Vec<_> = from_b.iter().map(|r| r.record_id).collect();
    assert_eq!(ids, vec![b.record_id, a.record_id]);

    let from_latest = history_for(&store, owner)
      .await
      .unwrap()
      .collect()
      .await
      .unwrap();
    assert_eq!(from_latest[0].record_id, c.record_id);
  }

  #[tokio::test]
  async fn cycle_is_detected() {
    let owner = Uuid::new_v4();
    let mut a = record(owner, None, 0);
    let b = record(owner, Some(a.record_id), 1);
    a.previous = Some(b.record_id);
    let store = store_of(&[&a, &b]);

    let err = history_from(&store, b.record_id)
      .await
      .unwrap()
      .collect()
      .await
      .unwrap_err();
    assert!(matches!(err, ChainError::Cycle { record_id } if record_id == b.record_id));
  }

  #[tokio::test]
  async fn cross_owner_link_is_rejected() {
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let theirs = record(stranger, None, 0);
    let mine = record(owner, Some(theirs.record_id), 1);
    let store = store_of(&[&theirs, &mine]);

    let err = history_from(&store, mine.record_id)
      .await
      .unwrap()
      .collect()
      .await
      .unwrap_err();
    assert!(matches!(
      err,
      ChainError::ForeignOwner { record_id, owner: o, expected }
        if record_id == theirs.record_id && o == stranger && expected == owner
    ));
  }

  #[tokio::test]
  async fn dangling_link_is_rejected() {
    let owner = Uuid::new_v4();
    let orphan = record(owner, Some(Uuid::new_v4()), 0);
    let store = store_of(&[&orphan]);

    let err = history_from(&store, orphan.record_id)
      .await
      .unwrap()
      .collect()
      .await
      .unwrap_err();
    assert!(matches!(err, ChainError::MissingRecord { .. }));
  }
}
