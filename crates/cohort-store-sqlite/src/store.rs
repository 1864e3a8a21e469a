//! [`SqliteStore`] — the SQLite implementation of [`DemographicStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use cohort_core::{
  participant::{
    NewOrganization, NewParticipant, Organization, Participant,
    normalize_username,
  },
  record::{DemographicRecord, NewDemographicRecord},
  store::DemographicStore,
};

use crate::{
  Error, Result,
  encode::{
    RawOrganization, RawParticipant, RawRecord, encode_birthdays, encode_dt,
    encode_extra, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Row helpers ─────────────────────────────────────────────────────────────

const RECORD_COLUMNS: &str = "record_id, participant_id, previous_id, created_at, \
   number_of_children, child_birthdays, languages_spoken_at_home, \
   number_of_guardians, number_of_guardians_explanation, race_identification, \
   age, gender, education_level, spouse_education_level, annual_income, \
   number_of_books, additional_comments, country, state, density, extra";

fn raw_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
  Ok(RawRecord {
    record_id:      row.get(0)?,
    participant_id: row.get(1)?,
    previous_id:    row.get(2)?,
    created_at:     row.get(3)?,
    number_of_children: row.get(4)?,
    child_birthdays: row.get(5)?,
    languages_spoken_at_home: row.get(6)?,
    number_of_guardians: row.get(7)?,
    number_of_guardians_explanation: row.get(8)?,
    race_identification: row.get(9)?,
    age: row.get(10)?,
    gender: row.get(11)?,
    education_level: row.get(12)?,
    spouse_education_level: row.get(13)?,
    annual_income: row.get(14)?,
    number_of_books: row.get(15)?,
    additional_comments: row.get(16)?,
    country: row.get(17)?,
    state: row.get(18)?,
    density: row.get(19)?,
    extra: row.get(20)?,
  })
}

fn raw_participant(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawParticipant> {
  Ok(RawParticipant {
    participant_id:  row.get(0)?,
    created_at:      row.get(1)?,
    username:        row.get(2)?,
    given_name:      row.get(3)?,
    middle_name:     row.get(4)?,
    family_name:     row.get(5)?,
    organization_id: row.get(6)?,
    is_active:       row.get(7)?,
  })
}

const PARTICIPANT_COLUMNS: &str = "participant_id, created_at, username, \
   given_name, middle_name, family_name, organization_id, is_active";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Cohort store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a fully-built [`Participant`] row.
  async fn insert_participant(&self, participant: &Participant) -> Result<()> {
    let id_str     = encode_uuid(participant.participant_id);
    let at_str     = encode_dt(participant.created_at);
    let username   = participant.username.clone();
    let given      = participant.given_name.clone();
    let middle     = participant.middle_name.clone();
    let family     = participant.family_name.clone();
    let org_str    = participant.organization_id.map(encode_uuid);
    let is_active  = participant.is_active;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO participants (
             participant_id, created_at, username,
             given_name, middle_name, family_name,
             organization_id, is_active
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str, at_str, username, given, middle, family, org_str, is_active,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Check that a participant row exists.
  async fn participant_exists(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM participants WHERE participant_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  /// The owner of a record, if the record exists.
  async fn record_owner(&self, id: Uuid) -> Result<Option<Uuid>> {
    let id_str = encode_uuid(id);
    let owner_str: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT participant_id FROM demographic_records WHERE record_id = ?1",
              rusqlite::params![id_str],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    owner_str
      .map(|s| Uuid::parse_str(&s))
      .transpose()
      .map_err(Error::Uuid)
  }

  /// Insert a fully-built [`DemographicRecord`] into `demographic_records`.
  async fn insert_record(&self, record: &DemographicRecord) -> Result<()> {
    let record_id_str      = encode_uuid(record.record_id);
    let participant_id_str = encode_uuid(record.participant_id);
    let previous_str       = record.previous.map(encode_uuid);
    let created_at_str     = encode_dt(record.created_at);
    let birthdays_str      = encode_birthdays(&record.fields.child_birthdays)?;
    let extra_str          = encode_extra(record.fields.extra.as_ref())?;
    let f                  = record.fields.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO demographic_records (
             record_id, participant_id, previous_id, created_at,
             number_of_children, child_birthdays, languages_spoken_at_home,
             number_of_guardians, number_of_guardians_explanation,
             race_identification, age, gender, education_level,
             spouse_education_level, annual_income, number_of_books,
             additional_comments, country, state, density, extra
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
          rusqlite::params![
            record_id_str,
            participant_id_str,
            previous_str,
            created_at_str,
            f.number_of_children,
            birthdays_str,
            f.languages_spoken_at_home,
            f.number_of_guardians,
            f.number_of_guardians_explanation,
            f.race_identification,
            f.age,
            f.gender,
            f.education_level,
            f.spouse_education_level,
            f.annual_income,
            f.number_of_books,
            f.additional_comments,
            f.country,
            f.state,
            f.density,
            extra_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── DemographicStore impl ───────────────────────────────────────────────────

impl DemographicStore for SqliteStore {
  type Error = Error;

  // ── Organizations ─────────────────────────────────────────────────────────

  async fn add_organization(
    &self,
    input: NewOrganization,
  ) -> Result<Organization> {
    let organization = Organization {
      organization_id: Uuid::new_v4(),
      created_at:      Utc::now(),
      name:            input.name,
      url:             input.url,
    };

    let id_str = encode_uuid(organization.organization_id);
    let at_str = encode_dt(organization.created_at);
    let name   = organization.name.clone();
    let url    = organization.url.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO organizations (organization_id, created_at, name, url)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, at_str, name, url],
        )?;
        Ok(())
      })
      .await?;

    Ok(organization)
  }

  async fn get_organization(&self, id: Uuid) -> Result<Option<Organization>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawOrganization> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT organization_id, created_at, name, url
               FROM organizations WHERE organization_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawOrganization {
                  organization_id: row.get(0)?,
                  created_at:      row.get(1)?,
                  name:            row.get(2)?,
                  url:             row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawOrganization::into_organization).transpose()
  }

  // ── Participants ──────────────────────────────────────────────────────────

  async fn add_participant(&self, input: NewParticipant) -> Result<Participant> {
    self.add_participant_with_id(Uuid::new_v4(), input).await
  }

  async fn add_participant_with_id(
    &self,
    id: Uuid,
    input: NewParticipant,
  ) -> Result<Participant> {
    let participant = Participant {
      participant_id:  id,
      created_at:      Utc::now(),
      username:        normalize_username(&input.username)?,
      given_name:      input.given_name,
      middle_name:     input.middle_name,
      family_name:     input.family_name,
      organization_id: input.organization_id,
      is_active:       false,
    };

    if let Some(org_id) = participant.organization_id
      && self.get_organization(org_id).await?.is_none()
    {
      return Err(cohort_core::Error::OrganizationNotFound(org_id).into());
    }

    self.insert_participant(&participant).await?;
    Ok(participant)
  }

  async fn get_participant(&self, id: Uuid) -> Result<Option<Participant>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawParticipant> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PARTICIPANT_COLUMNS} FROM participants
                 WHERE participant_id = ?1"
              ),
              rusqlite::params![id_str],
              raw_participant,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawParticipant::into_participant).transpose()
  }

  async fn list_participants(&self) -> Result<Vec<Participant>> {
    let raws: Vec<RawParticipant> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PARTICIPANT_COLUMNS} FROM participants ORDER BY created_at"
        ))?;
        let rows = stmt
          .query_map([], raw_participant)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawParticipant::into_participant)
      .collect()
  }

  // ── Records — append-only writes ──────────────────────────────────────────

  async fn create_record(
    &self,
    input: NewDemographicRecord,
  ) -> Result<DemographicRecord> {
    // Catalog membership is enforced here, before anything touches disk.
    input.fields.validate()?;

    if !self.participant_exists(input.participant_id).await? {
      return Err(
        cohort_core::Error::ParticipantNotFound(input.participant_id).into(),
      );
    }

    // `previous` must exist and belong to the same participant. A record
    // that already has a successor is a legal `previous`: forked histories
    // are permitted.
    if let Some(previous_id) = input.previous {
      match self.record_owner(previous_id).await? {
        None => {
          return Err(cohort_core::Error::RecordNotFound(previous_id).into());
        }
        Some(owner) if owner != input.participant_id => {
          return Err(
            cohort_core::Error::ForeignPrevious {
              record_id: previous_id,
              owner,
              expected: input.participant_id,
            }
            .into(),
          );
        }
        Some(_) => {}
      }
    }

    let record = DemographicRecord {
      record_id:      Uuid::new_v4(),
      participant_id: input.participant_id,
      previous:       input.previous,
      created_at:     Utc::now(),
      fields:         input.fields,
    };

    self.insert_record(&record).await?;
    Ok(record)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_record(&self, id: Uuid) -> Result<DemographicRecord> {
    self
      .find_record(id)
      .await?
      .ok_or_else(|| cohort_core::Error::RecordNotFound(id).into())
  }

  async fn find_record(&self, id: Uuid) -> Result<Option<DemographicRecord>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {RECORD_COLUMNS} FROM demographic_records
                 WHERE record_id = ?1"
              ),
              rusqlite::params![id_str],
              raw_record,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn latest_for(
    &self,
    participant_id: Uuid,
  ) -> Result<Option<DemographicRecord>> {
    let id_str = encode_uuid(participant_id);

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {RECORD_COLUMNS} FROM demographic_records
                 WHERE participant_id = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT 1"
              ),
              rusqlite::params![id_str],
              raw_record,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn records_for(
    &self,
    participant_id: Uuid,
  ) -> Result<Vec<DemographicRecord>> {
    let id_str = encode_uuid(participant_id);

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECORD_COLUMNS} FROM demographic_records
           WHERE participant_id = ?1
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], raw_record)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }
}
