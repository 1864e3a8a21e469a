//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings and UUIDs as hyphenated
//! lowercase strings. The birthday array and the extension blob are stored as
//! compact JSON.

use chrono::{DateTime, NaiveDate, Utc};
use cohort_core::{
  participant::{Organization, Participant},
  record::{DemographicRecord, SurveyFields},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Birthday array ──────────────────────────────────────────────────────────

pub fn encode_birthdays(dates: &[NaiveDate]) -> Result<String> {
  Ok(serde_json::to_string(dates)?)
}

pub fn decode_birthdays(s: &str) -> Result<Vec<NaiveDate>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Extension blob ──────────────────────────────────────────────────────────

pub fn encode_extra(extra: Option<&serde_json::Value>) -> Result<Option<String>> {
  extra.map(|v| serde_json::to_string(v).map_err(Error::Json)).transpose()
}

pub fn decode_extra(s: Option<&str>) -> Result<Option<serde_json::Value>> {
  s.map(|v| serde_json::from_str(v).map_err(Error::Json)).transpose()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `organizations` row.
pub struct RawOrganization {
  pub organization_id: String,
  pub created_at:      String,
  pub name:            String,
  pub url:             String,
}

impl RawOrganization {
  pub fn into_organization(self) -> Result<Organization> {
    Ok(Organization {
      organization_id: decode_uuid(&self.organization_id)?,
      created_at:      decode_dt(&self.created_at)?,
      name:            self.name,
      url:             self.url,
    })
  }
}

/// Raw strings read directly from a `participants` row.
pub struct RawParticipant {
  pub participant_id:  String,
  pub created_at:      String,
  pub username:        String,
  pub given_name:      String,
  pub middle_name:     String,
  pub family_name:     String,
  pub organization_id: Option<String>,
  pub is_active:       bool,
}

impl RawParticipant {
  pub fn into_participant(self) -> Result<Participant> {
    Ok(Participant {
      participant_id:  decode_uuid(&self.participant_id)?,
      created_at:      decode_dt(&self.created_at)?,
      username:        self.username,
      given_name:      self.given_name,
      middle_name:     self.middle_name,
      family_name:     self.family_name,
      organization_id: self
        .organization_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      is_active:       self.is_active,
    })
  }
}

/// Raw strings read directly from a `demographic_records` row.
pub struct RawRecord {
  pub record_id:      String,
  pub participant_id: String,
  pub previous_id:    Option<String>,
  pub created_at:     String,

  pub number_of_children: String,
  pub child_birthdays: String,
  pub languages_spoken_at_home: String,
  pub number_of_guardians: String,
  pub number_of_guardians_explanation: String,
  pub race_identification: String,
  pub age: String,
  pub gender: String,
  pub education_level: String,
  pub spouse_education_level: String,
  pub annual_income: String,
  pub number_of_books: i64,
  pub additional_comments: String,
  pub country: String,
  pub state: String,
  pub density: String,
  pub extra: Option<String>,
}

impl RawRecord {
  pub fn into_record(self) -> Result<DemographicRecord> {
    Ok(DemographicRecord {
      record_id:      decode_uuid(&self.record_id)?,
      participant_id: decode_uuid(&self.participant_id)?,
      previous:       self.previous_id.as_deref().map(decode_uuid).transpose()?,
      created_at:     decode_dt(&self.created_at)?,
      fields:         SurveyFields {
        number_of_children: self.number_of_children,
        child_birthdays: decode_birthdays(&self.child_birthdays)?,
        languages_spoken_at_home: self.languages_spoken_at_home,
        number_of_guardians: self.number_of_guardians,
        number_of_guardians_explanation: self.number_of_guardians_explanation,
        race_identification: self.race_identification,
        age: self.age,
        gender: self.gender,
        education_level: self.education_level,
        spouse_education_level: self.spouse_education_level,
        annual_income: self.annual_income,
        number_of_books: self.number_of_books,
        additional_comments: self.additional_comments,
        country: self.country,
        state: self.state,
        density: self.density,
        extra: decode_extra(self.extra.as_deref())?,
      },
    })
  }
}
