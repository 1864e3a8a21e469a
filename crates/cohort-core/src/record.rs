//! Demographic record types — one survey submission snapshot.
//!
//! Records are immutable once written. A resubmission creates a new record
//! whose `previous` field points at the one it supersedes, forming a
//! backward chain per participant.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, catalog::CodedField};

// ─── SurveyFields ────────────────────────────────────────────────────────────

/// The survey answers carried by every record.
///
/// Coded fields hold catalog codes, not labels; [`SurveyFields::validate`]
/// checks each against its catalog. Free-form fields are stored as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyFields {
  pub number_of_children: String,
  /// Birthdays of the participant's children, in the order entered.
  pub child_birthdays: Vec<NaiveDate>,
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
  /// ISO 3166-1 alpha-2 country code.
  pub country: String,
  /// USPS state code, or `XX` when none was selected.
  pub state: String,
  pub density: String,
  /// Open-ended extension blob; opaque to the store and the projector.
  #[serde(default)]
  pub extra: Option<serde_json::Value>,
}

impl SurveyFields {
  /// Every coded field paired with its stored code.
  pub fn coded_values(&self) -> [(CodedField, &str); 10] {
    [
      (CodedField::NumberOfChildren, &self.number_of_children),
      (CodedField::NumberOfGuardians, &self.number_of_guardians),
      (CodedField::RaceIdentification, &self.race_identification),
      (CodedField::Age, &self.age),
      (CodedField::Gender, &self.gender),
      (CodedField::EducationLevel, &self.education_level),
      (CodedField::SpouseEducationLevel, &self.spouse_education_level),
      (CodedField::AnnualIncome, &self.annual_income),
      (CodedField::State, &self.state),
      (CodedField::Density, &self.density),
    ]
  }

  /// Check every coded field against its catalog. Fails with
  /// [`Error::InvalidFieldValue`] naming the first offending field.
  pub fn validate(&self) -> Result<()> {
    for (field, value) in self.coded_values() {
      if !field.contains(value) {
        return Err(Error::InvalidFieldValue {
          field,
          value: value.to_owned(),
        });
      }
    }
    Ok(())
  }
}

// ─── DemographicRecord ───────────────────────────────────────────────────────

/// One persisted survey submission. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicRecord {
  pub record_id:      Uuid,
  /// The owning participant.
  pub participant_id: Uuid,
  /// The record this one supersedes, if any. Always owned by the same
  /// participant.
  pub previous:       Option<Uuid>,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at:     DateTime<Utc>,
  #[serde(flatten)]
  pub fields:         SurveyFields,
}

// ─── NewDemographicRecord ────────────────────────────────────────────────────

/// Input to [`crate::store::DemographicStore::create_record`].
/// `record_id` and `created_at` are always set by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDemographicRecord {
  pub participant_id: Uuid,
  pub previous:       Option<Uuid>,
  #[serde(flatten)]
  pub fields:         SurveyFields,
}

impl NewDemographicRecord {
  pub fn new(participant_id: Uuid, fields: SurveyFields) -> Self {
    Self {
      participant_id,
      previous: None,
      fields,
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn fields() -> SurveyFields {
    SurveyFields {
      number_of_children: "2".into(),
      child_birthdays: vec![
        NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(1992, 6, 15).unwrap(),
      ],
      languages_spoken_at_home: "English".into(),
      number_of_guardians: "2".into(),
      number_of_guardians_explanation: String::new(),
      race_identification: "white".into(),
      age: "30-34".into(),
      gender: "f".into(),
      education_level: "bach".into(),
      spouse_education_level: "na".into(),
      annual_income: "50000".into(),
      number_of_books: 75,
      additional_comments: String::new(),
      country: "US".into(),
      state: "MA".into(),
      density: "urban".into(),
      extra: None,
    }
  }

  #[test]
  fn valid_fields_pass() {
    fields().validate().unwrap();
  }

  #[test]
  fn unrecognized_gender_is_rejected() {
    let mut f = fields();
    f.gender = "xx".into();
    let err = f.validate().unwrap_err();
    assert!(matches!(
      err,
      Error::InvalidFieldValue { field: CodedField::Gender, ref value } if value == "xx"
    ));
  }

  #[test]
  fn unrecognized_state_is_rejected() {
    let mut f = fields();
    f.state = "ZZ".into();
    assert!(matches!(
      f.validate().unwrap_err(),
      Error::InvalidFieldValue { field: CodedField::State, .. }
    ));
  }

  #[test]
  fn survey_fields_roundtrip_through_json() {
    let f = fields();
    let json = serde_json::to_string(&f).unwrap();
    let back: SurveyFields = serde_json::from_str(&json).unwrap();
    assert_eq!(back, f);
  }
}
