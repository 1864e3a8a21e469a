//! The projector itself: record in, flat display form out.

use cohort_core::{catalog::CodedField, record::DemographicRecord};
use serde::Serialize;

use crate::{Error, Result};

// ─── Output types ────────────────────────────────────────────────────────────

/// The flat, display-ready form of one record.
///
/// Field names and label text are a compatibility contract with existing
/// export consumers; they must not change. Serializes to a flat JSON object
/// with no nested record or participant structures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRecord {
  /// The owner's UUID in simple hex form — never an internal row identity.
  pub user: String,
  /// RFC 3339 creation timestamp.
  pub created_at: String,
  pub number_of_children: String,
  /// `%Y-%m-%d` date strings, preserving submission order.
  pub child_birthdays: Vec<String>,
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
  /// The stored ISO 3166-1 alpha-2 code, unchanged.
  pub country: String,
  pub state: String,
  pub density: String,
  /// The extension blob, passed through untouched.
  pub extra: Option<serde_json::Value>,
}

/// A coded field whose stored code is no longer in its catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedCode {
  pub field: CodedField,
  pub code:  String,
}

/// The result of projecting one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
  pub display:    DisplayRecord,
  /// Fields whose codes failed catalog lookup. For each, `display` carries
  /// the raw stored code as a sentinel instead of a label.
  pub unresolved: Vec<UnresolvedCode>,
}

// ─── Projection ──────────────────────────────────────────────────────────────

fn resolve(
  field: CodedField,
  code: &str,
  unresolved: &mut Vec<UnresolvedCode>,
) -> String {
  match field.label_for(code) {
    Ok(label) => label.to_owned(),
    Err(_) => {
      unresolved.push(UnresolvedCode {
        field,
        code: code.to_owned(),
      });
      code.to_owned()
    }
  }
}

/// Project `record` into its display form.
///
/// Never fails: a stale code renders as itself and is reported in
/// [`Projection::unresolved`], so one bad field cannot block an export run.
/// Projection is pure — calling it twice on the same record yields
/// identical output.
pub fn project(record: &DemographicRecord) -> Projection {
  let f = &record.fields;
  let mut unresolved = Vec::new();

  let display = DisplayRecord {
    user: record.participant_id.simple().to_string(),
    created_at: record.created_at.to_rfc3339(),
    number_of_children: resolve(
      CodedField::NumberOfChildren,
      &f.number_of_children,
      &mut unresolved,
    ),
    child_birthdays: f
      .child_birthdays
      .iter()
      .map(|d| d.format("%Y-%m-%d").to_string())
      .collect(),
    languages_spoken_at_home: f.languages_spoken_at_home.clone(),
    number_of_guardians: resolve(
      CodedField::NumberOfGuardians,
      &f.number_of_guardians,
      &mut unresolved,
    ),
    number_of_guardians_explanation: f.number_of_guardians_explanation.clone(),
    race_identification: resolve(
      CodedField::RaceIdentification,
      &f.race_identification,
      &mut unresolved,
    ),
    age: resolve(CodedField::Age, &f.age, &mut unresolved),
    gender: resolve(CodedField::Gender, &f.gender, &mut unresolved),
    education_level: resolve(
      CodedField::EducationLevel,
      &f.education_level,
      &mut unresolved,
    ),
    spouse_education_level: resolve(
      CodedField::SpouseEducationLevel,
      &f.spouse_education_level,
      &mut unresolved,
    ),
    annual_income: resolve(
      CodedField::AnnualIncome,
      &f.annual_income,
      &mut unresolved,
    ),
    number_of_books: f.number_of_books,
    additional_comments: f.additional_comments.clone(),
    country: f.country.clone(),
    state: resolve(CodedField::State, &f.state, &mut unresolved),
    density: resolve(CodedField::Density, &f.density, &mut unresolved),
    extra: f.extra.clone(),
  };

  Projection {
    display,
    unresolved,
  }
}

/// Like [`project`], but any stale code is a hard error
/// ([`cohort_core::Error::UnknownCode`] for the first offending field).
pub fn project_strict(record: &DemographicRecord) -> Result<DisplayRecord> {
  let projection = project(record);
  if let Some(bad) = projection.unresolved.into_iter().next() {
    return Err(Error::Core(cohort_core::Error::UnknownCode {
      field: bad.field,
      code:  bad.code,
    }));
  }
  Ok(projection.display)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
