//! The Enumeration Catalog — fixed `(code, label)` tables for every coded
//! survey field.
//!
//! Codes are the stable wire/storage form; labels are the human-readable
//! display form. Both are reproduced verbatim from the survey definition so
//! that previously exported data stays byte-compatible. Tables are `'static`
//! and never change at runtime.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An ordered code → label table.
pub type Catalog = &'static [(&'static str, &'static str)];

// ─── Tables ──────────────────────────────────────────────────────────────────

pub const RACE: Catalog = &[
  ("white", "White"),
  ("hisp", "Hispanic, Latino, or Spanish origin"),
  ("black", "Black or African American"),
  ("asian", "Asian"),
  ("native", "American Indian or Alaska Native"),
  ("mideast-naf", "Middle Eastern or North African"),
  ("hawaiian-pac-isl", "Native Hawaiian or Other Pacific Islander"),
  ("other", "Another race, ethnicity, or origin"),
];

pub const GENDER: Catalog = &[
  ("m", "male"),
  ("f", "female"),
  ("o", "other"),
  ("na", "prefer not to answer"),
];

pub const EDUCATION: Catalog = &[
  ("some", "some or attending high school"),
  ("hs", "high school diploma or GED"),
  ("col", "some or attending college"),
  ("assoc", "2-year college degree"),
  ("bach", "4-year college degree"),
  ("grad", "some or attending graduate or professional school"),
  ("prof", "graduate or professional degree"),
];

pub const SPOUSE_EDUCATION: Catalog = &[
  ("some", "some or attending high school"),
  ("hs", "high school diploma or GED"),
  ("col", "some or attending college"),
  ("assoc", "2-year college degree"),
  ("bach", "4-year college degree"),
  ("grad", "some or attending graduate or professional school"),
  ("prof", "graduate or professional degree"),
  ("na", "not applicable - no spouse or partner"),
];

pub const NUMBER_OF_CHILDREN: Catalog = &[
  ("0", "0"),
  ("1", "1"),
  ("2", "2"),
  ("3", "3"),
  ("4", "4"),
  ("5", "5"),
  ("6", "6"),
  ("7", "7"),
  ("8", "8"),
  ("9", "9"),
  ("10", "10"),
  (">10", "More than 10"),
];

// The "45-59" code is labelled "45-49" in the survey definition. The mismatch
// is load-bearing: exported labels must match what consumers already hold.
pub const AGE: Catalog = &[
  ("<18", "under 18"),
  ("18-21", "18-21"),
  ("22-24", "22-24"),
  ("25-29", "25-29"),
  ("30-34", "30-34"),
  ("35-39", "35-39"),
  ("40-44", "40-44"),
  ("45-59", "45-49"),
  ("50s", "50-59"),
  ("60s", "60-69"),
  (">70", "70 or over"),
];

pub const GUARDIANS: Catalog = &[
  ("1", "1"),
  ("2", "2"),
  ("3>", "3 or more"),
  ("varies", "varies"),
];

pub const INCOME: Catalog = &[
  ("0", "0"),
  ("5000", "5000"),
  ("10000", "10000"),
  ("15000", "15000"),
  ("20000", "20000"),
  ("30000", "30000"),
  ("40000", "40000"),
  ("50000", "50000"),
  ("60000", "60000"),
  ("70000", "70000"),
  ("80000", "80000"),
  ("90000", "90000"),
  ("100000", "100000"),
  ("110000", "110000"),
  ("120000", "120000"),
  ("130000", "130000"),
  ("140000", "140000"),
  ("150000", "150000"),
  ("160000", "160000"),
  ("170000", "170000"),
  ("180000", "180000"),
  ("190000", "190000"),
  (">200000", "over 200000"),
  ("na", "prefer not to answer"),
];

pub const DENSITY: Catalog = &[
  ("urban", "urban"),
  ("suburban", "suburban"),
  ("rural", "rural"),
];

/// USPS state, territory, and military codes, preceded by the `XX` sentinel
/// the signup form uses for "no selection yet".
pub const STATE: Catalog = &[
  ("XX", "Select a State"),
  ("AL", "Alabama"),
  ("AK", "Alaska"),
  ("AS", "American Samoa"),
  ("AZ", "Arizona"),
  ("AR", "Arkansas"),
  ("AA", "Armed Forces Americas"),
  ("AE", "Armed Forces Europe"),
  ("AP", "Armed Forces Pacific"),
  ("CA", "California"),
  ("CO", "Colorado"),
  ("CT", "Connecticut"),
  ("DE", "Delaware"),
  ("DC", "District of Columbia"),
  ("FM", "Federated States of Micronesia"),
  ("FL", "Florida"),
  ("GA", "Georgia"),
  ("GU", "Guam"),
  ("HI", "Hawaii"),
  ("ID", "Idaho"),
  ("IL", "Illinois"),
  ("IN", "Indiana"),
  ("IA", "Iowa"),
  ("KS", "Kansas"),
  ("KY", "Kentucky"),
  ("LA", "Louisiana"),
  ("ME", "Maine"),
  ("MH", "Marshall Islands"),
  ("MD", "Maryland"),
  ("MA", "Massachusetts"),
  ("MI", "Michigan"),
  ("MN", "Minnesota"),
  ("MS", "Mississippi"),
  ("MO", "Missouri"),
  ("MT", "Montana"),
  ("NE", "Nebraska"),
  ("NV", "Nevada"),
  ("NH", "New Hampshire"),
  ("NJ", "New Jersey"),
  ("NM", "New Mexico"),
  ("NY", "New York"),
  ("NC", "North Carolina"),
  ("ND", "North Dakota"),
  ("MP", "Northern Mariana Islands"),
  ("OH", "Ohio"),
  ("OK", "Oklahoma"),
  ("OR", "Oregon"),
  ("PW", "Palau"),
  ("PA", "Pennsylvania"),
  ("PR", "Puerto Rico"),
  ("RI", "Rhode Island"),
  ("SC", "South Carolina"),
  ("SD", "South Dakota"),
  ("TN", "Tennessee"),
  ("TX", "Texas"),
  ("UT", "Utah"),
  ("VT", "Vermont"),
  ("VI", "Virgin Islands"),
  ("VA", "Virginia"),
  ("WA", "Washington"),
  ("WV", "West Virginia"),
  ("WI", "Wisconsin"),
  ("WY", "Wyoming"),
];

// ─── CodedField ──────────────────────────────────────────────────────────────

/// Identifies one coded survey field and its catalog.
///
/// The `Display` form is the field's name in stored records and exports.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CodedField {
  NumberOfChildren,
  NumberOfGuardians,
  RaceIdentification,
  Age,
  Gender,
  EducationLevel,
  SpouseEducationLevel,
  AnnualIncome,
  State,
  Density,
}

impl CodedField {
  /// The field name used in stored records and display exports.
  pub fn name(self) -> &'static str {
    match self {
      Self::NumberOfChildren => "number_of_children",
      Self::NumberOfGuardians => "number_of_guardians",
      Self::RaceIdentification => "race_identification",
      Self::Age => "age",
      Self::Gender => "gender",
      Self::EducationLevel => "education_level",
      Self::SpouseEducationLevel => "spouse_education_level",
      Self::AnnualIncome => "annual_income",
      Self::State => "state",
      Self::Density => "density",
    }
  }

  /// The catalog this field's values are drawn from.
  pub fn catalog(self) -> Catalog {
    match self {
      Self::NumberOfChildren => NUMBER_OF_CHILDREN,
      Self::NumberOfGuardians => GUARDIANS,
      Self::RaceIdentification => RACE,
      Self::Age => AGE,
      Self::Gender => GENDER,
      Self::EducationLevel => EDUCATION,
      Self::SpouseEducationLevel => SPOUSE_EDUCATION,
      Self::AnnualIncome => INCOME,
      Self::State => STATE,
      Self::Density => DENSITY,
    }
  }

  /// Whether `code` is a valid key in this field's catalog.
  pub fn contains(self, code: &str) -> bool {
    self.catalog().iter().any(|(c, _)| *c == code)
  }

  /// Resolve `code` to its display label, or fail with
  /// [`Error::UnknownCode`].
  pub fn label_for(self, code: &str) -> Result<&'static str> {
    self
      .catalog()
      .iter()
      .find(|(c, _)| *c == code)
      .map(|(_, label)| *label)
      .ok_or_else(|| Error::UnknownCode {
        field: self,
        code:  code.to_owned(),
      })
  }
}

impl std::fmt::Display for CodedField {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn label_for_known_code() {
    assert_eq!(CodedField::Gender.label_for("m").unwrap(), "male");
    assert_eq!(
      CodedField::RaceIdentification.label_for("hisp").unwrap(),
      "Hispanic, Latino, or Spanish origin"
    );
    assert_eq!(
      CodedField::NumberOfChildren.label_for(">10").unwrap(),
      "More than 10"
    );
    assert_eq!(CodedField::State.label_for("XX").unwrap(), "Select a State");
  }

  #[test]
  fn label_for_unknown_code_errors() {
    let err = CodedField::Gender.label_for("xx").unwrap_err();
    assert!(matches!(
      err,
      Error::UnknownCode { field: CodedField::Gender, ref code } if code == "xx"
    ));
  }

  #[test]
  fn catalog_sizes_are_fixed() {
    assert_eq!(RACE.len(), 8);
    assert_eq!(GENDER.len(), 4);
    assert_eq!(EDUCATION.len(), 7);
    assert_eq!(SPOUSE_EDUCATION.len(), 8);
    assert_eq!(NUMBER_OF_CHILDREN.len(), 12);
    assert_eq!(AGE.len(), 11);
    assert_eq!(GUARDIANS.len(), 4);
    assert_eq!(INCOME.len(), 24);
    assert_eq!(DENSITY.len(), 3);
    assert_eq!(STATE.len(), 63);
  }

  #[test]
  fn codes_are_unique_within_each_catalog() {
    for field in [
      CodedField::NumberOfChildren,
      CodedField::NumberOfGuardians,
      CodedField::RaceIdentification,
      CodedField::Age,
      CodedField::Gender,
      CodedField::EducationLevel,
      CodedField::SpouseEducationLevel,
      CodedField::AnnualIncome,
      CodedField::State,
      CodedField::Density,
    ] {
      let catalog = field.catalog();
      let mut codes: Vec<_> = catalog.iter().map(|(c, _)| *c).collect();
      codes.sort_unstable();
      codes.dedup();
      assert_eq!(codes.len(), catalog.len(), "duplicate code in {field}");
    }
  }

  #[test]
  fn age_keeps_historical_code_label_pair() {
    assert_eq!(CodedField::Age.label_for("45-59").unwrap(), "45-49");
    assert!(!CodedField::Age.contains("45-49"));
  }
}
