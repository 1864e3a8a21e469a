//! Participant and organization envelopes.
//!
//! A participant is the identity anchor that owns demographic records. It
//! holds account metadata only; everything the study platform learns about a
//! participant lives in their record chain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Organization ────────────────────────────────────────────────────────────

/// A research organization participants may belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
  pub organization_id: Uuid,
  pub created_at:      DateTime<Utc>,
  pub name:            String,
  /// Website address.
  pub url:             String,
}

/// Input to [`crate::store::DemographicStore::add_organization`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrganization {
  pub name: String,
  pub url:  String,
}

// ─── Participant ─────────────────────────────────────────────────────────────

/// A study participant (or researcher) account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
  pub participant_id:  Uuid,
  pub created_at:      DateTime<Utc>,
  /// The login email address; unique and normalized (see
  /// [`normalize_username`]).
  pub username:        String,
  pub given_name:      String,
  pub middle_name:     String,
  pub family_name:     String,
  pub organization_id: Option<Uuid>,
  pub is_active:       bool,
}

impl Participant {
  /// "given middle family", exactly as the account form captured it.
  pub fn full_name(&self) -> String {
    format!("{} {} {}", self.given_name, self.middle_name, self.family_name)
  }

  /// The stable external identifier: the UUID in simple hex form.
  pub fn short_name(&self) -> String {
    self.participant_id.simple().to_string()
  }
}

/// Input to [`crate::store::DemographicStore::add_participant`].
/// `participant_id` and `created_at` are assigned by the store;
/// `is_active` starts false until the account is confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewParticipant {
  pub username:        String,
  pub given_name:      String,
  pub middle_name:     String,
  pub family_name:     String,
  pub organization_id: Option<Uuid>,
}

/// Normalize a login email: trim whitespace and lowercase the domain part.
/// The local part keeps its case (it is case-sensitive per RFC 5321).
pub fn normalize_username(raw: &str) -> Result<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(Error::EmptyUsername);
  }

  match trimmed.rsplit_once('@') {
    Some((local, domain)) => Ok(format!("{local}@{}", domain.to_lowercase())),
    None => Ok(trimmed.to_owned()),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_lowercases_domain_only() {
    assert_eq!(
      normalize_username("Alice@Example.COM").unwrap(),
      "Alice@example.com"
    );
  }

  #[test]
  fn normalize_trims_whitespace() {
    assert_eq!(
      normalize_username("  alice@example.com \n").unwrap(),
      "alice@example.com"
    );
  }

  #[test]
  fn normalize_rejects_empty() {
    assert!(matches!(
      normalize_username("   ").unwrap_err(),
      Error::EmptyUsername
    ));
  }

  #[test]
  fn full_name_joins_parts() {
    let p = Participant {
      participant_id:  Uuid::new_v4(),
      created_at:      Utc::now(),
      username:        "alice@example.com".into(),
      given_name:      "Alice".into(),
      middle_name:     "P".into(),
      family_name:     "Liddell".into(),
      organization_id: None,
      is_active:       true,
    };
    assert_eq!(p.full_name(), "Alice P Liddell");
  }
}
