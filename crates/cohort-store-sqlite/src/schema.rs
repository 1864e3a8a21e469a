//! SQL schema for the Cohort SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS organizations (
    organization_id TEXT PRIMARY KEY,
    created_at      TEXT NOT NULL,
    name            TEXT NOT NULL,
    url             TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS participants (
    participant_id  TEXT PRIMARY KEY,
    created_at      TEXT NOT NULL,
    username        TEXT NOT NULL UNIQUE,  -- normalized email
    given_name      TEXT NOT NULL,
    middle_name     TEXT NOT NULL DEFAULT '',
    family_name     TEXT NOT NULL,
    organization_id TEXT REFERENCES organizations(organization_id),
    is_active       INTEGER NOT NULL DEFAULT 0
);

-- Demographic records are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS demographic_records (
    record_id       TEXT PRIMARY KEY,
    participant_id  TEXT NOT NULL REFERENCES participants(participant_id),
    previous_id     TEXT REFERENCES demographic_records(record_id),
    created_at      TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned

    number_of_children              TEXT NOT NULL,   -- catalog code
    child_birthdays                 TEXT NOT NULL,   -- JSON array of YYYY-MM-DD
    languages_spoken_at_home        TEXT NOT NULL,
    number_of_guardians             TEXT NOT NULL,   -- catalog code
    number_of_guardians_explanation TEXT NOT NULL,
    race_identification             TEXT NOT NULL,   -- catalog code
    age                             TEXT NOT NULL,   -- catalog code
    gender                          TEXT NOT NULL,   -- catalog code
    education_level                 TEXT NOT NULL,   -- catalog code
    spouse_education_level          TEXT NOT NULL,   -- catalog code
    annual_income                   TEXT NOT NULL,   -- catalog code
    number_of_books                 INTEGER NOT NULL,
    additional_comments             TEXT NOT NULL,
    country                         TEXT NOT NULL,   -- ISO 3166-1 alpha-2
    state                           TEXT NOT NULL,   -- catalog code
    density                         TEXT NOT NULL,   -- catalog code
    extra                           TEXT             -- JSON blob or NULL
);

CREATE INDEX IF NOT EXISTS records_participant_idx ON demographic_records(participant_id);
CREATE INDEX IF NOT EXISTS records_previous_idx    ON demographic_records(previous_id);
CREATE INDEX IF NOT EXISTS records_created_idx     ON demographic_records(created_at);

PRAGMA user_version = 1;
";
