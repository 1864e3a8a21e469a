//! Core types and trait definitions for the Cohort demographic-record store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod catalog;
pub mod error;
pub mod history;
pub mod participant;
pub mod record;
pub mod store;

pub use error::{Error, Result};
