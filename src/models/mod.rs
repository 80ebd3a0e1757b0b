//! Diesel row types and their conversions to and from domain records.

use chrono::{NaiveDateTime, Utc};

pub mod access;
pub mod company;
pub mod config;
pub mod contract;
pub mod finance;
pub mod party;
pub mod project;
pub mod ticket;
pub mod venue;

/// Timestamp written to `updated_at` by every changeset.
pub(crate) fn touch() -> NaiveDateTime {
    Utc::now().naive_utc()
}
