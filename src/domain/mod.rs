//! Domain records and value objects, independent of persistence and HTTP.

pub mod access;
pub mod auth;
pub mod company;
pub mod contract;
pub mod finance;
pub mod party;
pub mod project;
pub mod record;
pub mod ticket;
pub mod types;
pub mod venue;
