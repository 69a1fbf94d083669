//! Domain rules for the car inventory service.
//!
//! Everything in this crate is pure: validation of incoming car data,
//! item set de-duplication, and pagination arithmetic. No I/O happens
//! here, which keeps the rules unit-testable without a database.

pub mod error;
pub mod pagination;
pub mod types;
pub mod validation;
