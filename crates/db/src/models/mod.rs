//! Model structs and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` entity structs matching the database rows
//! - `Deserialize` DTOs for request payloads
//! - `Serialize` DTOs for response payloads

pub mod car;
