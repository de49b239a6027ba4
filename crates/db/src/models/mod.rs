//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize`-friendly insert DTO
//! - Query parameter structs for filtered reads

pub mod record;
