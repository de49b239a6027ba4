/// Database primary keys and entity ids are PostgreSQL BIGSERIAL.
///
/// An `object_id` of `0` marks a record with no singular target.
pub type DbId = i64;

/// All timestamps are UTC instants.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
