//! Repository for the append-only `audit_records` table.

use papertrail_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::record::{ActionCount, ActorCount, AuditRecord, NewAuditRecord, RecordQuery};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list for `audit_records` SELECT queries.
const COLUMNS: &str = "\
    id, timestamp, actor_id, actor_ip, severity, action, \
    object_type, object_id, object_name, details, created_at";

/// Column list for INSERT (excludes auto-generated `id` and `created_at`).
const INSERT_COLUMNS: &str = "\
    timestamp, actor_id, actor_ip, severity, action, \
    object_type, object_id, object_name, details";

/// Hard cap on page size regardless of the requested limit.
const MAX_PAGE_SIZE: i64 = 500;

// ---------------------------------------------------------------------------
// RecordRepo
// ---------------------------------------------------------------------------

/// Query, insert, and retention operations for audit records.
pub struct RecordRepo;

impl RecordRepo {
    /// Append a single record. The store assigns the id.
    pub async fn insert(pool: &PgPool, record: &NewAuditRecord) -> Result<AuditRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_records ({INSERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, AuditRecord>(&query)
            .bind(record.timestamp)
            .bind(record.actor_id)
            .bind(&record.actor_ip)
            .bind(record.severity.as_str())
            .bind(&record.action)
            .bind(&record.object_type)
            .bind(record.object_id)
            .bind(&record.object_name)
            .bind(&record.details)
            .fetch_one(pool)
            .await
    }

    /// Query records with filtering and pagination, newest first.
    ///
    /// Equal timestamps are tie-broken by the store-assigned id, so the
    /// last write wins the top spot.
    pub async fn query(pool: &PgPool, params: &RecordQuery) -> Result<Vec<AuditRecord>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).clamp(1, MAX_PAGE_SIZE);
        let offset = params.offset.unwrap_or(0).max(0);

        let (where_clause, bind_values, bind_idx) = build_record_filter(params);

        let query = format!(
            "SELECT {COLUMNS} FROM audit_records {where_clause} \
             ORDER BY timestamp DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let q = bind_record_values(sqlx::query_as::<_, AuditRecord>(&query), &bind_values);
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Fetch every record matching the filter for export, newest first.
    ///
    /// Ignores the filter's `limit`/`offset`: exports operate on the full
    /// filtered set, not one page of it.
    pub async fn export(pool: &PgPool, params: &RecordQuery) -> Result<Vec<AuditRecord>, sqlx::Error> {
        let (where_clause, bind_values, _) = build_record_filter(params);

        let query = format!(
            "SELECT {COLUMNS} FROM audit_records {where_clause} \
             ORDER BY timestamp DESC, id DESC"
        );

        let q = bind_record_values(sqlx::query_as::<_, AuditRecord>(&query), &bind_values);
        q.fetch_all(pool).await
    }

    /// Count records matching the given filter (for pagination metadata).
    pub async fn count(pool: &PgPool, params: &RecordQuery) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_record_filter(params);

        let query = format!("SELECT COUNT(*)::BIGINT FROM audit_records {where_clause}");

        let q = bind_record_scalar(sqlx::query_scalar::<_, i64>(&query), &bind_values);
        q.fetch_one(pool).await
    }

    /// Action frequency table, most frequent first.
    pub async fn group_by_action(pool: &PgPool, limit: i64) -> Result<Vec<ActionCount>, sqlx::Error> {
        sqlx::query_as::<_, ActionCount>(
            "SELECT action, COUNT(*)::BIGINT AS count FROM audit_records \
             GROUP BY action ORDER BY count DESC, action ASC LIMIT $1",
        )
        .bind(limit.clamp(1, MAX_PAGE_SIZE))
        .fetch_all(pool)
        .await
    }

    /// Actor frequency table, most frequent first. System-initiated records
    /// (no actor) group under a NULL actor id.
    pub async fn group_by_actor(pool: &PgPool, limit: i64) -> Result<Vec<ActorCount>, sqlx::Error> {
        sqlx::query_as::<_, ActorCount>(
            "SELECT actor_id, COUNT(*)::BIGINT AS count FROM audit_records \
             GROUP BY actor_id ORDER BY count DESC, actor_id ASC NULLS LAST LIMIT $1",
        )
        .bind(limit.clamp(1, MAX_PAGE_SIZE))
        .fetch_all(pool)
        .await
    }

    /// Retention sweep: delete records strictly older than `cutoff`.
    ///
    /// A record stamped exactly at the cutoff is retained. Delete-only and
    /// idempotent, so it is safe to run concurrently with writers and to
    /// re-run with the same cutoff.
    pub async fn delete_older_than(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM audit_records WHERE timestamp < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Irreversible bulk delete of every record.
    pub async fn clear_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM audit_records").execute(pool).await?;
        Ok(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built record queries.
enum BindValue {
    BigInt(DbId),
    Text(String),
    Timestamp(Timestamp),
}

/// Build a WHERE clause and bind values from `RecordQuery` filter parameters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`. The clause is
/// empty when no filters are active, or starts with `WHERE `. All filters
/// are AND-combined; the free-text search expands to an OR group over
/// object name, details, and action sharing one bind parameter.
fn build_record_filter(params: &RecordQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(severity) = params.severity {
        conditions.push(format!("severity = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(severity.as_str().to_string()));
    }

    if let Some(actor_id) = params.actor_id {
        conditions.push(format!("actor_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(actor_id));
    }

    if let Some(ref action) = params.action {
        conditions.push(format!("action = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(action.clone()));
    }

    if let Some(ref object_type) = params.object_type {
        conditions.push(format!("object_type = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(object_type.clone()));
    }

    if let Some(object_id) = params.object_id {
        conditions.push(format!("object_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(object_id));
    }

    if let Some(from) = params.from {
        conditions.push(format!("timestamp >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(from));
    }

    if let Some(to) = params.to {
        conditions.push(format!("timestamp <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(to));
    }

    if let Some(ref search) = params.search {
        conditions.push(format!(
            "(object_name ILIKE ${bind_idx} OR details::text ILIKE ${bind_idx} OR action ILIKE ${bind_idx})"
        ));
        bind_idx += 1;
        bind_values.push(BindValue::Text(format!("%{search}%")));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_record_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_record_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}
