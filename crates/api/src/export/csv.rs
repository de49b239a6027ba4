//! CSV rendering of audit records.
//!
//! Output contract: UTF-8 with a BOM prefix, a fixed header row, then one
//! row per record. The `Details` column is the flattened string form of
//! the details mapping with HTML stripped.

use papertrail_core::resolve::DisplayNameResolver;
use papertrail_db::models::record::AuditRecord;

use super::{actor_display, flatten_details};

/// UTF-8 byte-order mark emitted before the header so spreadsheet tools
/// pick up the encoding.
pub const BOM: &str = "\u{feff}";

/// Fixed CSV header row.
pub const HEADER: &str =
    "ID,Timestamp,User ID,User,IP Address,Severity,Action,Object Type,Object ID,Object Name,Details";

/// Render records to a CSV document, newest first as given.
pub fn render_csv(records: &[AuditRecord], resolver: &dyn DisplayNameResolver) -> String {
    let mut out = String::with_capacity(records.len() * 128 + HEADER.len() + BOM.len());
    out.push_str(BOM);
    out.push_str(HEADER);
    out.push('\n');

    for record in records {
        let row = [
            record.id.to_string(),
            record.timestamp.to_rfc3339(),
            record.actor_id.map(|id| id.to_string()).unwrap_or_default(),
            actor_display(resolver, record.actor_id),
            record.actor_ip.clone().unwrap_or_default(),
            record.severity.clone(),
            record.action.clone(),
            record.object_type.clone(),
            record.object_id.to_string(),
            record.object_name.clone(),
            flatten_details(&record.details),
        ];

        let line = row
            .iter()
            .map(|cell| escape_cell(cell))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Quote a cell when it contains a delimiter, quote, or line break;
/// embedded quotes are doubled.
fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use papertrail_core::resolve::{NullResolver, StaticResolver};

    fn record(id: i64, action: &str, severity: &str) -> AuditRecord {
        AuditRecord {
            id,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            actor_id: Some(1),
            actor_ip: Some("192.0.2.7".to_string()),
            severity: severity.to_string(),
            action: action.to_string(),
            object_type: "post".to_string(),
            object_id: 10,
            object_name: "Hello World".to_string(),
            details: serde_json::json!({"title": {"old": "A", "new": "B"}}),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn output_starts_with_bom_and_header() {
        let csv = render_csv(&[], &NullResolver);
        assert!(csv.starts_with(BOM));
        assert_eq!(csv.trim_start_matches(BOM).trim_end(), HEADER);
    }

    #[test]
    fn n_records_produce_n_plus_one_lines() {
        let records = vec![
            record(1, "post_updated", "info"),
            record(2, "post_deleted", "warning"),
            record(3, "user_logged_in", "info"),
        ];
        let csv = render_csv(&records, &NullResolver);
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines.len(), records.len() + 1);
    }

    #[test]
    fn columns_reparse_to_source_values() {
        let records = vec![
            record(1, "post_updated", "info"),
            record(2, "post_deleted", "warning"),
        ];
        let csv = render_csv(&records, &NullResolver);
        let lines: Vec<&str> = csv.trim_end().lines().skip(1).collect();

        for (line, source) in lines.iter().zip(&records) {
            let cells: Vec<&str> = line.split(',').collect();
            // ID, Severity, Action, Object ID columns round-trip exactly.
            assert_eq!(cells[0].parse::<i64>().unwrap(), source.id);
            assert_eq!(cells[5], source.severity);
            assert_eq!(cells[6], source.action);
            assert_eq!(cells[8].parse::<i64>().unwrap(), source.object_id);
        }
    }

    #[test]
    fn user_column_resolves_display_name() {
        let mut resolver = StaticResolver::new();
        resolver.insert("user", 1, "alice");

        let csv = render_csv(&[record(1, "post_updated", "info")], &resolver);
        let row = csv.trim_end().lines().nth(1).unwrap();
        assert!(row.contains(",alice,"));
    }

    #[test]
    fn system_records_leave_user_columns_empty() {
        let mut rec = record(1, "option_updated", "info");
        rec.actor_id = None;
        rec.actor_ip = None;

        let csv = render_csv(&[rec], &NullResolver);
        let row = csv.trim_end().lines().nth(1).unwrap();
        let cells: Vec<&str> = row.split(',').collect();
        assert_eq!(cells[2], "");
        assert_eq!(cells[3], "");
        assert_eq!(cells[4], "");
    }

    #[test]
    fn cells_with_delimiters_are_quoted() {
        let mut rec = record(1, "post_updated", "info");
        rec.object_name = "Hello, \"World\"".to_string();

        let csv = render_csv(&[rec], &NullResolver);
        assert!(csv.contains("\"Hello, \"\"World\"\"\""));
    }

    #[test]
    fn details_column_is_flattened_and_stripped() {
        let mut rec = record(1, "post_updated", "info");
        rec.details = serde_json::json!({"content": {"old": "<p>Hi</p>", "new": "Bye"}});

        let csv = render_csv(&[rec], &NullResolver);
        let row = csv.trim_end().lines().nth(1).unwrap();
        assert!(row.ends_with("content: Hi -> Bye"));
    }
}
