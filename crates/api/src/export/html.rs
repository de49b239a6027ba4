//! HTML rendering of audit records.
//!
//! Produces a standalone document with the same logical columns as the CSV
//! export. Used directly for HTML downloads and as the body handed to the
//! PDF renderer (the `@page` rule requests landscape orientation there).

use papertrail_core::resolve::DisplayNameResolver;
use papertrail_db::models::record::AuditRecord;

use super::{actor_display, flatten_details};

const COLUMN_HEADERS: &[&str] = &[
    "ID",
    "Timestamp",
    "User ID",
    "User",
    "IP Address",
    "Severity",
    "Action",
    "Object Type",
    "Object ID",
    "Object Name",
    "Details",
];

/// Render records to a self-contained HTML table document.
pub fn render_html(records: &[AuditRecord], resolver: &dyn DisplayNameResolver) -> String {
    let mut out = String::with_capacity(records.len() * 256 + 1024);

    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Audit records</title>\n<style>\n");
    out.push_str("@page { size: A4 landscape; margin: 1cm; }\n");
    out.push_str("body { font-family: sans-serif; font-size: 12px; }\n");
    out.push_str("table { border-collapse: collapse; width: 100%; }\n");
    out.push_str("th, td { border: 1px solid #ccc; padding: 4px 6px; text-align: left; }\n");
    out.push_str("th { background: #f0f0f0; }\n");
    out.push_str("</style>\n</head>\n<body>\n<table>\n<thead>\n<tr>");
    for header in COLUMN_HEADERS {
        out.push_str(&format!("<th>{header}</th>"));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    for record in records {
        let cells = [
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

        out.push_str("<tr>");
        for cell in &cells {
            out.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    out
}

/// Escape text for safe embedding in HTML element content.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use papertrail_core::resolve::NullResolver;

    fn record(name: &str) -> AuditRecord {
        AuditRecord {
            id: 1,
            timestamp: Utc::now(),
            actor_id: None,
            actor_ip: None,
            severity: "info".to_string(),
            action: "post_updated".to_string(),
            object_type: "post".to_string(),
            object_id: 10,
            object_name: name.to_string(),
            details: serde_json::json!({}),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn document_contains_one_row_per_record() {
        let html = render_html(&[record("A"), record("B")], &NullResolver);
        assert_eq!(html.matches("<tr>").count(), 3); // header + 2 rows
        assert!(html.contains("<td>A</td>"));
        assert!(html.contains("<td>B</td>"));
    }

    #[test]
    fn page_rule_requests_landscape() {
        let html = render_html(&[], &NullResolver);
        assert!(html.contains("size: A4 landscape"));
    }

    #[test]
    fn cell_content_is_escaped() {
        let html = render_html(&[record("<script>alert(1)</script>")], &NullResolver);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
