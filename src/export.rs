//! CSV Export Surface
//!
//! Full-audit rendering of one target's record history, removed rows
//! included (the only view that keeps them). Rendered entirely in memory
//! and handed back to the delivery path, so no artifact can outlive the
//! delivery attempt.

use crate::ledger::record::VouchRecord;

/// Fixed header row. Tag columns carry the legacy discriminator slot; the
/// identity namespace here has no discriminator, so they render the stable
/// `0000` placeholder.
pub const EXPORT_HEADER: [&str; 11] = [
    "id",
    "voucherId",
    "voucherDisplayName",
    "voucherTag",
    "targetId",
    "targetDisplayName",
    "targetTag",
    "reason",
    "timestamp",
    "communityId",
    "removed",
];

const PLACEHOLDER_TAG: &str = "0000";

/// Render the record set as quoted CSV: every value double-quoted, embedded
/// quotes doubled, header row unquoted.
pub fn render_csv(records: &[VouchRecord]) -> String {
    let mut out = String::with_capacity(64 + records.len() * 96);
    out.push_str(&EXPORT_HEADER.join(","));
    out.push('\n');

    for r in records {
        let fields = [
            r.id.to_string(),
            r.voucher_id.clone(),
            r.voucher_name.clone(),
            PLACEHOLDER_TAG.to_string(),
            r.target_id.clone(),
            r.target_name.clone(),
            PLACEHOLDER_TAG.to_string(),
            r.reason.clone(),
            r.created_at.to_rfc3339(),
            r.community_id.clone(),
            r.removed.to_string(),
        ];
        let line: Vec<String> = fields.iter().map(|f| quote(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }

    out
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
