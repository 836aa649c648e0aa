//! Counts and Rankings
//!
//! Grouping preserves first-seen order over the snapshot scan, and the
//! descending sort is stable, so ties rank in the order a group first
//! appeared. With snapshots fetched newest-first this makes tie-breaks
//! deterministic and reproducible.

use std::collections::HashMap;

use serde::Serialize;

use crate::ledger::record::VouchRecord;

/// Leaderboards truncate to the top ten.
pub const LEADERBOARD_LIMIT: usize = 10;

/// One ranked row: the grouped identity and its live-record count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    pub user_id: String,
    pub display_name: String,
    pub count: usize,
}

/// Live vouches `user_id` has given in the snapshot.
pub fn given_count(snapshot: &[VouchRecord], user_id: &str) -> usize {
    snapshot
        .iter()
        .filter(|r| !r.removed && r.voucher_id == user_id)
        .count()
}

/// Live vouches `user_id` has received in the snapshot.
pub fn received_count(snapshot: &[VouchRecord], user_id: &str) -> usize {
    snapshot
        .iter()
        .filter(|r| !r.removed && r.target_id == user_id)
        .count()
}

/// Rank targets by live vouches received.
pub fn top_received(snapshot: &[VouchRecord]) -> Vec<LeaderboardRow> {
    rank_by(snapshot, |r| (&r.target_id, &r.target_name))
}

/// Rank vouchers by live vouches given.
pub fn top_given(snapshot: &[VouchRecord]) -> Vec<LeaderboardRow> {
    rank_by(snapshot, |r| (&r.voucher_id, &r.voucher_name))
}

fn rank_by<'a, F>(snapshot: &'a [VouchRecord], key: F) -> Vec<LeaderboardRow>
where
    F: Fn(&'a VouchRecord) -> (&'a String, &'a String),
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<LeaderboardRow> = Vec::new();

    for record in snapshot.iter().filter(|r| !r.removed) {
        let (id, name) = key(record);
        if let Some(&i) = index.get(id.as_str()) {
            rows[i].count += 1;
        } else {
            index.insert(id, rows.len());
            rows.push(LeaderboardRow {
                user_id: id.clone(),
                display_name: name.clone(),
                count: 1,
            });
        }
    }

    // Stable sort keeps first-seen order between equal counts.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows.truncate(LEADERBOARD_LIMIT);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: i64, voucher: &str, target: &str, removed: bool) -> VouchRecord {
        VouchRecord {
            id,
            voucher_id: voucher.to_string(),
            voucher_name: voucher.to_string(),
            target_id: target.to_string(),
            target_name: target.to_string(),
            reason: "r".to_string(),
            community_id: "g1".to_string(),
            created_at: Utc::now(),
            removed,
        }
    }

    #[test]
    fn test_counts_exclude_removed() {
        let snapshot = vec![
            record(1, "alice", "bob", false),
            record(2, "alice", "carol", true),
            record(3, "dave", "alice", false),
        ];
        assert_eq!(given_count(&snapshot, "alice"), 1);
        assert_eq!(received_count(&snapshot, "alice"), 1);
        assert_eq!(received_count(&snapshot, "carol"), 0);
    }

    #[test]
    fn test_tie_break_is_first_seen_order() {
        // A(3), B(3), C(1) scanned in order A,B,A,C,B,A: A's group opened
        // first, so A ranks ahead of B on the tie.
        let snapshot = vec![
            record(1, "v", "A", false),
            record(2, "v", "B", false),
            record(3, "v", "A", false),
            record(4, "v", "C", false),
            record(5, "v", "B", false),
            record(6, "v", "A", false),
        ];
        let top = top_received(&snapshot);
        assert_eq!(top.len(), 3);
        assert_eq!((top[0].user_id.as_str(), top[0].count), ("A", 3));
        assert_eq!((top[1].user_id.as_str(), top[1].count), ("B", 3));
        assert_eq!((top[2].user_id.as_str(), top[2].count), ("C", 1));
    }

    #[test]
    fn test_truncates_to_limit() {
        let mut snapshot = Vec::new();
        for i in 0..15 {
            snapshot.push(record(i, "v", &format!("t{i}"), false));
        }
        assert_eq!(top_received(&snapshot).len(), LEADERBOARD_LIMIT);
    }

    #[test]
    fn test_given_side_ranking() {
        let snapshot = vec![
            record(1, "alice", "x", false),
            record(2, "alice", "y", false),
            record(3, "bob", "z", false),
        ];
        let top = top_given(&snapshot);
        assert_eq!((top[0].user_id.as_str(), top[0].count), ("alice", 2));
        assert_eq!((top[1].user_id.as_str(), top[1].count), ("bob", 1));
    }
}
