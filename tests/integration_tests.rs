//! Integration tests for the vouch ledger
//!
//! These tests verify the core pipeline end-to-end over in-memory
//! snapshots: create validation order, access gating, aggregation
//! properties, pagination with cursor navigation, and export rendering.
//! Store-backed paths (conditional soft-delete, blacklist uniqueness) are
//! enforced by constraints and conditional updates at the PostgreSQL
//! boundary and exercised against a live database in deployment smoke
//! tests.

use chrono::{Duration, Utc};
use vouch_ledger::{
    clamp_page, decay_weight, given_count, page_slice, received_count, render_csv, reputation,
    resolve_privilege, top_received, total_pages, validate_create, validate_reason, ActorContext,
    Badge, CommunitySettings, LedgerError, PageCursor, PageStep, TargetRef, VouchRecord,
    PAGE_SIZE,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Create a test vouch record with configurable parameters
fn record(id: i64, voucher: &str, target: &str, age_days: i64, removed: bool) -> VouchRecord {
    VouchRecord {
        id,
        voucher_id: voucher.to_string(),
        voucher_name: format!("{voucher}-name"),
        target_id: target.to_string(),
        target_name: format!("{target}-name"),
        reason: "good trade".to_string(),
        community_id: "g1".to_string(),
        created_at: Utc::now() - Duration::days(age_days),
        removed,
    }
}

fn actor(id: &str, platform_admin: bool, roles: &[&str]) -> ActorContext {
    ActorContext {
        id: id.to_string(),
        display_name: format!("{id}-name"),
        platform_admin,
        roles: roles.iter().map(|r| r.to_string()).collect(),
    }
}

fn target(id: &str) -> TargetRef {
    TargetRef {
        id: id.to_string(),
        display_name: format!("{id}-name"),
        automated: false,
    }
}

fn community(trusted_role: Option<&str>) -> CommunitySettings {
    CommunitySettings {
        trusted_role_id: trusted_role.map(String::from),
        ..CommunitySettings::new("g1".to_string())
    }
}

// ============================================================================
// Create Validation
// ============================================================================

mod create_validation {
    use super::*;

    #[test]
    fn test_self_vouch_always_rejected() {
        let settings = community(None);
        let result = validate_create(&actor("u1", false, &[]), &target("u1"), &settings);
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_automated_target_rejected() {
        let settings = community(None);
        let bot = TargetRef {
            automated: true,
            ..target("bot")
        };
        let result = validate_create(&actor("u1", false, &[]), &bot, &settings);
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_trusted_role_scenario() {
        // Community restricts vouching to role R: an actor without R and
        // without elevation is forbidden, an actor with R passes.
        let settings = community(Some("R"));

        let outsider = validate_create(&actor("u1", false, &[]), &target("u2"), &settings);
        assert!(matches!(outsider, Err(LedgerError::Forbidden(_))));

        let trusted = validate_create(&actor("u1", false, &["R"]), &target("u2"), &settings);
        assert!(trusted.is_ok());
    }

    #[test]
    fn test_elevation_bypasses_trusted_role() {
        let settings = community(Some("R"));
        let admin = validate_create(&actor("u1", true, &[]), &target("u2"), &settings);
        assert!(admin.is_ok());
    }

    #[test]
    fn test_reason_validated_at_the_boundary() {
        assert!(validate_reason("legit, fast shipping").is_ok());
        assert!(matches!(validate_reason(""), Err(LedgerError::Validation(_))));
        assert!(matches!(
            validate_reason(&"r".repeat(501)),
            Err(LedgerError::Validation(_))
        ));
    }
}

// ============================================================================
// Aggregation Properties
// ============================================================================

mod aggregation {
    use super::*;

    #[test]
    fn test_decay_monotonicity() {
        let half_life = 90.0;
        assert_eq!(decay_weight(0.0, half_life), 1.0);
        assert!((decay_weight(half_life, half_life) - 0.5).abs() < 1e-9);
        assert!((decay_weight(2.0 * half_life, half_life) - 0.25).abs() < 1e-9);

        let mut prev = 1.0;
        for age in (0..1000).map(|d| d as f64) {
            let w = decay_weight(age, half_life);
            assert!(w <= prev);
            prev = w;
        }
    }

    #[test]
    fn test_badge_boundaries() {
        assert_eq!(Badge::for_received_count(9), Badge::None);
        assert_eq!(Badge::for_received_count(10), Badge::Bronze);
        assert_eq!(Badge::for_received_count(49), Badge::Bronze);
        assert_eq!(Badge::for_received_count(50), Badge::Gold);
        assert_eq!(Badge::for_received_count(99), Badge::Gold);
        assert_eq!(Badge::for_received_count(100), Badge::Centurion);
    }

    #[test]
    fn test_leaderboard_determinism() {
        // Records for targets A(3), B(3), C(1) inserted in order
        // A,B,A,C,B,A: top two are A then B, A's group first-seen earlier.
        let snapshot = vec![
            record(1, "v1", "A", 0, false),
            record(2, "v2", "B", 0, false),
            record(3, "v3", "A", 0, false),
            record(4, "v4", "C", 0, false),
            record(5, "v5", "B", 0, false),
            record(6, "v6", "A", 0, false),
        ];
        let top = top_received(&snapshot);
        assert_eq!(top[0].user_id, "A");
        assert_eq!(top[0].count, 3);
        assert_eq!(top[1].user_id, "B");
        assert_eq!(top[1].count, 3);
    }

    #[test]
    fn test_purge_scenario_counts() {
        // Target T with 5 live and 2 already-removed records: received is
        // 5 beforehand; after a purge flips the live ones, it is 0 and the
        // removed rows stay removed.
        let mut snapshot: Vec<VouchRecord> = (1..=5)
            .map(|i| record(i, &format!("v{i}"), "T", 0, false))
            .collect();
        snapshot.push(record(6, "v6", "T", 10, true));
        snapshot.push(record(7, "v7", "T", 20, true));

        assert_eq!(received_count(&snapshot, "T"), 5);

        for r in snapshot.iter_mut() {
            if !r.removed {
                r.removed = true;
            }
        }
        assert_eq!(received_count(&snapshot, "T"), 0);
        assert_eq!(snapshot.iter().filter(|r| r.removed).count(), 7);
    }

    #[test]
    fn test_single_snapshot_keeps_views_consistent() {
        let snapshot = vec![
            record(1, "alice", "bob", 0, false),
            record(2, "carol", "alice", 0, false),
            record(3, "dave", "alice", 180, false),
        ];
        let now = Utc::now();

        let received = received_count(&snapshot, "alice");
        let rep = reputation(&snapshot, "alice", now, 180.0);

        assert_eq!(received, 2);
        assert_eq!(given_count(&snapshot, "alice"), 1);
        // Both figures come from the same slice: two received records, one
        // fresh and one a half-life old.
        assert!((rep - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_disabled_decay_weights_everything_fully() {
        let snapshot = vec![
            record(1, "v1", "T", 500, false),
            record(2, "v2", "T", 1000, false),
        ];
        let rep = reputation(&snapshot, "T", Utc::now(), 0.0);
        assert_eq!(rep, 2.0);
    }
}

// ============================================================================
// Access Control
// ============================================================================

mod access_control {
    use super::*;

    #[test]
    fn test_elevation_paths() {
        let mut settings = community(None);
        settings.admin_role_id = Some("mods".to_string());

        assert!(resolve_privilege(&actor("u1", true, &[]), &settings).elevated);
        assert!(resolve_privilege(&actor("u2", false, &["mods"]), &settings).elevated);
        assert!(!resolve_privilege(&actor("u3", false, &["other"]), &settings).elevated);
    }

    #[test]
    fn test_unconfigured_admin_role_means_native_only() {
        let settings = community(None);
        assert!(!resolve_privilege(&actor("u1", false, &["mods"]), &settings).elevated);
        assert!(resolve_privilege(&actor("u2", true, &[]), &settings).elevated);
    }
}

// ============================================================================
// Pagination
// ============================================================================

mod pagination {
    use super::*;

    #[test]
    fn test_clamp_saturates() {
        assert_eq!(clamp_page(-5, 3), 0);
        assert_eq!(clamp_page(99, 3), 2);
        assert_eq!(clamp_page(0, 0), 0);
    }

    #[test]
    fn test_navigation_flow_with_cursor() {
        let records: Vec<VouchRecord> = (1..=25)
            .map(|i| record(i, &format!("v{i}"), "T", 0, false))
            .collect();
        let total = total_pages(records.len(), PAGE_SIZE);
        assert_eq!(total, 3);

        // Open the listing at page 0 and walk forward.
        let mut cursor = PageCursor {
            requester_id: "u1".to_string(),
            subject_id: "T".to_string(),
            community_id: "g1".to_string(),
            page: 0,
            total,
        };

        for expected in [1usize, 2, 2] {
            let decoded = PageCursor::decode(&cursor.encode()).unwrap();
            decoded.ensure_requester("u1").unwrap();
            let next = clamp_page(decoded.page as i64 + PageStep::Next.delta(), total);
            assert_eq!(next, expected); // clamps at the last page
            cursor.page = next;
        }

        assert_eq!(page_slice(&records, cursor.page, PAGE_SIZE).len(), 5);
    }

    #[test]
    fn test_navigation_reflects_concurrent_removal() {
        // A cursor minted over 25 records points at page 2; by the next
        // step most records were removed. Re-fetching and re-chunking
        // clamps the stale index back into range.
        let cursor = PageCursor {
            requester_id: "u1".to_string(),
            subject_id: "T".to_string(),
            community_id: "g1".to_string(),
            page: 2,
            total: 3,
        };

        let fresh: Vec<VouchRecord> = (1..=8)
            .map(|i| record(i, &format!("v{i}"), "T", 0, false))
            .collect();
        let fresh_total = total_pages(fresh.len(), PAGE_SIZE);

        let page = clamp_page(cursor.page as i64 + PageStep::Next.delta(), fresh_total);
        assert_eq!(page, 0);
        assert_eq!(page_slice(&fresh, page, PAGE_SIZE).len(), 8);
    }

    #[test]
    fn test_navigation_rejects_other_identities() {
        let cursor = PageCursor {
            requester_id: "u1".to_string(),
            subject_id: "T".to_string(),
            community_id: "g1".to_string(),
            page: 0,
            total: 1,
        };
        let decoded = PageCursor::decode(&cursor.encode()).unwrap();
        assert!(matches!(
            decoded.ensure_requester("intruder"),
            Err(LedgerError::Forbidden(_))
        ));
    }

    #[test]
    fn test_malformed_cursor_rejected() {
        assert!(matches!(
            PageCursor::decode("definitely not a cursor"),
            Err(LedgerError::Validation(_))
        ));
    }
}

// ============================================================================
// Export
// ============================================================================

mod export {
    use super::*;

    #[test]
    fn test_export_is_full_audit() {
        let records = vec![
            record(1, "alice", "T", 0, false),
            record(2, "bob", "T", 5, true),
        ];
        let csv = render_csv(&records);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "id,voucherId,voucherDisplayName,voucherTag,targetId,targetDisplayName,targetTag,reason,timestamp,communityId,removed"
        );
        assert!(lines[1].contains("\"false\""));
        assert!(lines[2].contains("\"true\""));
    }

    #[test]
    fn test_export_doubles_embedded_quotes() {
        let mut r = record(1, "alice", "T", 0, false);
        r.reason = "called it \"flawless\"".to_string();
        let csv = render_csv(&[r]);
        assert!(csv.contains("\"called it \"\"flawless\"\"\""));
    }
}
