//! Vouch Ledger Service
//!
//! Records attestations ("vouches") one identity makes about another within
//! a bounded community, derives aggregate trust signals from that ledger,
//! and exposes paginated, access-controlled views over it.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs         - Crate root with re-exports
//! ├── main.rs        - Server entrypoint
//! ├── config.rs      - Configuration management
//! ├── error.rs       - Outcome kinds and store fault classification
//! ├── ledger/        - Core ledger
//! │   ├── record.rs  - Vouch records, settings, blacklist, actor contexts
//! │   ├── access.rs  - Privilege & eligibility resolution
//! │   └── service.rs - Authoritative write path
//! ├── reputation/    - Aggregation engine
//! │   ├── score.rs   - Decay weights, reputation, badge tiers
//! │   └── leaderboard.rs - Counts and rankings
//! ├── paging/        - Pager
//! │   └── cursor.rs  - Self-contained navigation cursor
//! ├── database/      - PostgreSQL persistence
//! │   ├── pool.rs    - Connection pool + schema bootstrap
//! │   ├── vouches.rs - Vouch repository
//! │   ├── settings.rs - Community settings repository
//! │   └── blacklist.rs - Blacklist repository
//! ├── api/           - HTTP surface
//! │   ├── vouches.rs - Create/remove/purge + paginated listing
//! │   ├── stats.rs   - Stats, profiles, leaderboards, status
//! │   └── admin.rs   - Settings, blacklist, export
//! ├── audit.rs       - Best-effort audit sink
//! ├── directory.rs   - Display-only identity resolution
//! └── export.rs      - Quoted-CSV rendering
//! ```

pub mod api;
pub mod audit;
pub mod config;
pub mod database;
pub mod directory;
pub mod error;
pub mod export;
pub mod ledger;
pub mod paging;
pub mod reputation;

// Re-export main types for convenience
pub use audit::{AuditEvent, AuditSink, NullSink, WebhookSink};
pub use config::LedgerConfig;
pub use database::DatabasePool;
pub use directory::{IdentityDirectory, IdentityProfile, StaticDirectory};
pub use error::{LedgerError, StoreError};
pub use export::{render_csv, EXPORT_HEADER};
pub use ledger::{
    is_eligible_voucher, resolve_privilege, validate_create, validate_reason, ActorContext,
    BlacklistEntry, CommunitySettings, GatedCommand, TargetRef, VouchLedger, VouchRecord,
};
pub use paging::{clamp_page, page_slice, total_pages, PageCursor, PageStep, PAGE_SIZE};
pub use reputation::{
    decay_weight, given_count, received_count, reputation, top_given, top_received, Badge,
    LeaderboardRow,
};
