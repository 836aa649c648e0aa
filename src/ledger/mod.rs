//! Vouch Ledger Core
//!
//! The data model, the access control resolver, and the authoritative
//! write path over the store.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ ActorContext │────►│ access       │◄────│ Community    │
//! │ (gateway)    │     │ (privilege,  │     │ Settings     │
//! └──────────────┘     │  eligibility)│     └──────────────┘
//!                      └──────┬───────┘
//!                             ▼
//!                      ┌──────────────┐
//!                      │ VouchLedger  │──► store + audit sink
//!                      │ (write path) │
//!                      └──────────────┘
//! ```

pub mod access;
pub mod record;
pub mod service;

pub use access::{
    ensure_elevated, ensure_platform_admin, is_eligible_voucher, resolve_privilege, GatedCommand,
    Privilege,
};
pub use record::{
    validate_reason, ActorContext, BlacklistEntry, CommunitySettings, TargetRef, VouchRecord,
    DEFAULT_HALF_LIFE_DAYS, MAX_REASON_LEN,
};
pub use service::{validate_create, VouchLedger};
