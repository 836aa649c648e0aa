//! Identity Directory
//!
//! Display-only resolution of opaque identity handles. Capability data
//! (platform-admin flag, role memberships) never comes from here; the
//! gateway resolves it into the actor context at the access boundary.
//! A handle that no longer resolves degrades to a placeholder so views
//! over departed members still render.

use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct IdentityProfile {
    pub id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl IdentityProfile {
    /// Fallback profile for an identity the directory can no longer
    /// resolve.
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: "unknown member".to_string(),
            avatar_url: None,
        }
    }
}

#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Resolve a handle for display. None means the identity is no longer
    /// resolvable; callers fall back to a placeholder or a denormalized
    /// snapshot name.
    async fn resolve(&self, id: &str) -> Option<IdentityProfile>;
}

/// Directory for deployments where the gateway denormalizes display data
/// into every command payload, leaving nothing to look up here.
pub struct StaticDirectory;

#[async_trait]
impl IdentityDirectory for StaticDirectory {
    async fn resolve(&self, _id: &str) -> Option<IdentityProfile> {
        None
    }
}
