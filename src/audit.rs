//! Audit Sink
//!
//! Best-effort notifications about ledger mutations, delivered to a
//! community's configured log channel. Delivery is fire-and-forget: a sink
//! failure is logged and swallowed, never escalated into the operation
//! that triggered it.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

/// Ledger mutations worth a notification.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    VouchCreated {
        id: i64,
        voucher: String,
        target: String,
        reason: String,
    },
    VouchRemoved {
        id: i64,
        requester: String,
    },
    TargetPurged {
        target: String,
        requester: String,
        affected: u64,
    },
    BlacklistAdded {
        user: String,
        reason: String,
        added_by: String,
    },
    BlacklistRemoved {
        user: String,
        removed_by: String,
    },
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Deliver one event to a community's log channel. Implementations
    /// must contain their own failures.
    async fn notify(&self, community_id: &str, channel_id: &str, event: AuditEvent);
}

/// Posts events as JSON to a gateway webhook endpoint,
/// `{base}/channels/{channel}/messages`.
pub struct WebhookSink {
    client: reqwest::Client,
    base_url: String,
}

impl WebhookSink {
    pub fn new(base_url: String, timeout: std::time::Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AuditSink for WebhookSink {
    async fn notify(&self, community_id: &str, channel_id: &str, event: AuditEvent) {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);
        let body = json!({
            "community_id": community_id,
            "notification": event,
        });
        match self.client.post(&url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(community_id = %community_id, "audit notification delivered");
            }
            Ok(resp) => {
                warn!(community_id = %community_id, status = %resp.status(), "audit notification rejected");
            }
            Err(e) => {
                warn!(community_id = %community_id, error = %e, "audit notification failed");
            }
        }
    }
}

/// Sink for deployments without a notification gateway.
pub struct NullSink;

#[async_trait]
impl AuditSink for NullSink {
    async fn notify(&self, _community_id: &str, _channel_id: &str, _event: AuditEvent) {}
}
