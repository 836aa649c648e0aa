//! Pagination Cursor
//!
//! Self-contained navigation state: the requesting identity, the listing
//! subject, the community scope, and the page position, base64-encoded so
//! no server-side session store is needed. Decoding validates shape, and a
//! navigation step is only honored for the identity that opened the
//! listing.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Direction of one navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStep {
    Prev,
    Next,
}

impl PageStep {
    pub fn delta(self) -> i64 {
        match self {
            PageStep::Prev => -1,
            PageStep::Next => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    /// Identity that opened the listing; navigation from anyone else is
    /// rejected.
    pub requester_id: String,
    /// Identity the listing is about.
    pub subject_id: String,
    pub community_id: String,
    pub page: usize,
    /// Page count at encode time. Display only; each step recomputes the
    /// real total from a fresh snapshot.
    pub total: usize,
}

impl PageCursor {
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    pub fn decode(raw: &str) -> Result<Self, LedgerError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw)
            .map_err(|_| malformed())?;
        serde_json::from_slice(&bytes).map_err(|_| malformed())
    }

    /// Reject navigation from any identity other than the original
    /// requester.
    pub fn ensure_requester(&self, actor_id: &str) -> Result<(), LedgerError> {
        if self.requester_id == actor_id {
            Ok(())
        } else {
            Err(LedgerError::Forbidden(
                "only the original requester can navigate this listing".to_string(),
            ))
        }
    }
}

fn malformed() -> LedgerError {
    LedgerError::Validation("malformed pagination cursor".to_string())
}
