//! Stateless scroll cursors.
//!
//! A cursor carries the whole canonical query, the offset of the next page,
//! and the time it was issued, so any server instance can resume it. The
//! token is URL-safe base64 over a JSON payload with a SHA-256 digest of its
//! contents; a token whose digest does not verify is rejected.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::search::QueryCriteria;
use crate::types::Timestamp;

/// Payload format version.
const CURSOR_VERSION: u8 = 1;

/// `scrollId` values that start a new scroll instead of resuming one.
pub const INITIAL_SCROLL_KEYWORDS: &[&str] = &["initial", "start", "first", "0"];

pub fn is_initial_scroll(scroll_id: &str) -> bool {
    INITIAL_SCROLL_KEYWORDS.contains(&scroll_id)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error("scroll id is not valid base64")]
    Encoding,
    #[error("scroll id payload is unreadable")]
    Payload,
    #[error("scroll id version {0} is not supported")]
    Version(u8),
    #[error("scroll id checksum does not match its contents")]
    Checksum,
}

/// Position in a scrolled query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollCursor {
    pub criteria: QueryCriteria,
    pub offset: u64,
    pub issued_at: Timestamp,
}

#[derive(Serialize, Deserialize)]
struct CursorPayload {
    v: u8,
    c: QueryCriteria,
    o: u64,
    t: i64,
    d: String,
}

/// SHA-256 hex digest of the canonical criteria.
pub fn fingerprint(criteria: &QueryCriteria) -> String {
    // Serializing a plain struct of strings, numbers, and lists cannot fail.
    let bytes = serde_json::to_vec(criteria).unwrap_or_default();
    format!("{:x}", Sha256::digest(&bytes))
}

fn payload_digest(criteria: &QueryCriteria, offset: u64, issued_millis: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(fingerprint(criteria).as_bytes());
    hasher.update(offset.to_be_bytes());
    hasher.update(issued_millis.to_be_bytes());
    format!("{:x}", hasher.finalize())
}

impl ScrollCursor {
    pub fn new(criteria: QueryCriteria, offset: u64, issued_at: Timestamp) -> Self {
        Self {
            criteria,
            offset,
            issued_at,
        }
    }

    /// Encode as an opaque URL-safe token.
    pub fn encode(&self) -> String {
        let issued = self.issued_at.timestamp_millis();
        let payload = CursorPayload {
            v: CURSOR_VERSION,
            d: payload_digest(&self.criteria, self.offset, issued),
            c: self.criteria.clone(),
            o: self.offset,
            t: issued,
        };
        let json = serde_json::to_vec(&payload).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode and verify a token produced by [`ScrollCursor::encode`].
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| CursorError::Encoding)?;
        let payload: CursorPayload =
            serde_json::from_slice(&bytes).map_err(|_| CursorError::Payload)?;
        if payload.v != CURSOR_VERSION {
            return Err(CursorError::Version(payload.v));
        }
        if payload_digest(&payload.c, payload.o, payload.t) != payload.d {
            return Err(CursorError::Checksum);
        }
        let issued_at = chrono::Utc
            .timestamp_millis_opt(payload.t)
            .single()
            .ok_or(CursorError::Payload)?;
        Ok(Self {
            criteria: payload.c,
            offset: payload.o,
            issued_at,
        })
    }

    /// Whether the cursor is older than `ttl` at `now`.
    pub fn is_expired(&self, now: Timestamp, ttl: chrono::Duration) -> bool {
        now - self.issued_at > ttl
    }
}
