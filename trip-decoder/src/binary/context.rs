//! The continuation token.
//!
//! Pagination state for querying earlier/later trips against the same
//! search. Callers round-trip it opaquely: the only sanctioned reads are
//! the buffer-size hint and the can-query-more flag; everything else is
//! private and travels back to the backend unmodified.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

/// A continuation token string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid continuation token")]
pub struct InvalidToken;

/// Opaque pagination state returned with every successful decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingContext {
    request_id: String,
    sequence: u16,
    last_day: Option<String>,
    used_buffer_size: usize,
    can_query_more: bool,
}

impl PagingContext {
    pub(crate) fn new(
        request_id: String,
        sequence: u16,
        last_day: Option<String>,
        used_buffer_size: usize,
        can_query_more: bool,
    ) -> Self {
        Self {
            request_id,
            sequence,
            last_day,
            used_buffer_size,
            can_query_more,
        }
    }

    /// How many bytes of the response the decoder actually consumed.
    ///
    /// Callers use this to size the buffered read of the next page; a
    /// truncated response ([`super::DecodeError::BufferTooSmall`]) should
    /// be retried with a buffer comfortably larger than this.
    pub fn used_buffer_size(&self) -> usize {
        self.used_buffer_size
    }

    /// False when the backend cannot page this search any further.
    pub fn can_query_more(&self) -> bool {
        self.can_query_more
    }

    /// Serialize to an opaque token string for persisting between requests.
    pub fn to_token(&self) -> String {
        // Serializing a plain struct of strings and integers cannot fail.
        let json = serde_json::to_vec(self).expect("token serialization");
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Parse a token produced by [`PagingContext::to_token`].
    pub fn from_token(token: &str) -> Result<Self, InvalidToken> {
        let json = URL_SAFE_NO_PAD.decode(token).map_err(|_| InvalidToken)?;
        serde_json::from_slice(&json).map_err(|_| InvalidToken)
    }
}
