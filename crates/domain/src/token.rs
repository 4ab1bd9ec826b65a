//! Bearer-token claim decoding and expiry checks.
//!
//! Tokens are the compact three-segment form: the second segment carries a
//! URL-safe base64 JSON payload. Decoding here deliberately skips signature
//! verification; this layer only keeps stale tokens from being sent, it does
//! not establish trust. The upstream API boundary must verify signatures
//! independently.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde::Deserialize;

/// Clock-skew tolerance applied to the expiry claim, in milliseconds.
///
/// A token within this window of its expiry is already treated as expired so
/// that a request issued now does not arrive at the backend stale.
pub const CLOCK_SKEW_MS: i64 = 5_000;

/// Claims extracted from a bearer token payload.
///
/// Unknown payload fields are ignored; both claims are optional because the
/// identity provider controls the payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Claims {
    /// Subject identifier.
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiry timestamp in seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decodes the claims segment of a compact token.
///
/// Returns `None` for any malformed input: wrong segment count, invalid
/// base64, or a payload that is not a JSON object. Never panics.
#[must_use]
pub fn decode_claims(token: &str) -> Option<Claims> {
    let mut segments = token.split('.');
    let (Some(_), Some(payload), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    // Accept both padded and unpadded payloads.
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Reports whether a token is expired at the given wall-clock instant.
///
/// Undecodable tokens and tokens without an expiry claim count as expired.
#[must_use]
pub fn is_expired_at(token: &str, now_ms: i64) -> bool {
    let Some(claims) = decode_claims(token) else {
        return true;
    };
    let Some(exp) = claims.exp else {
        return true;
    };

    now_ms >= exp.saturating_mul(1_000).saturating_sub(CLOCK_SKEW_MS)
}

/// Reports whether a token is expired right now.
#[must_use]
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now().timestamp_millis())
}

/// Reports whether a token is present, decodable, and not yet expired.
#[must_use]
pub fn is_valid(token: &str) -> bool {
    !is_expired(token)
}
