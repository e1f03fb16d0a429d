//! JWT payload inspection.
//!
//! Only the payload segment is decoded. Nothing here verifies a signature,
//! so the results are hints for skipping requests that would be rejected.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use tracing::warn;

/// Tokens closer than this to expiry count as expiring soon.
pub const DEFAULT_EXPIRY_THRESHOLD_SECS: i64 = 5 * 60;

const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode the claims of a `header.payload.signature` token.
///
/// Returns `None` unless the token has exactly three parts and the payload
/// is a base64url-encoded JSON object. Padding is optional and the standard
/// alphabet's `+`/`/` are accepted too.
pub fn parse_jwt_payload(token: &str) -> Option<Map<String, Value>> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        warn!(parts = parts.len(), "Invalid JWT format");
        return None;
    }

    let segment = parts[1].replace('+', "-").replace('/', "_");
    let bytes = match PAYLOAD_ENGINE.decode(segment.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "JWT payload is not base64url");
            return None;
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(claims)) => Some(claims),
        Ok(_) => {
            warn!("JWT payload is not a JSON object");
            None
        }
        Err(e) => {
            warn!(error = %e, "JWT payload is not JSON");
            None
        }
    }
}

fn exp_claim(claims: &Map<String, Value>) -> Option<i64> {
    let exp = claims.get("exp")?;
    exp.as_i64().or_else(|| exp.as_f64().map(|f| f.floor() as i64))
}

/// Expiry instant from the `exp` claim.
pub fn jwt_expiration(token: &str) -> Option<DateTime<Utc>> {
    if token.is_empty() {
        return None;
    }
    let exp = exp_claim(&parse_jwt_payload(token)?)?;
    DateTime::from_timestamp(exp, 0)
}

/// Whether `token` is well-formed and not past its `exp` claim.
///
/// A token without `exp` never expires.
pub fn is_jwt_token_valid(token: &str) -> bool {
    is_jwt_token_valid_at(token, Utc::now())
}

pub fn is_jwt_token_valid_at(token: &str, now: DateTime<Utc>) -> bool {
    if token.is_empty() {
        return false;
    }
    let Some(claims) = parse_jwt_payload(token) else {
        return false;
    };
    match exp_claim(&claims) {
        Some(exp) if exp < now.timestamp() => {
            warn!("JWT token has expired");
            false
        }
        _ => true,
    }
}

/// Whether `token` expires within `threshold`.
///
/// Missing, unreadable and `exp`-less tokens all count as expiring soon.
pub fn is_jwt_token_expiring_soon(token: &str, threshold: Duration) -> bool {
    is_jwt_token_expiring_soon_at(token, threshold, Utc::now())
}

pub fn is_jwt_token_expiring_soon_at(token: &str, threshold: Duration, now: DateTime<Utc>) -> bool {
    if token.is_empty() {
        return true;
    }
    match parse_jwt_payload(token).as_ref().and_then(exp_claim) {
        Some(exp) => exp - now.timestamp() < threshold.num_seconds(),
        None => true,
    }
}
