//! Claims validation against the configured options.

use crate::{error::ClaimError, options::Options};
use chrono::Utc;
use serde_json::{Map, Value};

/// Validate a claims object against the given options.
///
/// Missing claims pass: absence is not failure. Each rule is independently
/// toggleable through [`Options`].
pub fn validate(claims: &Map<String, Value>, options: &Options) -> Result<(), ClaimError> {
    let now = Utc::now().timestamp();
    let skew = i64::try_from(options.max_clock_skew).unwrap_or(i64::MAX);

    if !options.ignore_exp {
        if let Some(value) = claims.get("exp") {
            let exp = numeric_date(value).ok_or(ClaimError::Malformed("exp"))?;
            if now - skew > exp {
                return Err(ClaimError::Expired);
            }
        }
    }

    if !options.ignore_nbf {
        if let Some(value) = claims.get("nbf") {
            let nbf = numeric_date(value).ok_or(ClaimError::Malformed("nbf"))?;
            if now + skew < nbf {
                return Err(ClaimError::NotYetValid);
            }
        }
    }

    if !options.valid_iss.is_empty() {
        if let Some(value) = claims.get("iss") {
            let iss = value.as_str().ok_or(ClaimError::Malformed("iss"))?;
            if !options.valid_iss.iter().any(|v| v == iss) {
                return Err(ClaimError::InvalidIssuer);
            }
        }
    }

    if !options.valid_aud.is_empty() {
        if let Some(value) = claims.get("aud") {
            if !audience_intersects(value, &options.valid_aud)? {
                return Err(ClaimError::InvalidAudience);
            }
        }
    }

    Ok(())
}

/// `exp`/`nbf` are numeric dates; fractional values truncate toward zero.
fn numeric_date(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}

/// `aud` may be a single string or an array of strings.
fn audience_intersects(value: &Value, valid: &[String]) -> Result<bool, ClaimError> {
    match value {
        Value::String(aud) => Ok(valid.iter().any(|v| v == aud)),
        Value::Array(entries) => {
            for entry in entries {
                let aud = entry.as_str().ok_or(ClaimError::Malformed("aud"))?;
                if valid.iter().any(|v| v == aud) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Err(ClaimError::Malformed("aud")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let result = validate(&claims(json!({ "exp": now - 1 })), &Options::default());
        assert_eq!(result, Err(ClaimError::Expired));
    }

    #[test]
    fn ignore_exp_accepts_expired_token() {
        let now = Utc::now().timestamp();
        let options = Options {
            ignore_exp: true,
            ..Default::default()
        };
        assert!(validate(&claims(json!({ "exp": now - 1 })), &options).is_ok());
    }

    #[test]
    fn clock_skew_tolerates_recent_expiry() {
        let now = Utc::now().timestamp();
        let options = Options {
            max_clock_skew: 60,
            ..Default::default()
        };
        assert!(validate(&claims(json!({ "exp": now - 10 })), &options).is_ok());
        assert_eq!(
            validate(&claims(json!({ "exp": now - 120 })), &options),
            Err(ClaimError::Expired)
        );
    }

    #[test]
    fn not_yet_valid_token_is_rejected() {
        let now = Utc::now().timestamp();
        assert_eq!(
            validate(&claims(json!({ "nbf": now + 60 })), &Options::default()),
            Err(ClaimError::NotYetValid)
        );
        let options = Options {
            max_clock_skew: 120,
            ..Default::default()
        };
        assert!(validate(&claims(json!({ "nbf": now + 60 })), &options).is_ok());
    }

    #[test]
    fn issuer_must_be_listed_when_configured() {
        let options = Options {
            valid_iss: vec!["example.org".to_string()],
            ..Default::default()
        };
        assert_eq!(
            validate(&claims(json!({ "iss": "other.org" })), &options),
            Err(ClaimError::InvalidIssuer)
        );
        assert!(validate(&claims(json!({ "iss": "example.org" })), &options).is_ok());
        // Empty valid_iss never rejects on issuer
        assert!(validate(
            &claims(json!({ "iss": "other.org" })),
            &Options::default()
        )
        .is_ok());
    }

    #[test]
    fn audience_accepts_string_or_array() {
        let options = Options {
            valid_aud: vec!["api".to_string()],
            ..Default::default()
        };
        assert!(validate(&claims(json!({ "aud": "api" })), &options).is_ok());
        assert!(validate(&claims(json!({ "aud": ["web", "api"] })), &options).is_ok());
        assert_eq!(
            validate(&claims(json!({ "aud": ["web"] })), &options),
            Err(ClaimError::InvalidAudience)
        );
    }

    #[test]
    fn missing_claims_are_not_validated() {
        let options = Options {
            valid_iss: vec!["example.org".to_string()],
            valid_aud: vec!["api".to_string()],
            ..Default::default()
        };
        assert!(validate(&claims(json!({ "sub": "user" })), &options).is_ok());
    }

    #[test]
    fn malformed_temporal_claim_is_rejected() {
        assert_eq!(
            validate(&claims(json!({ "exp": "tomorrow" })), &Options::default()),
            Err(ClaimError::Malformed("exp"))
        );
    }
}
