//! JWT claim sets and their registered-claim validation.
//!
//! Claims are kept as a JSON object so that any JSON-compatible value can be
//! carried. The registered date claims (`exp`, `nbf`, `iat`) are NumericDate
//! values: seconds since the UNIX epoch. Setting one from a `DateTime`
//! normalizes it to whole seconds.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::JwtError;

pub const ISSUER: &str = "iss";
pub const AUDIENCE: &str = "aud";
pub const EXPIRATION: &str = "exp";
pub const NOT_BEFORE: &str = "nbf";
pub const ISSUED_AT: &str = "iat";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet {
    claims: Map<String, Value>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(claims: Map<String, Value>) -> Self {
        Self { claims }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.claims
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.claims.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.claims.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.claims.remove(key)
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Stores a date as NumericDate seconds.
    pub fn set_date(&mut self, key: impl Into<String>, date: DateTime<Utc>) {
        self.claims.insert(key.into(), Value::from(date.timestamp()));
    }

    pub fn date(&self, key: &str) -> Option<DateTime<Utc>> {
        let seconds = self.claims.get(key)?.as_f64()?;
        Utc.timestamp_millis_opt((seconds * 1000.0).round() as i64).single()
    }

    pub fn issuer(&self) -> Option<&str> {
        self.claims.get(ISSUER).and_then(Value::as_str)
    }

    pub fn set_issuer(&mut self, issuer: impl Into<String>) {
        self.claims.insert(ISSUER.to_string(), Value::String(issuer.into()));
    }

    /// Audience when stored as a single string.
    pub fn audience(&self) -> Option<&str> {
        self.claims.get(AUDIENCE).and_then(Value::as_str)
    }

    pub fn set_audience(&mut self, audience: impl Into<String>) {
        self.claims
            .insert(AUDIENCE.to_string(), Value::String(audience.into()));
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.date(EXPIRATION)
    }

    pub fn set_expiration(&mut self, date: DateTime<Utc>) {
        self.set_date(EXPIRATION, date);
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.date(NOT_BEFORE)
    }

    pub fn set_not_before(&mut self, date: DateTime<Utc>) {
        self.set_date(NOT_BEFORE, date);
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.date(ISSUED_AT)
    }

    pub fn set_issued_at(&mut self, date: DateTime<Utc>) {
        self.set_date(ISSUED_AT, date);
    }

    pub fn validate(&self, validation: &Validation) -> Result<(), JwtError> {
        self.validate_at(validation, Utc::now())
    }

    /// Checks registered claims against `validation` as of `now`.
    ///
    /// Absent claims always pass; present claims of the wrong JSON type
    /// fail with `DecodeError`.
    pub fn validate_at(&self, validation: &Validation, now: DateTime<Utc>) -> Result<(), JwtError> {
        if let Some(issuer) = &validation.issuer {
            self.validate_issuer(issuer)?;
        }
        if let Some(audience) = &validation.audience {
            self.validate_audience(audience)?;
        }

        let now = now.timestamp_millis() as f64 / 1000.0;
        let leeway = validation.leeway.as_secs_f64();

        let expiration =
            self.numeric_date(EXPIRATION, "Expiration time claim (exp) must be a number")?;
        if let Some(exp) = expiration {
            if now > exp + leeway {
                return Err(JwtError::ExpiredSignature);
            }
        }
        let not_before = self.numeric_date(NOT_BEFORE, "Not before claim (nbf) must be a number")?;
        if let Some(nbf) = not_before {
            if now < nbf - leeway {
                return Err(JwtError::ImmatureSignature);
            }
        }
        let issued_at = self.numeric_date(ISSUED_AT, "Issued at claim (iat) must be a number")?;
        if let Some(iat) = issued_at {
            if iat > now + leeway {
                return Err(JwtError::InvalidIssuedAt);
            }
        }
        Ok(())
    }

    pub fn validate_issuer(&self, expected: &str) -> Result<(), JwtError> {
        match self.claims.get(ISSUER) {
            None => Ok(()),
            Some(Value::String(iss)) if iss == expected => Ok(()),
            Some(Value::String(_)) => Err(JwtError::InvalidIssuer),
            Some(_) => Err(JwtError::DecodeError(
                "Issuer claim (iss) must be a string".to_string(),
            )),
        }
    }

    pub fn validate_audience(&self, expected: &str) -> Result<(), JwtError> {
        let invalid = || {
            JwtError::DecodeError(
                "Invalid audience claim, must be a string or an array of strings".to_string(),
            )
        };
        match self.claims.get(AUDIENCE) {
            None => Ok(()),
            Some(Value::String(aud)) if aud == expected => Ok(()),
            Some(Value::String(_)) => Err(JwtError::InvalidAudience),
            Some(Value::Array(entries)) => {
                let mut found = false;
                for entry in entries {
                    let aud = entry.as_str().ok_or_else(invalid)?;
                    found |= aud == expected;
                }
                if found {
                    Ok(())
                } else {
                    Err(JwtError::InvalidAudience)
                }
            }
            Some(_) => Err(invalid()),
        }
    }

    fn numeric_date(&self, key: &str, type_error: &str) -> Result<Option<f64>, JwtError> {
        match self.claims.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| JwtError::DecodeError(type_error.to_string())),
        }
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(claims: Map<String, Value>) -> Self {
        Self::from_map(claims)
    }
}

/// Expectations checked by [`ClaimSet::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    pub audience: Option<String>,
    pub issuer: Option<String>,
    /// Clock skew tolerated on every date claim.
    pub leeway: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct ClaimSetBuilder {
    claims: ClaimSet,
}

impl ClaimSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.claims.set_issuer(issuer);
        self
    }

    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.claims.set_audience(audience);
        self
    }

    pub fn expiration(mut self, date: DateTime<Utc>) -> Self {
        self.claims.set_expiration(date);
        self
    }

    pub fn not_before(mut self, date: DateTime<Utc>) -> Self {
        self.claims.set_not_before(date);
        self
    }

    pub fn issued_at(mut self, date: DateTime<Utc>) -> Self {
        self.claims.set_issued_at(date);
        self
    }

    pub fn claim(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(key, value);
        self
    }

    pub fn build(self) -> ClaimSet {
        self.claims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    fn claims(value: Value) -> ClaimSet {
        match value {
            Value::Object(map) => ClaimSet::from_map(map),
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn builder_normalizes_dates_to_seconds() {
        let set = ClaimSetBuilder::new()
            .issuer("listkit")
            .expiration(at(2_000))
            .issued_at(at(1_000))
            .claim("role", "admin")
            .build();

        assert_eq!(set.get("exp"), Some(&json!(2_000)));
        assert_eq!(set.expiration(), Some(at(2_000)));
        assert_eq!(set.issued_at(), Some(at(1_000)));
        assert_eq!(set.issuer(), Some("listkit"));
        assert_eq!(set.get("role"), Some(&json!("admin")));
        assert_eq!(set.not_before(), None);
    }

    #[test]
    fn fractional_dates_are_read() {
        let set = claims(json!({ "exp": 1_500.5 }));
        assert_eq!(set.expiration().unwrap().timestamp_millis(), 1_500_500);
    }

    #[test]
    fn missing_claims_pass_validation() {
        let validation = Validation {
            audience: Some("app".to_string()),
            issuer: Some("listkit".to_string()),
            leeway: Duration::ZERO,
        };
        assert_eq!(ClaimSet::new().validate_at(&validation, at(10)), Ok(()));
    }

    #[test]
    fn issuer_mismatch_and_type_errors() {
        let validation = Validation {
            issuer: Some("listkit".to_string()),
            ..Validation::default()
        };
        assert_eq!(
            claims(json!({ "iss": "other" })).validate_at(&validation, at(0)),
            Err(JwtError::InvalidIssuer)
        );
        assert!(matches!(
            claims(json!({ "iss": 7 })).validate_at(&validation, at(0)),
            Err(JwtError::DecodeError(_))
        ));
        assert_eq!(
            claims(json!({ "iss": "listkit" })).validate_at(&validation, at(0)),
            Ok(())
        );
    }

    #[test]
    fn audience_string_or_array() {
        let set = claims(json!({ "aud": ["web", "app"] }));
        assert_eq!(set.validate_audience("app"), Ok(()));
        assert_eq!(set.validate_audience("cli"), Err(JwtError::InvalidAudience));

        let set = claims(json!({ "aud": "app" }));
        assert_eq!(set.validate_audience("app"), Ok(()));
        assert_eq!(set.validate_audience("web"), Err(JwtError::InvalidAudience));

        assert!(matches!(
            claims(json!({ "aud": ["app", 3] })).validate_audience("app"),
            Err(JwtError::DecodeError(_))
        ));
        assert!(matches!(
            claims(json!({ "aud": { "name": "app" } })).validate_audience("app"),
            Err(JwtError::DecodeError(_))
        ));
    }

    #[test]
    fn expiration_honours_leeway() {
        let set = claims(json!({ "exp": 100 }));
        let strict = Validation::default();
        let lenient = Validation {
            leeway: Duration::from_secs(10),
            ..Validation::default()
        };

        assert_eq!(set.validate_at(&strict, at(100)), Ok(()));
        assert_eq!(set.validate_at(&strict, at(101)), Err(JwtError::ExpiredSignature));
        assert_eq!(set.validate_at(&lenient, at(110)), Ok(()));
        assert_eq!(set.validate_at(&lenient, at(111)), Err(JwtError::ExpiredSignature));
    }

    #[test]
    fn not_before_honours_leeway() {
        let set = claims(json!({ "nbf": 100 }));
        let lenient = Validation {
            leeway: Duration::from_secs(5),
            ..Validation::default()
        };
        assert_eq!(
            set.validate_at(&Validation::default(), at(99)),
            Err(JwtError::ImmatureSignature)
        );
        assert_eq!(set.validate_at(&lenient, at(95)), Ok(()));
        assert_eq!(set.validate_at(&lenient, at(94)), Err(JwtError::ImmatureSignature));
    }

    #[test]
    fn issued_in_future_is_rejected() {
        let set = claims(json!({ "iat": 200 }));
        assert_eq!(
            set.validate_at(&Validation::default(), at(199)),
            Err(JwtError::InvalidIssuedAt)
        );
        assert_eq!(set.validate_at(&Validation::default(), at(200)), Ok(()));
    }

    #[test]
    fn non_numeric_dates_are_decode_errors() {
        for key in ["exp", "nbf", "iat"] {
            let mut set = ClaimSet::new();
            set.insert(key, "tomorrow");
            assert!(matches!(
                set.validate_at(&Validation::default(), at(0)),
                Err(JwtError::DecodeError(_))
            ));
        }
    }
}
