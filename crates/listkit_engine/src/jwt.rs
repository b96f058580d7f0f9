//! Compact JWS encoding of claim sets.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{Algorithm, ClaimSet, Validation};

/// base64url, unpadded on output, padding optional on input.
const BASE64_URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("decode error: {0}")]
    DecodeError(String),
    #[error("signature has expired")]
    ExpiredSignature,
    #[error("token is not valid yet")]
    ImmatureSignature,
    #[error("token was issued in the future")]
    InvalidIssuedAt,
    #[error("issuer does not match")]
    InvalidIssuer,
    #[error("audience does not match")]
    InvalidAudience,
    #[error("secret cannot be used as a signing key")]
    InvalidKey,
}

/// Encodes `claims` as `header.payload.signature`.
pub fn encode(claims: &ClaimSet, secret: &[u8], algorithm: Algorithm) -> Result<String, JwtError> {
    let header = json!({ "alg": algorithm.name(), "typ": "JWT" });
    let signing_input = format!("{}.{}", encode_segment(&header)?, encode_segment(claims)?);
    let signature = algorithm.sign(secret, signing_input.as_bytes())?;
    Ok(format!("{signing_input}.{}", BASE64_URL.encode(signature)))
}

/// Verifies and decodes a token signed with `algorithm`.
///
/// Claims are not validated; see [`decode_and_validate`].
pub fn decode(token: &str, secret: &[u8], algorithm: Algorithm) -> Result<ClaimSet, JwtError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header, payload, signature] = segments.as_slice() else {
        return Err(JwtError::InvalidToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    };

    let header = decode_json(header, "header")?;
    let Value::Object(header) = header else {
        return Err(JwtError::InvalidToken("header is not a JSON object".to_string()));
    };
    match header.get("alg").and_then(Value::as_str) {
        Some(alg) if alg == algorithm.name() => {}
        other => {
            return Err(JwtError::InvalidToken(format!(
                "header algorithm {other:?} does not match {algorithm}"
            )))
        }
    }

    let signature = decode_segment(signature, "signature")?;
    let signing_input = &token[..token.len() - segments[2].len() - 1];
    if !algorithm.verify(secret, signing_input.as_bytes(), &signature)? {
        return Err(JwtError::InvalidToken("signature verification failed".to_string()));
    }

    match decode_json(payload, "payload")? {
        Value::Object(claims) => Ok(ClaimSet::from_map(claims)),
        _ => Err(JwtError::InvalidToken("payload is not a JSON object".to_string())),
    }
}

pub fn decode_and_validate(
    token: &str,
    secret: &[u8],
    algorithm: Algorithm,
    validation: &Validation,
) -> Result<ClaimSet, JwtError> {
    let claims = decode(token, secret, algorithm)?;
    claims.validate(validation)?;
    Ok(claims)
}

fn encode_segment<S: Serialize + ?Sized>(value: &S) -> Result<String, JwtError> {
    let bytes = serde_json::to_vec(value)
        .map_err(|err| JwtError::InvalidToken(format!("claims are not serializable: {err}")))?;
    Ok(BASE64_URL.encode(bytes))
}

fn decode_segment(segment: &str, what: &str) -> Result<Vec<u8>, JwtError> {
    BASE64_URL
        .decode(segment)
        .map_err(|err| JwtError::InvalidToken(format!("{what} is not base64url: {err}")))
}

fn decode_json(segment: &str, what: &str) -> Result<Value, JwtError> {
    let bytes = decode_segment(segment, what)?;
    serde_json::from_slice(&bytes)
        .map_err(|err| JwtError::InvalidToken(format!("{what} is not JSON: {err}")))
}
