//! Bearer token decoding.
//!
//! Only the claims segment is read. Signatures are never checked here: the
//! server verifies authenticity, the client only cares when a token expires.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

/// URL-safe alphabet, padding optional.
const CLAIMS_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors raised while decoding a token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token must have three dot-separated segments, found {0}")]
    Malformed(usize),

    #[error("claims segment is not valid base64: {0}")]
    Encoding(String),

    #[error("claims segment is not a JSON object: {0}")]
    Claims(String),

    #[error("token has no expiry claim")]
    MissingExpiry,
}

/// The claims the client inspects. Every other claim is ignored, whatever its type.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Claims {
    /// Expiry, seconds since the Unix epoch. Any JSON number is accepted.
    pub exp: Option<f64>,
}

impl Claims {
    /// The expiry claim in whole seconds, or `MissingExpiry`.
    pub fn expiry(&self) -> Result<i64, TokenError> {
        self.exp.map(|exp| exp.floor() as i64).ok_or(TokenError::MissingExpiry)
    }
}

/// Decode the middle segment of `header.claims.signature`.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Malformed(segments.len()));
    }

    // Tolerate tokens encoded with the standard alphabet.
    let normalized: String = segments[1]
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = CLAIMS_ENGINE
        .decode(normalized.as_bytes())
        .map_err(|e| TokenError::Encoding(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| TokenError::Claims(e.to_string()))
}

/// Build an unsigned token carrying `claims`. Used by tests and the CLI.
pub fn encode_unsigned(claims: &serde_json::Value) -> String {
    let header = CLAIMS_ENGINE.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let body = CLAIMS_ENGINE.encode(claims.to_string().as_bytes());
    format!("{}.{}.sig", header.trim_end_matches('='), body.trim_end_matches('='))
}
