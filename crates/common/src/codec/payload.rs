//! The transport payload a sender hands back to the requestor
//!
//! # Wire Format
//!
//! ```text
//! base64( JSON { "message": base64(ciphertext), "key": base64(wrapped_key) } )
//! ```
//!
//! Both base64 layers use the standard alphabet with padding. This is the one
//! canonical format; senders and receivers never negotiate another.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::serde_as;

use crate::crypto::{WrappedKey, WRAPPED_KEY_SIZE};

/// Errors produced while decoding a transport payload
///
/// Every variant is a structural problem detected before any cryptography runs.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("payload is empty")]
    Empty,
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not a valid message object: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload key has wrong size, expected {expected}, got {got}")]
    KeySize { expected: usize, got: usize },
}

#[serde_as]
#[derive(Serialize, Deserialize)]
struct Envelope {
    #[serde_as(as = "Base64")]
    message: Vec<u8>,
    #[serde_as(as = "Base64")]
    key: Vec<u8>,
}

/// A wrapped key and the ciphertext it unlocks
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportPayload {
    pub wrapped_key: WrappedKey,
    pub ciphertext: Vec<u8>,
}

impl TransportPayload {
    pub fn new(wrapped_key: WrappedKey, ciphertext: Vec<u8>) -> Self {
        Self {
            wrapped_key,
            ciphertext,
        }
    }

    /// Serialize into the single pasteable token
    pub fn encode(&self) -> Result<String, PayloadError> {
        let envelope = Envelope {
            message: self.ciphertext.clone(),
            key: self.wrapped_key.bytes().to_vec(),
        };
        let json = serde_json::to_vec(&envelope)?;
        Ok(STANDARD.encode(json))
    }

    /// Parse a token produced by [`TransportPayload::encode`]
    ///
    /// Surrounding and embedded ASCII whitespace is ignored.
    pub fn decode(token: &str) -> Result<Self, PayloadError> {
        let compact: String = token.split_ascii_whitespace().collect();
        if compact.is_empty() {
            return Err(PayloadError::Empty);
        }
        let json = STANDARD.decode(compact)?;
        let envelope: Envelope = serde_json::from_slice(&json)?;
        let wrapped_key =
            WrappedKey::try_from(envelope.key.as_slice()).map_err(|_| PayloadError::KeySize {
                expected: WRAPPED_KEY_SIZE,
                got: envelope.key.len(),
            })?;
        Ok(Self::new(wrapped_key, envelope.message))
    }
}

impl fmt::Display for TransportPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = self.encode().map_err(|_| fmt::Error)?;
        f.write_str(&token)
    }
}

impl FromStr for TransportPayload {
    type Err = PayloadError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> TransportPayload {
        let mut key = [0u8; WRAPPED_KEY_SIZE];
        for (i, b) in key.iter_mut().enumerate() {
            *b = i as u8;
        }
        TransportPayload::new(WrappedKey::from(key), b"ciphertext bytes".to_vec())
    }

    #[test]
    fn test_encode_decode() {
        let payload = sample();
        let token = payload.encode().unwrap();
        assert_eq!(TransportPayload::decode(&token).unwrap(), payload);
        assert_eq!(token.parse::<TransportPayload>().unwrap(), payload);
        assert_eq!(payload.to_string(), token);
    }

    #[test]
    fn test_wire_format_is_nested_base64_json() {
        let payload = sample();
        let token = payload.encode().unwrap();

        let json = STANDARD.decode(&token).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);

        let message = STANDARD
            .decode(object["message"].as_str().unwrap())
            .unwrap();
        let key = STANDARD.decode(object["key"].as_str().unwrap()).unwrap();
        assert_eq!(message, payload.ciphertext);
        assert_eq!(key, payload.wrapped_key.bytes());
    }

    #[test]
    fn test_decode_hand_built_token() {
        let payload = sample();
        let json = format!(
            r#"{{"key":"{}","message":"{}"}}"#,
            STANDARD.encode(payload.wrapped_key.bytes()),
            STANDARD.encode(&payload.ciphertext)
        );
        let token = STANDARD.encode(json);
        assert_eq!(TransportPayload::decode(&token).unwrap(), payload);
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            TransportPayload::decode(""),
            Err(PayloadError::Empty)
        ));
        assert!(matches!(
            TransportPayload::decode("definitely not a payload"),
            Err(PayloadError::Base64(_))
        ));
        assert!(matches!(
            TransportPayload::decode(&STANDARD.encode("{\"message\": 1}")),
            Err(PayloadError::Json(_))
        ));
        assert!(matches!(
            TransportPayload::decode(&STANDARD.encode(r#"{"message":"AA==","key":"AA=="}"#)),
            Err(PayloadError::KeySize { got: 1, .. })
        ));

        let token = sample().encode().unwrap();
        assert!(TransportPayload::decode(&token[..token.len() - 5]).is_err());
    }
}
