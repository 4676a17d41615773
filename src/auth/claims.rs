//! Access token payload decoding
//!
//! The access token is base64 (standard alphabet, padded) of a JSON object
//! `{ id, userId, secret }`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Claims carried inside an access token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenClaims {
    pub id: String,
    pub user_id: String,
    /// Per-session random value.
    pub secret: String,
}

/// Decode an access token, reporting why it is unusable.
pub fn try_decode(access_token: &str) -> Result<AccessTokenClaims> {
    let bytes = STANDARD
        .decode(access_token.trim())
        .map_err(|e| Error::Decode(format!("not base64: {}", e)))?;
    let json = std::str::from_utf8(&bytes).map_err(|e| Error::Decode(e.to_string()))?;
    serde_json::from_str(json).map_err(|e| Error::Decode(e.to_string()))
}

/// Decode an access token. `None` means the session is unusable.
pub fn decode(access_token: &str) -> Option<AccessTokenClaims> {
    match try_decode(access_token) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!("Access token not decodable: {}", e);
            None
        }
    }
}

/// Encode claims the way the server does.
pub fn encode(claims: &AccessTokenClaims) -> String {
    // Serializing a struct of strings cannot fail.
    let json = serde_json::to_string(claims).unwrap_or_default();
    STANDARD.encode(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AccessTokenClaims {
        AccessTokenClaims {
            id: "6f1d".into(),
            user_id: "00000000-0000-0000-0000-000000000000".into(),
            secret: "a1b2c3".into(),
        }
    }

    #[test]
    fn test_round_trip() {
        let claims = sample();
        assert_eq!(decode(&encode(&claims)), Some(claims));
    }

    #[test]
    fn test_decode_server_field_names() {
        let token = STANDARD.encode(r#"{"id":"1","userId":"u","secret":"s"}"#);
        let claims = decode(&token).unwrap();
        assert_eq!(claims.user_id, "u");
    }

    #[test]
    fn test_decode_not_base64() {
        assert_eq!(decode("***"), None);
        assert!(matches!(try_decode("***"), Err(Error::Decode(_))));
    }

    #[test]
    fn test_decode_wrong_shape() {
        let token = STANDARD.encode(r#"{"id":1}"#);
        assert_eq!(decode(&token), None);
        let token = STANDARD.encode("plain text");
        assert_eq!(decode(&token), None);
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode(""), None);
    }
}
