//! Response envelope shared by every security API route

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Envelope code the server uses to report a revoked session.
pub const REVOKED_CODE: &str = "406";

#[derive(Deserialize)]
struct RawEnvelope {
    successful: bool,
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

/// `{ successful, code, message, data }` wrapper around a route payload.
///
/// `data` stays untyped until [`Envelope::into_data`], so the success flag
/// and code of a failed reply are readable whatever it carries as data.
#[derive(Debug)]
pub struct Envelope<T> {
    pub successful: bool,
    pub code: String,
    pub message: String,
    data: Value,
    payload: PhantomData<T>,
}

fn malformed(e: serde_json::Error) -> Error {
    tracing::debug!("Unparseable envelope: {}", e);
    Error::protocol("", format!("Malformed server response: {}", e))
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Parse a raw response body.
    pub fn parse(body: &str) -> Result<Self> {
        let raw: RawEnvelope = serde_json::from_str(body).map_err(malformed)?;
        Ok(Self {
            successful: raw.successful,
            code: raw.code,
            message: raw.message,
            data: raw.data,
            payload: PhantomData,
        })
    }

    /// Whether the server flagged the session as revoked.
    pub fn is_revoked(&self) -> bool {
        self.code == REVOKED_CODE
    }

    /// Unwrap the payload, turning `successful == false` into a protocol error.
    pub fn into_data(self) -> Result<T> {
        if !self.successful {
            let message = if self.message.is_empty() {
                format!("Request rejected (code {})", self.code)
            } else {
                self.message
            };
            return Err(Error::protocol(self.code, message));
        }
        if self.data.is_null() {
            return Err(Error::protocol(self.code, "Server response is missing data"));
        }
        serde_json::from_value(self.data).map_err(|e| {
            tracing::debug!("Unexpected envelope data: {}", e);
            Error::protocol(self.code, format!("Malformed server response: {}", e))
        })
    }
}
