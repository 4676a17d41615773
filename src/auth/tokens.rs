//! Token pair acquisition and refresh

use serde::{Deserialize, Serialize};

use super::claims;
use crate::api::{Endpoints, Envelope, Transport};
use crate::error::{Error, Result};

/// Token pair issued by the server.
///
/// `expiry_time` and `failure_time` are lifetimes in seconds counted from
/// the moment the package was received.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPackage {
    pub access_token: String,
    pub refresh_token: String,
    /// Soft threshold: refresh once this many seconds have passed.
    pub expiry_time: u64,
    /// Hard threshold: the refresh token is dead after this many seconds.
    pub failure_time: u64,
}

impl std::fmt::Debug for TokenPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPackage")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expiry_time", &self.expiry_time)
            .field("failure_time", &self.failure_time)
            .finish()
    }
}

impl TokenPackage {
    fn validate(self, code: &str) -> Result<Self> {
        if self.access_token.is_empty() {
            return Err(Error::protocol(code, "Server issued an empty access token"));
        }
        if let Err(e) = claims::try_decode(&self.access_token) {
            return Err(Error::protocol(
                code,
                format!("Server issued an unusable access token: {}", e),
            ));
        }
        if self.expiry_time > self.failure_time {
            return Err(Error::protocol(
                code,
                format!(
                    "Token expiry ({}s) exceeds failure time ({}s)",
                    self.expiry_time, self.failure_time
                ),
            ));
        }
        Ok(self)
    }
}

fn into_package(envelope: Envelope<TokenPackage>) -> Result<TokenPackage> {
    let code = envelope.code.clone();
    envelope.into_data()?.validate(&code)
}

/// Cold exchange: trade a signed one-time code for a new token pair.
pub async fn acquire_tokens(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    account: &str,
    login_signature: &str,
    dept_id: Option<&str>,
) -> Result<TokenPackage> {
    let url = endpoints.login(account, login_signature, dept_id);
    tracing::debug!("Acquiring token pair for account {}", account);

    let body = transport.get(&url, None).await?;
    into_package(Envelope::parse(&body)?)
}

/// Warm refresh: present the refresh token and receive a renewed pair.
///
/// Returns [`Error::SessionRevoked`] when the server reports the session as
/// revoked, whatever the success flag says.
pub async fn refresh_tokens(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    refresh_token: &str,
) -> Result<TokenPackage> {
    let url = endpoints.refresh();
    tracing::debug!("Refreshing token pair");

    let body = transport.get(&url, Some(refresh_token)).await?;
    let envelope = Envelope::<TokenPackage>::parse(&body)?;
    if envelope.is_revoked() {
        return Err(Error::SessionRevoked);
    }
    into_package(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{envelope_err, package, tokens_ok, MockTransport, Route};

    fn endpoints() -> Endpoints {
        Endpoints::new("http://auth.test").unwrap()
    }

    #[test]
    fn test_package_wire_names() {
        let pkg: TokenPackage = serde_json::from_str(
            r#"{"accessToken":"a","refreshToken":"r","expiryTime":300,"failureTime":3600}"#,
        )
        .unwrap();
        assert_eq!(pkg.expiry_time, 300);
        assert_eq!(pkg.failure_time, 3600);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let out = format!("{:?}", package("secret-access", 300, 3600));
        assert!(!out.contains("secret-access"));
    }

    #[tokio::test]
    async fn test_acquire_tokens() {
        let transport = MockTransport::new();
        transport.push(Route::Login, Ok(tokens_ok(&package("A1", 300, 3600))));

        let pkg = acquire_tokens(&transport, &endpoints(), "admin", "sig", Some("d1"))
            .await
            .unwrap();
        assert_eq!(pkg.access_token, package("A1", 300, 3600).access_token);

        let calls = transport.calls();
        assert_eq!(
            calls[0].url,
            "http://auth.test/securityapi/v1.0/tokens?account=admin&signature=sig&deptid=d1"
        );
    }

    #[tokio::test]
    async fn test_acquire_rejects_inverted_thresholds() {
        let transport = MockTransport::new();
        transport.push(Route::Login, Ok(tokens_ok(&package("A1", 600, 60))));

        let err = acquire_tokens(&transport, &endpoints(), "admin", "sig", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[tokio::test]
    async fn test_acquire_rejects_undecodable_access_token() {
        let transport = MockTransport::new();
        let mut pkg = package("A1", 300, 3600);
        pkg.access_token = "***not-base64***".into();
        transport.push(Route::Login, Ok(tokens_ok(&pkg)));

        let err = acquire_tokens(&transport, &endpoints(), "admin", "sig", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
        assert!(err.to_string().contains("unusable access token"));
    }

    #[tokio::test]
    async fn test_refresh_sends_bearer() {
        let transport = MockTransport::new();
        transport.push(Route::Refresh, Ok(tokens_ok(&package("A2", 300, 3600))));

        refresh_tokens(&transport, &endpoints(), "R1").await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].url, "http://auth.test/securityapi/v1.0/tokens");
        assert_eq!(calls[0].bearer.as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn test_refresh_revoked() {
        let transport = MockTransport::new();
        transport.push(Route::Refresh, Ok(envelope_err("406", "Refresh token revoked")));

        let err = refresh_tokens(&transport, &endpoints(), "R1").await.unwrap_err();
        assert_eq!(err, Error::SessionRevoked);
    }

    #[tokio::test]
    async fn test_refresh_revoked_with_empty_string_data() {
        let transport = MockTransport::new();
        transport.push(
            Route::Refresh,
            Ok(r#"{"successful":false,"code":"406","message":"revoked","data":""}"#.to_string()),
        );

        let err = refresh_tokens(&transport, &endpoints(), "R1").await.unwrap_err();
        assert_eq!(err, Error::SessionRevoked);
    }

    #[tokio::test]
    async fn test_refresh_other_failure() {
        let transport = MockTransport::new();
        transport.push(Route::Refresh, Ok(envelope_err("401", "Invalid token")));

        let err = refresh_tokens(&transport, &endpoints(), "R1").await.unwrap_err();
        assert_eq!(err, Error::protocol("401", "Invalid token"));
    }
}
