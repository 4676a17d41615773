//! Cached token session
//!
//! [`Session::access_token`] decides, at the moment of the call, whether the
//! cached access token can be handed out, must be refreshed, or the whole
//! pair must be re-acquired through a cold exchange (code fetch, sign,
//! acquire). Nothing runs in the background.
//!
//! All mutable state sits behind one async mutex that stays locked for the
//! duration of an exchange, so concurrent callers never issue duplicate
//! refresh or login requests: they wait, then find the fresh pair.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::claims::{self, AccessTokenClaims};
use super::tokens::{self, TokenPackage};
use super::{codes, signer, Credentials};
use crate::api::{Endpoints, Transport};
use crate::error::{Error, Result};

/// Revocations tolerated in a row before the error is surfaced.
pub const DEFAULT_MAX_REVOCATIONS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Consecutive `406` answers to a refresh that are each turned into a
    /// cold exchange. One more surfaces [`Error::SessionRevoked`].
    pub max_revocations: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_revocations: DEFAULT_MAX_REVOCATIONS,
        }
    }
}

/// Where the cached pair stands, judged by the time since it was acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Nothing acquired yet.
    Uninitialized,
    /// Access token usable as-is.
    Valid,
    /// Past the soft threshold; the next access refreshes.
    SoftExpired,
    /// Past the hard threshold, or the last exchange failed; the next access
    /// performs a cold exchange.
    HardExpired,
}

struct Cached {
    package: TokenPackage,
    acquired_at: Instant,
}

struct SessionState {
    cached: Option<Cached>,
    /// Outcome of the last cold exchange or refresh that reached the server.
    success: bool,
    revocations: u32,
}

impl SessionState {
    fn status(&self, now: Instant) -> SessionStatus {
        let Some(cached) = &self.cached else {
            return SessionStatus::Uninitialized;
        };
        if !self.success {
            return SessionStatus::HardExpired;
        }

        let elapsed = now.saturating_duration_since(cached.acquired_at);
        if elapsed >= Duration::from_secs(cached.package.failure_time) {
            SessionStatus::HardExpired
        } else if elapsed >= Duration::from_secs(cached.package.expiry_time) {
            SessionStatus::SoftExpired
        } else {
            SessionStatus::Valid
        }
    }

    /// Cached access token, only while the pair is [`SessionStatus::Valid`].
    fn valid_token(&self, now: Instant) -> Option<String> {
        match (&self.cached, self.status(now)) {
            (Some(cached), SessionStatus::Valid) => Some(cached.package.access_token.clone()),
            _ => None,
        }
    }

    /// Replace the pair wholesale and hand back the new access token.
    fn store(&mut self, package: TokenPackage) -> String {
        let token = package.access_token.clone();
        self.cached = Some(Cached {
            package,
            acquired_at: Instant::now(),
        });
        self.success = true;
        token
    }
}

/// Token session for one account against one server.
pub struct Session {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
    account: String,
    dept_id: Option<String>,
    signature: String,
    options: SessionOptions,
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoints: Endpoints,
        credentials: &Credentials,
    ) -> Self {
        Self::with_options(transport, endpoints, credentials, SessionOptions::default())
    }

    pub fn with_options(
        transport: Arc<dyn Transport>,
        endpoints: Endpoints,
        credentials: &Credentials,
        options: SessionOptions,
    ) -> Self {
        Self {
            transport,
            endpoints,
            account: credentials.account.clone(),
            dept_id: credentials.dept_id.clone(),
            signature: signer::sign(&credentials.account, &credentials.secret),
            options,
            state: Mutex::new(SessionState {
                cached: None,
                success: false,
                revocations: 0,
            }),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Account signature derived from the configured secret.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Current access token, refreshing or re-acquiring it first if needed.
    pub async fn access_token(&self) -> Result<String> {
        let mut state = self.state.lock().await;

        let now = Instant::now();
        if let Some(token) = state.valid_token(now) {
            return Ok(token);
        }

        if state.status(now) == SessionStatus::SoftExpired {
            self.refresh(&mut state).await
        } else {
            state.revocations = 0;
            self.cold_exchange(&mut state).await
        }
    }

    /// Claims of the cached access token. `None` when nothing is cached or
    /// the token does not decode; either way the session is not usable.
    pub async fn claims(&self) -> Option<AccessTokenClaims> {
        let state = self.state.lock().await;
        state
            .cached
            .as_ref()
            .and_then(|c| claims::decode(&c.package.access_token))
    }

    pub async fn status(&self) -> SessionStatus {
        self.state.lock().await.status(Instant::now())
    }

    /// Whether the last exchange with the server succeeded.
    pub async fn is_success(&self) -> bool {
        self.state.lock().await.success
    }

    /// Forget the cached pair; the next access performs a cold exchange.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.cached = None;
        state.success = false;
        state.revocations = 0;
        tracing::info!("Session for {} invalidated", self.account);
    }

    async fn refresh(&self, state: &mut SessionState) -> Result<String> {
        let Some(refresh_token) = state
            .cached
            .as_ref()
            .map(|c| c.package.refresh_token.clone())
        else {
            return self.cold_exchange(state).await;
        };

        tracing::info!("Access token past expiry, refreshing...");
        match tokens::refresh_tokens(self.transport.as_ref(), &self.endpoints, &refresh_token)
            .await
        {
            Ok(package) => {
                state.revocations = 0;
                tracing::info!("Token refreshed");
                Ok(state.store(package))
            }
            Err(Error::SessionRevoked) => {
                state.revocations += 1;
                if state.revocations > self.options.max_revocations {
                    tracing::warn!(
                        "Session revoked {} times in a row, giving up",
                        state.revocations
                    );
                    return Err(Error::SessionRevoked);
                }
                tracing::info!("Session revoked by server, re-acquiring tokens...");
                self.cold_exchange(state).await
            }
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                Err(e)
            }
        }
    }

    async fn cold_exchange(&self, state: &mut SessionState) -> Result<String> {
        tracing::info!("Acquiring token pair for {}...", self.account);

        match self.acquire().await {
            Ok(package) => {
                tracing::info!("Token pair acquired");
                Ok(state.store(package))
            }
            Err(e) => {
                state.success = false;
                tracing::warn!("Token acquisition failed: {}", e);
                Err(e)
            }
        }
    }

    async fn acquire(&self) -> Result<TokenPackage> {
        let transport = self.transport.as_ref();
        let code = codes::fetch_code(transport, &self.endpoints, &self.account).await?;
        let login_signature = signer::sign_login(&self.signature, &code);
        tokens::acquire_tokens(
            transport,
            &self.endpoints,
            &self.account,
            &login_signature,
            self.dept_id.as_deref(),
        )
        .await
    }
}
