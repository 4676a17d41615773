//! Authentication against the Insight security API
//!
//! Signs the account, exchanges one-time codes for token pairs and keeps
//! the resulting pair fresh inside a [`Session`].

pub mod claims;
pub mod codes;
pub mod session;
pub mod signer;
pub mod tokens;

pub use claims::AccessTokenClaims;
pub use session::{Session, SessionOptions, SessionStatus};
pub use tokens::TokenPackage;

/// Login credentials for one account.
#[derive(Clone)]
pub struct Credentials {
    /// Account name; case does not matter to the server.
    pub account: String,
    /// Shared secret, only ever used to derive the signature.
    pub secret: String,
    /// Department to log in to, if the account belongs to several.
    pub dept_id: Option<String>,
}

impl Credentials {
    pub fn new(account: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            secret: secret.into(),
            dept_id: None,
        }
    }

    pub fn with_dept(mut self, dept_id: impl Into<String>) -> Self {
        self.dept_id = Some(dept_id.into());
        self
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("secret", &"<redacted>")
            .field("dept_id", &self.dept_id)
            .finish()
    }
}
