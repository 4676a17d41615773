//! Route construction for the security API

use url::Url;

use crate::error::{Error, Result};

const TOKENS_PATH: &str = "securityapi/v1.0/tokens";
const CODES_PATH: &str = "securityapi/v1.0/tokens/codes";

/// Validated base server plus the routes hanging off it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Validate a base server URL such as `https://api.example.com` or
    /// `http://10.0.0.5:6200/gateway`.
    pub fn new(base_server: &str) -> Result<Self> {
        let base = Url::parse(base_server.trim())?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base server must be http(s), got '{}'",
                base.scheme()
            )));
        }
        if base.cannot_be_a_base() || base.host_str().is_none() {
            return Err(Error::Config(format!(
                "base server '{}' has no host",
                base_server
            )));
        }
        if base.query().is_some() || base.fragment().is_some() {
            return Err(Error::Config(format!(
                "base server '{}' must not carry a query or fragment",
                base_server
            )));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `GET {base}/securityapi/v1.0/tokens/codes?account=`
    pub fn codes(&self, account: &str) -> Url {
        let mut url = self.route(CODES_PATH);
        url.query_pairs_mut().append_pair("account", account);
        url
    }

    /// `GET {base}/securityapi/v1.0/tokens?account=&signature=&deptid=`
    pub fn login(&self, account: &str, signature: &str, dept_id: Option<&str>) -> Url {
        let mut url = self.route(TOKENS_PATH);
        url.query_pairs_mut()
            .append_pair("account", account)
            .append_pair("signature", signature)
            .append_pair("deptid", dept_id.unwrap_or_default());
        url
    }

    /// `GET {base}/securityapi/v1.0/tokens`, authenticated by refresh token.
    pub fn refresh(&self) -> Url {
        self.route(TOKENS_PATH)
    }

    fn route(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/{}", prefix, path));
        url
    }
}
