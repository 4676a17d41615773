//! One-time login code exchange

use crate::api::{Endpoints, Envelope, Transport};
use crate::error::Result;

/// Ask the server for a one-time code to sign the next login with.
pub async fn fetch_code(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    account: &str,
) -> Result<String> {
    let url = endpoints.codes(account);
    tracing::debug!("Requesting login code for account {}", account);

    let body = transport.get(&url, None).await?;
    Envelope::<String>::parse(&body)?.into_data()
}
