//! Plugin reactivation over HTTP

use super::{BOOTSTRAP_SCRIPT_NAME, ProvisionError, ServerEndpoint};
use reqwest::Client;
use tracing::{debug, info};

/// URL of the bootstrap script on the running server
pub fn reactivation_url(endpoint: &ServerEndpoint) -> String {
    format!(
        "http://{}:{}/{}",
        endpoint.host, endpoint.port, BOOTSTRAP_SCRIPT_NAME
    )
}

/// Requests the bootstrap script so the server runs it
pub struct Reactivator {
    client: Client,
}

impl Reactivator {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Issue the GET once the response head arrives.
    ///
    /// Neither the status nor the body is inspected; the body is dropped
    /// unread. Only failures to send the request or receive the head are
    /// errors. Returns the URL that was requested.
    pub async fn trigger(&self, endpoint: &ServerEndpoint) -> Result<String, ProvisionError> {
        let url = reactivation_url(endpoint);
        info!(url = %url, "requesting plugin reactivation");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ProvisionError::Reactivate {
                url: url.clone(),
                source,
            })?;

        debug!(
            status = %response.status(),
            length = ?response.content_length(),
            "reactivation response"
        );
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    include!("reactivate.test.rs");
}
