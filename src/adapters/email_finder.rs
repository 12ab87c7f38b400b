use crate::adapters::{check_status, REQUEST_TIMEOUT};
use crate::domain::ports::EmailFinder;
use crate::utils::error::{LeadError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const SERVICE: &str = "email-finder";

/// Email discovery keyed by person name + company domain. "not_found"
/// (as a body status or a plain 404) is a normal outcome.
pub struct EmailFinderClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    email: Option<String>,
    status: Option<String>,
}

impl EmailFinderClient {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl EmailFinder for EmailFinderClient {
    async fn find(&self, name: &str, domain: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(&self.api_key)
            .query(&[("full_name", name), ("domain", domain)])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        // Some providers answer not-found with a 404 body instead of a
        // status field.
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        check_status(SERVICE, response.status())?;

        let body: FindResponse =
            response
                .json()
                .await
                .map_err(|e| LeadError::MalformedResponse {
                    service: SERVICE.to_string(),
                    message: format!("find response was not JSON: {e}"),
                })?;

        if body.status.as_deref() == Some("not_found") {
            return Ok(None);
        }

        Ok(body.email.filter(|e| !e.trim().is_empty()))
    }
}
