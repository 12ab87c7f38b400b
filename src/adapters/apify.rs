use crate::adapters::{check_status, REQUEST_TIMEOUT};
use crate::domain::model::RawLead;
use crate::domain::ports::LeadSource;
use crate::utils::error::{LeadError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const SERVICE: &str = "scraper";

/// Apify-style Google Maps scraper. One synchronous actor run per
/// batch: the request carries the search task, the response body is
/// the dataset items array.
pub struct ApifyMapsScraper {
    client: Client,
    endpoint: String,
    api_key: String,
}

/// Raw dataset item as the maps actor returns it.
#[derive(Debug, Deserialize)]
struct PlaceItem {
    title: Option<String>,
    website: Option<String>,
    address: Option<String>,
    #[serde(rename = "categoryName")]
    category_name: Option<String>,
}

impl ApifyMapsScraper {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl LeadSource for ApifyMapsScraper {
    async fn fetch_leads(
        &self,
        query: &str,
        location: &str,
        max_records: usize,
    ) -> Result<Vec<RawLead>> {
        let body = serde_json::json!({
            "searchStringsArray": [query],
            "locationQuery": location,
            "maxCrawledPlacesPerSearch": max_records,
        });

        tracing::debug!(endpoint = %self.endpoint, query, location, "starting scraper run");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("token", self.api_key.as_str())])
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        check_status(SERVICE, response.status())?;

        let items: Vec<PlaceItem> =
            response
                .json()
                .await
                .map_err(|e| LeadError::MalformedResponse {
                    service: SERVICE.to_string(),
                    message: format!("dataset items were not a JSON array: {e}"),
                })?;

        let leads = items
            .into_iter()
            .map(|item| RawLead {
                name: item.title,
                website: item.website,
                address: item.address,
                category: item.category_name,
            })
            .collect::<Vec<_>>();

        // An empty array is the actor's normal no-match answer.
        tracing::debug!(count = leads.len(), "scraper run finished");
        Ok(leads)
    }
}
