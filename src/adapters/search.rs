use crate::adapters::{check_status, REQUEST_TIMEOUT};
use crate::domain::model::Candidate;
use crate::domain::ports::{DecisionMakerSearch, ProfileLookup};
use crate::utils::error::{LeadError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const SERVICE: &str = "search";

/// SERP-style search client. Serves both decision-maker discovery
/// (parsing people out of result titles) and the best-effort profile
/// description lookup (first snippet).
pub struct SerpSearchClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

impl SerpSearchClient {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
        }
    }

    async fn query(&self, q: &str) -> Result<SearchResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&serde_json::json!({ "q": q }))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        check_status(SERVICE, response.status())?;

        response
            .json()
            .await
            .map_err(|e| LeadError::MalformedResponse {
                service: SERVICE.to_string(),
                message: format!("search response was not JSON: {e}"),
            })
    }
}

/// Parses a person out of a result title shaped like
/// "Jane Smith - CEO - Acme Corp | LinkedIn". Titles that do not look
/// like a person profile yield no candidate.
fn parse_candidate(title: &str, link: Option<String>) -> Option<Candidate> {
    let cleaned = title.split('|').next().unwrap_or(title).trim();
    let mut parts = cleaned.split(" - ").map(str::trim);

    let name = parts.next().filter(|n| !n.is_empty() && n.len() < 60)?;
    // A lone fragment with no role separator is usually a company
    // page, not a person.
    let role = parts.next().filter(|r| !r.is_empty())?;

    Some(Candidate {
        name: name.to_string(),
        title: Some(role.to_string()),
        profile_url: link,
    })
}

#[async_trait]
impl DecisionMakerSearch for SerpSearchClient {
    async fn search(&self, query: &str) -> Result<Option<Candidate>> {
        let response = self.query(query).await?;

        let candidate = response
            .organic
            .into_iter()
            .find_map(|result| parse_candidate(result.title.as_deref()?, result.link));

        Ok(candidate)
    }
}

#[async_trait]
impl ProfileLookup for SerpSearchClient {
    async fn lookup(&self, name: &str, company: &str) -> Result<Option<String>> {
        let response = self.query(&format!("{name} {company}")).await?;
        Ok(response.organic.into_iter().find_map(|r| r.snippet))
    }
}
