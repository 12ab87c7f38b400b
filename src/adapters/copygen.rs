use crate::adapters::{check_status, REQUEST_TIMEOUT};
use crate::domain::model::{EnrichmentFields, LeadRecord};
use crate::domain::ports::CopyGenerator;
use crate::utils::error::{LeadError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const SERVICE: &str = "copygen";
/// Outreach copy must stay under this many words.
const MAX_WORDS: usize = 100;

/// Hosted language-model client for short-form outreach copy.
pub struct CopyGenClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    text: Option<String>,
}

impl CopyGenClient {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
        }
    }

    fn build_prompt(lead: &LeadRecord, fields: &EnrichmentFields) -> String {
        let mut facts = vec![format!("Company: {}", lead.company)];
        if let Some(name) = &fields.decision_maker {
            facts.push(format!("Contact: {}", name));
        }
        if let Some(title) = &fields.title {
            facts.push(format!("Role: {}", title));
        }
        if let Some(description) = &fields.description {
            facts.push(format!("Background: {}", description));
        }
        format!(
            "Write a friendly two-sentence cold outreach opener, under {} words, \
             no closing punctuation.\n{}",
            MAX_WORDS,
            facts.join("\n")
        )
    }
}

/// Enforces the copy contract: non-empty, < `MAX_WORDS` words, no
/// terminal punctuation.
fn postprocess(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    let mut text = if words.len() >= MAX_WORDS {
        words[..MAX_WORDS - 1].join(" ")
    } else {
        words.join(" ")
    };

    while text.ends_with(['.', '!', '?']) {
        text.pop();
    }
    let text = text.trim_end().to_string();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl CopyGenerator for CopyGenClient {
    async fn generate(&self, lead: &LeadRecord, fields: &EnrichmentFields) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "prompt": Self::build_prompt(lead, fields),
                "max_words": MAX_WORDS,
            }))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        check_status(SERVICE, response.status())?;

        let body: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| LeadError::MalformedResponse {
                    service: SERVICE.to_string(),
                    message: format!("generation response was not JSON: {e}"),
                })?;

        // Empty or unusable generations are retryable by contract.
        body.text
            .as_deref()
            .and_then(postprocess)
            .ok_or_else(|| LeadError::MalformedResponse {
                service: SERVICE.to_string(),
                message: "empty generation".to_string(),
            })
    }
}
