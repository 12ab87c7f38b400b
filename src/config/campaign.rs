use crate::domain::ports::ConfigProvider;
use crate::utils::error::{LeadError, Result};
use crate::utils::validation::{
    self, validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_SCRAPER_ENDPOINT: &str =
    "https://api.apify.com/v2/acts/compass~crawler-google-places/run-sync-get-dataset-items";
const DEFAULT_SEARCH_ENDPOINT: &str = "https://google.serper.dev/search";
const DEFAULT_EMAIL_ENDPOINT: &str = "https://api.anymailfinder.com/v5.0/search/person.json";
const DEFAULT_COPYGEN_ENDPOINT: &str = "https://api.openai.com/v1/responses";

/// One outreach campaign: what to scrape, how hard to push the
/// enrichment APIs, and where results land.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub campaign: CampaignMeta,
    pub search: SearchConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignMeta {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub query: String,
    pub location: String,
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    #[serde(default)]
    pub skip_email: bool,
    #[serde(default)]
    pub skip_copy: bool,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            min_delay_ms: default_min_delay_ms(),
            skip_email: false,
            skip_copy: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub scraper: ServiceConfig,
    pub search: ServiceConfig,
    pub email: ServiceConfig,
    pub copygen: ServiceConfig,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ServicesConfig {
    /// Endpoint/key defaults for runs without a campaign file. Keys
    /// come from the conventional environment variables.
    pub fn from_env() -> Self {
        let service = |endpoint_var: &str, default_endpoint: &str, key_var: &str| ServiceConfig {
            endpoint: std::env::var(endpoint_var)
                .unwrap_or_else(|_| default_endpoint.to_string()),
            api_key: std::env::var(key_var).unwrap_or_default(),
        };

        Self {
            scraper: service("LEADFLOW_SCRAPER_URL", DEFAULT_SCRAPER_ENDPOINT, "APIFY_TOKEN"),
            search: service("LEADFLOW_SEARCH_URL", DEFAULT_SEARCH_ENDPOINT, "SERPER_API_KEY"),
            email: service(
                "LEADFLOW_EMAIL_URL",
                DEFAULT_EMAIL_ENDPOINT,
                "ANYMAILFINDER_API_KEY",
            ),
            copygen: service("LEADFLOW_COPYGEN_URL", DEFAULT_COPYGEN_ENDPOINT, "OPENAI_API_KEY"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default)]
    pub archive: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            archive: false,
        }
    }
}

fn default_max_records() -> usize {
    50
}

fn default_concurrency() -> usize {
    5
}

fn default_min_delay_ms() -> u64 {
    1500
}

fn default_output_path() -> String {
    "./output".to_string()
}

impl CampaignConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LeadError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| LeadError::ConfigParse {
            field: "campaign".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }
}

/// Replaces `${VAR_NAME}` placeholders from the environment. Unset
/// variables are left as-is so key validation can report them.
fn substitute_env_vars(content: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .to_string()
}

impl Validate for CampaignConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("campaign.name", &self.campaign.name)?;
        validate_non_empty_string("search.query", &self.search.query)?;
        validate_non_empty_string("search.location", &self.search.location)?;
        validate_positive_number("search.max_records", self.search.max_records, 1)?;
        validate_range("enrichment.concurrency", self.enrichment.concurrency, 1, 64)?;
        validate_path("export.output_path", &self.export.output_path)?;

        validate_url("services.scraper.endpoint", &self.services.scraper.endpoint)?;
        validate_url("services.search.endpoint", &self.services.search.endpoint)?;
        validate_url("services.email.endpoint", &self.services.email.endpoint)?;
        validate_url("services.copygen.endpoint", &self.services.copygen.endpoint)?;

        validation::validate_api_key("services.scraper.api_key", &self.services.scraper.api_key)?;
        validation::validate_api_key("services.search.api_key", &self.services.search.api_key)?;
        if !self.enrichment.skip_email {
            validation::validate_api_key("services.email.api_key", &self.services.email.api_key)?;
        }
        if !self.enrichment.skip_copy {
            validation::validate_api_key(
                "services.copygen.api_key",
                &self.services.copygen.api_key,
            )?;
        }

        Ok(())
    }
}

impl ConfigProvider for CampaignConfig {
    fn search_query(&self) -> &str {
        &self.search.query
    }

    fn location(&self) -> &str {
        &self.search.location
    }

    fn max_records(&self) -> usize {
        self.search.max_records
    }

    fn concurrency(&self) -> usize {
        self.enrichment.concurrency
    }

    fn min_delay(&self) -> Duration {
        Duration::from_millis(self.enrichment.min_delay_ms)
    }

    fn output_path(&self) -> &str {
        &self.export.output_path
    }

    fn skip_email(&self) -> bool {
        self.enrichment.skip_email
    }

    fn skip_copy(&self) -> bool {
        self.enrichment.skip_copy
    }

    fn archive(&self) -> bool {
        self.export.archive
    }
}
