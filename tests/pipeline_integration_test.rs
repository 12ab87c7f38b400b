use anyhow::Result;
use httpmock::prelude::*;
use leadflow::adapters::apify::ApifyMapsScraper;
use leadflow::adapters::copygen::CopyGenClient;
use leadflow::adapters::email_finder::EmailFinderClient;
use leadflow::adapters::search::SerpSearchClient;
use leadflow::core::rate_limit::RateLimiter;
use leadflow::core::worker::{EnrichmentWorker, LimiterKeys};
use leadflow::domain::ports::LeadSource;
use leadflow::{CampaignConfig, LeadPipeline, LocalStorage, PipelineEngine};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::TempDir;

fn campaign_toml(server: &MockServer, output_path: &str, extra_enrichment: &str) -> String {
    format!(
        r#"
[campaign]
name = "integration-test"

[search]
query = "plumbers"
location = "Austin, TX"
max_records = 10

[enrichment]
concurrency = 2
min_delay_ms = 0
{extra_enrichment}

[services.scraper]
endpoint = "{scrape}"
api_key = "scraper-key"

[services.search]
endpoint = "{search}"
api_key = "search-key"

[services.email]
endpoint = "{email}"
api_key = "email-key"

[services.copygen]
endpoint = "{copygen}"
api_key = "copygen-key"

[export]
output_path = "{output_path}"
"#,
        scrape = server.url("/scrape"),
        search = server.url("/search"),
        email = server.url("/email"),
        copygen = server.url("/copygen"),
    )
}

async fn load_campaign(
    temp_path: &str,
    server: &MockServer,
    extra_enrichment: &str,
) -> Result<CampaignConfig> {
    let normalized_path = temp_path.replace('\\', "/");
    let config_path = format!("{}/campaign.toml", temp_path);
    tokio::fs::write(
        &config_path,
        campaign_toml(server, &normalized_path, extra_enrichment),
    )
    .await?;
    Ok(CampaignConfig::from_file(&config_path)?)
}

fn build_engine(
    config: CampaignConfig,
) -> PipelineEngine<LeadPipeline<LocalStorage, CampaignConfig>> {
    let services = config.services.clone();
    let source: Arc<dyn LeadSource> = Arc::new(ApifyMapsScraper::new(
        services.scraper.endpoint,
        services.scraper.api_key,
    ));
    let serp = Arc::new(SerpSearchClient::new(
        services.search.endpoint,
        services.search.api_key,
    ));
    let emails = Arc::new(EmailFinderClient::new(
        services.email.endpoint,
        services.email.api_key,
    ));
    let copywriter = Arc::new(CopyGenClient::new(
        services.copygen.endpoint,
        services.copygen.api_key,
    ));

    let limiter = Arc::new(RateLimiter::new(
        leadflow::domain::ports::ConfigProvider::min_delay(&config),
    ));
    let worker = Arc::new(EnrichmentWorker::new(
        serp.clone(),
        serp,
        emails,
        copywriter,
        limiter,
        LimiterKeys::default(),
        config.enrichment.skip_email,
        config.enrichment.skip_copy,
    ));

    let storage = LocalStorage::new(config.export.output_path.clone());
    let cancel = Arc::new(AtomicBool::new(false));
    let pipeline = LeadPipeline::new(storage, config, source, worker, cancel);
    PipelineEngine::new(pipeline)
}

/// Full happy path: scrape, dedup, enrich with all four services, and
/// check the CSV and summary that land on disk.
#[tokio::test]
async fn test_full_pipeline_enriches_and_exports() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let temp_path = temp_dir.path().to_str().unwrap();
    let server = MockServer::start();

    let config = load_campaign(temp_path, &server, "").await?;

    let scrape_mock = server.mock(|when, then| {
        when.method(POST).path("/scrape").query_param("token", "scraper-key");
        then.status(200).json_body(serde_json::json!([
            {"title": "Apex Plumbing", "website": "https://apexplumbing.com", "address": "12 Main St", "categoryName": "Plumber"},
            {"title": "Apex Plumbing Co", "website": "https://www.apexplumbing.com/contact"},
            {"title": "Bravo Drains", "website": "https://bravodrains.com"},
            {"title": "Cash Only Drains"},
            {"address": "nameless and siteless"}
        ]));
    });

    let search_mock = server.mock(|when, then| {
        when.method(POST).path("/search").header("X-API-KEY", "search-key");
        then.status(200).json_body(serde_json::json!({
            "organic": [
                {
                    "title": "Sam Alvarez - Owner - Apex Plumbing | LinkedIn",
                    "link": "https://linkedin.com/in/samalvarez",
                    "snippet": "Sam Alvarez has run Apex Plumbing since 2015."
                }
            ]
        }));
    });

    let email_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/email")
            .query_param("full_name", "Sam Alvarez")
            .query_param("domain", "apexplumbing.com");
        then.status(200)
            .json_body(serde_json::json!({"email": "sam@apexplumbing.com", "status": "found"}));
    });

    let email_miss_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/email")
            .query_param("domain", "bravodrains.com");
        then.status(200)
            .json_body(serde_json::json!({"email": null, "status": "not_found"}));
    });

    let copy_mock = server.mock(|when, then| {
        when.method(POST).path("/copygen");
        then.status(200).json_body(
            serde_json::json!({"text": "Hi Sam, impressed by what Apex Plumbing has built."}),
        );
    });

    let engine = build_engine(config);
    let report = engine.run().await?;

    scrape_mock.assert();
    assert!(search_mock.hits() >= 1);
    email_mock.assert();
    email_miss_mock.assert();
    // One generation per record that has a decision maker, including
    // the no-website one.
    assert_eq!(copy_mock.hits(), 3);

    // 5 raw rows -> 1 dropped (nameless+siteless), 1 duplicate domain,
    // 3 dispatched of which 2 are email candidates.
    assert_eq!(report.summary.processed, 3);
    assert_eq!(report.summary.enriched, 1);
    assert_eq!(report.summary.email_not_found, 1);
    assert_eq!(report.summary.no_website, 1);
    assert_eq!(report.summary.dropped, 1);
    assert!(!report.interrupted);
    assert!(report.fatal_error.is_none());

    let csv = tokio::fs::read_to_string(format!("{}/leads.csv", temp_path)).await?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("company,domain,website"));
    assert!(lines[1].contains("Apex Plumbing"));
    assert!(lines[1].contains("sam@apexplumbing.com"));
    assert!(lines[1].ends_with("enriched"));
    // Terminal punctuation is stripped from generated copy.
    assert!(lines[1].contains("Apex Plumbing has built"));
    assert!(!lines[1].contains("has built."));
    // Person fields survive an email miss.
    assert!(lines[2].contains("Bravo Drains"));
    assert!(lines[2].contains("Sam Alvarez"));
    assert!(lines[2].ends_with("email_not_found"));
    assert!(lines[3].contains("Cash Only Drains"));
    assert!(lines[3].ends_with("no_website"));

    let summary: serde_json::Value =
        serde_json::from_str(&tokio::fs::read_to_string(format!("{}/summary.json", temp_path)).await?)?;
    assert_eq!(summary["summary"]["processed"], 3);
    assert_eq!(summary["exported_records"], 3);
    assert_eq!(summary["interrupted"], false);

    Ok(())
}

/// A quota error from a provider aborts the batch but still exports
/// whatever was collected before the failure.
#[tokio::test]
async fn test_quota_exhaustion_aborts_but_still_exports() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let temp_path = temp_dir.path().to_str().unwrap();
    let server = MockServer::start();

    let config = load_campaign(temp_path, &server, "").await?;

    server.mock(|when, then| {
        when.method(POST).path("/scrape");
        then.status(200).json_body(serde_json::json!([
            {"title": "Apex Plumbing", "website": "https://apexplumbing.com"}
        ]));
    });

    server.mock(|when, then| {
        when.method(POST).path("/search");
        then.status(402)
            .json_body(serde_json::json!({"error": "quota exceeded"}));
    });

    let engine = build_engine(config);
    let report = engine.run().await?;

    assert!(report.fatal_error.is_some());
    assert!(report.interrupted);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.enriched, 0);

    // Header-only CSV still lands on disk.
    let csv = tokio::fs::read_to_string(format!("{}/leads.csv", temp_path)).await?;
    assert_eq!(csv.lines().count(), 1);

    Ok(())
}

/// Skip flags disable their stages entirely; the email and copy
/// services are never contacted.
#[tokio::test]
async fn test_skip_flags_bypass_services() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let temp_path = temp_dir.path().to_str().unwrap();
    let server = MockServer::start();

    let config = load_campaign(
        temp_path,
        &server,
        "skip_email = true\nskip_copy = true",
    )
    .await?;

    server.mock(|when, then| {
        when.method(POST).path("/scrape");
        then.status(200).json_body(serde_json::json!([
            {"title": "Apex Plumbing", "website": "https://apexplumbing.com"}
        ]));
    });

    server.mock(|when, then| {
        when.method(POST).path("/search");
        then.status(200).json_body(serde_json::json!({
            "organic": [
                {"title": "Sam Alvarez - Owner - Apex Plumbing | LinkedIn", "link": null, "snippet": null}
            ]
        }));
    });

    let email_mock = server.mock(|when, then| {
        when.method(GET).path("/email");
        then.status(200).json_body(serde_json::json!({"email": "x@y.z"}));
    });
    let copy_mock = server.mock(|when, then| {
        when.method(POST).path("/copygen");
        then.status(200).json_body(serde_json::json!({"text": "hello"}));
    });

    let engine = build_engine(config);
    let report = engine.run().await?;

    assert_eq!(email_mock.hits(), 0);
    assert_eq!(copy_mock.hits(), 0);
    assert_eq!(report.summary.email_not_found, 1);

    let csv = tokio::fs::read_to_string(format!("{}/leads.csv", temp_path)).await?;
    assert!(csv.contains("Sam Alvarez"));
    assert!(csv.contains("email_not_found"));

    Ok(())
}

/// With archiving on, the exporter writes a single zip bundle instead
/// of loose files.
#[tokio::test]
async fn test_archive_writes_zip_bundle() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let temp_path = temp_dir.path().to_str().unwrap();
    let server = MockServer::start();

    let mut config = load_campaign(
        temp_path,
        &server,
        "skip_email = true\nskip_copy = true",
    )
    .await?;
    config.export.archive = true;

    server.mock(|when, then| {
        when.method(POST).path("/scrape");
        then.status(200).json_body(serde_json::json!([
            {"title": "Apex Plumbing", "website": "https://apexplumbing.com"}
        ]));
    });
    server.mock(|when, then| {
        when.method(POST).path("/search");
        then.status(200).json_body(serde_json::json!({"organic": []}));
    });

    let engine = build_engine(config);
    let report = engine.run().await?;

    assert!(report.output_path.ends_with("leads_bundle.zip"));
    assert!(tokio::fs::try_exists(format!("{}/leads_bundle.zip", temp_path)).await?);
    assert!(!tokio::fs::try_exists(format!("{}/leads.csv", temp_path)).await?);

    // No decision maker found at all -> record kept with that status.
    assert_eq!(report.summary.no_decision_maker, 1);

    Ok(())
}
