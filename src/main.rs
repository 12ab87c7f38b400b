use clap::Parser;
use leadflow::adapters::apify::ApifyMapsScraper;
use leadflow::adapters::copygen::CopyGenClient;
use leadflow::adapters::email_finder::EmailFinderClient;
use leadflow::adapters::search::SerpSearchClient;
use leadflow::core::rate_limit::RateLimiter;
use leadflow::core::worker::{EnrichmentWorker, LimiterKeys};
use leadflow::domain::ports::{ConfigProvider, CopyGenerator, DecisionMakerSearch, EmailFinder, LeadSource, ProfileLookup};
use leadflow::utils::error::ErrorSeverity;
use leadflow::utils::{logger, validation::Validate};
use leadflow::{CliConfig, LeadPipeline, LocalStorage, PipelineEngine};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting leadflow CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve_campaign() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load campaign: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(3);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(3);
    }

    tracing::info!("📋 Campaign: {}", config.campaign.name);
    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    // First Ctrl-C stops dispatching new records; in-flight ones finish
    // and whatever was collected is still exported.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("🛑 Interrupt received, finishing in-flight records");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    let services = &config.services;
    let source: Arc<dyn LeadSource> = Arc::new(ApifyMapsScraper::new(
        services.scraper.endpoint.clone(),
        services.scraper.api_key.clone(),
    ));
    let serp = Arc::new(SerpSearchClient::new(
        services.search.endpoint.clone(),
        services.search.api_key.clone(),
    ));
    let search: Arc<dyn DecisionMakerSearch> = serp.clone();
    let profiles: Arc<dyn ProfileLookup> = serp;
    let emails: Arc<dyn EmailFinder> = Arc::new(EmailFinderClient::new(
        services.email.endpoint.clone(),
        services.email.api_key.clone(),
    ));
    let copywriter: Arc<dyn CopyGenerator> = Arc::new(CopyGenClient::new(
        services.copygen.endpoint.clone(),
        services.copygen.api_key.clone(),
    ));

    let limiter = Arc::new(RateLimiter::new(config.min_delay()));
    let worker = Arc::new(EnrichmentWorker::new(
        search,
        profiles,
        emails,
        copywriter,
        limiter,
        LimiterKeys::default(),
        config.skip_email(),
        config.skip_copy(),
    ));

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = LeadPipeline::new(storage, config, source, worker, cancel);
    let engine = PipelineEngine::new_with_monitoring(pipeline, cli.monitor);

    match engine.run().await {
        Ok(report) => {
            let s = &report.summary;
            tracing::info!(
                "📊 Processed {} records: {} enriched, {} email not found, \
                 {} no decision maker, {} no website, {} failed, {} skipped, {} dropped",
                s.processed,
                s.enriched,
                s.email_not_found,
                s.no_decision_maker,
                s.no_website,
                s.failed,
                s.skipped,
                s.dropped
            );
            tracing::info!("📁 Output saved to: {}", report.output_path);
            println!("📁 Output saved to: {}", report.output_path);

            if let Some(e) = &report.fatal_error {
                eprintln!("⚠️ Batch aborted early: {}", e.user_friendly_message());
                eprintln!("💡 {}", e.recovery_suggestion());
                std::process::exit(2);
            }
            if report.interrupted {
                println!("⚠️ Interrupted; exported partial results");
                std::process::exit(2);
            }
            println!("✅ Campaign completed successfully!");
        }
        Err(e) => {
            tracing::error!(
                "❌ Pipeline failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
