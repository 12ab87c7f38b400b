pub mod campaign;

pub use campaign::{CampaignConfig, CampaignMeta, EnrichmentConfig, ExportConfig, SearchConfig, ServiceConfig, ServicesConfig};

#[cfg(feature = "cli")]
pub use cli::CliConfig;

#[cfg(feature = "cli")]
mod cli {
    use super::campaign::{
        CampaignConfig, CampaignMeta, EnrichmentConfig, ExportConfig, SearchConfig, ServicesConfig,
    };
    use crate::utils::error::Result;
    use clap::Parser;

    /// Scrape, enrich and export a batch of local-business leads.
    #[derive(Parser, Debug, Clone)]
    #[command(name = "leadflow")]
    #[command(version, about, long_about = None)]
    pub struct CliConfig {
        /// Business category or industry to search for
        #[arg(short, long, required_unless_present = "campaign")]
        pub query: Option<String>,

        /// Geographic area the search is scoped to
        #[arg(short, long, required_unless_present = "campaign")]
        pub location: Option<String>,

        /// Maximum number of places to fetch from the scraper
        #[arg(long, default_value = "50")]
        pub max_records: usize,

        /// Number of records enriched in parallel
        #[arg(short = 'w', long, default_value = "5")]
        pub concurrency: usize,

        /// Minimum spacing between calls to the same service, in milliseconds
        #[arg(long, default_value = "1500")]
        pub min_delay_ms: u64,

        /// Directory the CSV and summary are written to
        #[arg(short, long, default_value = "./output")]
        pub output_path: String,

        /// Skip the email discovery stage
        #[arg(long)]
        pub skip_email: bool,

        /// Skip outreach copy generation
        #[arg(long)]
        pub skip_copy: bool,

        /// Bundle the exported files into a zip archive
        #[arg(long)]
        pub archive: bool,

        /// Campaign TOML file; its settings replace the flags above
        #[arg(short, long)]
        pub campaign: Option<String>,

        /// Enable verbose logging
        #[arg(short, long)]
        pub verbose: bool,

        /// Log process memory and CPU usage between phases
        #[arg(long)]
        pub monitor: bool,
    }

    impl CliConfig {
        /// Resolves the effective campaign: either the TOML file named by
        /// `--campaign`, or one assembled from the flags with service
        /// endpoints and keys taken from the environment.
        pub fn resolve_campaign(&self) -> Result<CampaignConfig> {
            if let Some(path) = &self.campaign {
                tracing::info!("📁 Loading campaign from {}", path);
                return CampaignConfig::from_file(path);
            }

            Ok(CampaignConfig {
                campaign: CampaignMeta {
                    name: "ad-hoc".to_string(),
                    description: None,
                },
                search: SearchConfig {
                    query: self.query.clone().unwrap_or_default(),
                    location: self.location.clone().unwrap_or_default(),
                    max_records: self.max_records,
                },
                enrichment: EnrichmentConfig {
                    concurrency: self.concurrency,
                    min_delay_ms: self.min_delay_ms,
                    skip_email: self.skip_email,
                    skip_copy: self.skip_copy,
                },
                services: ServicesConfig::from_env(),
                export: ExportConfig {
                    output_path: self.output_path.clone(),
                    archive: self.archive,
                },
            })
        }
    }

}
