pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::storage::LocalStorage;
pub use config::CampaignConfig;
pub use core::{engine::PipelineEngine, pipeline::LeadPipeline};
pub use domain::model::{BatchOutcome, BatchSummary, LeadRecord, LeadStatus};
pub use utils::error::{LeadError, Result};
