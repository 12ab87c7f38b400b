use serde::{Deserialize, Serialize};

/// A business record as returned by the scraper service, before any
/// validation or deduplication.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLead {
    pub name: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
}

/// A normalized lead, uniquely keyed by `domain` within a batch.
/// Records without a website keep `domain = None` and skip email
/// enrichment downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRecord {
    pub company: String,
    pub domain: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
}

/// A decision-maker candidate returned by the search service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub title: Option<String>,
    pub profile_url: Option<String>,
}

/// Terminal state of one record after enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    /// Decision-maker and email both found.
    Enriched,
    /// Person found but no email; still a usable lead.
    EmailNotFound,
    NoDecisionMaker,
    NoWebsite,
    Failed,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Enriched => "enriched",
            LeadStatus::EmailNotFound => "email_not_found",
            LeadStatus::NoDecisionMaker => "no_decision_maker",
            LeadStatus::NoWebsite => "no_website",
            LeadStatus::Failed => "failed",
        }
    }
}

/// Fields a worker may populate. Applied to the record as one unit;
/// a result is never partially written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichmentFields {
    pub decision_maker: Option<String>,
    pub title: Option<String>,
    pub profile_url: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// The atomic result of one worker run over one record.
#[derive(Debug, Clone)]
pub struct EnrichmentOutcome {
    /// Position of the record in the dispatched batch, so completions
    /// can be re-associated regardless of completion order.
    pub index: usize,
    pub record: LeadRecord,
    pub status: LeadStatus,
    pub fields: EnrichmentFields,
}

/// Output of the normalizer: deduplicated records plus the number of
/// raw rows dropped for missing both name and website.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub records: Vec<LeadRecord>,
    pub dropped: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub enriched: usize,
    pub email_not_found: usize,
    pub no_decision_maker: usize,
    pub no_website: usize,
    pub failed: usize,
    /// Records never dispatched because the batch was interrupted.
    pub skipped: usize,
    /// Raw rows rejected by the normalizer.
    pub dropped: usize,
}

impl BatchSummary {
    pub fn tally(&mut self, status: LeadStatus) {
        match status {
            LeadStatus::Enriched => self.enriched += 1,
            LeadStatus::EmailNotFound => self.email_not_found += 1,
            LeadStatus::NoDecisionMaker => self.no_decision_maker += 1,
            LeadStatus::NoWebsite => self.no_website += 1,
            LeadStatus::Failed => self.failed += 1,
        }
    }

    /// True when some records completed but not all of them.
    pub fn is_partial(&self) -> bool {
        self.skipped > 0 || self.failed > 0
    }
}

/// Everything the dispatcher hands back: collected results (always
/// exportable, even after an interruption), the tallies, and the
/// batch-fatal error if one stopped the run early.
#[derive(Debug)]
pub struct BatchOutcome {
    pub outcomes: Vec<EnrichmentOutcome>,
    pub summary: BatchSummary,
    pub interrupted: bool,
    pub fatal_error: Option<crate::utils::error::LeadError>,
}
