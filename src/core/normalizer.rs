use crate::domain::model::{LeadRecord, NormalizedBatch, RawLead};
use std::collections::HashSet;
use url::Url;

/// Lower-cased, scheme-stripped, `www.`-stripped host of a website
/// field. `None` when the value is empty or not parseable as a host.
pub fn normalize_domain(website: &str) -> Option<String> {
    let trimmed = website.trim();
    if trimmed.is_empty() {
        return None;
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme).ok()?;
    let host = url.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Deduplicates and validates raw scraped records.
///
/// Keyed by normalized website domain; the first occurrence wins and
/// later duplicates are discarded. Records without a website pass
/// through un-deduplicated (they cannot collide on a domain key) and
/// are flagged for the no-website path downstream. Rows missing both a
/// name and a website are dropped and counted.
pub fn normalize(raw: Vec<RawLead>) -> NormalizedBatch {
    let mut seen_domains = HashSet::new();
    let mut records = Vec::new();
    let mut dropped = 0;
    let mut duplicates = 0;

    for lead in raw {
        let name = lead
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let domain = lead.website.as_deref().and_then(normalize_domain);

        if name.is_none() && domain.is_none() {
            dropped += 1;
            continue;
        }

        if let Some(key) = &domain {
            if !seen_domains.insert(key.clone()) {
                duplicates += 1;
                continue;
            }
        }

        // A scraped row with a website but no name is still usable;
        // the domain stands in as the company name.
        let company = match (name, &domain) {
            (Some(n), _) => n.to_string(),
            (None, Some(d)) => d.clone(),
            (None, None) => unreachable!("handled by the drop check above"),
        };

        records.push(LeadRecord {
            company,
            domain,
            website: lead.website,
            address: lead.address,
        });
    }

    if dropped > 0 || duplicates > 0 {
        tracing::debug!(dropped, duplicates, "normalizer discarded raw rows");
    }

    NormalizedBatch {
        records,
        dropped,
        duplicates,
    }
}
