use crate::core::rate_limit::RateLimiter;
use crate::domain::model::{
    Candidate, EnrichmentFields, EnrichmentOutcome, LeadRecord, LeadStatus,
};
use crate::domain::ports::{
    CopyGenerator, DecisionMakerSearch, EmailFinder, Enricher, ProfileLookup,
};
use crate::utils::error::{LeadError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Rate-limiter keys, one per external API key the worker calls.
#[derive(Debug, Clone)]
pub struct LimiterKeys {
    pub search: String,
    pub email: String,
    pub copygen: String,
}

impl Default for LimiterKeys {
    fn default() -> Self {
        Self {
            search: "search".to_string(),
            email: "email".to_string(),
            copygen: "copygen".to_string(),
        }
    }
}

/// Attempts per distinct query phrasing; retried only on transient
/// errors, then demoted to not-found.
const MAX_ATTEMPTS: usize = 2;
/// Phrasing variants tried for decision-maker discovery.
const MAX_PHRASINGS: usize = 2;

/// Enriches one lead at a time: decision-maker search, best-effort
/// profile lookup, email discovery, outreach copy. Every external call
/// goes through the shared rate limiter first. The worker owns no
/// shared state beyond the limiter; its result is returned whole.
pub struct EnrichmentWorker {
    search: Arc<dyn DecisionMakerSearch>,
    profiles: Arc<dyn ProfileLookup>,
    emails: Arc<dyn EmailFinder>,
    copywriter: Arc<dyn CopyGenerator>,
    limiter: Arc<RateLimiter>,
    keys: LimiterKeys,
    skip_email: bool,
    skip_copy: bool,
}

impl EnrichmentWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        search: Arc<dyn DecisionMakerSearch>,
        profiles: Arc<dyn ProfileLookup>,
        emails: Arc<dyn EmailFinder>,
        copywriter: Arc<dyn CopyGenerator>,
        limiter: Arc<RateLimiter>,
        keys: LimiterKeys,
        skip_email: bool,
        skip_copy: bool,
    ) -> Self {
        Self {
            search,
            profiles,
            emails,
            copywriter,
            limiter,
            keys,
            skip_email,
            skip_copy,
        }
    }

    fn phrasings(record: &LeadRecord) -> Vec<String> {
        vec![
            format!("{} founder OR CEO", record.company),
            format!("\"{}\" owner OR director", record.company),
        ]
    }

    /// Stage 1: decision-maker discovery. Tries up to `MAX_PHRASINGS`
    /// query variants, `MAX_ATTEMPTS` attempts each. Exhausting the
    /// policy is a not-found outcome, not an error; only batch-fatal
    /// errors propagate.
    async fn find_decision_maker(&self, record: &LeadRecord) -> Result<Option<Candidate>> {
        for phrasing in Self::phrasings(record).iter().take(MAX_PHRASINGS) {
            for attempt in 1..=MAX_ATTEMPTS {
                self.limiter.acquire(&self.keys.search).await;
                match self.search.search(phrasing).await {
                    Ok(Some(candidate)) => return Ok(Some(candidate)),
                    // A clean empty result will not change on retry;
                    // move on to the next phrasing.
                    Ok(None) => break,
                    Err(e) if e.is_batch_fatal() => return Err(e),
                    Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                        tracing::debug!(
                            company = %record.company,
                            attempt,
                            error = %e,
                            "decision-maker search retrying"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            company = %record.company,
                            error = %e,
                            "decision-maker search failed, trying next phrasing"
                        );
                        break;
                    }
                }
            }
        }
        Ok(None)
    }

    /// Stage 2: profile description, best-effort. Absence or a
    /// non-fatal error only omits the field.
    async fn lookup_profile(&self, candidate: &Candidate, record: &LeadRecord) -> Result<Option<String>> {
        for attempt in 1..=MAX_ATTEMPTS {
            self.limiter.acquire(&self.keys.search).await;
            match self.profiles.lookup(&candidate.name, &record.company).await {
                Ok(description) => return Ok(description),
                Err(e) if e.is_batch_fatal() => return Err(e),
                Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                    tracing::debug!(person = %candidate.name, error = %e, "profile lookup retrying");
                }
                Err(e) => {
                    tracing::warn!(person = %candidate.name, error = %e, "profile lookup skipped");
                    return Ok(None);
                }
            }
        }
        Ok(None)
    }

    /// Stage 3: email discovery keyed by person name + company domain.
    async fn find_email(&self, candidate: &Candidate, domain: &str) -> Result<Option<String>> {
        for attempt in 1..=MAX_ATTEMPTS {
            self.limiter.acquire(&self.keys.email).await;
            match self.emails.find(&candidate.name, domain).await {
                Ok(email) => return Ok(email),
                Err(e) if e.is_batch_fatal() => return Err(e),
                Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                    tracing::debug!(person = %candidate.name, domain, error = %e, "email lookup retrying");
                }
                Err(e) => {
                    tracing::warn!(person = %candidate.name, domain, error = %e, "email lookup demoted to not-found");
                    return Ok(None);
                }
            }
        }
        Ok(None)
    }

    /// Stage 4: outreach copy. Empty/malformed generations are
    /// retryable once; persistent failure only omits the message.
    async fn generate_copy(
        &self,
        record: &LeadRecord,
        fields: &EnrichmentFields,
    ) -> Result<Option<String>> {
        for attempt in 1..=MAX_ATTEMPTS {
            self.limiter.acquire(&self.keys.copygen).await;
            match self.copywriter.generate(record, fields).await {
                Ok(text) if !text.trim().is_empty() => return Ok(Some(text)),
                Ok(_) => {
                    tracing::debug!(company = %record.company, attempt, "empty generation, retrying");
                }
                Err(e) if e.is_batch_fatal() => return Err(e),
                Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                    tracing::debug!(company = %record.company, error = %e, "copy generation retrying");
                }
                Err(e) => {
                    tracing::warn!(company = %record.company, error = %e, "copy generation skipped");
                    return Ok(None);
                }
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl Enricher for EnrichmentWorker {
    async fn enrich(&self, index: usize, record: LeadRecord) -> Result<EnrichmentOutcome> {
        let mut fields = EnrichmentFields::default();

        let candidate = match self.find_decision_maker(&record).await? {
            Some(candidate) => candidate,
            None => {
                tracing::info!(company = %record.company, "no decision-maker found");
                return Ok(EnrichmentOutcome {
                    index,
                    record,
                    status: LeadStatus::NoDecisionMaker,
                    fields,
                });
            }
        };

        fields.decision_maker = Some(candidate.name.clone());
        fields.title = candidate.title.clone();
        fields.profile_url = candidate.profile_url.clone();
        fields.description = self.lookup_profile(&candidate, &record).await?;

        let status = match &record.domain {
            None => LeadStatus::NoWebsite,
            Some(_) if self.skip_email => LeadStatus::EmailNotFound,
            Some(domain) => match self.find_email(&candidate, domain).await? {
                Some(email) => {
                    fields.email = Some(email);
                    LeadStatus::Enriched
                }
                None => LeadStatus::EmailNotFound,
            },
        };

        if !self.skip_copy {
            fields.message = self.generate_copy(&record, &fields).await?;
        }

        tracing::debug!(
            company = %record.company,
            status = status.as_str(),
            "record enrichment finished"
        );

        Ok(EnrichmentOutcome {
            index,
            record,
            status,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct StubSearch {
        calls: AtomicUsize,
        results: Vec<Result<Option<Candidate>>>,
    }

    impl StubSearch {
        fn new(results: Vec<Result<Option<Candidate>>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                results,
            }
        }
    }

    #[async_trait]
    impl DecisionMakerSearch for StubSearch {
        async fn search(&self, _query: &str) -> Result<Option<Candidate>> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.results.get(i) {
                Some(Ok(v)) => Ok(v.clone()),
                Some(Err(e)) => Err(clone_err(e)),
                None => Ok(None),
            }
        }
    }

    struct StubProfiles(Option<String>);

    #[async_trait]
    impl ProfileLookup for StubProfiles {
        async fn lookup(&self, _name: &str, _company: &str) -> Result<Option<String>> {
            Ok(self.0.clone())
        }
    }

    struct StubEmails {
        calls: AtomicUsize,
        result: Option<String>,
        fatal: bool,
    }

    #[async_trait]
    impl EmailFinder for StubEmails {
        async fn find(&self, _name: &str, _domain: &str) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fatal {
                return Err(LeadError::QuotaExceeded {
                    service: "email-finder".into(),
                });
            }
            Ok(self.result.clone())
        }
    }

    struct StubCopy(String);

    #[async_trait]
    impl CopyGenerator for StubCopy {
        async fn generate(&self, _lead: &LeadRecord, _fields: &EnrichmentFields) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    fn clone_err(e: &LeadError) -> LeadError {
        match e {
            LeadError::RateLimited { service } => LeadError::RateLimited {
                service: service.clone(),
            },
            LeadError::Transient { service, message } => LeadError::Transient {
                service: service.clone(),
                message: message.clone(),
            },
            LeadError::QuotaExceeded { service } => LeadError::QuotaExceeded {
                service: service.clone(),
            },
            other => LeadError::Processing {
                message: other.to_string(),
            },
        }
    }

    fn candidate() -> Candidate {
        Candidate {
            name: "Jordan Reyes".into(),
            title: Some("Founder".into()),
            profile_url: Some("https://linkedin.com/in/jordanreyes".into()),
        }
    }

    fn record(domain: Option<&str>) -> LeadRecord {
        LeadRecord {
            company: "Reyes Roofing".into(),
            domain: domain.map(String::from),
            website: domain.map(|d| format!("https://{d}")),
            address: None,
        }
    }

    fn worker(
        search: StubSearch,
        emails: StubEmails,
        skip_email: bool,
        skip_copy: bool,
    ) -> EnrichmentWorker {
        EnrichmentWorker::new(
            Arc::new(search),
            Arc::new(StubProfiles(Some("20 years in roofing".into()))),
            Arc::new(emails),
            Arc::new(StubCopy("Hi Jordan, loved your work".into())),
            Arc::new(RateLimiter::new(Duration::from_millis(0))),
            LimiterKeys::default(),
            skip_email,
            skip_copy,
        )
    }

    fn found_emails(email: &str) -> StubEmails {
        StubEmails {
            calls: AtomicUsize::new(0),
            result: Some(email.to_string()),
            fatal: false,
        }
    }

    fn no_emails() -> StubEmails {
        StubEmails {
            calls: AtomicUsize::new(0),
            result: None,
            fatal: false,
        }
    }

    #[tokio::test]
    async fn test_full_enrichment_success() {
        let worker = worker(
            StubSearch::new(vec![Ok(Some(candidate()))]),
            found_emails("jordan@reyesroofing.com"),
            false,
            false,
        );

        let outcome = worker.enrich(0, record(Some("reyesroofing.com"))).await.unwrap();

        assert_eq!(outcome.status, LeadStatus::Enriched);
        assert_eq!(outcome.fields.decision_maker.as_deref(), Some("Jordan Reyes"));
        assert_eq!(outcome.fields.email.as_deref(), Some("jordan@reyesroofing.com"));
        assert!(outcome.fields.message.is_some());
    }

    #[tokio::test]
    async fn test_no_decision_maker_short_circuits() {
        let emails = no_emails();
        let worker = worker(StubSearch::new(vec![Ok(None), Ok(None)]), emails, false, false);

        let outcome = worker.enrich(3, record(Some("reyesroofing.com"))).await.unwrap();

        assert_eq!(outcome.status, LeadStatus::NoDecisionMaker);
        assert!(outcome.fields.decision_maker.is_none());
        assert!(outcome.fields.email.is_none());
        assert_eq!(outcome.index, 3);
    }

    #[tokio::test]
    async fn test_email_not_found_keeps_person_fields() {
        let worker = worker(
            StubSearch::new(vec![Ok(Some(candidate()))]),
            no_emails(),
            false,
            false,
        );

        let outcome = worker.enrich(0, record(Some("reyesroofing.com"))).await.unwrap();

        assert_eq!(outcome.status, LeadStatus::EmailNotFound);
        assert_eq!(outcome.fields.decision_maker.as_deref(), Some("Jordan Reyes"));
        assert_eq!(outcome.fields.title.as_deref(), Some("Founder"));
        assert!(outcome.fields.profile_url.is_some());
        assert!(outcome.fields.email.is_none());
    }

    #[tokio::test]
    async fn test_no_website_record_never_queries_email_finder() {
        let emails = StubEmails {
            calls: AtomicUsize::new(0),
            result: Some("should-not-be-used@x.com".into()),
            fatal: false,
        };
        let calls_probe = Arc::new(emails);
        let worker = EnrichmentWorker::new(
            Arc::new(StubSearch::new(vec![Ok(Some(candidate()))])),
            Arc::new(StubProfiles(None)),
            calls_probe.clone(),
            Arc::new(StubCopy("hello".into())),
            Arc::new(RateLimiter::new(Duration::from_millis(0))),
            LimiterKeys::default(),
            false,
            true,
        );

        let outcome = worker.enrich(0, record(None)).await.unwrap();

        assert_eq!(outcome.status, LeadStatus::NoWebsite);
        assert_eq!(calls_probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transient_search_errors_retry_then_fall_back_to_next_phrasing() {
        // Phrasing 1: transient, transient (exhausted). Phrasing 2: hit.
        let search = StubSearch::new(vec![
            Err(LeadError::Transient {
                service: "search".into(),
                message: "503".into(),
            }),
            Err(LeadError::Transient {
                service: "search".into(),
                message: "503".into(),
            }),
            Ok(Some(candidate())),
        ]);
        let worker = worker(search, found_emails("j@r.com"), false, true);

        let outcome = worker.enrich(0, record(Some("reyesroofing.com"))).await.unwrap();
        assert_eq!(outcome.status, LeadStatus::Enriched);
    }

    #[tokio::test]
    async fn test_transient_errors_exhausted_demote_to_not_found() {
        let transient = || {
            Err(LeadError::Transient {
                service: "search".into(),
                message: "timeout".into(),
            })
        };
        let search = StubSearch::new(vec![transient(), transient(), transient(), transient()]);
        let worker = worker(search, no_emails(), false, true);

        let outcome = worker.enrich(0, record(Some("reyesroofing.com"))).await.unwrap();
        assert_eq!(outcome.status, LeadStatus::NoDecisionMaker);
    }

    #[tokio::test]
    async fn test_quota_error_propagates_as_hard_failure() {
        let worker = worker(
            StubSearch::new(vec![Ok(Some(candidate()))]),
            StubEmails {
                calls: AtomicUsize::new(0),
                result: None,
                fatal: true,
            },
            false,
            true,
        );

        let err = worker
            .enrich(0, record(Some("reyesroofing.com")))
            .await
            .unwrap_err();
        assert!(err.is_batch_fatal());
    }

    #[tokio::test]
    async fn test_skip_email_marks_email_not_found() {
        let emails = StubEmails {
            calls: AtomicUsize::new(0),
            result: Some("x@y.com".into()),
            fatal: false,
        };
        let probe = Arc::new(emails);
        let worker = EnrichmentWorker::new(
            Arc::new(StubSearch::new(vec![Ok(Some(candidate()))])),
            Arc::new(StubProfiles(None)),
            probe.clone(),
            Arc::new(StubCopy("hello".into())),
            Arc::new(RateLimiter::new(Duration::from_millis(0))),
            LimiterKeys::default(),
            true,
            true,
        );

        let outcome = worker.enrich(0, record(Some("reyesroofing.com"))).await.unwrap();
        assert_eq!(outcome.status, LeadStatus::EmailNotFound);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }
}
