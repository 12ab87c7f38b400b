use crate::domain::model::{BatchOutcome, BatchSummary, LeadRecord};
use crate::domain::ports::Enricher;
use crate::utils::error::LeadError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Fans a batch out to at most `concurrency` workers at a time and
/// collects every result regardless of individual failures.
///
/// Cancellation is cooperative: the shared flag is checked before a
/// record starts work (both before and after its permit is granted),
/// never by killing in-flight tasks. An interrupt or a batch-fatal
/// worker error therefore leaves exactly the already-completed results
/// behind, each fully formed.
pub struct Dispatcher {
    concurrency: usize,
    cancel: Arc<AtomicBool>,
}

impl Dispatcher {
    pub fn new(concurrency: usize, cancel: Arc<AtomicBool>) -> Self {
        Self {
            concurrency: concurrency.max(1),
            cancel,
        }
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub async fn run<E>(&self, records: Vec<LeadRecord>, worker: Arc<E>) -> BatchOutcome
    where
        E: Enricher + ?Sized + 'static,
    {
        let total = records.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(total);

        tracing::info!(
            records = total,
            concurrency = self.concurrency,
            "🚀 dispatching enrichment batch"
        );

        for (index, record) in records.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let worker = worker.clone();
            let cancel = self.cancel.clone();

            handles.push(tokio::spawn(async move {
                if cancel.load(Ordering::SeqCst) {
                    return Ok(None);
                }
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    // The semaphore is never closed; treat it like a
                    // cancellation if it somehow is.
                    Err(_) => return Ok(None),
                };
                if cancel.load(Ordering::SeqCst) {
                    return Ok(None);
                }
                worker.enrich(index, record).await.map(Some)
            }));
        }

        let mut outcomes = Vec::new();
        let mut summary = BatchSummary {
            processed: total,
            ..BatchSummary::default()
        };
        let mut fatal_error: Option<LeadError> = None;

        for handle in handles {
            match handle.await {
                Ok(Ok(Some(outcome))) => {
                    summary.tally(outcome.status);
                    outcomes.push(outcome);
                }
                Ok(Ok(None)) => {
                    summary.skipped += 1;
                }
                Ok(Err(e)) => {
                    summary.failed += 1;
                    if e.is_batch_fatal() {
                        tracing::error!(error = %e, "💥 batch-fatal error, stopping new dispatches");
                        self.cancel.store(true, Ordering::SeqCst);
                        if fatal_error.is_none() {
                            fatal_error = Some(e);
                        }
                    } else {
                        tracing::warn!(error = %e, "record enrichment failed, batch continues");
                    }
                }
                Err(join_err) => {
                    summary.failed += 1;
                    tracing::error!(error = %join_err, "enrichment task panicked");
                }
            }
        }

        // Completion order is arbitrary; restore input order so the
        // export is stable.
        outcomes.sort_by_key(|o| o.index);

        let interrupted = self.cancel.load(Ordering::SeqCst);
        tracing::info!(
            collected = outcomes.len(),
            skipped = summary.skipped,
            failed = summary.failed,
            interrupted,
            "🏁 batch complete"
        );

        BatchOutcome {
            outcomes,
            summary,
            interrupted,
            fatal_error,
        }
    }
}
