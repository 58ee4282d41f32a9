//! Poll-for-completion watcher
//!
//! After an upload, the analysis result eventually appears in the remote
//! record store. The watcher re-fetches the store on a fixed interval until
//! the record for the submission shows up, or a bounded number of attempts
//! is exhausted. Exhaustion is a normal terminal outcome (`TimedOut`), not
//! an error: the caller tells the user to retry manually.
//!
//! Two detection policies, selected by configuration (the store's shape is
//! deployment-specific and cannot be inferred):
//! - Identifier match: scan for a record whose `audioFile` contains the
//!   submitted filename. Preferred when the store round-trips filenames.
//! - Change detection: compare the last element of each fetch against the
//!   last element of a baseline snapshot taken at watch start. For stores
//!   that only expose an appended feed.
//!
//! Known limitations, preserved deliberately:
//! - Under change detection, two results landing within one interval are
//!   reported as one (only the last-added record is seen).
//! - Under identifier match, duplicate filenames across uploads return the
//!   first match in collection order, which may be an older record.

use async_trait::async_trait;
use maap_common::config::DetectionPolicy;
use maap_common::{AnalysisRecord, Error, Result};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Read-only source of the current record collection.
///
/// Implemented by `RecordStoreClient`; the watcher depends only on this
/// trait so tests can script the store's responses.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the full, currently known record collection, in store order
    async fn fetch(&self) -> Result<Vec<AnalysisRecord>>;
}

/// Terminal outcome of a watch operation
#[derive(Debug, Clone, PartialEq)]
pub enum WatchOutcome {
    /// The completed record was found. `index` is its position in `records`,
    /// the collection fetched on the successful attempt.
    Found {
        attempt: u32,
        index: usize,
        records: Vec<AnalysisRecord>,
    },
    /// All attempts exhausted without a match
    TimedOut { attempts: u32 },
    /// The caller cancelled the watch before a match or timeout
    Cancelled { attempts: u32 },
}

/// Bounded polling watcher over a `RecordSource`
#[derive(Debug, Clone)]
pub struct ResultWatcher {
    policy: DetectionPolicy,
    max_attempts: u32,
    interval: Duration,
}

impl ResultWatcher {
    /// Create a watcher.
    ///
    /// Requires `max_attempts >= 1` and a positive interval.
    pub fn new(policy: DetectionPolicy, max_attempts: u32, interval: Duration) -> Result<Self> {
        if max_attempts < 1 {
            return Err(Error::InvalidInput(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if interval.is_zero() {
            return Err(Error::InvalidInput(
                "polling interval must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            policy,
            max_attempts,
            interval,
        })
    }

    /// Poll `source` until the result for `expected_identifier` appears.
    ///
    /// Blocks the caller for up to `max_attempts x interval` wall-clock
    /// time. Fetch errors during polling are logged and consume the attempt
    /// ("no change this attempt"); they never abort the loop. The local
    /// baseline/latest snapshots live only for the duration of this call,
    /// so concurrent watches are independent.
    ///
    /// `expected_identifier` must be non-empty under the identifier-match
    /// policy; change detection does not use it.
    pub async fn await_result(
        &self,
        source: &dyn RecordSource,
        expected_identifier: &str,
        cancel: &CancellationToken,
    ) -> Result<WatchOutcome> {
        if self.policy == DetectionPolicy::IdentifierMatch && expected_identifier.trim().is_empty()
        {
            return Err(Error::InvalidInput(
                "expected identifier must be non-empty for identifier matching".to_string(),
            ));
        }

        // Baseline snapshot, change detection only: identifier matching
        // never reads it, so under that policy exactly max_attempts fetches
        // are issued. A failed baseline fetch degrades to an empty baseline.
        let baseline = if self.policy == DetectionPolicy::ChangeDetection {
            match source.fetch().await {
                Ok(records) => records,
                Err(e) => {
                    warn!(error = %e, "Baseline fetch failed; starting from an empty baseline");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        for attempt in 1..=self.max_attempts {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(attempts = attempt - 1, "Watch cancelled");
                    return Ok(WatchOutcome::Cancelled { attempts: attempt - 1 });
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            let records = match source.fetch().await {
                Ok(records) => records,
                Err(e) => {
                    warn!(attempt, error = %e, "Fetch failed; no change this attempt");
                    continue;
                }
            };

            if let Some(index) = self.detect(expected_identifier, &baseline, &records) {
                info!(attempt, index, "Analysis result found");
                return Ok(WatchOutcome::Found {
                    attempt,
                    index,
                    records,
                });
            }
            debug!(attempt, records = records.len(), "No completion yet");
        }

        info!(attempts = self.max_attempts, "Watch timed out without a match");
        Ok(WatchOutcome::TimedOut {
            attempts: self.max_attempts,
        })
    }

    /// Apply the configured detection policy to one fetched collection,
    /// returning the matched record's index.
    fn detect(
        &self,
        expected_identifier: &str,
        baseline: &[AnalysisRecord],
        records: &[AnalysisRecord],
    ) -> Option<usize> {
        match self.policy {
            DetectionPolicy::IdentifierMatch => {
                // First match in collection order wins
                records
                    .iter()
                    .position(|r| r.matches_identifier(expected_identifier))
            }
            DetectionPolicy::ChangeDetection => {
                let last = records.last()?;
                let index = records.len() - 1;
                match baseline.last() {
                    // Empty baseline: the feed's last element counts once it
                    // carries a non-empty summary
                    None => last.has_summary().then_some(index),
                    // Otherwise: any structural difference in the last
                    // element means a new record was appended
                    Some(base) => (last != base).then_some(index),
                }
            }
        }
    }
}
