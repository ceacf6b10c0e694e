//! Single-flight, time-bounded suggestion requests.
//!
//! # Invariants
//! - Empty content never reaches the tagger.
//! - A second `analyze` while one is pending returns `Busy` immediately.
//! - The in-flight flag is released on completion, timeout and cancellation.
//! - Failures are logged and reported as `NoSuggestion`; nothing is retried.

use super::tagger::{MaterialTagger, TagSuggestion};
use crate::service::taxonomy_service::Taxonomy;
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Result of one smart-tag attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmartTagOutcome {
    /// Content was empty; no request was sent.
    Skipped,
    /// Another request from this tagger is still pending.
    Busy,
    /// The request failed or timed out.
    NoSuggestion,
    Suggested(TagSuggestion),
}

impl SmartTagOutcome {
    pub fn suggestion(&self) -> Option<&TagSuggestion> {
        match self {
            Self::Suggested(suggestion) => Some(suggestion),
            _ => None,
        }
    }
}

/// Wraps a tagger with a timeout and a re-entrancy guard.
pub struct SmartTagger<T: MaterialTagger> {
    tagger: T,
    timeout: Duration,
    in_flight: AtomicBool,
}

impl<T: MaterialTagger> SmartTagger<T> {
    pub fn new(tagger: T, timeout: Duration) -> Self {
        Self {
            tagger,
            timeout,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a request is currently pending. UIs disable the trigger on `true`.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn tagger(&self) -> &T {
        &self.tagger
    }

    /// Requests a suggestion for `content`, constrained to `taxonomy`.
    pub async fn analyze(&self, content: &str, taxonomy: &Taxonomy) -> SmartTagOutcome {
        if content.is_empty() {
            return SmartTagOutcome::Skipped;
        }
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            info!("event=smart_tag module=ai status=skip reason=busy");
            return SmartTagOutcome::Busy;
        };

        let started_at = Instant::now();
        let request = self.tagger.suggest(content, taxonomy);
        let result = tokio::time::timeout(self.timeout, request).await;
        let duration_ms = started_at.elapsed().as_millis();

        match result {
            Ok(Ok(suggestion)) => {
                info!(
                    "event=smart_tag module=ai status=ok duration_ms={duration_ms} tags={}",
                    suggestion.tags.len()
                );
                SmartTagOutcome::Suggested(suggestion)
            }
            Ok(Err(err)) => {
                warn!("event=smart_tag module=ai status=error duration_ms={duration_ms} error={err}");
                SmartTagOutcome::NoSuggestion
            }
            Err(_) => {
                warn!(
                    "event=smart_tag module=ai status=error duration_ms={duration_ms} error_code=timeout timeout_ms={}",
                    self.timeout.as_millis()
                );
                SmartTagOutcome::NoSuggestion
            }
        }
    }
}

struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
