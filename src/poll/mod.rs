// src/poll/mod.rs
//! Poll-until-fresh loop shared by every job.
//!
//! A [`Poller`] fetches the target's probe address, hands the result to a
//! [`FreshnessPredicate`] and either returns the ready payload or sleeps for a
//! fixed interval and tries again. There is no attempt cap; hosts bound the
//! loop with a [`CancellationToken`] or a deadline.

pub mod fetch;
pub mod target;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub use fetch::{FetchError, FetchResult, Fetcher, HttpFetcher};
pub use target::PollTarget;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_OFFSET_BOUND: u32 = 5;

/// Outcome of evaluating one fetch against a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict<T> {
    Ready(T),
    NotReady,
}

impl<T> Verdict<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Verdict::Ready(_))
    }
}

pub trait FreshnessPredicate: Send + Sync {
    type Payload;

    fn evaluate(&self, target: &PollTarget, fetched: &FetchResult) -> Verdict<Self::Payload>;
}

/// What to do when the transport itself fails (DNS, connect, read).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkErrorPolicy {
    /// Treat like "not published yet" and keep polling.
    #[default]
    Retry,
    /// Stop polling and surface the error.
    Abort,
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("polling cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },
    #[error("deadline reached after {attempts} attempts")]
    DeadlineExceeded { attempts: u64 },
    #[error("network failure on attempt {attempts}")]
    Network {
        attempts: u64,
        #[source]
        source: FetchError,
    },
}

/// First fresh result plus the target state that produced it.
#[derive(Debug, Clone)]
pub struct PollOutcome<T> {
    pub payload: T,
    pub target: PollTarget,
    pub attempts: u64,
}

#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
    offset_bound: u32,
    network_errors: NetworkErrorPolicy,
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(CancellationToken::new())
    }
}

impl Poller {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            offset_bound: DEFAULT_OFFSET_BOUND,
            network_errors: NetworkErrorPolicy::default(),
            deadline: None,
            cancel,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Highest offset probed before wrapping back to 1. Values below 1 act as 1.
    pub fn with_offset_bound(mut self, bound: u32) -> Self {
        self.offset_bound = bound.max(1);
        self
    }

    pub fn with_network_errors(mut self, policy: NetworkErrorPolicy) -> Self {
        self.network_errors = policy;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn offset_bound(&self) -> u32 {
        self.offset_bound
    }

    /// Block until `predicate` accepts a fetch of `target`.
    pub async fn poll<P>(
        &self,
        mut target: PollTarget,
        fetcher: &dyn Fetcher,
        predicate: &P,
    ) -> Result<PollOutcome<P::Payload>, PollError>
    where
        P: FreshnessPredicate + ?Sized,
    {
        let mut attempts: u64 = 0;
        loop {
            if self.cancel.is_cancelled() {
                return Err(PollError::Cancelled { attempts });
            }
            if self.deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(PollError::DeadlineExceeded { attempts });
            }

            attempts += 1;
            let address = target.probe_address();
            info!(target: "poll", attempt = attempts, %address, "probing");

            let verdict = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(PollError::Cancelled { attempts }),
                _ = until(self.deadline) => return Err(PollError::DeadlineExceeded { attempts }),
                res = fetcher.fetch(&address) => match res {
                    Ok(fetched) => predicate.evaluate(&target, &fetched),
                    Err(e) => match self.network_errors {
                        NetworkErrorPolicy::Abort => {
                            return Err(PollError::Network { attempts, source: e })
                        }
                        NetworkErrorPolicy::Retry => {
                            warn!(target: "poll", attempt = attempts, error = %e, "fetch failed, retrying");
                            Verdict::NotReady
                        }
                    },
                },
            };

            if let Verdict::Ready(payload) = verdict {
                info!(target: "poll", attempt = attempts, %address, "fresh data found");
                return Ok(PollOutcome {
                    payload,
                    target,
                    attempts,
                });
            }

            info!(target: "poll", %address, "not available yet");
            target.advance(self.offset_bound);
            self.pause(attempts).await?;
        }
    }

    async fn pause(&self, attempts: u64) -> Result<(), PollError> {
        let wake = Instant::now() + self.interval;
        match self.deadline {
            Some(deadline) if deadline <= wake => {
                tokio::select! {
                    _ = self.cancel.cancelled() => Err(PollError::Cancelled { attempts }),
                    _ = tokio::time::sleep_until(deadline) => Err(PollError::DeadlineExceeded { attempts }),
                }
            }
            _ => {
                tokio::select! {
                    _ = self.cancel.cancelled() => Err(PollError::Cancelled { attempts }),
                    _ = tokio::time::sleep_until(wake) => Ok(()),
                }
            }
        }
    }
}

/// Resolves at `deadline`, or never when there is none.
async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
