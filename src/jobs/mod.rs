// src/jobs/mod.rs
//! One function per daily notification job. Each runs to completion once:
//! poll until fresh, compose, send.

pub mod release;
pub mod severe_cases;

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveDate, Utc};
use tokio_util::sync::CancellationToken;

use crate::config::NotifierConfig;
use crate::poll::{HttpFetcher, Poller};

/// Publication timezone of both sources (UTC+9).
pub fn jst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("UTC+9 is a valid offset")
}

/// Everything a job needs, passed explicitly instead of living in globals.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub config: NotifierConfig,
    /// Fixed at job start; all target dates derive from it.
    pub now: DateTime<FixedOffset>,
    pub cancel: CancellationToken,
}

impl JobContext {
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            config,
            now: Utc::now().with_timezone(&jst()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_now(mut self, now: DateTime<FixedOffset>) -> Self {
        self.now = now;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    pub fn days_ago(&self, days: i64) -> NaiveDate {
        self.today() - ChronoDuration::days(days)
    }

    /// Poller configured from `[poll]`; the deadline clock starts now.
    pub fn poller(&self) -> Poller {
        let poll = &self.config.poll;
        Poller::new(self.cancel.clone())
            .with_interval(poll.interval())
            .with_network_errors(poll.network_errors)
            .with_deadline(poll.deadline().map(|d| tokio::time::Instant::now() + d))
    }

    pub fn http_fetcher(&self) -> HttpFetcher {
        HttpFetcher::default().with_timeout(self.config.poll.request_timeout())
    }
}
