// src/jobs/severe_cases.rs
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use super::JobContext;
use crate::delta::DailyDelta;
use crate::notify::{compose, Notifier};
use crate::poll::{Fetcher, PollTarget};
use crate::sources::severe_cases::{AggregateRowPredicate, SevereCaseRow};

#[derive(Debug, Clone, Serialize)]
pub struct SevereCasesReport {
    pub previous: SevereCaseRow,
    pub current: SevereCaseRow,
    pub delta: DailyDelta,
    pub attempts: u64,
}

/// Waits for yesterday's nationwide row, compares it with the day before and
/// mails both counts. The two dates are polled one after the other.
pub async fn run(
    ctx: &JobContext,
    fetcher: &dyn Fetcher,
    notifier: &dyn Notifier,
) -> Result<SevereCasesReport> {
    let sources = &ctx.config.sources;
    let predicate = AggregateRowPredicate {
        category: sources.aggregate_category.clone(),
    };
    let poller = ctx.poller();

    let previous = poller
        .poll(
            PollTarget::date_row(&sources.severe_cases_url, ctx.days_ago(2)),
            fetcher,
            &predicate,
        )
        .await
        .context("polling day-before-yesterday row")?;
    info!(target: "severe_cases", date = %previous.payload.date, count = previous.payload.count, "previous day");

    let current = poller
        .poll(
            PollTarget::date_row(&sources.severe_cases_url, ctx.days_ago(1)),
            fetcher,
            &predicate,
        )
        .await
        .context("polling yesterday row")?;
    info!(target: "severe_cases", date = %current.payload.date, count = current.payload.count, "latest day");

    let notification = compose::severe_cases(&previous.payload, &current.payload);
    notifier.send(&notification).await?;
    info!(target: "severe_cases", preview = %compose::preview(&notification), "notification sent");

    Ok(SevereCasesReport {
        delta: DailyDelta::new(previous.payload.count, current.payload.count),
        attempts: previous.attempts + current.attempts,
        previous: previous.payload,
        current: current.payload,
    })
}
