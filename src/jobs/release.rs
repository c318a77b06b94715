// src/jobs/release.rs
//! Numbered release PDF jobs: discover the latest report number, then probe
//! the following numbers until a real PDF shows up.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use super::JobContext;
use crate::extract::{FigureReport, TextExtractor};
use crate::notify::{compose, Attachment, Notifier};
use crate::poll::{Fetcher, PollOutcome, PollTarget};
use crate::sources::discovery::{discover_latest, LinkRule};
use crate::sources::release_pdf::{
    ReleaseDocument, ReleasePdfPredicate, ATTACH_JOB_MIN_BYTES, LINK_JOB_MIN_BYTES,
};
use crate::storage::{dated_filename, save_payload};

/// Size floor and offset bound of one release job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbePlan {
    pub min_bytes: u64,
    pub offset_bound: u32,
}

impl ProbePlan {
    /// Link mail: bigger floor, several releases may land at once.
    pub const LINK: Self = Self {
        min_bytes: LINK_JOB_MIN_BYTES,
        offset_bound: 5,
    };
    pub const PDF: Self = Self {
        min_bytes: ATTACH_JOB_MIN_BYTES,
        offset_bound: 4,
    };
    pub const FIGURES: Self = Self {
        min_bytes: ATTACH_JOB_MIN_BYTES,
        offset_bound: 5,
    };
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseReport {
    pub base_number: u32,
    pub report_number: u32,
    pub offset: u32,
    pub address: String,
    pub attempts: u64,
    pub saved_to: Option<PathBuf>,
    pub figures: Option<FigureReport>,
}

impl ReleaseReport {
    fn from_outcome(base_number: u32, outcome: &PollOutcome<ReleaseDocument>) -> Self {
        Self {
            base_number,
            report_number: outcome.payload.report_number,
            offset: outcome.target.offset().unwrap_or_default(),
            address: outcome.payload.address.clone(),
            attempts: outcome.attempts,
            saved_to: None,
            figures: None,
        }
    }
}

/// Discovery followed by the probe loop.
pub async fn find_release(
    ctx: &JobContext,
    fetcher: &dyn Fetcher,
    plan: ProbePlan,
) -> Result<(u32, PollOutcome<ReleaseDocument>)> {
    let sources = &ctx.config.sources;
    let rule = LinkRule::new(&sources.href_pattern, &sources.token_pattern)?;
    let base = discover_latest(fetcher, &sources.landing_url, &rule)
        .await
        .context("report number discovery")?;

    let outcome = ctx
        .poller()
        .with_offset_bound(plan.offset_bound)
        .poll(
            PollTarget::numbered_document(&sources.document_base_url, base),
            fetcher,
            &ReleasePdfPredicate::new(plan.min_bytes),
        )
        .await
        .context("probing for the new release")?;
    info!(
        target: "release",
        base,
        report = outcome.payload.report_number,
        attempts = outcome.attempts,
        "release found"
    );
    Ok((base, outcome))
}

/// Mail a link to the new release.
pub async fn run_link(
    ctx: &JobContext,
    fetcher: &dyn Fetcher,
    notifier: &dyn Notifier,
) -> Result<ReleaseReport> {
    let (base, outcome) = find_release(ctx, fetcher, ProbePlan::LINK).await?;
    let notification = compose::release_link(&outcome.payload.address, &ctx.config.sources.landing_url);
    notifier.send(&notification).await?;
    info!(target: "release", preview = %compose::preview(&notification), "notification sent");
    Ok(ReleaseReport::from_outcome(base, &outcome))
}

/// Save the release PDF under a dated name and mail it as an attachment.
pub async fn run_pdf(
    ctx: &JobContext,
    fetcher: &dyn Fetcher,
    notifier: &dyn Notifier,
) -> Result<ReleaseReport> {
    let (base, outcome) = find_release(ctx, fetcher, ProbePlan::PDF).await?;
    let (attachment, path) = store_attachment(ctx, &outcome.payload).await?;

    let notification = compose::release_pdf(
        &outcome.payload.address,
        &ctx.config.sources.landing_url,
        attachment,
    );
    notifier.send(&notification).await?;
    info!(target: "release", preview = %compose::preview(&notification), "notification sent");

    let mut report = ReleaseReport::from_outcome(base, &outcome);
    report.saved_to = Some(path);
    Ok(report)
}

/// As [`run_pdf`], plus the case count read from the PDF text and table.
pub async fn run_figures(
    ctx: &JobContext,
    fetcher: &dyn Fetcher,
    extractor: &dyn TextExtractor,
    notifier: &dyn Notifier,
) -> Result<ReleaseReport> {
    let (base, outcome) = find_release(ctx, fetcher, ProbePlan::FIGURES).await?;
    let (attachment, path) = store_attachment(ctx, &outcome.payload).await?;

    let text = extractor
        .extract_text(&outcome.payload.bytes)
        .context("reading release pdf text")?;
    let figures = FigureReport::from_text(&text, &ctx.config.sources.table_header);
    if figures.agrees() == Some(false) {
        tracing::warn!(target: "release", "text and table figures differ; both are in the mail");
    }

    let notification = compose::release_figures(&figures, attachment);
    notifier.send(&notification).await?;
    info!(target: "release", preview = %compose::preview(&notification), "notification sent");

    let mut report = ReleaseReport::from_outcome(base, &outcome);
    report.saved_to = Some(path);
    report.figures = Some(figures);
    Ok(report)
}

async fn store_attachment(
    ctx: &JobContext,
    doc: &ReleaseDocument,
) -> Result<(Attachment, PathBuf)> {
    let storage = &ctx.config.storage;
    let filename = dated_filename(ctx.today(), &storage.attachment_name);
    let path = save_payload(&storage.attachment_dir, &filename, &doc.bytes).await?;
    let attachment = Attachment {
        filename,
        content_type: "application/pdf".to_string(),
        bytes: doc.bytes.clone(),
    };
    Ok((attachment, path))
}
