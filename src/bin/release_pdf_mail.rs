//! Mails the newest numbered release PDF as an attachment.

use health_release_notifier::bootstrap::Runtime;
use health_release_notifier::jobs::release;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let rt = Runtime::from_env()?;
    let fetcher = rt.ctx.http_fetcher();

    let report = release::run_pdf(&rt.ctx, &fetcher, &rt.mailer).await?;

    println!(
        "mail sent: report {} (saved to {})",
        report.report_number,
        report
            .saved_to
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    );
    Ok(())
}
