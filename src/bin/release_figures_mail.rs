//! Mails the newest release PDF together with the case count read from it.

use health_release_notifier::bootstrap::Runtime;
use health_release_notifier::extract::PdfTextExtractor;
use health_release_notifier::jobs::release;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let rt = Runtime::from_env()?;
    let fetcher = rt.ctx.http_fetcher();

    let report = release::run_figures(&rt.ctx, &fetcher, &PdfTextExtractor, &rt.mailer).await?;

    if let Some(figs) = &report.figures {
        println!(
            "{} ★ text: {} / table: {}",
            figs.text.headline.as_deref().unwrap_or("-"),
            figs.text.count.as_deref().unwrap_or("-"),
            figs.table.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
        );
    }
    println!("mail sent: report {}", report.report_number);
    Ok(())
}
