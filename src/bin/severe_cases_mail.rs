//! Mails yesterday's nationwide severe-case count and its day-over-day change
//! as soon as the CSV feed has the row.

use health_release_notifier::bootstrap::Runtime;
use health_release_notifier::jobs::severe_cases;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let rt = Runtime::from_env()?;
    let fetcher = rt.ctx.http_fetcher();

    let report = severe_cases::run(&rt.ctx, &fetcher, &rt.mailer).await?;

    println!(
        "mail sent: {} severe cases on {} ({})",
        report.current.count, report.current.date, report.delta
    );
    Ok(())
}
