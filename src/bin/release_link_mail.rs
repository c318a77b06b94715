//! Mails a link to the newest numbered release PDF once it is published.

use health_release_notifier::bootstrap::Runtime;
use health_release_notifier::jobs::release;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let rt = Runtime::from_env()?;
    let fetcher = rt.ctx.http_fetcher();

    let report = release::run_link(&rt.ctx, &fetcher, &rt.mailer).await?;

    println!("mail sent: {}", report.address);
    Ok(())
}
