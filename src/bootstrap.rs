// src/bootstrap.rs
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::NotifierConfig;
use crate::jobs::JobContext;
use crate::notify::EmailSender;

pub struct Runtime {
    pub ctx: JobContext,
    pub mailer: EmailSender,
}

impl Runtime {
    /// `.env`, logging, config and SMTP credentials, in that order.
    /// Missing credentials stop the process before any polling starts.
    pub fn from_env() -> Result<Self> {
        // no-op when there is no .env file
        let _ = dotenvy::dotenv();
        crate::telemetry::init_tracing();

        let config = NotifierConfig::load_default().context("loading notifier config")?;
        let creds = config.mail.credentials()?;
        // Safe diagnostics only: never the password itself
        info!(
            "mail cfg loaded: host={}:{}, from={}, to={}, pass_len={}",
            creds.smtp_host,
            creds.smtp_port,
            creds.from,
            creds.to,
            creds.password.len()
        );
        let mailer = EmailSender::new(&creds)?;
        let ctx = JobContext::new(config);
        spawn_ctrl_c_cancel(&ctx);
        Ok(Self { ctx, mailer })
    }
}

/// Ctrl-C cancels the poll loop instead of killing the process mid-write.
fn spawn_ctrl_c_cancel(ctx: &JobContext) {
    let cancel = ctx.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping");
            cancel.cancel();
        }
    });
}
