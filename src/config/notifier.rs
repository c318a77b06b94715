// src/config/notifier.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::poll::NetworkErrorPolicy;
use crate::sources::{discovery, release_pdf, severe_cases};

pub const ENV_CONFIG_PATH: &str = "NOTIFIER_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/notifier.toml";
pub const DEFAULT_JSON_PATH: &str = "config/notifier.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub mail: MailConfig,
    pub poll: PollConfig,
    pub sources: SourcesConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Login name; defaults to `from` when unset.
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            username: None,
            password: None,
            from: None,
            to: None,
        }
    }
}

/// Fully resolved mail settings; built only when every field is present.
#[derive(Clone)]
pub struct MailCredentials {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

impl std::fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailCredentials")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password_len", &self.password.len())
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

impl MailConfig {
    pub fn credentials(&self) -> Result<MailCredentials> {
        let from = non_empty(&self.from).ok_or_else(|| anyhow!("sender address missing (NOTIFY_EMAIL_FROM)"))?;
        let to = non_empty(&self.to).ok_or_else(|| anyhow!("recipient address missing (NOTIFY_EMAIL_TO)"))?;
        let password = non_empty(&self.password).ok_or_else(|| anyhow!("SMTP password missing (SMTP_PASS)"))?;
        let username = non_empty(&self.username).unwrap_or_else(|| from.clone());
        if self.smtp_host.trim().is_empty() {
            bail!("SMTP host missing (SMTP_HOST)");
        }
        Ok(MailCredentials {
            smtp_host: self.smtp_host.trim().to_string(),
            smtp_port: self.smtp_port,
            username,
            password,
            from,
            to,
        })
    }
}

fn non_empty(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_secs: u64,
    /// Optional bound on total polling time; unset means poll until fresh.
    pub deadline_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub network_errors: NetworkErrorPolicy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            deadline_secs: None,
            request_timeout_secs: None,
            network_errors: NetworkErrorPolicy::Retry,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub severe_cases_url: String,
    pub aggregate_category: String,
    pub landing_url: String,
    pub document_base_url: String,
    pub href_pattern: String,
    pub token_pattern: String,
    pub table_header: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            severe_cases_url: severe_cases::DEFAULT_FEED_URL.to_string(),
            aggregate_category: severe_cases::AGGREGATE_CATEGORY.to_string(),
            landing_url: release_pdf::DEFAULT_LANDING_URL.to_string(),
            document_base_url: release_pdf::DEFAULT_DOCUMENT_BASE.to_string(),
            href_pattern: discovery::DEFAULT_HREF_PATTERN.to_string(),
            token_pattern: discovery::DEFAULT_TOKEN_PATTERN.to_string(),
            table_header: crate::extract::DEFAULT_TABLE_HEADER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub attachment_dir: PathBuf,
    pub attachment_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            attachment_dir: std::env::temp_dir(),
            attachment_name: crate::storage::DEFAULT_ATTACHMENT_NAME.to_string(),
        }
    }
}

impl NotifierConfig {
    /// Load from an explicit path. TOML or JSON by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading notifier config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => serde_json::from_str(&content).context("parsing notifier config json"),
            _ => toml::from_str(&content).context("parsing notifier config toml"),
        }
    }

    /// Lookup order:
    /// 1) $NOTIFIER_CONFIG_PATH
    /// 2) config/notifier.toml
    /// 3) config/notifier.json
    /// 4) built-in defaults
    ///
    /// Environment overrides are applied on top in every case.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path");
            }
            Self::load_from(&pb)?
        } else if Path::new(DEFAULT_TOML_PATH).exists() {
            Self::load_from(Path::new(DEFAULT_TOML_PATH))?
        } else if Path::new(DEFAULT_JSON_PATH).exists() {
            Self::load_from(Path::new(DEFAULT_JSON_PATH))?
        } else {
            Self::default()
        };
        cfg.apply_env_from(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    pub fn apply_env_from<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = get("SMTP_HOST") {
            self.mail.smtp_host = v;
        }
        if let Some(v) = get("SMTP_PORT") {
            self.mail.smtp_port = v.trim().parse().context("SMTP_PORT")?;
        }
        if let Some(v) = get("SMTP_USER") {
            self.mail.username = Some(v);
        }
        if let Some(v) = get("SMTP_PASS") {
            self.mail.password = Some(v);
        }
        if let Some(v) = get("NOTIFY_EMAIL_FROM") {
            self.mail.from = Some(v);
        }
        if let Some(v) = get("NOTIFY_EMAIL_TO") {
            self.mail.to = Some(v);
        }
        if let Some(v) = get("POLL_INTERVAL_SECS") {
            self.poll.interval_secs = v.trim().parse().context("POLL_INTERVAL_SECS")?;
        }
        if let Some(v) = get("POLL_DEADLINE_SECS") {
            self.poll.deadline_secs = Some(v.trim().parse().context("POLL_DEADLINE_SECS")?);
        }
        if let Some(v) = get("ATTACHMENT_DIR") {
            self.storage.attachment_dir = PathBuf::from(v);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::{env, fs};

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: NotifierConfig = toml::from_str(
            r#"
[poll]
interval_secs = 30
network_errors = "abort"

[mail]
to = "desk@example.test"
"#,
        )
        .unwrap();
        assert_eq!(cfg.poll.interval_secs, 30);
        assert_eq!(cfg.poll.network_errors, NetworkErrorPolicy::Abort);
        assert_eq!(cfg.mail.smtp_port, 587);
        assert_eq!(cfg.sources.aggregate_category, "ALL");
        assert_eq!(cfg.mail.to.as_deref(), Some("desk@example.test"));
    }

    #[test]
    fn env_overrides_file_values() {
        let vars: HashMap<&str, &str> = [
            ("SMTP_PASS", "secret"),
            ("NOTIFY_EMAIL_FROM", "bot@example.test"),
            ("NOTIFY_EMAIL_TO", "desk@example.test"),
            ("POLL_DEADLINE_SECS", "3600"),
        ]
        .into_iter()
        .collect();
        let mut cfg = NotifierConfig::default();
        cfg.apply_env_from(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        let creds = cfg.mail.credentials().unwrap();
        assert_eq!(creds.username, "bot@example.test");
        assert_eq!(creds.to, "desk@example.test");
        assert_eq!(cfg.poll.deadline(), Some(Duration::from_secs(3600)));
        assert!(!format!("{creds:?}").contains("secret"));
    }

    #[test]
    fn bad_numeric_env_is_an_error() {
        let mut cfg = NotifierConfig::default();
        let res = cfg.apply_env_from(|k| (k == "SMTP_PORT").then(|| "abc".to_string()));
        assert!(res.is_err());
    }

    #[test]
    fn missing_credentials_rejected() {
        let mut mail = MailConfig::default();
        mail.from = Some("bot@example.test".into());
        mail.to = Some("  ".into());
        mail.password = Some("pw".into());
        assert!(mail.credentials().is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);

        let cfg = NotifierConfig::load_default().unwrap();
        assert_eq!(cfg.poll.interval_secs, 10);

        fs::create_dir_all(tmp.path().join("config")).unwrap();
        fs::write(
            tmp.path().join(DEFAULT_TOML_PATH),
            "[poll]\ninterval_secs = 20\n",
        )
        .unwrap();
        assert_eq!(NotifierConfig::load_default().unwrap().poll.interval_secs, 20);

        let p_json = tmp.path().join("custom.json");
        fs::write(&p_json, r#"{"poll": {"interval_secs": 5}}"#).unwrap();
        env::set_var(ENV_CONFIG_PATH, p_json.display().to_string());
        assert_eq!(NotifierConfig::load_default().unwrap().poll.interval_secs, 5);
        env::remove_var(ENV_CONFIG_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
