// src/notify/mod.rs
pub mod compose;
pub mod email;

use anyhow::Result;

pub use email::EmailSender;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String, // e.g. "application/pdf"
    pub bytes: Vec<u8>,
}

/// One outbound message: plain text, optional HTML alternative, optional attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
    pub attachment: Option<Attachment>,
}

impl Notification {
    pub fn plain(subject: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            text: text.into(),
            html: None,
            attachment: None,
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, n: &Notification) -> Result<()>;
}

// --- Test helper ---
/// Keeps every notification in memory instead of sending it.
#[derive(Default)]
pub struct MemoryNotifier {
    pub sent: std::sync::Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, n: &Notification) -> Result<()> {
        self.sent
            .lock()
            .map_err(|_| anyhow::anyhow!("memory notifier poisoned"))?
            .push(n.clone());
        Ok(())
    }
}
