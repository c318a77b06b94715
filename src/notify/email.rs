use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailAttachment, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{Notification, Notifier};
use crate::config::notifier::MailCredentials;

/// STARTTLS submission with password login.
pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    pub fn new(creds: &MailCredentials) -> Result<Self> {
        let login = Credentials::new(creds.username.clone(), creds.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&creds.smtp_host)
            .with_context(|| format!("invalid SMTP host {}", creds.smtp_host))?
            .port(creds.smtp_port)
            .credentials(login)
            .build();

        let from = creds.from.parse().context("invalid sender address")?;
        let to = creds.to.parse().context("invalid recipient address")?;

        Ok(Self { mailer, from, to })
    }

    pub fn build_message(&self, n: &Notification) -> Result<Message> {
        build_message(self.from.clone(), self.to.clone(), n)
    }
}

pub fn build_message(from: Mailbox, to: Mailbox, n: &Notification) -> Result<Message> {
    let builder = Message::builder().from(from).to(to).subject(n.subject.clone());

    let msg = match (&n.html, &n.attachment) {
        (None, None) => builder
            .header(ContentType::TEXT_PLAIN)
            .body(n.text.clone()),
        (Some(html), None) => {
            builder.multipart(MultiPart::alternative_plain_html(n.text.clone(), html.clone()))
        }
        (html, Some(att)) => {
            let body = match html {
                Some(html) => MultiPart::alternative_plain_html(n.text.clone(), html.clone()),
                None => MultiPart::mixed().singlepart(SinglePart::plain(n.text.clone())),
            };
            let content_type =
                ContentType::parse(&att.content_type).context("attachment content type")?;
            let file = MailAttachment::new(att.filename.clone()).body(att.bytes.clone(), content_type);
            builder.multipart(MultiPart::mixed().multipart(body).singlepart(file))
        }
    };
    msg.context("build email")
}

#[async_trait::async_trait]
impl Notifier for EmailSender {
    async fn send(&self, n: &Notification) -> Result<()> {
        let msg = self.build_message(n)?;
        // Login failures surface here; nothing retries them.
        self.mailer.send(msg).await.context("send email")?;
        tracing::info!(target: "notify", subject = %n.subject, "email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Attachment;

    fn boxes() -> (Mailbox, Mailbox) {
        (
            "bot@example.test".parse().unwrap(),
            "desk@example.test".parse().unwrap(),
        )
    }

    fn render(n: &Notification) -> String {
        let (from, to) = boxes();
        String::from_utf8(build_message(from, to, n).unwrap().formatted()).unwrap()
    }

    #[test]
    fn plain_message() {
        let out = render(&Notification::plain("subject", "hello"));
        assert!(out.contains("Content-Type: text/plain"));
        assert!(!out.contains("multipart"));
    }

    #[test]
    fn html_alternative() {
        let out = render(&Notification::plain("s", "hello").with_html("<p>hello</p>"));
        assert!(out.contains("multipart/alternative"));
        assert!(out.contains("text/html"));
    }

    #[test]
    fn attachment_is_mixed() {
        let n = Notification::plain("s", "see attached").with_attachment(Attachment {
            filename: "20210102_tokyo_covid19.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: b"%PDF-1.4".to_vec(),
        });
        let out = render(&n);
        assert!(out.contains("multipart/mixed"));
        assert!(out.contains("application/pdf"));
        assert!(out.contains("20210102_tokyo_covid19.pdf"));
    }

    #[test]
    fn html_and_attachment_nest_alternative_in_mixed() {
        let n = Notification::plain("s", "see attached")
            .with_html("<p>see attached</p>")
            .with_attachment(Attachment {
                filename: "20210102_tokyo_covid19.pdf".into(),
                content_type: "application/pdf".into(),
                bytes: b"%PDF-1.4".to_vec(),
            });
        let out = render(&n);
        let mixed = out.find("multipart/mixed").unwrap();
        let alternative = out.find("multipart/alternative").unwrap();
        assert!(mixed < alternative);
        assert!(out.contains("text/plain"));
        assert!(out.contains("text/html"));
        assert!(out.contains("application/pdf"));
        assert!(out.contains("20210102_tokyo_covid19.pdf"));
    }

    #[test]
    fn bad_content_type_is_an_error() {
        let (from, to) = boxes();
        let n = Notification::plain("s", "x").with_attachment(Attachment {
            filename: "a".into(),
            content_type: "not a type".into(),
            bytes: vec![],
        });
        assert!(build_message(from, to, &n).is_err());
    }
}
