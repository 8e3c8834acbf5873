//! Email delivery over a local SMTP relay.
//!
//! Builds a `multipart/alternative` message (plain text first, HTML second)
//! and submits it to an unauthenticated relay such as smtp4dev on
//! `localhost:25`. Failures propagate to the caller; this layer never retries.

use crate::error::DeliveryError;
use lettre::message::{Mailbox, MultiPart, SinglePart, header::ContentType};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::{Duration, Instant};
use tracing::{info, instrument};

pub const DEFAULT_SMTP_HOST: &str = "localhost";
pub const DEFAULT_SMTP_PORT: u16 = 25;

/// Something that can hand a composed digest to a mail transport.
pub trait Mailer {
    async fn send(&self, plain_body: &str, html_body: &str, subject: &str) -> Result<(), DeliveryError>;
}

impl<T: Mailer> Mailer for &T {
    async fn send(&self, plain_body: &str, html_body: &str, subject: &str) -> Result<(), DeliveryError> {
        (**self).send(plain_body, html_body, subject).await
    }
}

/// Build the multipart digest message.
pub fn build_message(
    plain_body: &str,
    html_body: &str,
    subject: &str,
    from: &Mailbox,
    to: &Mailbox,
) -> Result<Message, DeliveryError> {
    let message = Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(subject)
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(plain_body.to_string()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html_body.to_string()),
                ),
        )?;
    Ok(message)
}

/// [`Mailer`] that talks plain SMTP to a relay without TLS or credentials.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
    port: u16,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    pub fn new(host: &str, port: u16, timeout: Duration, from: Mailbox, to: Mailbox) -> Self {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .timeout(Some(timeout))
            .build();
        Self {
            transport,
            host: host.to_string(),
            port,
            from,
            to,
        }
    }
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("from", &self.from.to_string())
            .field("to", &self.to.to_string())
            .finish()
    }
}

impl Mailer for SmtpMailer {
    #[instrument(level = "info", skip_all, fields(host = %self.host, port = self.port, to = %self.to))]
    async fn send(&self, plain_body: &str, html_body: &str, subject: &str) -> Result<(), DeliveryError> {
        let t0 = Instant::now();
        let message = build_message(plain_body, html_body, subject, &self.from, &self.to)?;
        let response = self.transport.send(message).await?;
        info!(
            code = %response.code(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            subject,
            "Digest email sent"
        );
        Ok(())
    }
}
