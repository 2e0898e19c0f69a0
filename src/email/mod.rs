pub mod templates;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

/// Outbound SMTP transport for transactional mail. The password-reset link
/// is the only email this service sends.
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl Mailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP relay setup failed: {e}"))?
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.pass.clone()))
            .build();

        Ok(Mailer {
            transport,
            from: config.from.clone(),
        })
    }

    pub async fn send_password_reset(&self, to: &str, reset_url: &str) -> Result<(), String> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {e}"))?,
            )
            .to(to
                .parse()
                .map_err(|e| format!("Invalid recipient address: {e}"))?)
            .subject("Password Reset")
            .header(ContentType::TEXT_HTML)
            .body(templates::render_password_reset(reset_url))
            .map_err(|e| format!("Failed to build reset email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| format!("SMTP send failed: {e}"))
    }
}
