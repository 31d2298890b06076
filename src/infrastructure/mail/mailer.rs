//! SMTP delivery for reports and ad-hoc notices

use std::fmt;
use std::path::Path;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;
use tracing::{info, warn};

use crate::core::OpsError;

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpServer {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Clone, Deserialize)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub smtp: SmtpServer,
    pub credentials: SmtpCredentials,
    pub from: String,
    pub to: Vec<String>,
}

fn default_port() -> u16 {
    587
}

impl MailConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.smtp.host.trim().is_empty() {
            return Err("mail.smtp.host must not be empty".into());
        }
        if self.to.is_empty() {
            return Err("mail.to needs at least one recipient".into());
        }
        Ok(())
    }
}

pub struct Mailer {
    from: Mailbox,
    to: Vec<Mailbox>,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl Mailer {
    pub fn new(config: &MailConfig) -> Result<Self, OpsError> {
        let from: Mailbox = config.from.parse()?;
        let to = config
            .to
            .iter()
            .map(|addr| addr.parse::<Mailbox>())
            .collect::<Result<Vec<_>, _>>()?;
        let creds = Credentials::new(
            config.credentials.username.clone(),
            config.credentials.password.clone(),
        );
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp.host)?
            .port(config.smtp.port)
            .credentials(creds)
            .build();
        Ok(Self { from, to, transport })
    }

    /// Open a connection and run the SMTP handshake without sending anything.
    pub async fn check_server(&self) -> Result<(), OpsError> {
        if self.transport.test_connection().await? {
            info!("SMTP server is reachable");
            Ok(())
        } else {
            warn!("SMTP server did not accept the connection");
            Err(OpsError::Mail("SMTP server did not accept the connection".into()))
        }
    }

    pub async fn send(
        &self,
        subject: &str,
        html_body: &str,
        attachment: Option<&Path>,
    ) -> Result<(), OpsError> {
        let attachment = match attachment {
            Some(path) => Some(read_attachment(path).await?),
            None => None,
        };
        let message = compose(&self.from, &self.to, subject, html_body, attachment)?;
        self.transport.send(message).await?;
        info!("Mail \"{}\" sent to {} recipient(s)", subject, self.to.len());
        Ok(())
    }
}

async fn read_attachment(path: &Path) -> Result<(String, Vec<u8>), OpsError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| OpsError::Mail(format!("attachment {} has no file name", path.display())))?;
    let bytes = tokio::fs::read(path).await?;
    Ok((name, bytes))
}

fn compose(
    from: &Mailbox,
    to: &[Mailbox],
    subject: &str,
    html_body: &str,
    attachment: Option<(String, Vec<u8>)>,
) -> Result<Message, OpsError> {
    let mut builder = Message::builder()
        .date_now()
        .from(from.clone())
        .subject(subject);
    for recipient in to {
        builder = builder.to(recipient.clone());
    }

    let mut body = MultiPart::mixed().singlepart(SinglePart::html(html_body.to_string()));
    if let Some((name, bytes)) = attachment {
        let content_type = ContentType::parse("application/octet-stream")
            .map_err(|err| OpsError::Mail(err.to_string()))?;
        body = body.singlepart(Attachment::new(name).body(bytes, content_type));
    }

    Ok(builder.multipart(body)?)
}
