//! SMTP dispatch of composed order notifications. Configuration is checked
//! eagerly at construction; the send itself runs under a hard deadline and is
//! never retried.

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::notification::{MessageBody, SpreadsheetAttachment};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{info, instrument};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub struct MailDispatcher {
  transport: AsyncSmtpTransport<Tokio1Executor>,
  sender: Mailbox,
  recipient: Mailbox,
  send_deadline: Duration,
}

impl MailDispatcher {
  /// Builds the dispatcher from configuration. Any missing transport field
  /// fails fast with a `ConfigurationError` before a single network attempt
  /// is made.
  pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
    let smtp = &config.smtp;

    let mut missing = Vec::new();
    if smtp.host.is_none() {
      missing.push("SMTP_HOST");
    }
    if smtp.port.is_none() {
      missing.push("SMTP_PORT");
    }
    if smtp.user.is_none() {
      missing.push("SMTP_USER");
    }
    if smtp.pass.is_none() {
      missing.push("SMTP_PASS");
    }
    if smtp.sender.is_none() {
      missing.push("EMAIL_FROM");
    }
    if smtp.recipient.is_none() {
      missing.push("EMAIL_TO");
    }
    if !missing.is_empty() {
      return Err(AppError::Config(format!(
        "Mail transport not configured, missing: {}",
        missing.join(", ")
      )));
    }

    // Unwraps are safe: presence was just checked.
    let host = smtp.host.clone().unwrap();
    let port = smtp.port.unwrap();
    let user = smtp.user.clone().unwrap();
    let pass = smtp.pass.clone().unwrap();

    let sender: Mailbox = smtp
      .sender
      .clone()
      .unwrap()
      .parse()
      .map_err(|e| AppError::Config(format!("Invalid EMAIL_FROM address: {}", e)))?;
    let recipient: Mailbox = smtp
      .recipient
      .clone()
      .unwrap()
      .parse()
      .map_err(|e| AppError::Config(format!("Invalid EMAIL_TO address: {}", e)))?;

    let tls = if smtp.secure {
      let params =
        TlsParameters::new(host.clone()).map_err(|e| AppError::Config(format!("SMTP TLS setup failed: {}", e)))?;
      Tls::Wrapper(params)
    } else {
      Tls::None
    };

    let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host.as_str())
      .port(port)
      .tls(tls)
      .credentials(Credentials::new(user, pass))
      .timeout(Some(smtp.socket_timeout))
      .build();

    Ok(Self {
      transport,
      sender,
      recipient,
      send_deadline: smtp.send_deadline,
    })
  }

  /// Sends one composed notification to the fixed operator recipient.
  /// Exceeding the deadline is a dispatch failure, not a retry.
  #[instrument(name = "mailer::send", skip(self, body, attachment), fields(subject = %body.subject))]
  pub async fn send(&self, body: &MessageBody, attachment: Option<&SpreadsheetAttachment>) -> Result<(), AppError> {
    let alternative = MultiPart::alternative_plain_html(body.text.clone(), body.html.clone());

    let builder = Message::builder()
      .from(self.sender.clone())
      .to(self.recipient.clone())
      .subject(body.subject.clone());

    let message = match attachment {
      Some(sheet) => {
        let content_type =
          ContentType::parse(XLSX_MIME).map_err(|e| AppError::Dispatch(format!("Invalid attachment MIME: {}", e)))?;
        let part = Attachment::new(sheet.filename.clone()).body(sheet.bytes.clone(), content_type);
        builder.multipart(MultiPart::mixed().multipart(alternative).singlepart(part))
      }
      None => builder.multipart(alternative),
    }
    .map_err(|e| AppError::Dispatch(format!("Message assembly failed: {}", e)))?;

    match tokio::time::timeout(self.send_deadline, self.transport.send(message)).await {
      Err(_) => Err(AppError::Dispatch(format!(
        "SMTP send exceeded the {:?} deadline",
        self.send_deadline
      ))),
      Ok(Err(e)) => Err(AppError::Dispatch(format!("SMTP send failed: {}", e))),
      Ok(Ok(_)) => {
        info!("Order notification dispatched.");
        Ok(())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;

  fn configured() -> AppConfig {
    let mut config = AppConfig::for_tests();
    config.smtp.host = Some("smtp.example.com".to_string());
    config.smtp.port = Some(587);
    config.smtp.user = Some("mailer".to_string());
    config.smtp.pass = Some("secret".to_string());
    config.smtp.sender = Some("shop@example.com".to_string());
    config.smtp.recipient = Some("orders@example.com".to_string());
    config
  }

  #[test]
  fn fully_configured_transport_builds() {
    assert!(MailDispatcher::from_config(&configured()).is_ok());
  }

  #[test]
  fn missing_fields_fail_fast_with_config_error() {
    let mut config = configured();
    config.smtp.host = None;
    config.smtp.pass = None;
    match MailDispatcher::from_config(&config) {
      Err(AppError::Config(msg)) => {
        assert!(msg.contains("SMTP_HOST"));
        assert!(msg.contains("SMTP_PASS"));
      }
      other => panic!("expected ConfigurationError, got {:?}", other.map(|_| ())),
    }
  }

  #[test]
  fn malformed_sender_address_is_a_config_error() {
    let mut config = configured();
    config.smtp.sender = Some("not-an-address".to_string());
    assert!(matches!(MailDispatcher::from_config(&config), Err(AppError::Config(_))));
  }

  #[tokio::test]
  async fn unreachable_transport_is_a_dispatch_error() {
    let mut config = configured();
    // Reserved TEST-NET address, nothing listens there.
    config.smtp.host = Some("192.0.2.1".to_string());
    let dispatcher = MailDispatcher::from_config(&config).unwrap();
    let body = MessageBody {
      subject: "Новый заказ №ORD-TEST".to_string(),
      html: "<p>test</p>".to_string(),
      text: "test".to_string(),
    };
    match dispatcher.send(&body, None).await {
      Err(AppError::Dispatch(_)) => {}
      other => panic!("expected DispatchError, got {:?}", other.map(|_| ())),
    }
  }
}
