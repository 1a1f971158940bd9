use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// SMTP transport settings. Every field except `secure` and the timeouts is
/// optional at load time; the mail dispatcher validates the full set eagerly
/// when it is constructed, so a half-configured transport degrades order
/// notification instead of preventing startup.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
  pub host: Option<String>,
  pub port: Option<u16>,
  pub secure: bool,
  pub user: Option<String>,
  pub pass: Option<String>,
  pub sender: Option<String>,
  pub recipient: Option<String>,
  /// Socket-level timeout applied to the SMTP connection.
  pub socket_timeout: Duration,
  /// Overall deadline for one send, covering connect + greeting + transfer.
  pub send_deadline: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,

  /// Public base URL internal image hosts are rewritten to.
  pub public_url: String,
  /// Returned for products/items with no image reference at all.
  pub fallback_image_url: String,

  pub jwt_secret: String,
  pub jwt_expires_secs: u64,

  pub smtp: SmtpConfig,
  /// When set, order notifications carry a spreadsheet attachment.
  pub order_xlsx_attachment: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    let opt_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "5000".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;

    let public_url = get_env("PUBLIC_URL")
      .unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port))
      .trim_end_matches('/')
      .to_string();
    let fallback_image_url =
      opt_env("FALLBACK_IMAGE_URL").unwrap_or_else(|| format!("{}/images/default-product.jpg", public_url));

    let jwt_secret = get_env("JWT_SECRET")?;
    let jwt_expires_secs = get_env("JWT_EXPIRES_SECS")
      .unwrap_or_else(|_| "86400".to_string())
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid JWT_EXPIRES_SECS: {}", e)))?;

    let smtp_port = match opt_env("SMTP_PORT") {
      Some(raw) => Some(
        raw
          .parse::<u16>()
          .map_err(|e| AppError::Config(format!("Invalid SMTP_PORT: {}", e)))?,
      ),
      None => None,
    };
    let smtp_timeout_ms = get_env("SMTP_TIMEOUT_MS")
      .unwrap_or_else(|_| "10000".to_string())
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid SMTP_TIMEOUT_MS: {}", e)))?;

    let smtp = SmtpConfig {
      host: opt_env("SMTP_HOST"),
      port: smtp_port,
      secure: opt_env("SMTP_SECURE").map(|v| v == "true" || v == "1").unwrap_or(false),
      user: opt_env("SMTP_USER"),
      pass: opt_env("SMTP_PASS"),
      sender: opt_env("EMAIL_FROM"),
      recipient: opt_env("EMAIL_TO"),
      socket_timeout: Duration::from_millis(smtp_timeout_ms),
      send_deadline: Duration::from_millis(smtp_timeout_ms.saturating_mul(3)),
    };

    let order_xlsx_attachment = get_env("ORDER_XLSX_ATTACHMENT")
      .unwrap_or_else(|_| "true".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid ORDER_XLSX_ATTACHMENT value: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      public_url,
      fallback_image_url,
      jwt_secret,
      jwt_expires_secs,
      smtp,
      order_xlsx_attachment,
    })
  }
}

impl AppConfig {
  /// Config with every network-facing setting stubbed out, for unit tests.
  #[doc(hidden)]
  pub fn for_tests() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 5000,
      database_url: "postgres://localhost/storefront_test".to_string(),
      public_url: "https://shop.example.com".to_string(),
      fallback_image_url: "https://shop.example.com/images/default-product.jpg".to_string(),
      jwt_secret: "test-secret".to_string(),
      jwt_expires_secs: 3600,
      smtp: SmtpConfig {
        host: None,
        port: None,
        secure: false,
        user: None,
        pass: None,
        sender: None,
        recipient: None,
        socket_timeout: Duration::from_millis(100),
        send_deadline: Duration::from_millis(300),
      },
      order_xlsx_attachment: true,
    }
  }
}
