//! Rewrites internal host references in product image URLs to the public
//! base URL, so clients never see container-network hostnames.

use crate::config::AppConfig;

/// Port the backend listens on inside the container network. Seeded catalog
/// data carries image URLs pointing at it.
const INTERNAL_PORT: u16 = 5000;

const INTERNAL_HOSTS: [&str; 4] = ["backend", "localhost", "127.0.0.1", "0.0.0.0"];

/// Resolves a possibly-empty image reference to a single absolute URL.
///
/// Policy, in order: missing/blank references get the configured fallback
/// image; known internal-host prefixes are rewritten to the public base URL
/// (first match wins); absolute URLs pass through unchanged; relative paths
/// are prefixed with the public base URL.
pub fn normalize_image_url(image_url: Option<&str>, config: &AppConfig) -> String {
  let trimmed = image_url.unwrap_or("").trim();
  if trimmed.is_empty() {
    return config.fallback_image_url.clone();
  }

  let mut patterns = Vec::with_capacity(INTERNAL_HOSTS.len() * 2);
  for host in INTERNAL_HOSTS {
    patterns.push(format!("http://{}:{}", host, INTERNAL_PORT));
    if config.server_port != INTERNAL_PORT {
      patterns.push(format!("http://{}:{}", host, config.server_port));
    }
  }

  for pattern in &patterns {
    // Patterns are pure ASCII, so the prefix is compared byte-for-byte.
    let matches = trimmed
      .get(..pattern.len())
      .is_some_and(|prefix| prefix.eq_ignore_ascii_case(pattern));
    if matches {
      let rest = &trimmed[pattern.len()..];
      return format!("{}{}", config.public_url, rest);
    }
  }

  if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
    return trimmed.to_string();
  }
  if trimmed.starts_with('/') {
    return format!("{}{}", config.public_url, trimmed);
  }
  format!("{}/{}", config.public_url, trimmed)
}
