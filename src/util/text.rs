//! Text normalization for case/accent-insensitive matching.

/// Normalizes a string for the search shadow fields: trim, lowercase, and
/// fold `ё` to `е` so queries match regardless of which spelling was typed.
pub fn normalize_search_text(s: &str) -> String {
  s.trim().to_lowercase().replace('ё', "е")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn trims_and_lowercases() {
    assert_eq!(normalize_search_text("  Фильтр ГЕЙЗЕР  "), "фильтр гейзер");
  }

  #[test]
  fn folds_yo_to_ye() {
    assert_eq!(normalize_search_text("Ёлка зелёная"), "елка зеленая");
  }

  #[test]
  fn empty_stays_empty() {
    assert_eq!(normalize_search_text("   "), "");
  }
}
