//! Timestamp replacement policy.

use chrono::format::{Item, StrftimeItems};
use chrono::Local;

/// Renders the current local time with a user-supplied `strftime` format
/// string, e.g. `%b %d %H:%M:%S`.
#[derive(Debug, Clone)]
pub struct TimestampReplacer {
    format: String,
}

impl TimestampReplacer {
    /// Create a new timestamp replacer. The format must have passed
    /// [`is_valid_format`] at build time; rendering an invalid format would
    /// panic inside chrono's `Display`.
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
        }
    }

    pub fn render(&mut self) -> String {
        Local::now().format(&self.format).to_string()
    }
}

/// Whether `format` is a well-formed `strftime` pattern.
pub fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_with_format() {
        let mut r = TimestampReplacer::new("%Y-%m-%d");
        let s = r.render();

        // yyyy-mm-dd
        assert_eq!(s.len(), 10);
        assert_eq!(s.matches('-').count(), 2);
    }

    #[test]
    fn test_format_validation() {
        assert!(is_valid_format("%b %d %H:%M:%S"));
        assert!(is_valid_format("plain text"));
        assert!(!is_valid_format("%Q is not a thing"));
    }
}
