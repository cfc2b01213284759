//! ENS name normalization
//!
//! Writes are only accepted for names that already equal their normalized
//! form: lowercase, NFC-composed, dot-separated non-empty labels with no
//! whitespace or control characters.

use unicode_normalization::UnicodeNormalization;

/// Compute the normalized form of a name, or `None` when the name cannot be
/// normalized at all (empty string, empty label, forbidden characters).
pub fn normalize(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }

    let mut labels = Vec::new();
    for label in name.split('.') {
        if label.is_empty() {
            return None;
        }

        let label: String = label.nfc().collect::<String>().to_lowercase();
        if label
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return None;
        }

        labels.push(label);
    }

    Some(labels.join("."))
}

/// Whether a name equals its own normalized form.
pub fn is_normalized(name: &str) -> bool {
    normalize(name).as_deref() == Some(name)
}
