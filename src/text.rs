//! Small label helpers shared by the enforcer and the translator.

/// Lowercase, ASCII-alphanumeric words joined by `_`.
/// `"FRAUD-DETECTION v2"` → `"fraud_detection_v2"`.
pub fn slugify(text: &str) -> String {
    label_words(text).join("_")
}

/// Lowercase words of a label, split on anything that is not alphanumeric.
pub fn label_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("FRAUD-DETECTION  v2"), "fraud_detection_v2");
        assert_eq!(slugify("  PCI_DSS "), "pci_dss");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn words_split_on_punctuation() {
        assert_eq!(label_words("Send e-mail (AI)"), vec!["send", "e", "mail", "ai"]);
    }
}
