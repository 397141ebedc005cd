//! Layout A prints the masked card reference inline with the description.
//! Everything from the first masked run onward moves to the reference field.

use std::sync::LazyLock;

use regex::Regex;

static MASKED_CARD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*{4,}\d+").expect("valid masked card regex"));

/// Split `text` into `(description, reference)` at the first masked run.
pub fn split_masked_reference(text: &str) -> (String, String) {
    match MASKED_CARD.find(text) {
        Some(m) => (
            text[..m.start()].trim().to_string(),
            text[m.start()..].trim().to_string(),
        ),
        None => (text.trim().to_string(), String::new()),
    }
}

/// Re-run the split after more text was appended to a row.
pub fn rejoin_and_split(description: &str, reference: &str, tail: &str) -> (String, String) {
    let joined = [description, reference, tail]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    split_masked_reference(&joined)
}
