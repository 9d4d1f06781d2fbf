use std::collections::BTreeMap;

/// Leading single-digit owner id, as written by the first generation of
/// capture clients (`1_...`, `2-...`, `1.jpg`).
///
/// The digit must be followed by `_`, `-`, `.`, whitespace, or nothing.
pub fn leading_owner_digit(filename: &str) -> Option<u8> {
    let mut chars = filename.chars();
    let digit = chars.next()?.to_digit(10)?;

    match chars.next() {
        None => {}
        Some('_' | '-' | '.') => {}
        Some(ch) if ch.is_whitespace() => {}
        Some(_) => return None,
    }

    u8::try_from(digit).ok()
}

/// Default numeric owner table.
pub fn default_numeric_labels() -> BTreeMap<u8, String> {
    BTreeMap::from([
        (1, "Leyangan".to_string()),
        (2, "Pak Tommy".to_string()),
    ])
}
