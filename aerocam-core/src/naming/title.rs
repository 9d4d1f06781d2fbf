//! Free-form titles: the text before the first separator, dashes as spaces.

use tracing::debug;

/// Derive a display title from free-form filename text.
///
/// Returns `None` when nothing usable remains, leaving the caller to apply
/// its unknown label.
pub fn free_form_title(filename: &str, separator: char) -> Option<String> {
    let head = match filename.split_once(separator) {
        Some((head, _)) => head,
        None => strip_extension(filename),
    };

    let spaced = head.replace('-', " ");
    let trimmed = spaced.trim();
    if trimmed.is_empty() {
        debug!("No free-form title in {:?}", filename);
        return None;
    }

    Some(capitalize_words(trimmed))
}

/// Everything before the last `.`, or the whole name when there is none.
fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) => &filename[..idx],
        None => filename,
    }
}

/// Upper-case the first character of every whitespace-delimited word.
/// Other characters are left untouched.
fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_before_separator() {
        assert_eq!(
            free_form_title("pak-tommy_2025-01-01_10-00-00.jpg", '_').as_deref(),
            Some("Pak Tommy")
        );
        assert_eq!(
            free_form_title("leyangan_cam1.png", '_').as_deref(),
            Some("Leyangan")
        );
    }

    #[test]
    fn whole_name_without_extension_when_no_separator() {
        assert_eq!(
            free_form_title("greenhouse-north.jpeg", '_').as_deref(),
            Some("Greenhouse North")
        );
        assert_eq!(free_form_title("noext", '_').as_deref(), Some("Noext"));
    }

    #[test]
    fn existing_case_is_kept() {
        assert_eq!(
            free_form_title("mcDONALD-farm_x.jpg", '_').as_deref(),
            Some("McDONALD Farm")
        );
    }

    #[test]
    fn empty_heads_yield_none() {
        assert_eq!(free_form_title("_2025-01-01_10-00-00.jpg", '_'), None);
        assert_eq!(free_form_title("---_x.jpg", '_'), None);
        assert_eq!(free_form_title(".jpg", '_'), None);
        assert_eq!(free_form_title("", '_'), None);
    }

    #[test]
    fn custom_separator() {
        assert_eq!(
            free_form_title("north-bay+2025.jpg", '+').as_deref(),
            Some("North Bay")
        );
    }

    #[test]
    fn dashes_collapse_to_single_spaces_only_per_dash() {
        assert_eq!(free_form_title("a--b_x.jpg", '_').as_deref(), Some("A  B"));
    }
}
