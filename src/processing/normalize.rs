//! Text normalization shared by every pipeline stage.

/// Ligature codepoints emitted by PDF text extraction and their ASCII replacements.
///
/// The table is part of the output format: block contents and titles are compared after this
/// substitution, so entries must not change without re-checking dedup behavior.
pub const LIGATURES: &[(char, &str)] = &[('\u{FB04}', "ff"), ('\u{FB03}', "fi"), ('\u{FB01}', "fi")];

/// Replace known ligatures, collapse every whitespace run into one space, and trim the ends.
///
/// Casing and punctuation are preserved. The function is idempotent.
pub fn normalize(text: &str) -> String {
    let mut expanded = String::with_capacity(text.len());
    for ch in text.chars() {
        match LIGATURES.iter().find(|(ligature, _)| *ligature == ch) {
            Some((_, replacement)) => expanded.push_str(replacement),
            None => expanded.push(ch),
        }
    }
    expanded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Bullet glyphs recognized at the start of list items.
pub const BULLET_GLYPHS: &[char] = &['\u{2022}', '\u{2023}', '\u{25E6}', '\u{2043}'];

/// Drop any leading run of whitespace and bullet glyphs, then trim.
pub fn strip_leading_bullets(text: &str) -> &str {
    text.trim_start_matches(|c: char| c.is_whitespace() || BULLET_GLYPHS.contains(&c))
        .trim()
}

/// Number of whitespace-delimited words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_newlines() {
        assert_eq!(normalize("  Coastal \n\n Adventures\t in  Nice  "), "Coastal Adventures in Nice");
    }

    #[test]
    fn replaces_ligatures() {
        assert_eq!(normalize("\u{FB01}ne o\u{FB03}ce"), "fine ofice");
    }

    #[test]
    fn preserves_case_and_punctuation() {
        assert_eq!(normalize("EXECUTIVE  Summary: Q3!"), "EXECUTIVE Summary: Q3!");
    }

    #[test]
    fn is_idempotent() {
        let samples = [
            "",
            "   ",
            "a\u{FB04}uent  \n text",
            "\u{2022} Bullet\r\nline",
            "already normal",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "input {sample:?}");
        }
    }

    #[test]
    fn strips_leading_bullets_only() {
        assert_eq!(strip_leading_bullets(" \u{2022}\u{2022} Pack light \u{2022} "), "Pack light \u{2022}");
        assert_eq!(strip_leading_bullets("No bullet"), "No bullet");
    }

    #[test]
    fn counts_words() {
        assert_eq!(word_count(" one  two\nthree "), 3);
        assert_eq!(word_count(""), 0);
    }
}
