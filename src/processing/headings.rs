//! Line-level heading detection.
//!
//! Classification is an ordered list of [`HeadingRule`]s. Each rule either decides the verdict
//! for a line or passes it on to the next rule; the first decision wins and a line no rule claims
//! is body text. Rejection rules come first so that noise never reaches the acceptance rules.

use std::sync::LazyLock;

use regex::Regex;

use super::normalize::{BULLET_GLYPHS, normalize, word_count};

const MIN_HEADING_CHARS: usize = 5;
const MAX_HEADING_CHARS: usize = 100;
const MAX_TITLE_CASE_WORDS: usize = 15;

const ALL_CAPS_STOPLIST: &[&str] = &["introduction", "conclusion", "references", "appendix"];
const TITLE_CASE_STOPLIST: &[&str] = &["chapter", "part", "section"];

static PAGE_REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(page|source)\s*\d+\b").unwrap());
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{4}\b").unwrap());
static ENUMERATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([IVXLCDM]+\.|\d+(\.\d+)*\.|[A-Z]\.)\s+[A-Z]").unwrap()
});
static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| {
    let glyphs: String = BULLET_GLYPHS.iter().collect();
    Regex::new(&format!(r"^\s*[{glyphs}]\s+[A-Z]")).unwrap()
});

/// One step of the heading decision list.
pub struct HeadingRule {
    /// Short identifier used in logs and tests.
    pub name: &'static str,
    /// What the rule is looking for.
    pub rationale: &'static str,
    /// `Some(verdict)` when the rule decides, `None` to defer to the next rule.
    pub decide: fn(&str) -> Option<bool>,
}

/// Ordered heading rules; order is significant.
pub const HEADING_RULES: &[HeadingRule] = &[
    HeadingRule {
        name: "length",
        rationale: "headings are between 5 and 100 characters",
        decide: reject_out_of_bounds_length,
    },
    HeadingRule {
        name: "page-reference",
        rationale: "page or source number references are running headers",
        decide: reject_page_reference,
    },
    HeadingRule {
        name: "currency",
        rationale: "lines opening with a currency marker are prices or figures",
        decide: reject_currency_marker,
    },
    HeadingRule {
        name: "year",
        rationale: "a bare four-digit token marks dates and citations",
        decide: reject_year_token,
    },
    HeadingRule {
        name: "all-caps",
        rationale: "multi-word upper-case lines are section titles",
        decide: accept_all_caps,
    },
    HeadingRule {
        name: "enumerated",
        rationale: "roman, numeric or letter enumerators followed by a capitalized word",
        decide: accept_enumerated,
    },
    HeadingRule {
        name: "title-case",
        rationale: "short title-cased lines without terminal punctuation",
        decide: accept_title_case,
    },
    HeadingRule {
        name: "bullet",
        rationale: "bulleted capitalized phrases of more than one word",
        decide: accept_bullet,
    },
];

/// Whether `line` reads as a section heading.
pub fn is_heading(line: &str) -> bool {
    deciding_rule(line).is_some_and(|(_, verdict)| verdict)
}

/// The rule that decided `line` and its verdict, or `None` when no rule applies.
pub fn deciding_rule(line: &str) -> Option<(&'static HeadingRule, bool)> {
    let line = normalize(line);
    HEADING_RULES
        .iter()
        .find_map(|rule| (rule.decide)(&line).map(|verdict| (rule, verdict)))
}

fn reject_out_of_bounds_length(line: &str) -> Option<bool> {
    let chars = line.chars().count();
    (!(MIN_HEADING_CHARS..=MAX_HEADING_CHARS).contains(&chars)).then_some(false)
}

fn reject_page_reference(line: &str) -> Option<bool> {
    PAGE_REFERENCE_RE.is_match(line).then_some(false)
}

fn reject_currency_marker(line: &str) -> Option<bool> {
    line.starts_with('$').then_some(false)
}

fn reject_year_token(line: &str) -> Option<bool> {
    YEAR_RE.is_match(line).then_some(false)
}

fn accept_all_caps(line: &str) -> Option<bool> {
    if !is_upper(line) || word_count(line) <= 1 {
        return None;
    }
    Some(!ALL_CAPS_STOPLIST.contains(&line.to_lowercase().as_str()))
}

fn accept_enumerated(line: &str) -> Option<bool> {
    ENUMERATED_RE.is_match(line).then_some(true)
}

fn accept_title_case(line: &str) -> Option<bool> {
    if !is_title(line)
        || word_count(line) >= MAX_TITLE_CASE_WORDS
        || line.ends_with(['.', '?', '!'])
    {
        return None;
    }
    Some(!TITLE_CASE_STOPLIST.contains(&line.to_lowercase().as_str()))
}

fn accept_bullet(line: &str) -> Option<bool> {
    (BULLET_RE.is_match(line) && word_count(line) > 1).then_some(true)
}

/// At least one cased character and no lower-case characters.
fn is_upper(text: &str) -> bool {
    let mut cased = false;
    for ch in text.chars() {
        if ch.is_lowercase() {
            return false;
        }
        if ch.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Every cased run starts with an upper-case character followed only by lower-case ones.
fn is_title(text: &str) -> bool {
    let mut cased = false;
    let mut previous_cased = false;
    for ch in text.chars() {
        if ch.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else if ch.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else {
            previous_cased = false;
        }
    }
    cased
}
