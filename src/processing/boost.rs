//! Keyword boosting policy applied on top of semantic similarity.
//!
//! The policy is data, not control flow: a [`BoostTable`] lists additive keyword weights and
//! "headline" rules, and can be loaded from JSON to retarget the ranking at another domain.
//! The built-in table is tuned for group leisure-travel planning; it is not a general policy.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::normalize::BULLET_GLYPHS;

static TITLE_NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let glyphs: String = BULLET_GLYPHS.iter().collect();
    Regex::new(&format!(r"[\s{glyphs}]+")).unwrap()
});

/// Errors raised while loading a boost table from disk.
#[derive(Debug, Error)]
pub enum BoostTableError {
    /// The table file could not be read.
    #[error("Failed to read boost table {path}: {source}")]
    Io {
        /// Path of the table file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The table file is not valid JSON for a boost table.
    #[error("Invalid boost table {path}: {source}")]
    Parse {
        /// Path of the table file.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A headline prefix is not a valid regular expression fragment.
    #[error("Invalid headline prefix '{prefix}': {source}")]
    Pattern {
        /// Offending prefix.
        prefix: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

/// Additive weight applied when `keyword` occurs in a block title or document name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordBoost {
    /// Lower-case substring to look for.
    pub keyword: String,
    /// Signed score adjustment.
    pub boost: f32,
}

/// Bonus for blocks that read as the top-level summary of a themed document.
///
/// Applies when the title contains any of `title_keywords` and the document name contains
/// `document_keyword`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineBoost {
    /// Lower-case substrings, any of which must occur in the title.
    pub title_keywords: Vec<String>,
    /// Lower-case substring that must occur in the document name.
    pub document_keyword: String,
    /// Signed score adjustment.
    pub bonus: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BoostTableData {
    keywords: Vec<KeywordBoost>,
    headline_prefixes: Vec<String>,
    headline_boosts: Vec<HeadlineBoost>,
}

/// Complete boosting policy.
#[derive(Debug, Clone)]
pub struct BoostTable {
    data: BoostTableData,
    headline_re: Option<Regex>,
}

impl BoostTable {
    /// Build a table, compiling the headline prefixes.
    pub fn new(
        keywords: Vec<KeywordBoost>,
        headline_prefixes: Vec<String>,
        headline_boosts: Vec<HeadlineBoost>,
    ) -> Result<Self, BoostTableError> {
        Self::from_data(BoostTableData {
            keywords,
            headline_prefixes,
            headline_boosts,
        })
    }

    fn from_data(mut data: BoostTableData) -> Result<Self, BoostTableError> {
        // Titles and document names are compared lower-cased.
        for entry in &mut data.keywords {
            entry.keyword = entry.keyword.to_lowercase();
        }
        for rule in &mut data.headline_boosts {
            for keyword in &mut rule.title_keywords {
                *keyword = keyword.to_lowercase();
            }
            rule.document_keyword = rule.document_keyword.to_lowercase();
        }

        for prefix in &data.headline_prefixes {
            Regex::new(prefix).map_err(|source| BoostTableError::Pattern {
                prefix: prefix.clone(),
                source,
            })?;
        }
        let headline_re = if data.headline_prefixes.is_empty() {
            None
        } else {
            let alternation = data.headline_prefixes.join("|");
            Some(
                Regex::new(&format!("^(?i:{alternation})")).map_err(|source| {
                    BoostTableError::Pattern {
                        prefix: alternation.clone(),
                        source,
                    }
                })?,
            )
        };
        Ok(Self { data, headline_re })
    }

    /// A table that applies no adjustments.
    pub fn empty() -> Self {
        Self {
            data: BoostTableData {
                keywords: Vec::new(),
                headline_prefixes: Vec::new(),
                headline_boosts: Vec::new(),
            },
            headline_re: None,
        }
    }

    /// Parse a table from its JSON representation.
    pub fn from_json(raw: &str, origin: &str) -> Result<Self, BoostTableError> {
        let data: BoostTableData =
            serde_json::from_str(raw).map_err(|source| BoostTableError::Parse {
                path: origin.to_string(),
                source,
            })?;
        Self::from_data(data)
    }

    /// Load a table from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, BoostTableError> {
        let origin = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| BoostTableError::Io {
            path: origin.clone(),
            source,
        })?;
        Self::from_json(&raw, &origin)
    }

    /// Serialize the table to pretty JSON, the format accepted by [`BoostTable::from_json`].
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.data)
    }

    /// Keyword weights in application order.
    pub fn keywords(&self) -> &[KeywordBoost] {
        &self.data.keywords
    }

    /// Headline rules in priority order.
    pub fn headline_boosts(&self) -> &[HeadlineBoost] {
        &self.data.headline_boosts
    }

    /// Total adjustment for a block with `title` from `document`.
    ///
    /// Every matching keyword applies. At most one headline rule applies: the first whose
    /// keywords match, and only when the title opens with a headline prefix.
    pub fn adjustment(&self, title: &str, document: &str) -> f32 {
        let title = clean_title(title);
        let document = document.to_lowercase();

        let mut total = 0.0_f32;
        for entry in &self.data.keywords {
            if title.contains(&entry.keyword) || document.contains(&entry.keyword) {
                total += entry.boost;
            }
        }

        if self
            .headline_re
            .as_ref()
            .is_some_and(|headline| headline.is_match(&title))
        {
            let matched = self.data.headline_boosts.iter().find(|rule| {
                rule.title_keywords
                    .iter()
                    .any(|keyword| title.contains(keyword.as_str()))
                    && document.contains(&rule.document_keyword)
            });
            if let Some(rule) = matched {
                total += rule.bonus;
            }
        }

        total
    }
}

impl Default for BoostTable {
    /// Built-in policy for group leisure-travel planning.
    fn default() -> Self {
        let keywords = [
            ("cities", 0.08),
            ("things to do", 0.10),
            ("activities", 0.10),
            ("experiences", 0.09),
            ("coastal adventures", 0.12),
            ("nightlife and entertainment", 0.15),
            ("restaurants", 0.07),
            ("cuisine", 0.07),
            ("culinary experiences", 0.09),
            ("wine tasting", 0.06),
            ("packing", 0.05),
            ("tips and tricks", 0.06),
            ("travel tips", 0.06),
            ("water sports", 0.12),
            ("hotels", 0.03),
            ("shopping and markets", 0.04),
            ("outdoor activities", 0.08),
            ("family-friendly", -0.10),
            ("history", -0.05),
            ("traditions and culture", -0.03),
            ("conclusion", -0.02),
            ("introduction", -0.01),
        ]
        .into_iter()
        .map(|(keyword, boost)| KeywordBoost {
            keyword: keyword.to_string(),
            boost,
        })
        .collect();

        let headline_prefixes = [
            "comprehensive",
            "ultimate",
            "a culinary journey",
            "a historical journey",
            "a comprehensive guide",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        let headline_boosts = [
            (&["cities"][..], "cities", 0.15),
            (&["things to do", "activities"][..], "things to do", 0.15),
            (&["cuisine"][..], "cuisine", 0.10),
            (&["restaurants and hotels"][..], "restaurants and hotels", 0.08),
            (&["tips and tricks"][..], "tips and tricks", 0.10),
            (&["history"][..], "history", 0.01),
            (&["traditions and culture"][..], "traditions and culture", 0.01),
        ]
        .into_iter()
        .map(|(title_keywords, document_keyword, bonus)| HeadlineBoost {
            title_keywords: title_keywords.iter().map(|k| k.to_string()).collect(),
            document_keyword: document_keyword.to_string(),
            bonus,
        })
        .collect();

        Self::new(keywords, headline_prefixes, headline_boosts)
            .expect("built-in boost table is valid")
    }
}

/// Lower-case the title and fold whitespace and bullet runs into single spaces.
fn clean_title(title: &str) -> String {
    TITLE_NOISE_RE
        .replace_all(&title.to_lowercase(), " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn default_table_has_expected_shape() {
        let table = BoostTable::default();
        assert_eq!(table.keywords().len(), 22);
        assert_eq!(table.headline_boosts().len(), 7);
    }

    #[test]
    fn keywords_match_title_or_document() {
        let table = BoostTable::default();
        approx(table.adjustment("Nightlife and Entertainment Guide", "nightlife.pdf"), 0.15);
        approx(table.adjustment("History of the Region", "nightlife.pdf"), -0.05);
        approx(table.adjustment("Overview", "South of France - Cities.pdf"), 0.08);
    }

    #[test]
    fn matching_keywords_accumulate() {
        let table = BoostTable::default();
        // "outdoor activities" and "activities" both match.
        approx(table.adjustment("Outdoor Activities", "guide.pdf"), 0.18);
    }

    #[test]
    fn bullets_and_spacing_are_ignored_in_titles() {
        let table = BoostTable::default();
        approx(table.adjustment("\u{2022}  Water\n Sports", "guide.pdf"), 0.12);
    }

    #[test]
    fn headline_bonus_requires_prefix_and_shared_domain() {
        let table = BoostTable::default();
        approx(
            table.adjustment(
                "Comprehensive Guide to Major Cities in the South of France",
                "South of France - Cities.pdf",
            ),
            0.08 + 0.15,
        );
        // Same title, unrelated document: keyword boost only.
        approx(
            table.adjustment(
                "Comprehensive Guide to Major Cities in the South of France",
                "guide.pdf",
            ),
            0.08,
        );
        // Prefix must open the title.
        approx(
            table.adjustment("Our Comprehensive Cities Guide", "Cities.pdf"),
            0.08,
        );
    }

    #[test]
    fn only_first_matching_headline_rule_applies() {
        let table = BoostTable::default();
        let title = "Ultimate Guide to Cities and Cuisine";
        let document = "cities and cuisine.pdf";
        // cities 0.08 + cuisine 0.07 + first headline rule (cities) 0.15.
        approx(table.adjustment(title, document), 0.30);
    }

    #[test]
    fn tables_round_trip_through_json() {
        let table = BoostTable::new(
            vec![KeywordBoost {
                keyword: "ferry".into(),
                boost: 0.2,
            }],
            vec!["complete".into()],
            vec![HeadlineBoost {
                title_keywords: vec!["islands".into()],
                document_keyword: "islands".into(),
                bonus: 0.1,
            }],
        )
        .expect("table");
        let json = table.to_json().expect("json");
        let reloaded = BoostTable::from_json(&json, "inline").expect("reload");
        approx(reloaded.adjustment("Complete Islands Ferry Guide", "islands.pdf"), 0.3);
    }

    #[test]
    fn loaded_entries_match_regardless_of_case() {
        let table = BoostTable::from_json(
            r#"{
                "keywords": [{"keyword": "Nightlife", "boost": 0.2}],
                "headline_prefixes": ["Complete"],
                "headline_boosts": [
                    {"title_keywords": ["Islands"], "document_keyword": "Islands", "bonus": 0.1}
                ]
            }"#,
            "inline",
        )
        .expect("table");

        assert_eq!(table.keywords()[0].keyword, "nightlife");
        approx(table.adjustment("NIGHTLIFE ON THE COAST", "guide.pdf"), 0.2);
        approx(table.adjustment("Complete Islands Tour", "Islands.pdf"), 0.1);
    }

    #[test]
    fn invalid_tables_are_rejected() {
        assert!(matches!(
            BoostTable::from_json("{\"keywords\": 3}", "inline"),
            Err(BoostTableError::Parse { .. })
        ));
        assert!(matches!(
            BoostTable::new(Vec::new(), vec!["(unclosed".into()], Vec::new()),
            Err(BoostTableError::Pattern { .. })
        ));
        assert!(matches!(
            BoostTable::from_file(Path::new("/no/such/boosts.json")),
            Err(BoostTableError::Io { .. })
        ));
    }

    #[test]
    fn empty_table_is_neutral() {
        approx(BoostTable::empty().adjustment("Nightlife", "nightlife.pdf"), 0.0);
    }
}
