//! Section segmentation: raw per-page text in, titled content blocks out.
//!
//! The first block of every document is the whole document itself, kept as a relevance fallback.
//! Finer blocks are opened at heading lines and may span page breaks; a block only survives when
//! it carries more than [`MIN_BLOCK_WORDS`] words. Titles that are implausibly long for a heading
//! are replaced, and blocks with identical content are collapsed to their first occurrence.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use super::headings::is_heading;
use super::normalize::{normalize, word_count};
use super::types::ContentBlock;

/// A finer block must contain strictly more words than this to be kept.
pub const MIN_BLOCK_WORDS: usize = 20;

const LONG_TITLE_WORDS: usize = 15;
const LONG_TITLE_CONTENT_WORDS: usize = 50;
const UNTITLED_DOCUMENT: &str = "Untitled Document";

/// Block under construction while walking the pages.
struct OpenBlock<'a> {
    title: Option<String>,
    start_page: usize,
    lines: Vec<&'a str>,
}

impl<'a> OpenBlock<'a> {
    fn empty() -> Self {
        Self {
            title: None,
            start_page: 1,
            lines: Vec::new(),
        }
    }

    fn starting_at(heading: &'a str, page: usize) -> Self {
        Self {
            title: Some(normalize(heading)),
            start_page: page,
            lines: vec![heading],
        }
    }

    /// Whether `heading` should open a new block rather than continue this one.
    fn is_split_by(&self, heading: &str) -> bool {
        self.title
            .as_deref()
            .is_none_or(|title| !is_near_duplicate(title, heading))
    }

    fn push(&mut self, line: &'a str, page: usize) {
        if self.lines.is_empty() && self.title.is_none() {
            self.start_page = page;
        }
        self.lines.push(line);
    }

    /// Finish the block, returning it only when it passes the minimum-content gate.
    fn close(&self, document: &str) -> Option<ContentBlock> {
        let content = normalize(&self.lines.join("\n"));
        if word_count(&content) <= MIN_BLOCK_WORDS {
            tracing::trace!(
                document,
                page = self.start_page,
                words = word_count(&content),
                "Discarding undersized block"
            );
            return None;
        }
        Some(ContentBlock {
            document: document.to_string(),
            page_number: self.start_page,
            section_title: self
                .title
                .clone()
                .unwrap_or_else(|| ContentBlock::fallback_title(self.start_page)),
            content,
        })
    }
}

/// Case-insensitive equality or containment in either direction.
fn is_near_duplicate(title: &str, line: &str) -> bool {
    let title = title.to_lowercase();
    let line = normalize(line).to_lowercase();
    title == line || title.contains(&line) || line.contains(&title)
}

fn page_lines(page: &str) -> Vec<&str> {
    page.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Split one document's pages into content blocks.
///
/// Returns an empty list only when the document has no extractable text.
pub fn segment_document(document: &str, pages: &[String]) -> Vec<ContentBlock> {
    if pages.is_empty() {
        return Vec::new();
    }

    let mut blocks = vec![whole_document_block(document, pages)];

    let mut open = OpenBlock::empty();
    for (index, raw_page) in pages.iter().enumerate() {
        let page = index + 1;
        let mut lines = page_lines(raw_page);

        // A heading at the top of a new page may end a block that spans the break.
        if index > 0 && !open.lines.is_empty() {
            if let Some(&first) = lines.first() {
                if is_heading(first) && open.is_split_by(first) {
                    if let Some(block) = open.close(document) {
                        blocks.push(block);
                        open = OpenBlock::starting_at(first, page);
                        lines.remove(0);
                    }
                }
            }
        }

        for line in lines {
            if !is_heading(line) {
                open.push(line, page);
                continue;
            }
            if open.title.is_some() && open.is_split_by(line) {
                if let Some(block) = open.close(document) {
                    blocks.push(block);
                }
                open = OpenBlock::starting_at(line, page);
            } else {
                open.push(line, page);
                if open.title.is_none() {
                    open.title = Some(normalize(line));
                    open.start_page = page;
                }
            }
        }
    }

    if !open.lines.is_empty() {
        if let Some(block) = open.close(document) {
            blocks.push(block);
        }
    }

    let blocks = finalize_blocks(blocks);
    if !blocks.is_empty() {
        tracing::debug!(document, blocks = blocks.len(), "Segmented document");
        return blocks;
    }

    tracing::debug!(document, "No sections found; falling back to one block per page");
    per_page_blocks(document, pages)
}

fn whole_document_block(document: &str, pages: &[String]) -> ContentBlock {
    let title = pages
        .first()
        .and_then(|page| page_lines(page).first().map(|line| normalize(line)))
        .unwrap_or_else(|| UNTITLED_DOCUMENT.to_string());
    ContentBlock {
        document: document.to_string(),
        page_number: 1,
        section_title: title,
        content: normalize(&pages.join("\n")),
    }
}

/// Rewrite implausible titles, drop empty blocks, and dedupe by content (first wins).
fn finalize_blocks(blocks: Vec<ContentBlock>) -> Vec<ContentBlock> {
    let mut seen = HashSet::new();
    let mut finalized = Vec::with_capacity(blocks.len());

    for block in blocks {
        let content = normalize(&block.content);
        if content.is_empty() {
            continue;
        }
        let mut section_title = normalize(&block.section_title);
        if word_count(&section_title) > LONG_TITLE_WORDS
            && word_count(&content) > LONG_TITLE_CONTENT_WORDS
        {
            section_title = ContentBlock::fallback_title(block.page_number);
        }
        if !seen.insert(content_hash(&content)) {
            tracing::trace!(document = %block.document, page = block.page_number, "Dropping duplicate block");
            continue;
        }
        finalized.push(ContentBlock {
            section_title,
            content,
            ..block
        });
    }

    finalized
}

fn per_page_blocks(document: &str, pages: &[String]) -> Vec<ContentBlock> {
    pages
        .iter()
        .enumerate()
        .filter_map(|(index, raw_page)| {
            let content = normalize(raw_page);
            (!content.is_empty()).then(|| ContentBlock {
                document: document.to_string(),
                page_number: index + 1,
                section_title: ContentBlock::fallback_title(index + 1),
                content,
            })
        })
        .collect()
}

fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
