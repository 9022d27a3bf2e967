//! Query-directed extractive summarization.
//!
//! Sentences are selected by relevance and then presented in source order, so a summary reads
//! as a sequence of excerpts rather than a ranked list. Output sentences are verbatim.

use std::collections::HashSet;

use crate::embedding::{EmbeddingClient, EmbeddingClientError, cosine_similarity};

use super::normalize::{strip_leading_bullets, word_count};

/// Sentences with this many words or fewer are dropped before scoring.
pub const MIN_SENTENCE_WORDS: usize = 5;

/// Query text used to steer summaries toward the persona and task.
pub fn summary_query(persona: &str, job: &str) -> String {
    format!("{persona} {job}")
}

/// Split text at whitespace that follows `.`, `?` or `!`.
///
/// No split happens after initials such as `U.S.` or `e.g.`, nor after a capitalized
/// two-letter abbreviation such as `Mr.`. Pieces are trimmed and empty pieces dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;

    for (position, &(offset, ch)) in chars.iter().enumerate() {
        if position == 0 || !ch.is_whitespace() {
            continue;
        }
        let preceding = &chars[..position];
        if !matches!(preceding[position - 1].1, '.' | '?' | '!') || is_abbreviation(preceding) {
            continue;
        }
        sentences.push(&text[start..offset]);
        start = offset + ch.len_utf8();
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .collect()
}

fn is_abbreviation(preceding: &[(usize, char)]) -> bool {
    let tail: Vec<char> = preceding
        .iter()
        .rev()
        .take(4)
        .map(|&(_, ch)| ch)
        .collect();
    let is_word = |ch: char| ch.is_alphanumeric() || ch == '_';

    // "U.S." style: word char, period, word char, terminal.
    let initials = tail.len() == 4 && is_word(tail[3]) && tail[2] == '.' && is_word(tail[1]);
    // "Mr." style: upper, lower, period.
    let title = tail.len() >= 3
        && tail[2].is_ascii_uppercase()
        && tail[1].is_ascii_lowercase()
        && tail[0] == '.';
    initials || title
}

/// Build an extractive summary of at most `max_sentences` sentences.
///
/// With a `query` vector, sentences are scored by cosine similarity to it. Without one, each
/// sentence is scored by its summed similarity to every other sentence. Sentences that differ
/// only by a leading bullet are selected once. Returns an empty string when no sentence
/// survives the length filter.
pub async fn summarize(
    client: &(dyn EmbeddingClient + Send + Sync),
    content: &str,
    max_sentences: usize,
    query: Option<&[f32]>,
) -> Result<String, EmbeddingClientError> {
    let sentences: Vec<&str> = split_sentences(content)
        .into_iter()
        .filter(|sentence| word_count(sentence) > MIN_SENTENCE_WORDS)
        .collect();
    let limit = max_sentences.min(sentences.len());
    if limit == 0 {
        return Ok(String::new());
    }

    let vectors = client
        .generate_embeddings(sentences.iter().map(|s| s.to_string()).collect())
        .await?;
    if vectors.len() != sentences.len() {
        return Err(EmbeddingClientError::InvalidResponse(format!(
            "expected {} vectors, got {}",
            sentences.len(),
            vectors.len()
        )));
    }

    let scores: Vec<f32> = match query {
        Some(query) => vectors
            .iter()
            .map(|vector| cosine_similarity(query, vector))
            .collect(),
        None => vectors
            .iter()
            .enumerate()
            .map(|(i, vector)| {
                vectors
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, other)| cosine_similarity(vector, other))
                    .sum::<f32>()
            })
            .collect(),
    };

    let mut by_score: Vec<usize> = (0..sentences.len()).collect();
    by_score.sort_by(|&left, &right| scores[right].total_cmp(&scores[left]));

    let mut seen: HashSet<&str> = HashSet::new();
    let mut selected: Vec<usize> = Vec::with_capacity(limit);
    for index in by_score {
        let cleaned = strip_leading_bullets(sentences[index]);
        if cleaned.is_empty() || !seen.insert(cleaned) {
            continue;
        }
        selected.push(index);
        if selected.len() >= limit {
            break;
        }
    }

    selected.sort_unstable();
    let mut summary = selected
        .iter()
        .map(|&index| sentences[index])
        .collect::<Vec<_>>()
        .join(" ");
    if !summary.is_empty() && !summary.ends_with(['.', '?', '!']) {
        summary.push('.');
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FixedVectors(HashMap<String, Vec<f32>>);

    #[async_trait]
    impl EmbeddingClient for FixedVectors {
        async fn generate_embeddings(
            &self,
            texts: Vec<String>,
        ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
            Ok(texts
                .iter()
                .map(|text| self.0.get(text).cloned().unwrap_or_else(|| vec![0.0, 0.0]))
                .collect())
        }
    }

    fn client(pairs: &[(&str, [f32; 2])]) -> FixedVectors {
        FixedVectors(
            pairs
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.to_vec()))
                .collect(),
        )
    }

    const S1: &str = "The old harbour fills with fishing boats at dawn.";
    const S2: &str = "Parking near the station costs a few euros daily.";
    const S3: &str = "Sunset sailing trips leave from the harbour every evening.";
    const S4: &str = "The museum keeps shorter hours during the winter months.";
    const S5: &str = "Local bakeries close early on most Sunday afternoons here.";

    #[test]
    fn splits_on_terminal_punctuation() {
        assert_eq!(
            split_sentences("We sailed. Was it fun? Yes!  Again"),
            vec!["We sailed.", "Was it fun?", "Yes!", "Again"]
        );
    }

    #[test]
    fn does_not_split_initials_or_titles() {
        assert_eq!(
            split_sentences("Mr. Smith moved to the U.S. last year. He likes it."),
            vec!["Mr. Smith moved to the U.S. last year.", "He likes it."]
        );
        assert_eq!(
            split_sentences("Bring snacks, e.g. fruit. Then go."),
            vec!["Bring snacks, e.g. fruit.", "Then go."]
        );
    }

    #[tokio::test]
    async fn selected_sentences_keep_source_order() {
        let content = [S1, S2, S3, S4, S5].join(" ");
        let client = client(&[
            (S1, [0.8, 0.6]),
            (S2, [0.0, 1.0]),
            (S3, [1.0, 0.0]),
            (S4, [0.3, 0.95]),
            (S5, [0.1, 0.99]),
        ]);

        let summary = summarize(&client, &content, 2, Some(&[1.0, 0.0]))
            .await
            .expect("summary");

        assert_eq!(summary, format!("{S1} {S3}"));
    }

    #[tokio::test]
    async fn without_query_central_sentences_win() {
        let content = [S1, S2, S3].join(" ");
        let client = client(&[(S1, [1.0, 0.0]), (S2, [0.9, 0.1]), (S3, [0.0, 1.0])]);

        let summary = summarize(&client, &content, 1, None).await.expect("summary");

        assert_eq!(summary, S2);
    }

    #[tokio::test]
    async fn short_sentences_are_never_returned() {
        let content = format!("Very short one. {S1} Tiny. {S2} Five words are too few.");
        let client = client(&[(S1, [1.0, 0.0]), (S2, [0.5, 0.5])]);

        let summary = summarize(&client, &content, 10, Some(&[1.0, 0.0]))
            .await
            .expect("summary");

        assert_eq!(summary, format!("{S1} {S2}"));
    }

    #[tokio::test]
    async fn bullet_variants_are_selected_once() {
        let bulleted = format!("\u{2022} {S3}");
        let content = format!("{bulleted} {S1} {S3}");
        let client = client(&[
            (bulleted.as_str(), [1.0, 0.0]),
            (S3, [1.0, 0.0]),
            (S1, [0.5, 0.5]),
        ]);

        let summary = summarize(&client, &content, 2, Some(&[1.0, 0.0]))
            .await
            .expect("summary");

        assert_eq!(summary, format!("{bulleted} {S1}"));
    }

    #[tokio::test]
    async fn appends_terminal_period() {
        let content = "we walked along the shore for hours and hours";
        let client = client(&[]);

        let summary = summarize(&client, content, 3, None).await.expect("summary");

        assert_eq!(summary, "we walked along the shore for hours and hours.");
    }

    #[tokio::test]
    async fn degenerate_inputs_return_empty_summary() {
        let client = client(&[]);
        assert_eq!(summarize(&client, "", 3, None).await.expect("empty"), "");
        assert_eq!(
            summarize(&client, "Too short. Also short.", 3, None)
                .await
                .expect("short"),
            ""
        );
        assert_eq!(summarize(&client, S1, 0, None).await.expect("zero"), "");
    }

    #[test]
    fn summary_query_joins_persona_and_job() {
        assert_eq!(summary_query("Planner", "Plan a trip."), "Planner Plan a trip.");
    }
}
