//! Serializable pipeline report.

use std::path::Path;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, macros::format_description};

use crate::processing::PipelineError;

/// Run description echoed at the top of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Document identifiers requested for the run, in input order.
    pub input_documents: Vec<String>,
    /// Persona description.
    pub persona: String,
    /// Task description.
    pub job_to_be_done: String,
    /// UTC time the report was assembled, as `YYYY-MM-DD HH:MM:SS`.
    pub processing_timestamp: String,
}

/// One of the globally top-ranked sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSection {
    /// Source document identifier.
    pub document: String,
    /// Section title of the ranked block.
    pub section_title: String,
    /// 1-based position in the global ranking.
    pub importance_rank: usize,
    /// Page the section is anchored to.
    pub page_number: usize,
}

/// Extractive summary of a top-ranked section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubSectionAnalysis {
    /// Source document identifier.
    pub document: String,
    /// Selected sentences in source order.
    pub refined_text: String,
    /// Page the section is anchored to.
    pub page_number: usize,
}

/// Complete output of a digest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestReport {
    /// Run description.
    pub metadata: ReportMetadata,
    /// Top sections ordered by importance.
    pub extracted_sections: Vec<ExtractedSection>,
    /// Section summaries ordered by document then page.
    pub sub_section_analysis: Vec<SubSectionAnalysis>,
}

impl DigestReport {
    /// Serialize the report as pretty JSON to `path`, creating parent directories.
    pub fn write_report(&self, path: &Path) -> Result<(), PipelineError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Report written");
        Ok(())
    }
}

/// Format a timestamp the way reports carry it.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    at.format(&format).unwrap_or_else(|_| at.to_string())
}

/// Current UTC time in report format.
pub fn current_timestamp() -> String {
    format_timestamp(OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample() -> DigestReport {
        DigestReport {
            metadata: ReportMetadata {
                input_documents: vec!["a.pdf".into()],
                persona: "Travel Planner".into(),
                job_to_be_done: "Plan a trip".into(),
                processing_timestamp: "2025-07-10 09:05:03".into(),
            },
            extracted_sections: vec![ExtractedSection {
                document: "a.pdf".into(),
                section_title: "Coastal Adventures".into(),
                importance_rank: 1,
                page_number: 2,
            }],
            sub_section_analysis: vec![SubSectionAnalysis {
                document: "a.pdf".into(),
                refined_text: "Kayak tours leave from the old harbour each morning.".into(),
                page_number: 2,
            }],
        }
    }

    #[test]
    fn timestamps_use_fixed_layout() {
        assert_eq!(
            format_timestamp(datetime!(2025-07-10 09:05:03 UTC)),
            "2025-07-10 09:05:03"
        );
        assert_eq!(current_timestamp().len(), "YYYY-MM-DD HH:MM:SS".len());
    }

    #[test]
    fn serializes_expected_field_names() {
        let value = serde_json::to_value(sample()).expect("json");
        assert_eq!(value["metadata"]["job_to_be_done"], "Plan a trip");
        assert_eq!(value["extracted_sections"][0]["importance_rank"], 1);
        assert_eq!(value["sub_section_analysis"][0]["page_number"], 2);
    }

    #[test]
    fn writes_report_into_new_directory() {
        let dir = std::env::temp_dir().join(format!("persona-digest-report-{}", std::process::id()));
        let path = dir.join("nested").join("result.json");

        sample().write_report(&path).expect("write");
        let raw = std::fs::read_to_string(&path).expect("read back");
        let parsed: DigestReport = serde_json::from_str(&raw).expect("parse");
        assert_eq!(parsed, sample());

        std::fs::remove_dir_all(&dir).ok();
    }
}
