use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_INPUT_DIR: &str = "data/input";
const DEFAULT_OUTPUT_FILE: &str = "output/result.json";
const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";
const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_TOP_SECTIONS: usize = 5;
const DEFAULT_SUMMARY_SENTENCES: usize = 7;

/// Persona used when the run input omits one.
pub const DEFAULT_PERSONA: &str = "General Analyst";
/// Job description used when the run input omits one.
pub const DEFAULT_JOB: &str = "Extract key information from documents.";
/// File name of the per-run input configuration inside the input directory.
pub const RUN_INPUT_FILE: &str = "input_config.json";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the digest pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the input documents and `input_config.json`.
    pub input_dir: PathBuf,
    /// Destination of the JSON report.
    pub output_file: PathBuf,
    /// Number of globally top-ranked sections carried into the report.
    pub top_sections: usize,
    /// Maximum sentence count of each refined summary.
    pub summary_sentences: usize,
    /// Embedding provider used to generate vector representations.
    pub embedding_provider: EmbeddingProvider,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Dimensionality of vectors produced by the hashed provider.
    pub embedding_dimension: usize,
    /// Base URL of the Ollama runtime.
    pub ollama_url: String,
    /// Optional JSON file replacing the built-in boost table.
    pub boost_table_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            top_sections: DEFAULT_TOP_SECTIONS,
            summary_sentences: DEFAULT_SUMMARY_SENTENCES,
            embedding_provider: EmbeddingProvider::Hashed,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            boost_table_path: None,
        }
    }
}

/// Supported embedding backends for the pipeline.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Deterministic in-process hashing; needs no model download.
    Hashed,
    /// Local Ollama runtime.
    Ollama,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            input_dir: load_env_optional("DIGEST_INPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.input_dir),
            output_file: load_env_optional("DIGEST_OUTPUT_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_file),
            top_sections: parse_optional("DIGEST_TOP_SECTIONS")?.unwrap_or(defaults.top_sections),
            summary_sentences: parse_optional("DIGEST_SUMMARY_SENTENCES")?
                .unwrap_or(defaults.summary_sentences),
            embedding_provider: load_env_optional("EMBEDDING_PROVIDER")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|()| ConfigError::InvalidValue("EMBEDDING_PROVIDER".to_string()))
                })
                .transpose()?
                .unwrap_or(defaults.embedding_provider),
            embedding_model: load_env_optional("EMBEDDING_MODEL")
                .unwrap_or(defaults.embedding_model),
            embedding_dimension: parse_optional("EMBEDDING_DIMENSION")?
                .unwrap_or(defaults.embedding_dimension),
            ollama_url: load_env_optional("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            boost_table_path: load_env_optional("DIGEST_BOOST_TABLE").map(PathBuf::from),
        })
    }

    /// Location of the per-run input configuration.
    pub fn run_input_path(&self) -> PathBuf {
        self.input_dir.join(RUN_INPUT_FILE)
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional(key: &str) -> Result<Option<usize>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hashed" | "hash" => Ok(Self::Hashed),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Load configuration from the environment, reading a `.env` file first when present.
pub fn init_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        input_dir = %config.input_dir.display(),
        output_file = %config.output_file.display(),
        embedding_provider = ?config.embedding_provider,
        embedding_model = %config.embedding_model,
        "Loaded configuration"
    );
    Ok(config)
}

/// Persona and task description for one pipeline run, plus the documents to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInput {
    /// Free-text persona description.
    pub persona: String,
    /// Free-text job-to-be-done description.
    pub job: String,
    /// Document file names relative to the input directory; empty means "discover".
    pub documents: Vec<String>,
}

impl Default for RunInput {
    fn default() -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            job: DEFAULT_JOB.to_string(),
            documents: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawRunInput {
    #[serde(default)]
    persona: Option<RawPersona>,
    #[serde(default)]
    job_to_be_done: Option<RawJob>,
    #[serde(default)]
    documents: Vec<RawDocument>,
}

#[derive(Debug, Deserialize)]
struct RawPersona {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawJob {
    #[serde(default)]
    task: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    filename: String,
}

impl RunInput {
    /// Parse the JSON run input, filling absent fields with defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let parsed: RawRunInput = serde_json::from_str(raw)?;
        let defaults = Self::default();
        Ok(Self {
            persona: parsed
                .persona
                .and_then(|persona| persona.description)
                .unwrap_or(defaults.persona),
            job: parsed
                .job_to_be_done
                .and_then(|job| job.task)
                .unwrap_or(defaults.job),
            documents: parsed
                .documents
                .into_iter()
                .map(|document| document.filename)
                .collect(),
        })
    }

    /// Load the run input from disk.
    ///
    /// A missing or malformed file is never fatal: the defaults are used and a warning is logged.
    pub fn load_or_default(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %path.display(),
                    "No run input found; using default persona and job"
                );
                return Self::default();
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to read run input; using defaults");
                return Self::default();
            }
        };

        match Self::from_json(&raw) {
            Ok(input) => {
                tracing::info!(path = %path.display(), "Loaded persona and job from run input");
                input
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Malformed run input; using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_provider_parses_known_values() {
        assert_eq!("Ollama".parse::<EmbeddingProvider>(), Ok(EmbeddingProvider::Ollama));
        assert_eq!(" hashed ".parse::<EmbeddingProvider>(), Ok(EmbeddingProvider::Hashed));
        assert!("openai".parse::<EmbeddingProvider>().is_err());
    }

    #[test]
    fn run_input_reads_nested_fields() {
        let input = RunInput::from_json(
            r#"{
                "persona": {"role": "x", "description": "Travel Planner"},
                "job_to_be_done": {"task": "Plan a trip of 4 days."},
                "documents": [{"filename": "a.pdf", "title": "A"}, {"filename": "b.pdf"}]
            }"#,
        )
        .expect("valid input");
        assert_eq!(input.persona, "Travel Planner");
        assert_eq!(input.job, "Plan a trip of 4 days.");
        assert_eq!(input.documents, vec!["a.pdf".to_string(), "b.pdf".to_string()]);
    }

    #[test]
    fn run_input_defaults_missing_fields() {
        let input = RunInput::from_json("{}").expect("empty object");
        assert_eq!(input, RunInput::default());
    }

    #[test]
    fn malformed_run_input_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!(
            "persona-digest-malformed-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{not json").expect("write fixture");
        let input = RunInput::load_or_default(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(input, RunInput::default());
    }

    #[test]
    fn missing_run_input_falls_back_to_defaults() {
        let input = RunInput::load_or_default(Path::new("/definitely/not/here/input_config.json"));
        assert_eq!(input.persona, DEFAULT_PERSONA);
        assert_eq!(input.job, DEFAULT_JOB);
    }

    #[test]
    fn init_config_returns_independent_values() {
        let mut first = init_config().expect("config");
        first.top_sections = usize::MAX;
        let second = init_config().expect("config");
        assert_ne!(second.top_sections, usize::MAX);
    }
}
