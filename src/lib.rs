#![deny(missing_docs)]

//! Core library for the persona-driven document digest.

/// Environment-driven configuration and per-run input.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Document text extraction and input discovery.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Run metrics helpers.
pub mod metrics;
/// Segmentation, ranking, and summarization pipeline.
pub mod processing;
/// Serializable digest report.
pub mod report;
