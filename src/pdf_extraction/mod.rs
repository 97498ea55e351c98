// PDF extraction module
//
// Three interchangeable backends sit behind `TextExtractor`. `Backend` picks
// one at startup; the orchestrator wraps it with error classification and
// the fallback policy.
pub mod demo;
pub mod native;
pub mod orchestrator;
pub mod remote;

use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::config::ReaderConfig;
use crate::file_picker::PickedFile;
use crate::types::ErrorKind;

pub use demo::DemoExtractor;
pub use native::NativeExtractor;
pub use orchestrator::{ExtractionResult, Orchestrator, FALLBACK_TEXT};
pub use remote::{RemoteConfig, RemoteExtractor};

/// Which backend produced a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Native,
    Remote,
    Demo,
}

impl ExtractionMethod {
    pub fn label(self) -> &'static str {
        match self {
            ExtractionMethod::Native => "native",
            ExtractionMethod::Remote => "remote",
            ExtractionMethod::Demo => "demo",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Backend-level failure. Carries the classified kind plus the detail for logs.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct ExtractError {
    pub kind: ErrorKind,
    pub detail: String,
}

impl ExtractError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self { kind, detail: detail.into() }
    }

    pub fn from_io(err: &std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            _ => ErrorKind::Unknown,
        };
        Self::new(kind, err.to_string())
    }
}

/// Converts a picked document into raw text.
pub trait TextExtractor: Send + Sync {
    fn method(&self) -> ExtractionMethod;

    fn extract(
        &self,
        file: &PickedFile,
    ) -> impl Future<Output = Result<String, ExtractError>> + Send;
}

/// Composition-time backend selection.
pub enum Backend {
    Native(NativeExtractor),
    Remote(RemoteExtractor),
    Demo(DemoExtractor),
}

impl Backend {
    /// Build the backend named by `config.backend`.
    pub fn from_config(config: &ReaderConfig) -> Result<Self, ExtractError> {
        Ok(match config.backend {
            ExtractionMethod::Native => Backend::Native(NativeExtractor::new(config.scratch_dir.clone())),
            ExtractionMethod::Remote => Backend::Remote(RemoteExtractor::new(&config.remote)?),
            ExtractionMethod::Demo => Backend::Demo(DemoExtractor::new()),
        })
    }
}

impl TextExtractor for Backend {
    fn method(&self) -> ExtractionMethod {
        match self {
            Backend::Native(e) => e.method(),
            Backend::Remote(e) => e.method(),
            Backend::Demo(e) => e.method(),
        }
    }

    async fn extract(&self, file: &PickedFile) -> Result<String, ExtractError> {
        match self {
            Backend::Native(e) => e.extract(file).await,
            Backend::Remote(e) => e.extract(file).await,
            Backend::Demo(e) => e.extract(file).await,
        }
    }
}

/// Reject text that is blank after trimming.
pub(crate) fn require_text(text: String) -> Result<String, ExtractError> {
    if text.trim().is_empty() {
        Err(ExtractError::new(
            ErrorKind::NoExtractableText,
            "document contains no text layer",
        ))
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_file_not_found() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(ExtractError::from_io(&err).kind, ErrorKind::FileNotFound);
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(ExtractError::from_io(&err).kind, ErrorKind::Unknown);
    }

    #[test]
    fn backend_follows_config() {
        let mut config = ReaderConfig::default();
        config.backend = ExtractionMethod::Demo;
        assert_eq!(Backend::from_config(&config).unwrap().method(), ExtractionMethod::Demo);

        config.backend = ExtractionMethod::Remote;
        assert!(Backend::from_config(&config).is_err());
        config.remote.endpoint = Some("http://localhost:8080/extract".to_string());
        assert_eq!(Backend::from_config(&config).unwrap().method(), ExtractionMethod::Remote);
    }

    #[test]
    fn blank_text_is_not_extractable() {
        assert_eq!(
            require_text(" \n\t".to_string()).unwrap_err().kind,
            ErrorKind::NoExtractableText
        );
        assert_eq!(require_text("x".to_string()).unwrap(), "x");
    }
}
