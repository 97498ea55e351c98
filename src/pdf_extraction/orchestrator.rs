// Extraction orchestration - classify backend failures and apply the fallback policy
use std::time::Instant;

use super::{ExtractionMethod, TextExtractor};
use crate::file_picker::PickedFile;
use crate::types::ErrorKind;

/// Substitute text shown when extraction fails and fallback is enabled.
pub const FALLBACK_TEXT: &str = "The text of this document could not be extracted. \
What follows is placeholder content, not the document itself. \
Check the document or try another extraction backend. \
Go back to pick a different file.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    Success {
        text: String,
        method: ExtractionMethod,
        /// Set when `text` is fallback content; holds the original failure.
        fallback_reason: Option<ErrorKind>,
    },
    Failure(ErrorKind),
}

impl ExtractionResult {
    pub fn used_fallback(&self) -> bool {
        matches!(self, ExtractionResult::Success { fallback_reason: Some(_), .. })
    }
}

pub struct Orchestrator<E> {
    extractor: E,
    fallback: bool,
}

impl<E: TextExtractor> Orchestrator<E> {
    pub fn new(extractor: E, fallback: bool) -> Self {
        Self { extractor, fallback }
    }

    pub fn method(&self) -> ExtractionMethod {
        self.extractor.method()
    }

    pub fn fallback_enabled(&self) -> bool {
        self.fallback
    }

    /// Never returns a raw error: every backend failure becomes an `ErrorKind`.
    pub async fn extract(&self, file: &PickedFile) -> ExtractionResult {
        let method = self.extractor.method();
        let start = Instant::now();
        log::info!("extracting {} with {} backend", file.name, method);

        match self.extractor.extract(file).await {
            Ok(text) => {
                log::info!(
                    "extracted {} chars from {} in {:?}",
                    text.len(),
                    file.name,
                    start.elapsed()
                );
                ExtractionResult::Success {
                    text,
                    method,
                    fallback_reason: None,
                }
            }
            Err(e) if self.fallback => {
                log::warn!("{} failed ({}), using fallback text", file.name, e);
                ExtractionResult::Success {
                    text: FALLBACK_TEXT.to_string(),
                    method,
                    fallback_reason: Some(e.kind),
                }
            }
            Err(e) => {
                log::error!("{} failed after {:?}: {}", file.name, start.elapsed(), e);
                ExtractionResult::Failure(e.kind)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf_extraction::{DemoExtractor, ExtractError};

    struct Failing(ErrorKind);

    impl TextExtractor for Failing {
        fn method(&self) -> ExtractionMethod {
            ExtractionMethod::Native
        }

        async fn extract(&self, _file: &PickedFile) -> Result<String, ExtractError> {
            Err(ExtractError::new(self.0, "scripted failure"))
        }
    }

    fn file() -> PickedFile {
        PickedFile {
            uri: "file:///tmp/a.pdf".to_string(),
            name: "a.pdf".to_string(),
            size_bytes: Some(10),
        }
    }

    #[tokio::test]
    async fn failure_is_classified() {
        let orchestrator = Orchestrator::new(Failing(ErrorKind::EncryptedDocument), false);
        assert_eq!(
            orchestrator.extract(&file()).await,
            ExtractionResult::Failure(ErrorKind::EncryptedDocument)
        );
    }

    #[tokio::test]
    async fn fallback_marks_result() {
        let orchestrator = Orchestrator::new(Failing(ErrorKind::BackendUnavailable), true);
        let result = orchestrator.extract(&file()).await;
        assert!(result.used_fallback());
        match result {
            ExtractionResult::Success { text, fallback_reason, method } => {
                assert_eq!(text, FALLBACK_TEXT);
                assert_eq!(fallback_reason, Some(ErrorKind::BackendUnavailable));
                assert_eq!(method, ExtractionMethod::Native);
            }
            other => panic!("expected fallback success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn success_is_not_fallback() {
        let orchestrator = Orchestrator::new(DemoExtractor::with_text("One. Two."), true);
        let result = orchestrator.extract(&file()).await;
        assert!(!result.used_fallback());
        assert!(matches!(result, ExtractionResult::Success { method: ExtractionMethod::Demo, .. }));
    }
}
