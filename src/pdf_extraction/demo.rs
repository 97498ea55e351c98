// Canned text backend - keeps the reader usable without any real extraction
use super::{ExtractError, ExtractionMethod, TextExtractor};
use crate::file_picker::PickedFile;

pub const DEMO_TEXT: &str = "This is sample text that demonstrates reading one sentence at a time. \
Real PDF extraction is available through the native and remote backends. \
Each sentence is shown on its own to keep the reading focused. \
Use the arrow keys to move between sentences. \
Reading one idea at a time helps concentration. \
The goal is better comprehension through slower reading. \
Pick a real PDF with another backend to read your own documents.";

#[derive(Debug, Clone)]
pub struct DemoExtractor {
    text: String,
}

impl DemoExtractor {
    pub fn new() -> Self {
        Self::with_text(DEMO_TEXT)
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for DemoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for DemoExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Demo
    }

    async fn extract(&self, file: &PickedFile) -> Result<String, ExtractError> {
        log::debug!("demo backend: ignoring contents of {}", file.name);
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmenter::segment;

    #[tokio::test]
    async fn returns_seven_sentences_for_any_file() {
        let file = PickedFile {
            uri: "file:///nowhere.pdf".to_string(),
            name: "nowhere.pdf".to_string(),
            size_bytes: None,
        };
        let text = DemoExtractor::new().extract(&file).await.unwrap();
        assert_eq!(segment(&text).len(), 7);
    }
}
