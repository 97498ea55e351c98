// Reading session - picker/reader mode, sentence list and reading position
//
// The session is the only owner of the current sentence list and position.
// Every mutation goes through one of the named transitions below.

use serde::{Deserialize, Serialize};

use crate::pdf_extraction::ExtractionMethod;
use crate::segmenter::{Sentence, SentenceList};
use crate::types::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Picker,
    Reader,
}

/// Where the installed sentence list came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSource {
    pub file_name: String,
    pub size_bytes: Option<u64>,
    pub method: ExtractionMethod,
    /// Set when real extraction failed and substitute text was used.
    pub fallback_reason: Option<ErrorKind>,
}

impl DocumentSource {
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedDocument {
    pub sentences: SentenceList,
    pub source: DocumentSource,
}

/// Outcome of a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved,
    NoOp,
    Rejected,
}

impl Transition {
    pub fn changed(self) -> bool {
        self == Transition::Moved
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("an extraction is already running")]
    ExtractionInProgress,
    #[error("reading position {position} is outside a list of {len} sentences")]
    PositionOutOfRange { position: usize, len: usize },
    #[error("reader mode needs a loaded document")]
    ReaderWithoutDocument,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    FileExtracted(LoadedDocument),
    Next,
    Previous,
    Back,
    Resume,
}

/// Restored sessions are checked against the same invariants the
/// transitions keep, and never come back loading.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "SessionSnapshot")]
pub struct ReadingSession {
    mode: ViewMode,
    document: Option<LoadedDocument>,
    position: usize,
    loading: bool,
}

#[derive(Deserialize)]
struct SessionSnapshot {
    mode: ViewMode,
    document: Option<LoadedDocument>,
    position: usize,
}

impl TryFrom<SessionSnapshot> for ReadingSession {
    type Error = SessionError;

    fn try_from(snapshot: SessionSnapshot) -> Result<Self, Self::Error> {
        let len = snapshot.document.as_ref().map_or(0, |d| d.sentences.len());
        match &snapshot.document {
            None if snapshot.mode == ViewMode::Reader => return Err(SessionError::ReaderWithoutDocument),
            None if snapshot.position != 0 => {
                return Err(SessionError::PositionOutOfRange { position: snapshot.position, len })
            }
            Some(_) if snapshot.position >= len => {
                return Err(SessionError::PositionOutOfRange { position: snapshot.position, len })
            }
            _ => {}
        }
        Ok(Self {
            mode: snapshot.mode,
            document: snapshot.document,
            position: snapshot.position,
            loading: false,
        })
    }
}

impl ReadingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    pub fn sentences(&self) -> Option<&SentenceList> {
        self.document.as_ref().map(|d| &d.sentences)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current_sentence(&self) -> Option<&Sentence> {
        self.sentences()?.get(self.position)
    }

    pub fn has_next(&self) -> bool {
        self.mode == ViewMode::Reader
            && self.sentences().map_or(false, |s| self.position + 1 < s.len())
    }

    pub fn has_previous(&self) -> bool {
        self.mode == ViewMode::Reader && self.document.is_some() && self.position > 0
    }

    /// Single entry point for the rendering layer.
    pub fn apply(&mut self, event: SessionEvent) -> Transition {
        match event {
            SessionEvent::FileExtracted(doc) => self.file_extracted(doc),
            SessionEvent::Next => self.next(),
            SessionEvent::Previous => self.previous(),
            SessionEvent::Back => self.back(),
            SessionEvent::Resume => self.resume(),
        }
    }

    /// Install a freshly extracted document. An empty list is refused and
    /// leaves the session untouched.
    pub fn file_extracted(&mut self, doc: LoadedDocument) -> Transition {
        if doc.sentences.is_empty() {
            log::info!("{}: no sentences, staying in {:?}", doc.source.file_name, self.mode);
            return Transition::Rejected;
        }
        log::info!(
            "{}: installed {} sentences ({})",
            doc.source.file_name,
            doc.sentences.len(),
            doc.source.method
        );
        self.document = Some(doc);
        self.position = 0;
        self.mode = ViewMode::Reader;
        Transition::Moved
    }

    pub fn next(&mut self) -> Transition {
        if self.mode != ViewMode::Reader {
            return Transition::Rejected;
        }
        if self.has_next() {
            self.position += 1;
            Transition::Moved
        } else {
            Transition::NoOp
        }
    }

    pub fn previous(&mut self) -> Transition {
        if self.mode != ViewMode::Reader {
            return Transition::Rejected;
        }
        if self.position > 0 {
            self.position -= 1;
            Transition::Moved
        } else {
            Transition::NoOp
        }
    }

    /// Return to the picker. The document and position are kept.
    pub fn back(&mut self) -> Transition {
        if self.mode != ViewMode::Reader {
            return Transition::Rejected;
        }
        self.mode = ViewMode::Picker;
        Transition::Moved
    }

    /// Re-enter the reader at the retained position.
    pub fn resume(&mut self) -> Transition {
        if self.mode == ViewMode::Reader || self.loading {
            return Transition::Rejected;
        }
        if self.document.is_none() {
            return Transition::NoOp;
        }
        self.mode = ViewMode::Reader;
        Transition::Moved
    }

    pub fn begin_extraction(&mut self) -> Result<(), SessionError> {
        if self.loading {
            return Err(SessionError::ExtractionInProgress);
        }
        self.loading = true;
        Ok(())
    }

    pub fn finish_extraction(&mut self) {
        self.loading = false;
    }

    /// Stable state after an input or extraction error.
    pub fn abort_to_picker(&mut self) {
        self.loading = false;
        self.mode = ViewMode::Picker;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmenter::segment;

    fn doc(text: &str) -> LoadedDocument {
        LoadedDocument {
            sentences: segment(text),
            source: DocumentSource {
                file_name: "sample.pdf".to_string(),
                size_bytes: Some(2048),
                method: ExtractionMethod::Demo,
                fallback_reason: None,
            },
        }
    }

    #[test]
    fn starts_in_picker() {
        let session = ReadingSession::new();
        assert_eq!(session.mode(), ViewMode::Picker);
        assert!(session.sentences().is_none());
        assert_eq!(session.position(), 0);
        assert!(!session.is_loading());
    }

    #[test]
    fn walks_three_sentences() {
        let mut session = ReadingSession::new();
        assert_eq!(session.apply(SessionEvent::FileExtracted(doc("A. B. C."))), Transition::Moved);
        assert_eq!(session.mode(), ViewMode::Reader);
        assert_eq!(session.position(), 0);

        assert_eq!(session.apply(SessionEvent::Next), Transition::Moved);
        assert_eq!(session.apply(SessionEvent::Next), Transition::Moved);
        assert_eq!(session.position(), 2);
        assert_eq!(session.apply(SessionEvent::Next), Transition::NoOp);
        assert_eq!(session.position(), 2);

        assert_eq!(session.apply(SessionEvent::Previous), Transition::Moved);
        assert_eq!(session.position(), 1);

        assert_eq!(session.apply(SessionEvent::Back), Transition::Moved);
        assert_eq!(session.mode(), ViewMode::Picker);
        assert_eq!(session.sentences().map(|s| s.len()), Some(3));

        assert_eq!(session.apply(SessionEvent::Resume), Transition::Moved);
        assert_eq!(session.mode(), ViewMode::Reader);
        assert_eq!(session.position(), 1);
        assert_eq!(session.current_sentence().map(|s| s.as_str()), Some("B."));
    }

    #[test]
    fn previous_at_start_is_noop() {
        let mut session = ReadingSession::new();
        session.file_extracted(doc("Only one"));
        assert_eq!(session.previous(), Transition::NoOp);
        assert_eq!(session.next(), Transition::NoOp);
        assert!(!session.has_next());
        assert!(!session.has_previous());
    }

    #[test]
    fn empty_list_never_enters_reader() {
        let mut session = ReadingSession::new();
        assert_eq!(session.file_extracted(doc("  ...  ")), Transition::Rejected);
        assert_eq!(session.mode(), ViewMode::Picker);
        assert!(session.document().is_none());
    }

    #[test]
    fn new_document_resets_position() {
        let mut session = ReadingSession::new();
        session.file_extracted(doc("A. B. C."));
        session.next();
        session.next();
        session.back();
        session.file_extracted(doc("D. E."));
        assert_eq!(session.mode(), ViewMode::Reader);
        assert_eq!(session.position(), 0);
        assert_eq!(session.current_sentence().map(|s| s.as_str()), Some("D."));
    }

    #[test]
    fn navigation_rejected_in_picker() {
        let mut session = ReadingSession::new();
        assert_eq!(session.next(), Transition::Rejected);
        assert_eq!(session.previous(), Transition::Rejected);
        assert_eq!(session.back(), Transition::Rejected);
        assert_eq!(session.resume(), Transition::NoOp);
    }

    #[test]
    fn second_extraction_is_rejected_while_loading() {
        let mut session = ReadingSession::new();
        assert!(session.begin_extraction().is_ok());
        assert_eq!(session.begin_extraction(), Err(SessionError::ExtractionInProgress));
        session.finish_extraction();
        assert!(session.begin_extraction().is_ok());
        session.abort_to_picker();
        assert!(!session.is_loading());
        assert_eq!(session.mode(), ViewMode::Picker);
    }

    #[test]
    fn round_trips_through_json() {
        let mut session = ReadingSession::new();
        session.file_extracted(doc("A. B."));
        session.next();
        let json = serde_json::to_string(&session).unwrap();
        let restored: ReadingSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }

    #[test]
    fn restore_rejects_out_of_range_position() {
        let mut session = ReadingSession::new();
        session.file_extracted(doc("A. B."));
        let mut value = serde_json::to_value(&session).unwrap();
        value["position"] = serde_json::json!(2);
        let err = serde_json::from_value::<ReadingSession>(value).unwrap_err();
        assert!(err.to_string().contains("outside a list of 2"), "{}", err);

        let orphan = serde_json::json!({ "mode": "Reader", "document": null, "position": 0, "loading": false });
        assert!(serde_json::from_value::<ReadingSession>(orphan).is_err());
    }

    #[test]
    fn restore_clears_loading() {
        let mut session = ReadingSession::new();
        session.begin_extraction().unwrap();
        let json = serde_json::to_string(&session).unwrap();
        let restored: ReadingSession = serde_json::from_str(&json).unwrap();
        assert!(!restored.is_loading());
        assert_eq!(restored.mode(), ViewMode::Picker);
    }

    #[test]
    fn boundaries_only_reported_in_reader() {
        let mut session = ReadingSession::new();
        session.file_extracted(doc("A. B. C."));
        session.next();
        assert!(session.has_previous() && session.has_next());

        session.back();
        assert!(!session.has_previous());
        assert!(!session.has_next());
        assert_eq!(session.previous(), Transition::Rejected);

        session.resume();
        assert!(session.has_previous());
    }
}
