// Application controller - owns the session and drives extraction
//
// All session mutation happens here, one intent at a time. Extraction runs on
// the tokio runtime and reports back through a oneshot channel that the UI
// loop polls between frames.
use std::sync::Arc;
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::debug_panel::DebugPanel;
use crate::file_picker::{validate_selection, PickedFile};
use crate::pdf_extraction::{ExtractionResult, Orchestrator, TextExtractor};
use crate::screen_mode::ScreenMode;
use crate::segmenter::segment;
use crate::session::{DocumentSource, LoadedDocument, ReadingSession, SessionEvent, Transition};
use crate::summary::extraction_summary;
use crate::types::{AppFlags, ErrorKind};

pub const NO_SENTENCES_MESSAGE: &str = "No sentences were found in this document.";

/// User intents dispatched by the keyboard layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    PickFile,
    Next,
    Previous,
    Back,
    Resume,
    ToggleDebug,
    DismissAlert,
    ScrollLog(i32),
    Quit,
}

/// Blocking notification; input is swallowed until it is dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

struct PendingExtraction {
    file: PickedFile,
    rx: oneshot::Receiver<ExtractionResult>,
}

pub struct App<E> {
    pub session: ReadingSession,
    pub summary: Option<String>,
    pub alert: Option<Alert>,
    pub flags: AppFlags,
    pub screen_mode: ScreenMode,
    pub debug_panel: DebugPanel,
    orchestrator: Arc<Orchestrator<E>>,
    pending: Option<PendingExtraction>,
}

impl<E> App<E>
where
    E: TextExtractor + 'static,
{
    pub fn new(orchestrator: Orchestrator<E>) -> Self {
        Self {
            session: ReadingSession::new(),
            summary: None,
            alert: None,
            flags: AppFlags::REDRAW,
            screen_mode: ScreenMode::default(),
            debug_panel: DebugPanel::new(),
            orchestrator: Arc::new(orchestrator),
            pending: None,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator<E> {
        &self.orchestrator
    }

    pub fn should_exit(&self) -> bool {
        self.flags.contains(AppFlags::EXIT)
    }

    pub fn dispatch(&mut self, intent: Intent) {
        if self.alert.is_some() {
            match intent {
                Intent::DismissAlert => {
                    self.alert = None;
                    self.flags.insert(AppFlags::REDRAW);
                }
                Intent::Quit => self.flags.insert(AppFlags::EXIT),
                _ => {}
            }
            return;
        }

        let transition = match intent {
            Intent::PickFile => {
                if self.session.is_loading() {
                    log::debug!("pick ignored: extraction in progress");
                } else {
                    self.flags.insert(AppFlags::OPEN_PICKER);
                }
                Transition::NoOp
            }
            Intent::Next => self.session.apply(SessionEvent::Next),
            Intent::Previous => self.session.apply(SessionEvent::Previous),
            Intent::Back => self.session.apply(SessionEvent::Back),
            Intent::Resume => self.session.apply(SessionEvent::Resume),
            Intent::ToggleDebug => {
                self.screen_mode = self.screen_mode.toggle();
                log::debug!("switched to {:?} screen", self.screen_mode);
                Transition::Moved
            }
            Intent::ScrollLog(lines) => {
                if lines < 0 {
                    self.debug_panel.scroll_up(lines.unsigned_abs() as usize);
                } else {
                    self.debug_panel.scroll_down(lines as usize);
                }
                Transition::Moved
            }
            Intent::DismissAlert => Transition::NoOp,
            Intent::Quit => {
                self.flags.insert(AppFlags::EXIT);
                Transition::NoOp
            }
        };
        if transition.changed() {
            self.flags.insert(AppFlags::REDRAW);
        }
    }

    /// Validate a picked file and start extracting it in the background.
    /// Returns false when nothing was started.
    pub fn start_extraction(&mut self, file: PickedFile) -> bool {
        // The running job owns `loading`; nothing below may reset it
        if self.session.is_loading() || self.pending.is_some() {
            log::warn!("extraction already running ({} not started)", file.name);
            return false;
        }
        if let Err(e) = validate_selection(&file) {
            log::warn!("{}", e);
            self.session.abort_to_picker();
            self.alert = Some(Alert::new("Not a PDF", e.to_string()));
            self.flags.insert(AppFlags::REDRAW);
            return false;
        }
        if let Err(e) = self.session.begin_extraction() {
            log::warn!("{} ({} not started)", e, file.name);
            return false;
        }

        let (tx, rx) = oneshot::channel();
        let orchestrator = Arc::clone(&self.orchestrator);
        let task_file = file.clone();
        tokio::spawn(async move {
            let result = orchestrator.extract(&task_file).await;
            let _ = tx.send(result);
        });

        self.pending = Some(PendingExtraction { file, rx });
        self.flags.insert(AppFlags::REDRAW);
        true
    }

    /// Non-blocking check for a finished extraction. Returns true when one resolved.
    pub fn poll_extraction(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Closed) => {
                log::error!("extraction task for {} ended without a result", pending.file.name);
                ExtractionResult::Failure(ErrorKind::Unknown)
            }
        };
        if let Some(pending) = self.pending.take() {
            self.complete_extraction(&pending.file, result);
        }
        true
    }

    /// Wait for the running extraction, if any.
    pub async fn wait_for_extraction(&mut self) {
        if let Some(pending) = self.pending.take() {
            let result = pending.rx.await.unwrap_or_else(|_| {
                log::error!("extraction task for {} ended without a result", pending.file.name);
                ExtractionResult::Failure(ErrorKind::Unknown)
            });
            self.complete_extraction(&pending.file, result);
        }
    }

    fn complete_extraction(&mut self, file: &PickedFile, result: ExtractionResult) {
        self.session.finish_extraction();
        self.flags.insert(AppFlags::REDRAW);

        let (text, method, fallback_reason) = match result {
            ExtractionResult::Success { text, method, fallback_reason } => (text, method, fallback_reason),
            ExtractionResult::Failure(kind) => {
                self.session.abort_to_picker();
                self.alert = Some(Alert::new("Extraction failed", kind.user_message()));
                return;
            }
        };

        let document = LoadedDocument {
            sentences: segment(&text),
            source: DocumentSource {
                file_name: file.name.clone(),
                size_bytes: file.size_bytes,
                method,
                fallback_reason,
            },
        };
        let count = document.sentences.len();
        let summary = extraction_summary(&document.source, count);

        match self.session.apply(SessionEvent::FileExtracted(document)) {
            Transition::Moved => {
                log::info!("{}", summary.replace('\n', " | "));
                self.summary = Some(summary);
            }
            _ => {
                self.session.abort_to_picker();
                self.alert = Some(Alert::new("Nothing to read", NO_SENTENCES_MESSAGE));
            }
        }
    }
}
