// readerchunks - read PDFs one sentence at a time in the terminal
pub mod app;
pub mod config;
pub mod debug_panel;
pub mod file_picker;
pub mod keyboard;
pub mod logging;
pub mod pdf_extraction;
pub mod screen_mode;
pub mod segmenter;
pub mod session;
pub mod summary;
pub mod theme;
pub mod types;
pub mod ui_renderer;

pub use app::{App, Intent};
pub use config::ReaderConfig;
pub use segmenter::{segment, Sentence, SentenceList};
pub use session::{ReadingSession, SessionEvent, ViewMode};
pub use types::{ErrorKind, ReaderError};
