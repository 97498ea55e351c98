use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyModifiers, MouseButton, MouseEventKind},
    execute,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use nucleo::{Config, Nucleo, Utf32String};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use crate::theme::ReaderTheme;
use crate::types::{ReaderError, Result};

const URI_SCHEME: &str = "file://";

/// A document handed over by the picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickedFile {
    pub uri: String,
    pub name: String,
    pub size_bytes: Option<u64>,
}

impl PickedFile {
    /// Build a selection from a local path. A missing file still yields a
    /// selection with an unknown size; extraction reports it later.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let size_bytes = std::fs::metadata(path).ok().map(|m| m.len());
        Self {
            uri: format!("{}{}", URI_SCHEME, path.display()),
            name,
            size_bytes,
        }
    }

    /// Filesystem path behind the URI.
    pub fn local_path(&self) -> PathBuf {
        PathBuf::from(self.uri.strip_prefix(URI_SCHEME).unwrap_or(&self.uri))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Cancelled,
    Selected(PickedFile),
}

/// Reject anything that is not presented as a PDF before it reaches extraction.
pub fn validate_selection(file: &PickedFile) -> Result<()> {
    let reject = |reason: &str| ReaderError::RejectedFile {
        name: file.name.clone(),
        reason: reason.to_string(),
    };
    if file.uri.trim().is_empty() || file.uri.trim() == URI_SCHEME {
        return Err(reject("empty file location"));
    }
    if file.name.trim().is_empty() {
        return Err(reject("empty file name"));
    }
    if !has_pdf_suffix(&file.name) {
        return Err(reject("only .pdf files can be opened"));
    }
    Ok(())
}

pub fn has_pdf_suffix(name: &str) -> bool {
    name.len() >= 4
        && name.is_char_boundary(name.len() - 4)
        && name[name.len() - 4..].eq_ignore_ascii_case(".pdf")
}

/// Source of picked files. The terminal picker is the real one; tests can
/// script their own.
pub trait FilePicker {
    fn pick(&mut self) -> Result<PickOutcome>;
}

/// Fuzzy finder over PDFs found in the configured directories.
pub struct FuzzyPicker {
    search_dirs: Vec<PathBuf>,
}

impl FuzzyPicker {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }
}

impl FilePicker for FuzzyPicker {
    /// Expects the terminal to already be in raw mode on the alternate screen.
    fn pick(&mut self) -> Result<PickOutcome> {
        let pdf_files = find_pdf_files(&self.search_dirs);
        log::debug!("picker: {} candidate PDFs", pdf_files.len());
        if pdf_files.is_empty() {
            log::warn!("picker: no PDF files under {:?}", self.search_dirs);
            return Ok(PickOutcome::Cancelled);
        }

        match run_fuzzy_picker(&pdf_files)? {
            Some(path) => Ok(PickOutcome::Selected(PickedFile::from_path(&path))),
            None => Ok(PickOutcome::Cancelled),
        }
    }
}

/// Run the interactive fuzzy picker
fn run_fuzzy_picker(files: &[String]) -> Result<Option<PathBuf>> {
    let mut stdout = io::stdout();

    let mut nucleo = Nucleo::<Arc<str>>::new(Config::DEFAULT, Arc::new(|| {}), None, 1);

    let injector = nucleo.injector();
    for file in files {
        let file_arc: Arc<str> = Arc::from(file.as_str());
        let _ = injector.push(file_arc, |data, cols: &mut [Utf32String]| {
            cols[0] = data.as_ref().into();
        });
    }

    let mut query = String::new();
    let mut selected_index = 0usize;
    let mut scroll_offset = 0usize;

    loop {
        nucleo.tick(10);
        execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;

        let (term_width, term_height) = terminal::size().unwrap_or((80, 24));
        execute!(
            stdout,
            MoveTo(0, 0),
            SetBackgroundColor(ReaderTheme::accent_picker()),
            SetForegroundColor(ReaderTheme::text_header()),
            SetAttribute(Attribute::Bold),
            Print(format!("  {:<width$}", "Select a PDF", width = term_width.saturating_sub(2) as usize)),
            ResetColor,
            SetAttribute(Attribute::Reset)
        )?;

        execute!(
            stdout,
            MoveTo(0, 2),
            SetForegroundColor(ReaderTheme::accent_text()),
            Print("  Search: "),
            SetForegroundColor(ReaderTheme::text_primary()),
            Print(&query),
            SetForegroundColor(ReaderTheme::text_dim()),
            Print("_"),
            ResetColor
        )?;

        let snapshot = nucleo.snapshot();
        let all_matches = snapshot.matched_items(..).collect::<Vec<_>>();

        let max_path_width = (term_width as usize).saturating_sub(5);
        let max_display_items = (term_height as usize).saturating_sub(8).clamp(1, 15);

        // Keep the selection visible
        if selected_index >= scroll_offset + max_display_items {
            scroll_offset = selected_index + 1 - max_display_items;
        } else if selected_index < scroll_offset {
            scroll_offset = selected_index;
        }

        let visible = all_matches.iter().skip(scroll_offset).take(max_display_items);
        for (display_i, item) in visible.enumerate() {
            let line_pos = 4 + display_i as u16;
            let shown = truncate_path(item.data.as_ref(), max_path_width);
            execute!(stdout, MoveTo(0, line_pos), Clear(ClearType::CurrentLine))?;
            if scroll_offset + display_i == selected_index {
                execute!(
                    stdout,
                    SetForegroundColor(ReaderTheme::success()),
                    Print("  > "),
                    SetForegroundColor(ReaderTheme::text_primary()),
                    Print(&shown),
                    ResetColor
                )?;
            } else {
                execute!(
                    stdout,
                    Print("    "),
                    SetForegroundColor(ReaderTheme::text_secondary()),
                    Print(&shown),
                    ResetColor
                )?;
            }
        }

        let help_line = (4 + max_display_items + 1) as u16;
        execute!(
            stdout,
            MoveTo(0, help_line),
            SetForegroundColor(ReaderTheme::text_dim()),
            Print(format!("  {} files", all_matches.len())),
            MoveTo(0, help_line + 1),
            Print("  Up/Down Navigate  |  Enter Select  |  Esc Cancel  |  Type to search"),
            ResetColor
        )?;
        stdout.flush()?;

        if !event::poll(std::time::Duration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
                {
                    return Ok(None);
                }
                match key.code {
                    KeyCode::Esc => return Ok(None),
                    KeyCode::Enter => {
                        if let Some(item) = all_matches.get(selected_index) {
                            return Ok(Some(PathBuf::from(item.data.as_ref())));
                        }
                    }
                    KeyCode::Up => selected_index = selected_index.saturating_sub(1),
                    KeyCode::Down => {
                        selected_index = (selected_index + 1).min(all_matches.len().saturating_sub(1));
                    }
                    KeyCode::PageUp => {
                        selected_index = selected_index.saturating_sub(max_display_items);
                    }
                    KeyCode::PageDown => {
                        selected_index =
                            (selected_index + max_display_items).min(all_matches.len().saturating_sub(1));
                    }
                    KeyCode::Backspace => {
                        query.pop();
                        selected_index = 0;
                        scroll_offset = 0;
                        reparse(&mut nucleo, &query);
                    }
                    KeyCode::Char(c) => {
                        query.push(c);
                        selected_index = 0;
                        scroll_offset = 0;
                        reparse(&mut nucleo, &query);
                    }
                    _ => {}
                }
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => selected_index = selected_index.saturating_sub(3),
                MouseEventKind::ScrollDown => {
                    selected_index = (selected_index + 3).min(all_matches.len().saturating_sub(1));
                }
                MouseEventKind::Down(MouseButton::Left) => {
                    let row = mouse.row as usize;
                    if row >= 4 && row < 4 + max_display_items {
                        let clicked = scroll_offset + row - 4;
                        if clicked < all_matches.len() {
                            selected_index = clicked;
                        }
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }
}

fn reparse(nucleo: &mut Nucleo<Arc<str>>, query: &str) {
    nucleo.pattern.reparse(
        0,
        query,
        nucleo::pattern::CaseMatching::Smart,
        nucleo::pattern::Normalization::Smart,
        false,
    );
}

/// Shorten long paths to their file name so rows never wrap.
fn truncate_path(path: &str, max_width: usize) -> String {
    if path.chars().count() <= max_width {
        return path.to_string();
    }
    let file_name = path.rsplit('/').next().unwrap_or(path);
    if file_name.chars().count() + 4 <= max_width {
        return format!(".../{}", file_name);
    }
    let keep = max_width.saturating_sub(3);
    format!("{}...", file_name.chars().take(keep).collect::<String>())
}

/// Find PDF files under every search directory, deduplicated and sorted.
pub fn find_pdf_files(search_dirs: &[PathBuf]) -> Vec<String> {
    let use_fd = command_exists("fd");
    let mut all_files: Vec<String> = search_dirs
        .iter()
        .filter(|dir| dir.is_dir())
        .flat_map(|dir| find_pdfs_in_dir(dir, use_fd))
        .filter(|path| has_pdf_suffix(path))
        .collect();
    all_files.sort();
    all_files.dedup();
    all_files
}

fn find_pdfs_in_dir(search_dir: &Path, use_fd: bool) -> Vec<String> {
    // Prefer fd (faster), fall back to find
    let output = if use_fd {
        Command::new("fd")
            .args(["-e", "pdf", "-t", "f", "--absolute-path", "."])
            .arg(search_dir)
            .output()
    } else {
        Command::new("find")
            .arg(search_dir)
            .args(["-iname", "*.pdf", "-type", "f"])
            .output()
    };

    match output {
        Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Ok(output) => {
            log::warn!("picker: search in {} exited with {}", search_dir.display(), output.status);
            Vec::new()
        }
        Err(e) => {
            log::warn!("picker: search in {} failed: {}", search_dir.display(), e);
            Vec::new()
        }
    }
}

fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
