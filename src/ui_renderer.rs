// Screen rendering - picker, reader, debug log, alert overlay and status bar
use crossterm::{
    cursor::MoveTo,
    execute,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};

use crate::app::{Alert, App};
use crate::pdf_extraction::TextExtractor;
use crate::screen_mode::ScreenMode;
use crate::session::{ReadingSession, ViewMode};
use crate::theme::ReaderTheme;

pub fn render<E: TextExtractor + 'static>(app: &mut App<E>, width: u16, height: u16) -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    if width < 10 || height < 5 {
        return stdout.flush();
    }

    match app.screen_mode {
        ScreenMode::Debug => {
            render_header(&mut stdout, width, "DEBUG LOG", ReaderTheme::accent_debug())?;
            app.debug_panel.render(0, 1, width, height - 2)?;
        }
        ScreenMode::Session => match app.session.mode() {
            ViewMode::Picker => render_picker(&mut stdout, app, width, height)?,
            ViewMode::Reader => render_reader(&mut stdout, &app.session, width, height)?,
        },
    }

    render_status_bar(&mut stdout, &status_line(&app.session, app.screen_mode), width, height)?;

    if let Some(alert) = &app.alert {
        render_alert(&mut stdout, alert, width, height)?;
    }

    execute!(stdout, ResetColor)?;
    stdout.flush()
}

fn render_header(stdout: &mut io::Stdout, width: u16, title: &str, color: Color) -> io::Result<()> {
    execute!(
        stdout,
        MoveTo(0, 0),
        SetBackgroundColor(color),
        SetForegroundColor(ReaderTheme::text_header()),
        SetAttribute(Attribute::Bold),
        Print(fit(&format!(" {} ", title), width as usize)),
        SetAttribute(Attribute::Reset),
        ResetColor
    )
}

fn render_picker<E: TextExtractor + 'static>(
    stdout: &mut io::Stdout,
    app: &App<E>,
    width: u16,
    height: u16,
) -> io::Result<()> {
    let backend = app.orchestrator().method();
    render_header(stdout, width, &format!("READERCHUNKS  [{} backend]", backend), ReaderTheme::accent_picker())?;

    let mut y = 2u16;
    let (label, color) = if app.session.is_loading() {
        ("Extracting text...", ReaderTheme::warning())
    } else {
        ("Press Enter to pick a PDF", ReaderTheme::success())
    };
    execute!(stdout, MoveTo(2, y), SetForegroundColor(color), Print(label), ResetColor)?;
    y += 2;

    if let Some(summary) = &app.summary {
        for line in summary.lines() {
            if y >= height.saturating_sub(3) {
                break;
            }
            let color = if line.starts_with("Warning") {
                ReaderTheme::warning()
            } else {
                ReaderTheme::text_secondary()
            };
            execute!(
                stdout,
                MoveTo(2, y),
                SetForegroundColor(color),
                Print(fit(line, width.saturating_sub(4) as usize)),
                ResetColor
            )?;
            y += 1;
        }
        if app.session.document().is_some() && y < height.saturating_sub(3) {
            execute!(
                stdout,
                MoveTo(2, y + 1),
                SetForegroundColor(ReaderTheme::accent_text()),
                Print(format!("Press r to resume at sentence {}", app.session.position() + 1)),
                ResetColor
            )?;
        }
    }
    Ok(())
}

fn render_reader(stdout: &mut io::Stdout, session: &ReadingSession, width: u16, height: u16) -> io::Result<()> {
    let Some(document) = session.document() else {
        return Ok(());
    };
    let mut title = format!("{}  {}", document.source.file_name, position_label(session));
    if document.source.is_fallback() {
        title.push_str("  FALLBACK TEXT");
    }
    let color = if document.source.is_fallback() {
        ReaderTheme::warning()
    } else {
        ReaderTheme::accent_reader()
    };
    render_header(stdout, width, &title, color)?;

    let text_width = (width as usize).saturating_sub(8).clamp(10, 90);
    let lines = session
        .current_sentence()
        .map(|s| wrap_text(s, text_width))
        .unwrap_or_default();
    let body_height = height.saturating_sub(4) as usize;
    let top = 2 + body_height.saturating_sub(lines.len()) / 2;
    let left = (width as usize).saturating_sub(text_width) / 2;

    for (i, line) in lines.iter().take(body_height).enumerate() {
        execute!(
            stdout,
            MoveTo(left as u16, (top + i) as u16),
            SetForegroundColor(ReaderTheme::text_primary()),
            Print(line),
            ResetColor
        )?;
    }

    // Boundary controls are drawn dimmed rather than hidden
    let nav_y = height.saturating_sub(2);
    let prev_color = if session.has_previous() { ReaderTheme::accent_text() } else { ReaderTheme::text_dim() };
    let next_color = if session.has_next() { ReaderTheme::accent_text() } else { ReaderTheme::text_dim() };
    execute!(
        stdout,
        MoveTo(2, nav_y),
        SetForegroundColor(prev_color),
        Print("<- Previous"),
        MoveTo(width.saturating_sub(10), nav_y),
        SetForegroundColor(next_color),
        Print("Next ->"),
        ResetColor
    )
}

fn render_alert(stdout: &mut io::Stdout, alert: &Alert, width: u16, height: u16) -> io::Result<()> {
    let box_width = (width as usize).saturating_sub(8).clamp(20, 60);
    let mut body = wrap_text(&alert.message, box_width.saturating_sub(4));
    body.push(String::new());
    body.push("Enter to dismiss".to_string());

    let box_height = body.len() + 3;
    let left = ((width as usize).saturating_sub(box_width) / 2) as u16;
    let top = ((height as usize).saturating_sub(box_height) / 2) as u16;

    execute!(stdout, SetBackgroundColor(ReaderTheme::alert_bg()), SetForegroundColor(ReaderTheme::text_primary()))?;
    execute!(
        stdout,
        MoveTo(left, top),
        SetAttribute(Attribute::Bold),
        Print(fit(&format!("  {}", alert.title), box_width)),
        SetAttribute(Attribute::Reset),
        SetBackgroundColor(ReaderTheme::alert_bg()),
        SetForegroundColor(ReaderTheme::text_primary())
    )?;
    execute!(stdout, MoveTo(left, top + 1), Print(" ".repeat(box_width)))?;
    for (i, line) in body.iter().enumerate() {
        execute!(
            stdout,
            MoveTo(left, top + 2 + i as u16),
            Print(fit(&format!("  {}", line), box_width))
        )?;
    }
    execute!(stdout, MoveTo(left, top + 2 + body.len() as u16), Print(" ".repeat(box_width)), ResetColor)
}

fn render_status_bar(stdout: &mut io::Stdout, status: &str, width: u16, height: u16) -> io::Result<()> {
    execute!(
        stdout,
        MoveTo(0, height - 1),
        SetBackgroundColor(ReaderTheme::bg_status()),
        SetForegroundColor(ReaderTheme::text_status()),
        Print(fit(status, width as usize)),
        ResetColor
    )
}

/// "3 / 12", or empty when nothing is loaded.
pub fn position_label(session: &ReadingSession) -> String {
    match session.sentences() {
        Some(sentences) if !sentences.is_empty() => format!("{} / {}", session.position() + 1, sentences.len()),
        _ => String::new(),
    }
}

pub fn status_line(session: &ReadingSession, screen: ScreenMode) -> String {
    let hints = match (screen, session.mode()) {
        (ScreenMode::Debug, _) => "Up/Down Scroll | Tab: Back | Ctrl+C: Quit",
        (ScreenMode::Session, ViewMode::Picker) if session.is_loading() => "Tab: Log | Ctrl+C: Quit",
        (ScreenMode::Session, ViewMode::Picker) => "Enter: Pick PDF | r: Resume | Tab: Log | q: Quit",
        (ScreenMode::Session, ViewMode::Reader) => "Left/Right: Navigate | Esc: Back | Tab: Log | q: Quit",
    };
    let name = match (screen, session.mode()) {
        (ScreenMode::Debug, _) => "DEBUG",
        (_, ViewMode::Picker) => "PICKER",
        (_, ViewMode::Reader) => "READER",
    };
    let state = if session.is_loading() { "Loading" } else { "Ready" };
    format!(" {} | {} | {} ", name, state, hints)
}

/// Greedy word wrap; words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: String = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            lines.push(head);
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() { word.chars().count() } else { current.chars().count() + 1 + word.chars().count() };
        if needed > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Pad or cut to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat(' ').take(width - len));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf_extraction::ExtractionMethod;
    use crate::segmenter::segment;
    use crate::session::{DocumentSource, LoadedDocument};

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_text("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
        assert_eq!(wrap_text("", 10), Vec::<String>::new());
    }

    #[test]
    fn splits_overlong_words() {
        assert_eq!(wrap_text("abcdefghij kl", 4), vec!["abcd", "efgh", "ij", "kl"]);
    }

    #[test]
    fn fit_pads_and_truncates() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 3), "abc");
    }

    #[test]
    fn position_label_is_one_based() {
        let mut session = ReadingSession::new();
        assert_eq!(position_label(&session), "");
        session.file_extracted(LoadedDocument {
            sentences: segment("A. B. C."),
            source: DocumentSource {
                file_name: "x.pdf".to_string(),
                size_bytes: None,
                method: ExtractionMethod::Demo,
                fallback_reason: None,
            },
        });
        session.next();
        assert_eq!(position_label(&session), "2 / 3");
        assert!(status_line(&session, ScreenMode::Session).starts_with(" READER | Ready"));
    }
}
