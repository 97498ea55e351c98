use crossterm::{
    cursor::MoveTo,
    execute,
    style::{Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

use crate::logging;
use crate::theme::ReaderTheme;

/// Scrollable view over the in-memory log buffer.
pub struct DebugPanel {
    pub scroll_offset: usize,
    /// Stick to the newest lines until the user scrolls up.
    pub follow: bool,
    visible_rows: usize,
}

impl DebugPanel {
    pub fn new() -> Self {
        Self {
            scroll_offset: 0,
            follow: true,
            visible_rows: 10,
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.follow = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max_scroll = logging::snapshot().len().saturating_sub(self.visible_rows);
        self.scroll_offset = (self.scroll_offset + lines).min(max_scroll);
        self.follow = self.scroll_offset == max_scroll;
    }

    /// Lines that fit in `rows`, honouring follow mode.
    pub fn visible_lines(&mut self, logs: &[String], rows: usize) -> Vec<String> {
        self.visible_rows = rows.max(1);
        let max_scroll = logs.len().saturating_sub(self.visible_rows);
        if self.follow || self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
        }
        logs.iter()
            .skip(self.scroll_offset)
            .take(self.visible_rows)
            .cloned()
            .collect()
    }

    pub fn render(&mut self, start_x: u16, start_y: u16, width: u16, height: u16) -> io::Result<()> {
        let mut stdout = io::stdout();
        let logs = logging::snapshot();
        let lines = self.visible_lines(&logs, height as usize);

        for y in 0..height {
            execute!(stdout, MoveTo(start_x, start_y + y))?;
            match lines.get(y as usize) {
                Some(line) => {
                    let shown: String = line.chars().take(width as usize).collect();
                    let color = if line.contains("ERROR") || line.contains("WARN") {
                        ReaderTheme::warning()
                    } else {
                        ReaderTheme::text_secondary()
                    };
                    execute!(
                        stdout,
                        SetForegroundColor(color),
                        Print(format!("{:<width$}", shown, width = width as usize)),
                        ResetColor
                    )?;
                }
                None => write!(stdout, "{:width$}", "", width = width as usize)?,
            }
        }

        stdout.flush()
    }
}

impl Default for DebugPanel {
    fn default() -> Self {
        Self::new()
    }
}
