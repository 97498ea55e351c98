// Screen mode management - the session screens or the debug log

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenMode {
    #[default]
    Session, // Picker or reader, whichever the session is in
    Debug,   // Full screen debug output
}

impl ScreenMode {
    pub fn toggle(self) -> Self {
        match self {
            ScreenMode::Session => ScreenMode::Debug,
            ScreenMode::Debug => ScreenMode::Session,
        }
    }
}
