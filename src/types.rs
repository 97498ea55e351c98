// Core types and errors for readerchunks
use serde::{Deserialize, Serialize};

// App state flags using bitflags
bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AppFlags: u8 {
        const EXIT        = 0b0001;
        const REDRAW      = 0b0010;
        const OPEN_PICKER = 0b0100;
    }
}

/// Classified reason an extraction attempt failed.
///
/// Every backend error is converted to one of these before it reaches the
/// reading session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    FileNotFound,
    EncryptedDocument,
    NoExtractableText,
    BackendUnavailable,
    Unknown,
}

impl ErrorKind {
    /// Message shown to the user in the blocking alert.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::FileNotFound => "The selected file could not be found or opened.",
            ErrorKind::EncryptedDocument => {
                "This PDF is password protected. Remove the protection and try again."
            }
            ErrorKind::NoExtractableText => {
                "No text could be extracted. The PDF may contain only scanned images."
            }
            ErrorKind::BackendUnavailable => {
                "The extraction service is unavailable. Check your connection and try again."
            }
            ErrorKind::Unknown => "The PDF could not be processed.",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::FileNotFound => "file not found",
            ErrorKind::EncryptedDocument => "encrypted document",
            ErrorKind::NoExtractableText => "no extractable text",
            ErrorKind::BackendUnavailable => "backend unavailable",
            ErrorKind::Unknown => "unknown error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// Error types
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error in {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Rejected file {name:?}: {reason}")]
    RejectedFile { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ReaderError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_kind_has_its_own_message() {
        let kinds = [
            ErrorKind::FileNotFound,
            ErrorKind::EncryptedDocument,
            ErrorKind::NoExtractableText,
            ErrorKind::BackendUnavailable,
            ErrorKind::Unknown,
        ];
        let messages: HashSet<_> = kinds.iter().map(|k| k.user_message()).collect();
        assert_eq!(messages.len(), kinds.len());
        assert_ne!(
            ErrorKind::EncryptedDocument.user_message(),
            ErrorKind::FileNotFound.user_message()
        );
    }

    #[test]
    fn flags_toggle() {
        let mut flags = AppFlags::REDRAW;
        flags.insert(AppFlags::EXIT);
        flags.remove(AppFlags::REDRAW);
        assert!(flags.contains(AppFlags::EXIT));
        assert!(!flags.contains(AppFlags::REDRAW));
    }
}
