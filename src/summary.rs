// User-visible summary shown after each successful extraction
use crate::session::DocumentSource;

const UNKNOWN_SIZE: &str = "Unknown";

/// `bytes / 1024 / 1024` with two decimals.
pub fn format_size(size_bytes: Option<u64>) -> String {
    match size_bytes {
        Some(bytes) => format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0),
        None => UNKNOWN_SIZE.to_string(),
    }
}

pub fn method_indicator(source: &DocumentSource) -> &'static str {
    if source.is_fallback() {
        "fallback"
    } else {
        source.method.label()
    }
}

pub fn extraction_summary(source: &DocumentSource, sentence_count: usize) -> String {
    let mut lines = vec![
        format!("File: {}", source.file_name),
        format!("Size: {}", format_size(source.size_bytes)),
        format!("Sentences: {}", sentence_count),
        format!("Extraction: {}", method_indicator(source)),
    ];
    if let Some(reason) = source.fallback_reason {
        lines.push(format!(
            "Warning: showing substitute text, {} extraction failed ({})",
            source.method, reason
        ));
    }
    lines.join("\n")
}
