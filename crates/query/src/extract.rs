use crate::collaborators::DocumentExtractor;
use docqa_chunker::detect_file_type;
use std::path::Path;

/// Extensions read verbatim as UTF-8 text.
pub const PLAIN_TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "csv", "json", "html", "htm", "log", "rst",
];

/// Reads plain UTF-8 text files; everything else is unsupported.
#[derive(Debug, Clone, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    #[must_use]
    pub fn supports(path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        PLAIN_TEXT_EXTENSIONS.contains(&detect_file_type(name).as_str())
    }
}

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Option<String> {
        if !Self::supports(path) {
            log::error!("Unsupported file type: {}", path.display());
            return None;
        }
        log::info!("Starting ingestion for file: {}", path.display());
        match std::fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(err) => {
                log::error!("Error reading {}: {err}", path.display());
                None
            }
        }
    }
}
