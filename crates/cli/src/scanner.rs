use docqa_query::PlainTextExtractor;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Documents larger than this are skipped when walking directories.
const MAX_FILE_SIZE_BYTES: u64 = 20 * 1024 * 1024;

/// Expand ingest arguments into document paths.
///
/// Files are passed through as given so unsupported ones surface in the
/// ingest report. Directories are walked recursively, keeping supported
/// extensions and skipping hidden entries. Output is sorted per directory so
/// ingestion order is stable.
pub fn collect_documents(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut documents = Vec::new();
    for input in inputs {
        if input.is_dir() {
            documents.extend(scan_dir(input));
        } else {
            documents.push(input.clone());
        }
    }
    documents
}

fn scan_dir(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));

    for result in walker {
        match result {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                if let Ok(meta) = entry.metadata() {
                    if meta.len() > MAX_FILE_SIZE_BYTES {
                        log::debug!(
                            "Skipping large file {} ({} bytes > {})",
                            path.display(),
                            meta.len(),
                            MAX_FILE_SIZE_BYTES
                        );
                        continue;
                    }
                }
                if !PlainTextExtractor::supports(path) {
                    log::debug!("Skipping unsupported file {}", path.display());
                    continue;
                }
                files.push(path.to_path_buf());
            }
            Err(e) => log::warn!("Failed to read entry: {e}"),
        }
    }

    log::info!("Found {} documents under {}", files.len(), root.display());
    files
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}
