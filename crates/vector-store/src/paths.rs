use std::path::{Path, PathBuf};

pub const DEFAULT_STORE_DIR_NAME: &str = "vector_store";
pub const VECTORS_FILE_NAME: &str = "vectors.bin";
pub const PAYLOADS_FILE_NAME: &str = "payloads.json";

#[must_use]
pub fn vectors_path(store_dir: &Path) -> PathBuf {
    store_dir.join(VECTORS_FILE_NAME)
}

#[must_use]
pub fn payloads_path(store_dir: &Path) -> PathBuf {
    store_dir.join(PAYLOADS_FILE_NAME)
}

/// Sibling used for write-then-rename (`vectors.bin` -> `vectors.bin.tmp`).
#[must_use]
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
