use crate::codec::{decode_vectors, encode_vectors, peek_vectors_generation};
use crate::error::{Result, VectorStoreError};
use crate::flat_index::FlatIndex;
use crate::paths::{payloads_path, tmp_path, vectors_path};
use crate::payloads::{decode_payloads, encode_payloads, peek_payloads_generation};
use crate::types::SearchHit;
use crate::vector::normalized;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Ordered store of `(unit vector, payload)` pairs with exact search and
/// two-artifact persistence.
///
/// `search` only reads, so a shared reference can be searched from many
/// threads. `add`, `clear` and `save` take `&mut self`; interleaving them with
/// searches is the caller's job (a lock or a single owning task).
#[derive(Debug)]
pub struct VectorIndex {
    index: FlatIndex,
    payloads: Vec<String>,
    store_dir: Option<PathBuf>,
    generation: u64,
}

struct LoadedStore {
    index: FlatIndex,
    payloads: Vec<String>,
    generation: u64,
}

impl VectorIndex {
    /// Open the store at `store_dir`, loading persisted artifacts when they
    /// are present and agree with `dimension`.
    ///
    /// Missing, torn or corrupt artifacts, or a stored dimension different
    /// from `dimension`, leave the index empty (logged as a warning).
    pub fn open(dimension: usize, store_dir: impl AsRef<Path>) -> Result<Self> {
        ensure_dimension(dimension)?;
        let store_dir = store_dir.as_ref().to_path_buf();
        log::info!("Opening VectorIndex (dim {dimension}) at {store_dir:?}");
        fs::create_dir_all(&store_dir)?;

        let mut this = Self {
            index: FlatIndex::new(dimension),
            payloads: Vec::new(),
            store_dir: Some(store_dir.clone()),
            generation: 0,
        };

        match Self::load(dimension, &store_dir) {
            Ok(Some(loaded)) => {
                log::info!(
                    "Loaded existing vector index with {} vectors (generation {})",
                    loaded.payloads.len(),
                    loaded.generation
                );
                this.index = loaded.index;
                this.payloads = loaded.payloads;
                this.generation = loaded.generation;
            }
            Ok(None) => {
                log::info!("No existing index found. Initializing a new one.");
                this.generation = persisted_generation(&store_dir);
            }
            Err(err) => {
                log::warn!("Failed to load vector store at {store_dir:?}: {err}. Re-initializing.");
                // Later saves must not reuse a generation still stamped on a
                // leftover artifact, or a torn pair could look consistent.
                this.generation = persisted_generation(&store_dir);
            }
        }

        Ok(this)
    }

    /// Index without a store location; `save` always fails.
    pub fn in_memory(dimension: usize) -> Result<Self> {
        ensure_dimension(dimension)?;
        Ok(Self {
            index: FlatIndex::new(dimension),
            payloads: Vec::new(),
            store_dir: None,
            generation: 0,
        })
    }

    fn load(dimension: usize, store_dir: &Path) -> Result<Option<LoadedStore>> {
        let vectors_file = vectors_path(store_dir);
        let payloads_file = payloads_path(store_dir);

        match (vectors_file.exists(), payloads_file.exists()) {
            (false, false) => return Ok(None),
            (true, false) => {
                return Err(VectorStoreError::corrupt("payload artifact is missing"));
            }
            (false, true) => {
                return Err(VectorStoreError::corrupt("vector artifact is missing"));
            }
            (true, true) => {}
        }

        let decoded = decode_vectors(&fs::read(&vectors_file)?)?;
        if decoded.dimension != dimension {
            return Err(VectorStoreError::corrupt(format!(
                "stored index dimension ({}) differs from configured dimension ({dimension})",
                decoded.dimension
            )));
        }

        let (payload_generation, payloads) = decode_payloads(&fs::read(&payloads_file)?)?;
        if payloads.len() != decoded.count {
            return Err(VectorStoreError::corrupt(format!(
                "{} vectors but {} payloads",
                decoded.count,
                payloads.len()
            )));
        }
        if payload_generation != decoded.generation {
            return Err(VectorStoreError::corrupt(format!(
                "torn store: vectors from generation {}, payloads from generation {payload_generation}",
                decoded.generation
            )));
        }

        let index = FlatIndex::from_values(dimension, decoded.count, decoded.values)?;
        Ok(Some(LoadedStore {
            index,
            payloads,
            generation: decoded.generation,
        }))
    }

    /// Append vectors with their payloads.
    ///
    /// Rejects the whole batch, without mutating anything, when the counts
    /// differ or any vector has the wrong dimension. Each vector is stored
    /// normalized; the caller's buffers are left as they are.
    pub fn add(&mut self, vectors: &[Vec<f32>], payloads: &[String]) -> Result<()> {
        if vectors.len() != payloads.len() {
            return Err(VectorStoreError::CountMismatch {
                vectors: vectors.len(),
                payloads: payloads.len(),
            });
        }

        let dimension = self.dimension();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(VectorStoreError::InvalidDimension {
                expected: dimension,
                actual: bad.len(),
            });
        }

        if vectors.is_empty() {
            return Ok(());
        }

        let rows: Vec<Vec<f32>> = vectors.iter().map(|v| normalized(v)).collect();
        self.index.append(&rows)?;
        self.payloads.extend_from_slice(payloads);

        log::info!(
            "Added {} new vectors to the index. Total: {}",
            rows.len(),
            self.len()
        );
        Ok(())
    }

    /// Exact k-nearest-neighbour search by cosine similarity.
    ///
    /// Returns at most `k` hits ordered by descending score; equal scores
    /// keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let dimension = self.dimension();
        if query.len() != dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: dimension,
                actual: query.len(),
            });
        }

        if self.is_empty() {
            log::warn!("Search attempted on an empty index.");
            return Ok(Vec::new());
        }

        let query = normalized(query);
        let neighbors = self.index.search(&query, k)?;

        let hits: Vec<SearchHit> = neighbors
            .into_iter()
            .map(|(position, score)| SearchHit {
                score: score.clamp(-1.0, 1.0),
                position,
                payload: self.payloads[position].clone(),
            })
            .collect();

        log::debug!("Found {} results (k = {k})", hits.len());
        Ok(hits)
    }

    /// Persist both artifacts.
    ///
    /// Each artifact is written to a temporary sibling, synced and renamed
    /// into place. Both carry the same generation, so an interrupted save is
    /// detected on the next `open`. On failure the in-memory index is
    /// unchanged.
    pub fn save(&mut self) -> Result<()> {
        let Some(store_dir) = self.store_dir.clone() else {
            return Err(VectorStoreError::SaveFailed(
                "index has no store location".to_string(),
            ));
        };

        let generation = self.generation.wrapping_add(1);
        log::info!("Saving VectorIndex to {store_dir:?}");
        if let Err(err) = self.write_artifacts(&store_dir, generation) {
            log::error!("Failed to save index or payloads: {err}");
            return Err(VectorStoreError::SaveFailed(err.to_string()));
        }
        self.generation = generation;

        log::info!(
            "Saved {} vectors and payloads to {store_dir:?}",
            self.len()
        );
        Ok(())
    }

    fn write_artifacts(&self, store_dir: &Path, generation: u64) -> Result<()> {
        fs::create_dir_all(store_dir)?;

        let vector_bytes = encode_vectors(
            self.dimension(),
            self.len(),
            generation,
            self.index.values(),
        )?;
        let payload_bytes = encode_payloads(generation, &self.payloads)?;

        let vectors_file = vectors_path(store_dir);
        let payloads_file = payloads_path(store_dir);
        let vectors_tmp = tmp_path(&vectors_file);
        let payloads_tmp = tmp_path(&payloads_file);

        let staged = write_synced(&vectors_tmp, &vector_bytes)
            .and_then(|()| write_synced(&payloads_tmp, &payload_bytes));
        if let Err(err) = staged {
            let _ = fs::remove_file(&vectors_tmp);
            let _ = fs::remove_file(&payloads_tmp);
            return Err(err.into());
        }

        if let Err(err) = fs::rename(&payloads_tmp, &payloads_file) {
            let _ = fs::remove_file(&vectors_tmp);
            let _ = fs::remove_file(&payloads_tmp);
            return Err(err.into());
        }
        if let Err(err) = fs::rename(&vectors_tmp, &vectors_file) {
            let _ = fs::remove_file(&vectors_tmp);
            return Err(err.into());
        }

        // Make the renames durable where the platform allows syncing a directory.
        if let Ok(dir) = File::open(store_dir) {
            let _ = dir.sync_all();
        }
        Ok(())
    }

    /// Drop every entry. Persisted artifacts are untouched until `save`.
    pub fn clear(&mut self) {
        self.index.clear();
        self.payloads.clear();
    }

    #[must_use]
    pub fn payloads(&self) -> &[String] {
        &self.payloads
    }

    #[must_use]
    pub fn payload(&self, position: usize) -> Option<&str> {
        self.payloads.get(position).map(String::as_str)
    }

    /// Stored (normalized) vector at `position`
    #[must_use]
    pub fn vector(&self, position: usize) -> Option<Vec<f32>> {
        self.index.row(position).map(|row| row.to_vec())
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.index.dimension()
    }

    #[must_use]
    pub fn store_dir(&self) -> Option<&Path> {
        self.store_dir.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

/// Highest generation readable from either artifact header, 0 when none is.
fn persisted_generation(store_dir: &Path) -> u64 {
    let vectors = fs::read(vectors_path(store_dir))
        .ok()
        .and_then(|bytes| peek_vectors_generation(&bytes));
    let payloads = fs::read(payloads_path(store_dir))
        .ok()
        .and_then(|bytes| peek_payloads_generation(&bytes));
    vectors.max(payloads).unwrap_or(0)
}

fn ensure_dimension(dimension: usize) -> Result<()> {
    if dimension == 0 {
        return Err(VectorStoreError::InvalidConfig(
            "vector dimension must be > 0".to_string(),
        ));
    }
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
