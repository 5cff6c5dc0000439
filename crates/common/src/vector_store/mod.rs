//! Vector storage and nearest-neighbour queries
//!
//! `InMemoryVectorStore` keeps records in insertion order and answers top-k
//! queries by brute-force cosine distance. Stores can be written to and read
//! from a JSON snapshot, which is how the shared reference library is shipped
//! from the ingestion tool to the gateway.

use crate::errors::{AppError, Result};
use crate::models::{ChunkSource, HitOrigin, RetrievalHit};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

/// A stored chunk and its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub text: String,
    pub source: ChunkSource,
    pub vector: Vec<f32>,
}

/// Storage for chunk vectors
pub trait VectorStore: Send + Sync {
    /// Insert records; any id already present (or repeated in the batch) is rejected
    fn upsert(&mut self, records: Vec<VectorRecord>) -> Result<usize>;

    /// The `k` records closest to `vector`, ascending by cosine distance
    fn query(&self, vector: &[f32], k: usize) -> Vec<RetrievalHit>;

    /// Remove every record from one file, returning how many were dropped
    fn delete_source(&mut self, file_id: Uuid) -> usize;

    /// Number of stored records
    fn len(&self) -> usize;

    /// Distinct source files in insertion order
    fn sources(&self) -> Vec<ChunkSource>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    model: String,
    dimension: usize,
    records: Vec<VectorRecord>,
}

/// Brute-force in-memory store
#[derive(Debug, Clone)]
pub struct InMemoryVectorStore {
    records: Vec<VectorRecord>,
    ids: HashSet<String>,
    dimension: Option<usize>,
    origin: HitOrigin,
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new(HitOrigin::Session)
    }
}

impl InMemoryVectorStore {
    /// Create an empty store whose hits are tagged with `origin`
    pub fn new(origin: HitOrigin) -> Self {
        Self {
            records: Vec::new(),
            ids: HashSet::new(),
            dimension: None,
            origin,
        }
    }

    /// Vector dimension fixed by the first insert
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Write the store to a JSON snapshot
    pub fn save_snapshot(&self, path: &Path, model: &str) -> Result<()> {
        let snapshot = Snapshot {
            model: model.to_string(),
            dimension: self.dimension.unwrap_or(0),
            records: self.records.clone(),
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec(&snapshot)?;
        std::fs::write(path, json)?;

        tracing::info!(
            path = %path.display(),
            records = self.records.len(),
            model,
            "Vector snapshot written"
        );
        Ok(())
    }

    /// Load a snapshot built with the given embedding model and dimension
    pub fn load_snapshot(
        path: &Path,
        model: &str,
        dimension: usize,
        origin: HitOrigin,
    ) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;

        if snapshot.model != model {
            return Err(AppError::Configuration {
                message: format!(
                    "Snapshot {} was built with model {} but the embedder is {}",
                    path.display(),
                    snapshot.model,
                    model
                ),
            });
        }
        if !snapshot.records.is_empty() && snapshot.dimension != dimension {
            return Err(AppError::Configuration {
                message: format!(
                    "Snapshot {} has dimension {} but the embedder produces {}",
                    path.display(),
                    snapshot.dimension,
                    dimension
                ),
            });
        }

        let mut store = Self::new(origin);
        store.upsert(snapshot.records)?;

        tracing::info!(
            path = %path.display(),
            records = store.len(),
            "Vector snapshot loaded"
        );
        Ok(store)
    }
}

impl VectorStore for InMemoryVectorStore {
    fn upsert(&mut self, records: Vec<VectorRecord>) -> Result<usize> {
        let mut batch_ids = HashSet::new();
        let mut dimension = self.dimension;

        for record in &records {
            if self.ids.contains(&record.id) || !batch_ids.insert(record.id.as_str()) {
                return Err(AppError::Duplicate {
                    message: format!("chunk id {} already stored", record.id),
                });
            }
            match dimension {
                Some(d) if d != record.vector.len() => {
                    return Err(AppError::Validation {
                        message: format!(
                            "vector for {} has dimension {}, store expects {}",
                            record.id,
                            record.vector.len(),
                            d
                        ),
                        field: Some("vector".to_string()),
                    });
                }
                Some(_) => {}
                None => dimension = Some(record.vector.len()),
            }
        }

        let inserted = records.len();
        self.dimension = dimension;
        for record in records {
            self.ids.insert(record.id.clone());
            self.records.push(record);
        }
        Ok(inserted)
    }

    fn query(&self, vector: &[f32], k: usize) -> Vec<RetrievalHit> {
        if k == 0 || self.records.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f32, usize)> = self
            .records
            .iter()
            .enumerate()
            .map(|(position, record)| (1.0 - cosine_similarity(vector, &record.vector), position))
            .collect();

        // Stable sort keeps insertion order for equal distances
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        scored
            .into_iter()
            .take(k)
            .map(|(distance, position)| {
                let record = &self.records[position];
                RetrievalHit {
                    chunk_id: record.id.clone(),
                    text: record.text.clone(),
                    source: record.source.clone(),
                    distance,
                    origin: self.origin,
                }
            })
            .collect()
    }

    fn delete_source(&mut self, file_id: Uuid) -> usize {
        let before = self.records.len();
        let ids = &mut self.ids;
        self.records.retain(|record| {
            let keep = record.source.file_id != file_id;
            if !keep {
                ids.remove(&record.id);
            }
            keep
        });
        if self.records.is_empty() {
            self.dimension = None;
        }
        before - self.records.len()
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn sources(&self) -> Vec<ChunkSource> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.source.file_id))
            .map(|r| r.source.clone())
            .collect()
    }
}

/// Cosine similarity; mismatched or zero vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Merge hit lists by distance and keep the closest `k`
pub fn merge_hits(lists: Vec<Vec<RetrievalHit>>, k: usize) -> Vec<RetrievalHit> {
    let mut merged: Vec<RetrievalHit> = lists.into_iter().flatten().collect();
    merged.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
    merged.truncate(k);
    merged
}
