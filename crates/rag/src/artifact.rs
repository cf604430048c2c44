//! Index artifact persistence
//!
//! The artifact is a pair of co-located files:
//! - vector collection (`faqs.index`): little-endian binary, header + rows
//! - metadata collection (`metadata.json`): manifest + per-record metadata
//!
//! Row `i` of the vector file and `records[i]` of the metadata describe the
//! same record. The manifest carries the SHA-256 of the vector file, so a
//! metadata file paired with a different vector file is rejected on load.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use voice_faq_config::IndexConfig;
use voice_faq_core::RecordMetadata;

use crate::RagError;

/// Vector file magic
const MAGIC: &[u8; 4] = b"FAQV";

/// Bumped on any layout change; old artifacts must be rebuilt
pub const FORMAT_VERSION: u32 = 1;

/// magic + version + dimension + count
const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// Locations of the two artifact files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPaths {
    pub dir: PathBuf,
    pub vectors: PathBuf,
    pub metadata: PathBuf,
}

impl IndexPaths {
    pub fn new(
        dir: impl Into<PathBuf>,
        vectors_file: impl AsRef<Path>,
        metadata_file: impl AsRef<Path>,
    ) -> Self {
        let dir = dir.into();
        Self {
            vectors: dir.join(vectors_file),
            metadata: dir.join(metadata_file),
            dir,
        }
    }

    /// Default file names inside `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let defaults = IndexConfig::default();
        Self::new(dir, &defaults.vectors_file, &defaults.metadata_file)
    }

    /// Paths from settings, optionally overriding the directory
    pub fn from_config(config: &IndexConfig, dir: Option<&Path>) -> Self {
        let dir = dir.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(&config.dir));
        Self::new(dir, &config.vectors_file, &config.metadata_file)
    }
}

/// Contents of the metadata file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub format_version: u32,
    /// Embedding provider the vectors came from
    pub provider: String,
    pub dimension: usize,
    pub count: usize,
    /// Hex SHA-256 of the vector file bytes
    pub vectors_sha256: String,
    pub records: Vec<RecordMetadata>,
}

/// In-memory artifact: aligned vectors and metadata
#[derive(Debug, Clone, PartialEq)]
pub struct IndexArtifact {
    pub provider: String,
    pub dimension: usize,
    /// Row-major, `records.len() * dimension` values
    pub vectors: Vec<f32>,
    pub records: Vec<RecordMetadata>,
}

impl IndexArtifact {
    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write both files, each via a temp file renamed into place.
    ///
    /// Vectors land first; a reader racing the swap fails the checksum
    /// instead of pairing new vectors with old metadata.
    pub fn write(&self, paths: &IndexPaths) -> Result<(), RagError> {
        if self.vectors.len() != self.records.len() * self.dimension {
            return Err(RagError::CorruptIndex(format!(
                "{} values for {} records of dimension {}",
                self.vectors.len(),
                self.records.len(),
                self.dimension
            )));
        }

        std::fs::create_dir_all(&paths.dir).map_err(|e| RagError::OutputWrite {
            path: paths.dir.clone(),
            message: e.to_string(),
        })?;

        let vector_bytes = self.encode_vectors();
        let manifest = IndexManifest {
            format_version: FORMAT_VERSION,
            provider: self.provider.clone(),
            dimension: self.dimension,
            count: self.records.len(),
            vectors_sha256: sha256_hex(&vector_bytes),
            records: self.records.clone(),
        };
        let mut metadata_bytes =
            serde_json::to_vec_pretty(&manifest).map_err(|e| RagError::OutputWrite {
                path: paths.metadata.clone(),
                message: e.to_string(),
            })?;
        metadata_bytes.push(b'\n');

        write_replace(&paths.dir, &paths.vectors, &vector_bytes)?;
        write_replace(&paths.dir, &paths.metadata, &metadata_bytes)?;

        tracing::debug!(
            vectors = %paths.vectors.display(),
            metadata = %paths.metadata.display(),
            records = self.records.len(),
            "Index artifact written"
        );

        Ok(())
    }

    /// Read and cross-check both files
    pub fn read(paths: &IndexPaths) -> Result<Self, RagError> {
        for path in [&paths.vectors, &paths.metadata] {
            if !path.is_file() {
                return Err(RagError::IndexNotFound(path.clone()));
            }
        }

        let vector_bytes = std::fs::read(&paths.vectors)?;
        let metadata_bytes = std::fs::read(&paths.metadata)?;

        let manifest: IndexManifest = serde_json::from_slice(&metadata_bytes)
            .map_err(|e| RagError::CorruptIndex(format!("metadata: {}", e)))?;

        if manifest.format_version != FORMAT_VERSION {
            return Err(RagError::CorruptIndex(format!(
                "metadata format version {} (expected {})",
                manifest.format_version, FORMAT_VERSION
            )));
        }

        let actual_sha = sha256_hex(&vector_bytes);
        if actual_sha != manifest.vectors_sha256 {
            return Err(RagError::CorruptIndex(format!(
                "vector file checksum {} does not match metadata ({})",
                actual_sha, manifest.vectors_sha256
            )));
        }

        let (dimension, count, vectors) = decode_vectors(&vector_bytes)?;

        if dimension != manifest.dimension
            || count != manifest.count
            || count != manifest.records.len()
        {
            return Err(RagError::CorruptIndex(format!(
                "vector file has {} x {}, metadata declares {} x {} with {} records",
                count,
                dimension,
                manifest.count,
                manifest.dimension,
                manifest.records.len()
            )));
        }

        Ok(Self {
            provider: manifest.provider,
            dimension,
            vectors,
            records: manifest.records,
        })
    }

    fn encode_vectors(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.vectors.len() * 4);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.records.len() as u64).to_le_bytes());
        for value in &self.vectors {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }
}

fn decode_vectors(bytes: &[u8]) -> Result<(usize, usize, Vec<f32>), RagError> {
    if bytes.len() < HEADER_LEN || &bytes[0..4] != MAGIC {
        return Err(RagError::CorruptIndex(
            "vector file header is missing or invalid".to_string(),
        ));
    }

    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != FORMAT_VERSION {
        return Err(RagError::CorruptIndex(format!(
            "vector format version {} (expected {})",
            version, FORMAT_VERSION
        )));
    }

    let dimension = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    let mut count_bytes = [0u8; 8];
    count_bytes.copy_from_slice(&bytes[12..20]);
    let count = u64::from_le_bytes(count_bytes) as usize;

    let body = &bytes[HEADER_LEN..];
    let expected = count
        .checked_mul(dimension)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| RagError::CorruptIndex("vector file header overflows".to_string()))?;
    if body.len() != expected {
        return Err(RagError::CorruptIndex(format!(
            "vector body is {} bytes, header implies {}",
            body.len(),
            expected
        )));
    }

    let vectors = body
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok((dimension, count, vectors))
}

fn write_replace(dir: &Path, target: &Path, bytes: &[u8]) -> Result<(), RagError> {
    let output_err = |e: std::io::Error| RagError::OutputWrite {
        path: target.to_path_buf(),
        message: e.to_string(),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(output_err)?;
    tmp.write_all(bytes).map_err(output_err)?;
    tmp.as_file().sync_all().map_err(output_err)?;
    tmp.persist(target).map_err(|e| output_err(e.error))?;
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
