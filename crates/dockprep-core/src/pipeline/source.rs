//! Cache-first retrieval of deposited structures.

use crate::pipeline::error::PrepError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_BASE_URL: &str = "https://files.rcsb.org/view";
const DEFAULT_CACHE_DIR: &str = "./pdb";
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// The result of resolving a structure identifier to a local file.
///
/// Carries a path reference, never the file content: deposited structures
/// run to megabytes and downstream consumers only need the location.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadedStructure {
    /// The normalized (lowercase) identifier.
    pub id: String,
    /// Absolute path of the cached file.
    pub path: PathBuf,
    /// Size of the file in bytes.
    pub size: u64,
    /// Whether the file was already present in the cache.
    pub cache_hit: bool,
    /// Human-readable summary of what happened.
    pub message: String,
}

/// Resolves 4-character structure identifiers against a local cache,
/// fetching from the public repository on a miss.
#[derive(Debug, Clone)]
pub struct StructureSource {
    cache_dir: PathBuf,
    base_url: String,
    timeout: Duration,
}

impl Default for StructureSource {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DOWNLOAD_TIMEOUT,
        }
    }
}

impl StructureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the cache directory (default `./pdb`).
    pub fn with_cache_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cache_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Overrides the repository base URL.
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Overrides the download timeout (default 30 s).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves an identifier to a local file, downloading it on a cache
    /// miss.
    ///
    /// Repeated calls with the same identifier are idempotent: after the
    /// first success the cached file is returned without any network
    /// access.
    ///
    /// # Errors
    ///
    /// [`PrepError::InvalidIdentifier`] if the identifier is not exactly 4
    /// characters after trimming; [`PrepError::DownloadFailed`] on any
    /// transport error; [`PrepError::Preparation`] if the cache cannot be
    /// written.
    pub fn download(&self, id: &str) -> Result<DownloadedStructure, PrepError> {
        let id = id.trim().to_ascii_lowercase();
        if id.len() != 4 {
            return Err(PrepError::InvalidIdentifier(id));
        }

        let file_path = self.cache_dir.join(format!("{id}.pdb"));
        let abs_path = std::path::absolute(&file_path)?;

        if file_path.exists() {
            let size = fs::metadata(&file_path)?.len();
            info!(%id, path = %file_path.display(), size, "structure cache hit");
            return Ok(DownloadedStructure {
                message: format!(
                    "Structure {id} already exists at {} (skipped download).",
                    abs_path.display()
                ),
                id,
                path: abs_path,
                size,
                cache_hit: true,
            });
        }

        let url = format!("{}/{id}.pdb", self.base_url);
        debug!(%id, %url, "downloading structure");

        let body = self.fetch(&url).map_err(|source| PrepError::DownloadFailed {
            id: id.clone(),
            source,
        })?;

        fs::create_dir_all(&self.cache_dir)?;
        // Atomic persist: a crash mid-write must not leave a truncated file
        // that a later cache-hit check would trust.
        let mut temp = tempfile::NamedTempFile::new_in(&self.cache_dir)?;
        std::io::Write::write_all(&mut temp, body.as_bytes())?;
        temp.persist(&file_path).map_err(|e| e.error)?;

        let size = body.len() as u64;
        info!(%id, path = %file_path.display(), size, "structure downloaded");

        Ok(DownloadedStructure {
            message: format!(
                "Successfully downloaded structure {id} to {}.",
                abs_path.display()
            ),
            id,
            path: abs_path,
            size,
            cache_hit: false,
        })
    }

    fn fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        client.get(url).send()?.error_for_status()?.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_is_normalized_and_validated() {
        let source = StructureSource::new();
        assert!(matches!(
            source.download("1ie"),
            Err(PrepError::InvalidIdentifier(id)) if id == "1ie"
        ));
        assert!(matches!(
            source.download("  toolong  "),
            Err(PrepError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn cache_hit_skips_the_network_entirely() {
        let dir = tempfile::tempdir().unwrap();
        let cached = dir.path().join("1iep.pdb");
        fs::write(&cached, "CACHED PDB CONTENT").unwrap();

        // An unroutable base URL proves no network request is attempted.
        let source = StructureSource::new()
            .with_cache_dir(dir.path())
            .with_base_url("http://127.0.0.1:1");

        let result = source.download(" 1IEP ").unwrap();
        assert_eq!(result.id, "1iep");
        assert!(result.cache_hit);
        assert_eq!(result.size, "CACHED PDB CONTENT".len() as u64);
        assert!(result.path.is_absolute());
        assert!(result.message.contains("skipped download"));
    }

    #[test]
    fn download_failure_is_a_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = StructureSource::new()
            .with_cache_dir(dir.path())
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(Duration::from_millis(500));

        match source.download("1iep") {
            Err(PrepError::DownloadFailed { id, .. }) => assert_eq!(id, "1iep"),
            other => panic!("expected DownloadFailed, got {other:?}"),
        }
        // Nothing was cached on failure.
        assert!(!dir.path().join("1iep.pdb").exists());
    }
}
