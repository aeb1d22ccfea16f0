use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Result;
use tokio::fs;

const ENTRY_EXTENSION: &str = "json";

/// One persisted cache entry as seen by a directory scan.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub key: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

/// File tier of the cache: one `<key>.json` file per entry under `base_dir`.
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.resolve_path(key);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.base_dir).await?;
        fs::write(self.resolve_path(key), data).await?;
        Ok(())
    }

    /// Removes a file, treating an already-missing file as success.
    pub async fn remove(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn list(&self) -> Result<Vec<StoredFile>> {
        let mut dir = match fs::read_dir(&self.base_dir).await {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut files = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let metadata = match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => metadata,
                _ => continue,
            };
            files.push(StoredFile {
                key: key.to_string(),
                size: metadata.len(),
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                path,
            });
        }
        Ok(files)
    }

    /// Deletes every entry file, returning how many were removed.
    pub async fn clear(&self) -> Result<usize> {
        let files = self.list().await?;
        for file in &files {
            self.remove(&file.path).await?;
        }
        Ok(files.len())
    }

    pub fn resolve_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.{ENTRY_EXTENSION}"))
    }
}
