use anyhow::{anyhow, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

const MAX_NAME_ATTEMPTS: u32 = 100;

/// Stores uploaded wish media as flat files under a single directory.
///
/// Filenames are produced by `app::uploads::stored_filename` and are already
/// sanitized, so they never contain path separators.
#[derive(Clone, Debug)]
pub struct LocalMediaStore {
    dir: PathBuf,
}

impl LocalMediaStore {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Upload directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Writes `data` under `filename`, or under `rename(2)`, `rename(3)`, ...
    /// when that name is already taken. Never overwrites an existing file.
    /// Returns the name actually used once the whole file is on disk.
    pub async fn save_unique<F>(&self, filename: &str, data: &[u8], rename: F) -> Result<String>
    where
        F: Fn(u32) -> String,
    {
        let mut candidate = filename.to_string();

        for attempt in 2..=MAX_NAME_ATTEMPTS + 1 {
            match self.create_new(&candidate, data).await {
                Ok(()) => return Ok(candidate),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    warn!(file_name = %candidate, "upload name taken, trying another");
                    candidate = rename(attempt);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(anyhow!("no free upload name for {}", filename))
    }

    async fn create_new(&self, filename: &str, data: &[u8]) -> std::io::Result<()> {
        let path = self.file_path(filename);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        let written = async {
            file.write_all(data).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %cleanup, "failed to remove partial upload");
            }
            return Err(e);
        }

        info!(path = %path.display(), bytes = data.len(), "stored upload");
        Ok(())
    }

    pub async fn remove(&self, filename: &str) -> Result<()> {
        let path = self.file_path(filename);
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(path = %path.display(), "removed upload");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "upload already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
