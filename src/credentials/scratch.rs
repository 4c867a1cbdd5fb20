use std::path::{Path, PathBuf};

use anyhow::Context;
use uuid::Uuid;

/// An uploaded credential file persisted under the upload directory.
///
/// Every upload gets its own file name and the file is removed when the
/// guard is dropped, whichever way the request ends. Error messages leave
/// the path out since they reach HTTP clients; it is logged instead.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub async fn persist(dir: &Path, bytes: &[u8]) -> anyhow::Result<Self> {
        let path = dir.join(format!("credential-{}.json", Uuid::new_v4()));
        // Guard first so a partial write is still cleaned up.
        let scratch = Self { path };
        if let Err(e) = tokio::fs::write(&scratch.path, bytes).await {
            tracing::error!(path = %scratch.path.display(), "failed to write credential file: {}", e);
            return Err(e).context("failed to save uploaded credential file");
        }
        tracing::debug!(path = %scratch.path.display(), "credential file saved");
        Ok(scratch)
    }

    #[cfg(test)]
    fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> anyhow::Result<Vec<u8>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                tracing::error!(path = %self.path.display(), "failed to read credential file: {}", e);
                Err(e).context("failed to read uploaded credential file")
            }
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "credential file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                "failed to remove credential file: {}",
                e
            ),
        }
    }
}
