//! Persistence sink for uploaded media.
//!
//! Files are written under the configured directory, keyed by a sanitised form of the client
//! filename, and served back at `/static/uploads/<name>`. A later upload with the same name
//! overwrites the earlier one. Nothing is ever deleted.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::{config::UploadConfig, errors::Error};

/// URL prefix the upload directory is served under.
pub const PUBLIC_PREFIX: &str = "/static/uploads";

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

/// Where a saved upload lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub path: PathBuf,
    pub file_name: String,
}

impl StoredUpload {
    pub fn public_url(&self) -> String {
        format!("{PUBLIC_PREFIX}/{}", self.file_name)
    }
}

impl UploadStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` under the sanitised `name`, creating the directory if needed.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn save(&self, bytes: &[u8], name: &str) -> Result<StoredUpload, Error> {
        let file_name = sanitize_file_name(name);
        let path = self.dir.join(&file_name);

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| Error::Internal {
            operation: format!("create upload directory {}: {e}", self.dir.display()),
        })?;
        tokio::fs::write(&path, bytes).await.map_err(|e| Error::Internal {
            operation: format!("write upload {}: {e}", path.display()),
        })?;

        debug!(path = %path.display(), "Saved upload");
        Ok(StoredUpload { path, file_name })
    }
}

/// Last path component of `name` with anything outside `[A-Za-z0-9._-]` replaced by `_`.
///
/// Names that end up empty or made only of dots become `upload`.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();

    if cleaned.chars().all(|c| c == '.') {
        "upload".to_string()
    } else {
        cleaned
    }
}
