//! Per-request scratch directories
//!
//! A [`Workspace`] owns `<root>/<request id>/`. The external tool writes into
//! its `media/` subdirectory; archives are built next to it. The directory
//! tree is removed when the guard is dropped, so every exit path cleans up,
//! including a response body that is dropped halfway through streaming.

mod archive;
mod resolve;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub use archive::zip_directory;
pub use resolve::{Artifact, locate_single, package_playlist};

const MEDIA_DIR: &str = "media";

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("workspace i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("playlist produced no files")]
    EmptyPlaylist,

    #[error("no '{0}' file was produced")]
    MissingFile(&'static str),
}

/// Scratch directory guard for one request
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    /// Create (or wipe and recreate) the workspace for `id`
    pub async fn create_with_id(root: &Path, id: Uuid) -> Result<Self, WorkspaceError> {
        // Guard exists before any directory does, so a failure below still cleans up.
        let workspace = Self {
            dir: root.join(id.to_string()),
        };

        match tokio::fs::remove_dir_all(&workspace.dir).await {
            Ok(()) => warn!(path = %workspace.dir.display(), "Removed leftover workspace"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        tokio::fs::create_dir_all(workspace.media_dir()).await?;

        debug!(path = %workspace.dir.display(), "Workspace created");
        Ok(workspace)
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Where the external tool writes its output
    pub fn media_dir(&self) -> PathBuf {
        self.dir.join(MEDIA_DIR)
    }
}

impl Drop for Workspace {
    /// Inside a runtime the tree is removed on the blocking pool so a large
    /// playlist does not stall a worker thread.
    fn drop(&mut self) {
        let dir = std::mem::take(&mut self.dir);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_tree(&dir));
            }
            Err(_) => remove_tree(&dir),
        }
    }
}

fn remove_tree(dir: &Path) {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => debug!(path = %dir.display(), "Workspace removed"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!(path = %dir.display(), error = %err, "Failed to remove workspace"),
    }
}

/// Remove workspaces left behind by a previous process.
///
/// Only directories named like a request id are touched; anything else in
/// `root` is left alone. Returns the number of directories removed.
pub async fn purge_stale(root: &Path) -> Result<usize, WorkspaceError> {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err.into()),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let is_request_dir = entry
            .file_name()
            .to_str()
            .is_some_and(|name| Uuid::parse_str(name).is_ok());
        if is_request_dir && entry.file_type().await?.is_dir() {
            tokio::fs::remove_dir_all(entry.path()).await?;
            removed += 1;
        }
    }

    if removed > 0 {
        info!(root = %root.display(), removed, "Purged stale workspaces");
    }
    Ok(removed)
}
