//! Flat-file page storage: one `<title>.txt` per page under a root directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;
use uuid::Uuid;

use crate::application::repos::{PagesRepo, RepoError};
use crate::domain::pages::{Page, PageTitle};

#[derive(Debug, Error)]
pub enum PageStorageError {
    #[error("page `{title}` has no stored file")]
    NotFound { title: String },
    #[error("failed to read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write `{}`: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Filesystem-backed page storage.
#[derive(Debug)]
pub struct PageStorage {
    root: PathBuf,
}

impl PageStorage {
    /// Initialise storage rooted at the provided directory, creating it if necessary.
    pub fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of the file backing `title`.
    pub fn path_for(&self, title: &PageTitle) -> PathBuf {
        self.root.join(title.file_name())
    }

    pub async fn read(&self, title: &PageTitle) -> Result<Vec<u8>, PageStorageError> {
        let path = self.path_for(title);
        match fs::read(&path).await {
            Ok(body) => Ok(body),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(PageStorageError::NotFound {
                title: title.to_string(),
            }),
            Err(source) => Err(PageStorageError::Read { path, source }),
        }
    }

    /// Replace the body stored for `title`.
    ///
    /// The body is written to a uniquely named sibling file which is then
    /// renamed over the target, so concurrent writers never interleave and
    /// readers see either the old or the new body.
    pub async fn write(&self, title: &PageTitle, body: &[u8]) -> Result<(), PageStorageError> {
        let target = self.path_for(title);
        let staging = self
            .root
            .join(format!(".{}.{}.tmp", title.file_name(), Uuid::new_v4()));

        if let Err(source) = write_private_file(&staging, body).await {
            let _ = fs::remove_file(&staging).await;
            return Err(PageStorageError::Write {
                path: target,
                source,
            });
        }

        if let Err(source) = fs::rename(&staging, &target).await {
            let _ = fs::remove_file(&staging).await;
            return Err(PageStorageError::Write {
                path: target,
                source,
            });
        }

        debug!(
            target = "plainwiki::storage",
            path = %target.display(),
            bytes = body.len(),
            "page file replaced"
        );
        Ok(())
    }
}

// Owner read/write only.
async fn write_private_file(path: &Path, body: &[u8]) -> Result<(), std::io::Error> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(body).await?;
    file.sync_all().await?;
    Ok(())
}

#[async_trait]
impl PagesRepo for PageStorage {
    async fn load_page(&self, title: &PageTitle) -> Result<Page, RepoError> {
        match self.read(title).await {
            Ok(body) => Ok(Page::new(title.clone(), body)),
            Err(PageStorageError::NotFound { .. }) => Err(RepoError::not_found(title)),
            Err(err) => Err(RepoError::from_persistence(err)),
        }
    }

    async fn save_page(&self, page: &Page) -> Result<(), RepoError> {
        self.write(&page.title, &page.body)
            .await
            .map_err(RepoError::from_persistence)
    }
}
