use async_trait::async_trait;
use thiserror::Error;

use crate::domain::pages::{Page, PageTitle};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("page `{title}` not found")]
    NotFound { title: String },
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl RepoError {
    pub fn not_found(title: &PageTitle) -> Self {
        Self::NotFound {
            title: title.to_string(),
        }
    }

    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[async_trait]
pub trait PagesRepo: Send + Sync {
    /// Read the stored body for `title`.
    async fn load_page(&self, title: &PageTitle) -> Result<Page, RepoError>;

    /// Replace the stored body of `page.title` with `page.body`.
    async fn save_page(&self, page: &Page) -> Result<(), RepoError>;
}
