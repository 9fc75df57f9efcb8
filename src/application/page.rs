use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};

use crate::application::error::HttpError;
use crate::application::repos::{PagesRepo, RepoError};
use crate::domain::pages::{Page, PageTitle};

const SOURCE: &str = "application::page::PageService";

pub(crate) const PAGE_SAVE_TOTAL: &str = "plainwiki_page_save_total";
pub(crate) const PAGE_SAVE_FAILED_TOTAL: &str = "plainwiki_page_save_failed_total";
pub(crate) const PAGE_LOAD_MISS_TOTAL: &str = "plainwiki_page_load_miss_total";

#[derive(Clone)]
pub struct PageService {
    pages: Arc<dyn PagesRepo>,
}

impl PageService {
    pub fn new(pages: Arc<dyn PagesRepo>) -> Self {
        Self { pages }
    }

    pub async fn load(&self, title: &PageTitle) -> Result<Page, RepoError> {
        let result = self.pages.load_page(title).await;
        if let Err(RepoError::NotFound { .. }) = &result {
            counter!(PAGE_LOAD_MISS_TOTAL).increment(1);
        }
        result
    }

    /// Load a page, treating a page that was never saved as an empty one.
    pub async fn load_or_empty(&self, title: &PageTitle) -> Result<Page, HttpError> {
        match self.load(title).await {
            Ok(page) => Ok(page),
            Err(RepoError::NotFound { .. }) => {
                debug!(target = "plainwiki::pages", title = %title, "page not found, using empty body");
                Ok(Page::empty(title.clone()))
            }
            Err(err) => Err(HttpError::internal(SOURCE, &err)),
        }
    }

    pub async fn save(&self, page: &Page) -> Result<(), HttpError> {
        match self.pages.save_page(page).await {
            Ok(()) => {
                counter!(PAGE_SAVE_TOTAL).increment(1);
                debug!(
                    target = "plainwiki::pages",
                    title = %page.title,
                    bytes = page.body.len(),
                    "page saved"
                );
                Ok(())
            }
            Err(err) => {
                counter!(PAGE_SAVE_FAILED_TOTAL).increment(1);
                warn!(target = "plainwiki::pages", title = %page.title, error = %err, "page save failed");
                Err(HttpError::internal(SOURCE, &err))
            }
        }
    }
}
