use std::fmt;
use std::time::Instant;

use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use metrics::histogram;
use thiserror::Error;

use crate::application::error::HttpError;
use crate::domain::pages::Page;
use crate::domain::path::PageAction;

pub(crate) const RENDER_MS: &str = "plainwiki_render_ms";

/// The fixed set of page templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTemplate {
    View,
    Edit,
}

impl PageTemplate {
    pub fn name(self) -> &'static str {
        match self {
            PageTemplate::View => "view",
            PageTemplate::Edit => "edit",
        }
    }
}

impl fmt::Display for PageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("template `{template}` failed to render: {error}")]
pub struct TemplateRenderError {
    pub(crate) template: PageTemplate,
    #[source]
    pub(crate) error: AskamaError,
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        HttpError::internal("presentation::views::render_page", &err)
    }
}

#[derive(Clone, Debug)]
pub struct PageView {
    pub title: String,
    pub body: String,
    pub edit_href: String,
    pub save_href: String,
}

impl From<&Page> for PageView {
    fn from(page: &Page) -> Self {
        Self {
            title: page.title.to_string(),
            body: page.body_text(),
            edit_href: PageAction::Edit.href(&page.title),
            save_href: PageAction::Save.href(&page.title),
        }
    }
}

#[derive(Template)]
#[template(path = "view.html")]
pub struct ViewTemplate<'a> {
    pub view: &'a PageView,
}

#[derive(Template)]
#[template(path = "edit.html")]
pub struct EditTemplate<'a> {
    pub view: &'a PageView,
}

/// Render `page` through the named template.
///
/// Output is produced into an owned buffer; callers only ever see a complete
/// document or an error.
pub fn render_page(template: PageTemplate, page: &Page) -> Result<Html<String>, TemplateRenderError> {
    let view = PageView::from(page);
    let started = Instant::now();
    let rendered = match template {
        PageTemplate::View => ViewTemplate { view: &view }.render(),
        PageTemplate::Edit => EditTemplate { view: &view }.render(),
    };
    histogram!(RENDER_MS, "template" => template.name())
        .record(started.elapsed().as_secs_f64() * 1000.0);

    rendered
        .map(Html)
        .map_err(|error| TemplateRenderError { template, error })
}

pub fn render_page_response(template: PageTemplate, page: &Page) -> Response {
    match render_page(template, page) {
        Ok(html) => (StatusCode::OK, html).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}
