//! Request path validation.
//!
//! Page routes follow the shape `/{action}/{title}` where the action is one
//! of `view`, `edit` or `save` and the title is `[a-zA-Z0-9]+`. This is the
//! only place a title is taken from user input, so anything that gets past
//! it is safe to use as a filename stem.

use std::fmt;

use thiserror::Error;

use super::pages::PageTitle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    View,
    Edit,
    Save,
}

impl PageAction {
    pub const ALL: [PageAction; 3] = [PageAction::View, PageAction::Edit, PageAction::Save];

    pub fn as_str(self) -> &'static str {
        match self {
            PageAction::View => "view",
            PageAction::Edit => "edit",
            PageAction::Save => "save",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == segment)
    }

    /// Location of this action for the given title, e.g. `/view/Home`.
    pub fn href(self, title: &PageTitle) -> String {
        format!("/{}/{}", self.as_str(), title)
    }
}

impl fmt::Display for PageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePath {
    pub action: PageAction,
    pub title: PageTitle,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid page path `{path}`")]
pub struct PathError {
    pub path: String,
}

impl PathError {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

/// Match `path` against `^/(edit|save|view)/([a-zA-Z0-9]+)$`.
pub fn extract_title(path: &str) -> Result<PagePath, PathError> {
    let rest = path.strip_prefix('/').ok_or_else(|| PathError::new(path))?;
    let (segment, title) = rest.split_once('/').ok_or_else(|| PathError::new(path))?;

    let action = PageAction::from_segment(segment).ok_or_else(|| PathError::new(path))?;
    let title = PageTitle::new(title).map_err(|_| PathError::new(path))?;

    Ok(PagePath { action, title })
}

/// Whether `path` is in the page route namespace, valid or not.
pub fn is_page_route(path: &str) -> bool {
    PageAction::ALL.into_iter().any(|action| {
        path.strip_prefix('/')
            .and_then(|rest| rest.strip_prefix(action.as_str()))
            .is_some_and(|rest| rest.starts_with('/'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_action_and_title() {
        let parsed = extract_title("/view/FrontPage").expect("valid path");
        assert_eq!(parsed.action, PageAction::View);
        assert_eq!(parsed.title.as_str(), "FrontPage");

        let parsed = extract_title("/save/abc123").expect("valid path");
        assert_eq!(parsed.action, PageAction::Save);
        assert_eq!(parsed.title.as_str(), "abc123");
    }

    #[test]
    fn rejects_paths_outside_the_pattern() {
        let rejected = [
            "",
            "/",
            "view/Home",
            "/view",
            "/view/",
            "/view/Home/",
            "/view/Home/extra",
            "/view/../secret",
            "/view/a.txt",
            "/view/Home%2F",
            "/delete/Home",
            "/View/Home",
            "//view/Home",
        ];
        for path in rejected {
            assert_eq!(
                extract_title(path),
                Err(PathError {
                    path: path.to_string()
                }),
                "`{path}` should be rejected"
            );
        }
    }

    #[test]
    fn page_route_namespace() {
        assert!(is_page_route("/view/"));
        assert!(is_page_route("/edit/a.b"));
        assert!(is_page_route("/save/x/y"));
        assert!(!is_page_route("/view"));
        assert!(!is_page_route("/viewer/x"));
        assert!(!is_page_route("/"));
        assert!(!is_page_route("/hello"));
    }

    #[test]
    fn href_builds_route() {
        let title = PageTitle::new("Home").expect("valid title");
        assert_eq!(PageAction::Edit.href(&title), "/edit/Home");
    }
}
