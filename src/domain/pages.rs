use std::fmt;

use super::error::DomainError;

/// Name of a page. Restricted to ASCII letters and digits, which keeps it
/// usable verbatim as a filename stem.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PageTitle(String);

impl PageTitle {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        if raw.is_empty() {
            return Err(DomainError::EmptyTitle);
        }
        if !raw.bytes().all(|byte| byte.is_ascii_alphanumeric()) {
            return Err(DomainError::invalid_title(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filename the page body is persisted under.
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.0)
    }
}

impl fmt::Display for PageTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub title: PageTitle,
    pub body: Vec<u8>,
}

impl Page {
    pub fn new(title: PageTitle, body: impl Into<Vec<u8>>) -> Self {
        Self {
            title,
            body: body.into(),
        }
    }

    /// A page that has never been saved.
    pub fn empty(title: PageTitle) -> Self {
        Self {
            title,
            body: Vec::new(),
        }
    }

    /// Body decoded for display. Invalid UTF-8 sequences are replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_alphanumeric_titles() {
        let title = PageTitle::new("FrontPage2").expect("valid title");
        assert_eq!(title.as_str(), "FrontPage2");
        assert_eq!(title.file_name(), "FrontPage2.txt");
    }

    #[test]
    fn rejects_empty_title() {
        assert_eq!(PageTitle::new(""), Err(DomainError::EmptyTitle));
    }

    #[test]
    fn rejects_traversal_and_separators() {
        for raw in ["..", "a.b", "a/b", "a b", "über", "a-b"] {
            assert!(
                matches!(PageTitle::new(raw), Err(DomainError::InvalidTitle { .. })),
                "`{raw}` should be rejected"
            );
        }
    }

    #[test]
    fn body_text_replaces_invalid_utf8() {
        let title = PageTitle::new("Bytes").expect("valid title");
        let page = Page::new(title, vec![b'o', b'k', 0xff]);
        assert_eq!(page.body_text(), "ok\u{fffd}");
    }
}
