use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("page title is empty")]
    EmptyTitle,
    #[error("page title `{title}` contains a character outside [a-zA-Z0-9]")]
    InvalidTitle { title: String },
}

impl DomainError {
    pub fn invalid_title(title: impl Into<String>) -> Self {
        Self::InvalidTitle {
            title: title.into(),
        }
    }
}
