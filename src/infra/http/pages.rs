use std::borrow::Cow;

use axum::{
    extract::{Form, FromRequest, FromRequestParts, Query, Request, State},
    http::{
        HeaderMap, HeaderValue, Method, StatusCode, Uri,
        header::{ALLOW, CONTENT_TYPE, LOCATION},
        request::Parts,
    },
    response::{IntoResponse, Response},
};
use axum_extra::extract::Multipart;
use bytes::Bytes;
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use tracing::debug;

use crate::{
    application::error::HttpError,
    domain::{
        pages::Page,
        path::{PageAction, PagePath, extract_title, is_page_route},
    },
    presentation::views::{PageTemplate, render_page_response},
};

use super::HttpState;

const SOURCE: &str = "infra::http::pages";
const URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";
const BODY_FIELD: &str = "body";
const READ_METHODS: &str = "GET, HEAD";
const SAVE_METHODS: &str = "POST";

/// A request path that passed page-route validation.
///
/// The path is percent-decoded first, so `/view/%46oo` names `Foo`. Rejects
/// with `404 page not found` before the method is looked at.
#[derive(Debug, Clone)]
pub struct ValidPagePath(pub PagePath);

impl<S> FromRequestParts<S> for ValidPagePath
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_title(&decoded_path(&parts.uri))
            .map(Self)
            .map_err(|err| HttpError::not_found("infra::http::pages::ValidPagePath", err.to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct SaveForm {
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveEncoding {
    UrlEncoded,
    Multipart,
    Other,
}

impl SaveEncoding {
    fn of(headers: &HeaderMap) -> Self {
        let mime = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|mime| mime.trim().to_ascii_lowercase());

        match mime.as_deref() {
            Some(URLENCODED) => Self::UrlEncoded,
            Some(MULTIPART) => Self::Multipart,
            _ => Self::Other,
        }
    }
}

pub(super) async fn view_page(
    State(state): State<HttpState>,
    ValidPagePath(path): ValidPagePath,
    method: Method,
) -> Response {
    if !is_read(&method) {
        return method_not_allowed(&method, READ_METHODS);
    }

    match state.pages.load_or_empty(&path.title).await {
        Ok(page) => render_page_response(PageTemplate::View, &page),
        Err(err) => err.into_response(),
    }
}

pub(super) async fn edit_page(
    State(state): State<HttpState>,
    ValidPagePath(path): ValidPagePath,
    method: Method,
) -> Response {
    if !is_read(&method) {
        return method_not_allowed(&method, READ_METHODS);
    }

    match state.pages.load(&path.title).await {
        Ok(page) => render_page_response(PageTemplate::Edit, &page),
        Err(err) => {
            debug!(
                target = "plainwiki::http::pages",
                title = %path.title,
                error = %err,
                "edit target could not be loaded, redirecting"
            );
            found(PageAction::Edit.href(&path.title))
        }
    }
}

pub(super) async fn save_page(
    State(state): State<HttpState>,
    ValidPagePath(path): ValidPagePath,
    request: Request,
) -> Response {
    if request.method() != Method::POST {
        return method_not_allowed(request.method(), SAVE_METHODS);
    }

    let content = match read_save_body(request).await {
        Ok(content) => content,
        Err(err) => return err.into_response(),
    };
    let page = Page::new(path.title, content);

    match state.pages.save(&page).await {
        Ok(()) => found(PageAction::View.href(&page.title)),
        Err(err) => err.into_response(),
    }
}

/// Catch-all for paths outside the page routes.
pub(super) async fn greet(uri: Uri) -> Response {
    let path = decoded_path(&uri);
    if is_page_route(&path) {
        return HttpError::not_found(
            "infra::http::pages::greet",
            format!("invalid page path `{path}`"),
        )
        .into_response();
    }

    let name = path.strip_prefix('/').unwrap_or(&path);
    format!("Hi there, I love {name}!").into_response()
}

fn decoded_path(uri: &Uri) -> Cow<'_, str> {
    percent_decode_str(uri.path()).decode_utf8_lossy()
}

fn is_read(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}

fn found(location: String) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

fn method_not_allowed(method: &Method, allow: &'static str) -> Response {
    let mut response = HttpError::new(
        SOURCE,
        StatusCode::METHOD_NOT_ALLOWED,
        "405 method not allowed",
        format!("{method} is not allowed on page routes"),
    )
    .into_response();
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static(allow));
    response
}

/// Read the `body` field of a save request.
///
/// A url-encoded or multipart body wins over the query string; a missing
/// field on both sides is an empty page. Any other non-empty body is refused
/// rather than silently saved as nothing.
async fn read_save_body(request: Request) -> Result<Vec<u8>, HttpError> {
    let from_query = Query::<SaveForm>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(form)| form.body)
        .map(String::into_bytes);

    let from_body = match SaveEncoding::of(request.headers()) {
        SaveEncoding::UrlEncoded => {
            let Form(form) = Form::<SaveForm>::from_request(request, &())
                .await
                .map_err(|rejection| {
                    HttpError::from_error(SOURCE, rejection.status(), rejection.body_text(), &rejection)
                })?;
            form.body.map(String::into_bytes)
        }
        SaveEncoding::Multipart => {
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(|rejection| {
                    HttpError::from_error(SOURCE, rejection.status(), rejection.body_text(), &rejection)
                })?;
            multipart_field(multipart, BODY_FIELD).await?
        }
        SaveEncoding::Other => {
            let content_type = request
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("none")
                .to_string();
            let body = Bytes::from_request(request, &())
                .await
                .map_err(|rejection| {
                    HttpError::from_error(SOURCE, rejection.status(), rejection.body_text(), &rejection)
                })?;
            if !body.is_empty() {
                return Err(HttpError::new(
                    SOURCE,
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "415 unsupported media type",
                    format!("cannot read a page body from content type `{content_type}`"),
                ));
            }
            None
        }
    };

    Ok(from_body.or(from_query).unwrap_or_default())
}

/// First non-file part named `name`; file parts never count as form values.
async fn multipart_field(mut multipart: Multipart, name: &str) -> Result<Option<Vec<u8>>, HttpError> {
    let multipart_error = |err: axum_extra::extract::multipart::MultipartError| {
        HttpError::from_error(SOURCE, err.status(), err.body_text(), &err)
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some(name) && field.file_name().is_none() {
            let value = field.bytes().await.map_err(multipart_error)?;
            return Ok(Some(value.to_vec()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn save_encoding_follows_content_type() {
        assert_eq!(
            SaveEncoding::of(&headers_with("application/x-www-form-urlencoded; charset=utf-8")),
            SaveEncoding::UrlEncoded
        );
        assert_eq!(
            SaveEncoding::of(&headers_with("Multipart/Form-Data; boundary=XX")),
            SaveEncoding::Multipart
        );
        assert_eq!(SaveEncoding::of(&headers_with("text/plain")), SaveEncoding::Other);
        assert_eq!(SaveEncoding::of(&HeaderMap::new()), SaveEncoding::Other);
    }

    #[test]
    fn paths_are_percent_decoded() {
        let uri: Uri = "/view/%46oo".parse().expect("uri");
        assert_eq!(decoded_path(&uri), "/view/Foo");

        let uri: Uri = "/hello%20world".parse().expect("uri");
        assert_eq!(decoded_path(&uri), "/hello world");
    }

    #[test]
    fn decoded_separators_still_fail_validation() {
        let uri: Uri = "/view/..%2Fsecret".parse().expect("uri");
        assert!(extract_title(&decoded_path(&uri)).is_err());
    }

    #[test]
    fn head_counts_as_a_read() {
        assert!(is_read(&Method::GET));
        assert!(is_read(&Method::HEAD));
        assert!(!is_read(&Method::POST));
    }
}
