//! API response types.

use axum::{
    Json,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use foodgram_core::{Listing, PageRequest};
use serde::{Deserialize, Serialize};

/// `page` / `limit` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    /// Resolve against the configured default page size.
    #[must_use]
    pub fn resolve(&self, default_limit: u64) -> PageRequest {
        PageRequest::resolve(self.page, self.limit, default_limit)
    }
}

/// Paginated list envelope.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T: Serialize> Paginated<T> {
    /// Wrap a listing, linking neighbouring pages of the request URI.
    #[must_use]
    pub fn new(listing: Listing<T>, page: PageRequest, base_url: &str, uri: &Uri) -> Self {
        let has_next = page.page.saturating_mul(page.limit) < listing.count;
        let link = |n: u64| page_link(base_url, uri, n);

        Self {
            count: listing.count,
            next: has_next.then(|| link(page.page + 1)),
            previous: (page.page > 1).then(|| link(page.page - 1)),
            results: listing.results,
        }
    }
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Rebuild `uri` under `base_url` with its `page` parameter set to `page`.
fn page_link(base_url: &str, uri: &Uri, page: u64) -> String {
    let page_param = format!("page={page}");
    let mut params: Vec<&str> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|p| !p.is_empty() && *p != "page" && !p.starts_with("page="))
        .collect();
    params.push(&page_param);

    format!(
        "{}{}?{}",
        base_url.trim_end_matches('/'),
        uri.path(),
        params.join("&")
    )
}

/// 201 with a JSON body.
pub fn created<T: Serialize>(body: T) -> Response {
    (StatusCode::CREATED, Json(body)).into_response()
}

/// Empty success response.
#[must_use]
pub fn ok() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
