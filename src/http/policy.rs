//! Response policy
//!
//! Headers stamped onto every response plus the MIME override table. The
//! static file routine consults it but knows nothing about its contents.

use hyper::header::{HeaderName, HeaderValue};
use hyper::Response;
use std::path::Path;

use super::mime;

pub const CROSS_ORIGIN_EMBEDDER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-embedder-policy");
pub const CROSS_ORIGIN_OPENER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-opener-policy");

#[derive(Debug, Clone)]
pub struct ResponsePolicy {
    headers: Vec<(HeaderName, HeaderValue)>,
    mime_overrides: Vec<(&'static str, &'static str)>,
}

impl ResponsePolicy {
    pub const fn new(
        headers: Vec<(HeaderName, HeaderValue)>,
        mime_overrides: Vec<(&'static str, &'static str)>,
    ) -> Self {
        Self {
            headers,
            mime_overrides,
        }
    }

    /// COEP `require-corp` + COOP `same-origin`, which browsers require
    /// before exposing `SharedArrayBuffer`.
    pub fn cross_origin_isolated() -> Self {
        Self::new(
            vec![
                (
                    CROSS_ORIGIN_EMBEDDER_POLICY,
                    HeaderValue::from_static("require-corp"),
                ),
                (
                    CROSS_ORIGIN_OPENER_POLICY,
                    HeaderValue::from_static("same-origin"),
                ),
            ],
            mime::WASM_BUNDLE_OVERRIDES.to_vec(),
        )
    }

    pub fn headers(&self) -> &[(HeaderName, HeaderValue)] {
        &self.headers
    }

    pub fn content_type(&self, path: &Path) -> &'static str {
        mime::get_content_type(path, &self.mime_overrides)
    }

    /// Stamp the policy headers onto `response`, replacing existing values
    pub fn apply<B>(&self, response: &mut Response<B>) {
        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
    }
}

impl Default for ResponsePolicy {
    fn default() -> Self {
        Self::cross_origin_isolated()
    }
}
