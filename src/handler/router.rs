//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, static file
//! dispatch, error mapping and the response policy.

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{self, HeaderMap, HeaderName};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Raw (still percent-encoded) URI path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<String>,
    pub has_if_none_match: bool,
}

impl<'a> RequestContext<'a> {
    pub fn from_parts(parts: &'a Parts) -> Self {
        Self {
            path: parts.uri.path(),
            query: parts.uri.query(),
            is_head: parts.method == Method::HEAD,
            if_modified_since: header_string(&parts.headers, &header::IF_MODIFIED_SINCE),
            has_if_none_match: parts.headers.contains_key(header::IF_NONE_MATCH),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Every response, errors included, leaves with the policy headers applied.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();

    let mut response = route_request(&parts, &state).await;
    state.policy.apply(&mut response);

    if state.config.logging.access_log {
        let entry = access_entry(&parts, &response, peer_addr, started);
        logger::log_access(&entry, state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn route_request(parts: &Parts, state: &AppState) -> Response<Full<Bytes>> {
    if let Some(resp) = check_http_method(&parts.method) {
        return resp;
    }

    let ctx = RequestContext::from_parts(parts);
    match static_files::serve(&ctx, state).await {
        Ok(response) => response,
        Err(err) => error_response(&err),
    }
}

/// Only GET and HEAD are served
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => {
            logger::log_warning(&format!("Method not implemented: {method}"));
            Some(http::build_501_response())
        }
    }
}

fn error_response(err: &ServeError) -> Response<Full<Bytes>> {
    match err {
        ServeError::NotFound => {}
        ServeError::BadRequest(_) => logger::log_warning(&err.to_string()),
        _ => logger::log_error(&err.to_string()),
    }
    http::build_error_response(err.status())
}

fn access_entry(
    parts: &Parts,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = version_label(parts.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.referer = header_string(&parts.headers, &header::REFERER);
    entry.user_agent = header_string(&parts.headers, &header::USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

fn header_string(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;

    fn state_for(root: &std::path::Path) -> Arc<AppState> {
        let mut config = Config::default();
        config.serve.root_dir = root.to_path_buf();
        Arc::new(AppState::new(config))
    }

    async fn call(state: &Arc<AppState>, method: Method, uri: &str) -> Response<Full<Bytes>> {
        let req = Request::builder().method(method).uri(uri).body(()).unwrap();
        handle_request(req, Arc::clone(state), "127.0.0.1:50000".parse().unwrap())
            .await
            .unwrap()
    }

    fn assert_isolated(response: &Response<Full<Bytes>>) {
        assert_eq!(
            response.headers()["cross-origin-embedder-policy"],
            "require-corp"
        );
        assert_eq!(response.headers()["cross-origin-opener-policy"], "same-origin");
    }

    #[tokio::test]
    async fn test_serves_file_with_policy() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.wasm"), b"\0asm\x01\0\0\0").unwrap();
        let state = state_for(dir.path());

        let response = call(&state, Method::GET, "/app.wasm").await;
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], "application/wasm");
        assert!(response.headers().contains_key("last-modified"));
        assert_isolated(&response);
    }

    #[tokio::test]
    async fn test_error_statuses_keep_policy() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path());

        let cases = [
            (Method::GET, "/missing.js", 404),
            (Method::POST, "/", 501),
            (Method::DELETE, "/app.wasm", 501),
            (Method::GET, "/%FF", 400),
        ];
        for (method, uri, status) in cases {
            let response = call(&state, method, uri).await;
            assert_eq!(response.status(), status, "{uri}");
            assert_isolated(&response);
        }
    }

    #[tokio::test]
    async fn test_directory_redirect_keeps_query() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("pkg")).unwrap();
        let state = state_for(dir.path());

        let response = call(&state, Method::GET, "/pkg?v=2").await;
        assert_eq!(response.status(), 301);
        assert_eq!(response.headers()["location"], "/pkg/?v=2");
        assert_isolated(&response);
    }

    #[tokio::test]
    async fn test_directory_redirect_never_leaves_host() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("evil.example")).unwrap();
        let state = state_for(dir.path());

        let response = call(&state, Method::GET, "//evil.example").await;
        assert_eq!(response.status(), 301);
        assert_eq!(response.headers()["location"], "/evil.example/");
        assert_isolated(&response);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_file_is_500_and_server_keeps_serving() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked.wasm");
        fs::write(&locked, b"\0asm").unwrap();
        fs::write(dir.path().join("open.js"), b"run()").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read(&locked).is_ok() {
            // Running as root: permission bits are not enforced
            return;
        }
        let state = state_for(dir.path());

        let response = call(&state, Method::GET, "/locked.wasm").await;
        assert_eq!(response.status(), 500);
        assert_isolated(&response);

        let response = call(&state, Method::GET, "/open.js").await;
        assert_eq!(response.status(), 200);
        assert_isolated(&response);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unsearchable_directory_is_500() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("index.html"), b"<p>hi</p>").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read(locked.join("index.html")).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }
        let state = state_for(dir.path());

        let response = call(&state, Method::GET, "/locked/").await;
        assert_eq!(response.status(), 500);
        assert_isolated(&response);

        // Restore so the temp dir can be removed
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        let response = call(&state, Method::GET, "/locked/").await;
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_listing_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.serve.root_dir = dir.path().to_path_buf();
        config.serve.directory_listing = false;
        let state = Arc::new(AppState::new(config));

        let response = call(&state, Method::GET, "/").await;
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_if_modified_since() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("style.css"), b"body{}").unwrap();
        let state = state_for(dir.path());

        let req = Request::builder()
            .uri("/style.css")
            .header("If-Modified-Since", "Fri, 01 Jan 2100 00:00:00 GMT")
            .body(())
            .unwrap();
        let response = handle_request(req, Arc::clone(&state), "127.0.0.1:50000".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 304);
        assert_isolated(&response);

        // If-None-Match disables the date check
        let req = Request::builder()
            .uri("/style.css")
            .header("If-Modified-Since", "Fri, 01 Jan 2100 00:00:00 GMT")
            .header("If-None-Match", "\"abc\"")
            .body(())
            .unwrap();
        let response = handle_request(req, state, "127.0.0.1:50000".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], "text/css");
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}
