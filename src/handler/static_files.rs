//! Static file serving module
//!
//! Maps request paths onto the serving root, keeps them inside it, and
//! answers with a file, an index file, a directory listing or a redirect.

use crate::config::AppState;
use crate::error::{Result, ServeError};
use crate::handler::listing;
use crate::handler::router::RequestContext;
use crate::http::{self, cache};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Request path decoded and normalized against the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    /// Segments below the root; never empty, `.` or `..`
    pub segments: Vec<String>,
    pub trailing_slash: bool,
}

impl RequestPath {
    /// Decode a raw URI path.
    ///
    /// `..` removes the previous segment and stops at the root, so the
    /// result never climbs above it lexically.
    pub fn parse(raw_path: &str) -> Result<Self> {
        let trailing_slash = raw_path.trim_end().ends_with('/');
        let decoded = urlencoding::decode(raw_path)
            .map_err(|e| ServeError::BadRequest(format!("path '{raw_path}' is not valid UTF-8: {e}")))?;

        let mut segments: Vec<String> = Vec::new();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                name => segments.push(name.to_string()),
            }
        }

        Ok(Self {
            segments,
            trailing_slash,
        })
    }

    /// Same path with `name` appended
    #[must_use]
    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self {
            segments,
            trailing_slash: false,
        }
    }

    pub fn to_fs_path(&self, root: &Path) -> PathBuf {
        self.segments
            .iter()
            .fold(root.to_path_buf(), |path, segment| path.join(segment))
    }
}

/// An existing path under the serving root
#[derive(Debug, Clone)]
pub struct ResolvedPath {
    /// Path as requested; drives the MIME lookup
    pub requested: PathBuf,
    /// Canonical location, inside the canonical root
    pub canonical: PathBuf,
    pub is_dir: bool,
}

/// Resolve `request` under `root`, rejecting anything that lands outside it
/// (including through symlinks).
pub async fn resolve(root: &Path, request: &RequestPath) -> Result<ResolvedPath> {
    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Serving root not found or inaccessible '{}': {e}",
                root.display()
            ));
            return Err(ServeError::NotFound);
        }
    };

    let requested = request.to_fs_path(root);
    // Missing files are the common case, no need to log them
    let canonical = fs::canonicalize(&requested)
        .await
        .map_err(|e| lookup_error(&requested, e))?;

    if !canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            requested.display(),
            canonical.display()
        ));
        return Err(ServeError::NotFound);
    }

    let metadata = fs::metadata(&canonical)
        .await
        .map_err(|e| lookup_error(&canonical, e))?;

    Ok(ResolvedPath {
        requested,
        canonical,
        is_dir: metadata.is_dir(),
    })
}

/// First configured index file present in the directory `request` names
pub async fn find_index(
    root: &Path,
    request: &RequestPath,
    index_files: &[String],
) -> Result<Option<ResolvedPath>> {
    for index_file in index_files {
        match resolve(root, &request.join(index_file)).await {
            Ok(resolved) if !resolved.is_dir => return Ok(Some(resolved)),
            Ok(_) | Err(ServeError::NotFound) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}

/// Serve the path in `ctx` from the configured root
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Result<Response<Full<Bytes>>> {
    let request = RequestPath::parse(ctx.path)?;
    let resolved = resolve(&state.config.serve.root_dir, &request).await?;

    if resolved.is_dir {
        return serve_directory(ctx, state, &request, &resolved).await;
    }

    // A file addressed like a directory
    if request.trailing_slash {
        return Err(ServeError::NotFound);
    }

    serve_file(ctx, state, &resolved).await
}

async fn serve_directory(
    ctx: &RequestContext<'_>,
    state: &AppState,
    request: &RequestPath,
    resolved: &ResolvedPath,
) -> Result<Response<Full<Bytes>>> {
    if !request.trailing_slash {
        return Ok(http::build_301_response(&redirect_location(ctx.path, ctx.query)));
    }

    let serve_config = &state.config.serve;
    if let Some(index) = find_index(&serve_config.root_dir, request, &serve_config.index_files).await? {
        return serve_file(ctx, state, &index).await;
    }

    if !serve_config.directory_listing {
        return Err(ServeError::NotFound);
    }

    let display_path = urlencoding::decode(ctx.path)
        .map_or_else(|_| ctx.path.to_string(), std::borrow::Cow::into_owned);
    match listing::render_listing(&resolved.canonical, &display_path).await {
        Ok(html) => Ok(http::build_html_response(html, ctx.is_head)),
        Err(e) => {
            logger::log_warning(&format!(
                "Cannot list directory '{}': {e}",
                resolved.canonical.display()
            ));
            Err(ServeError::NotFound)
        }
    }
}

async fn serve_file(
    ctx: &RequestContext<'_>,
    state: &AppState,
    resolved: &ResolvedPath,
) -> Result<Response<Full<Bytes>>> {
    let path = &resolved.canonical;
    let metadata = fs::metadata(path).await.map_err(|e| read_error(path, e))?;
    let modified = metadata.modified().ok();
    let last_modified = modified.map(cache::http_date);

    if let (Some(modified), Some(last_modified)) = (modified, last_modified.as_deref()) {
        if cache::is_not_modified(ctx.if_modified_since.as_deref(), ctx.has_if_none_match, modified) {
            return Ok(http::build_304_response(last_modified));
        }
    }

    let content = fs::read(path).await.map_err(|e| read_error(path, e))?;
    let content_type = state.policy.content_type(&resolved.requested);

    Ok(http::build_file_response(
        Bytes::from(content),
        content_type,
        last_modified.as_deref(),
        ctx.is_head,
    ))
}

/// `Location` for a directory requested without its trailing slash.
///
/// Leading slashes collapse to one: `//host/dir` would otherwise be a
/// network-path reference to another host.
pub fn redirect_location(raw_path: &str, query: Option<&str>) -> String {
    let path = raw_path.trim_start_matches('/');
    match query {
        Some(query) => format!("/{path}/?{query}"),
        None => format!("/{path}/"),
    }
}

/// Errors while locating a path: only permission problems are server errors
fn lookup_error(path: &Path, error: io::Error) -> ServeError {
    if error.kind() == io::ErrorKind::PermissionDenied {
        ServeError::ReadFailure {
            path: path.to_path_buf(),
            source: error,
        }
    } else {
        ServeError::NotFound
    }
}

/// Errors while reading a located file
fn read_error(path: &Path, error: io::Error) -> ServeError {
    if error.kind() == io::ErrorKind::NotFound {
        ServeError::NotFound
    } else {
        ServeError::ReadFailure {
            path: path.to_path_buf(),
            source: error,
        }
    }
}
