//! MIME type detection module
//!
//! Returns the Content-Type for a file path: literal suffix overrides first,
//! then the default extension map.

use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Overrides needed to run a WebAssembly bundle in the browser.
///
/// Matched against the literal, case-sensitive end of the file name.
pub const WASM_BUNDLE_OVERRIDES: [(&str, &str); 5] = [
    (".wasm", "application/wasm"),
    (".js", "text/javascript"),
    (".css", "text/css"),
    (".ttf", "application/font-sfnt"),
    (".svg", "image/svg+xml"),
];

/// Look up `path` in an override table
pub fn find_override(path: &Path, overrides: &[(&'static str, &'static str)]) -> Option<&'static str> {
    let name = path.file_name()?.to_string_lossy();
    overrides
        .iter()
        .find(|(suffix, _)| name.ends_with(suffix))
        .map(|(_, content_type)| *content_type)
}

/// Default extension-based guess
///
/// # Examples
/// ```
/// use std::path::Path;
/// use wasm_serve::http::mime::guess_content_type;
/// assert_eq!(guess_content_type(Path::new("photo.png")), "image/png");
/// assert_eq!(guess_content_type(Path::new("no-extension")), "application/octet-stream");
/// ```
pub fn guess_content_type(path: &Path) -> &'static str {
    mime_guess::from_path(path).first_raw().unwrap_or(OCTET_STREAM)
}

/// Content-Type for `path`, honoring `overrides` before the default map
pub fn get_content_type(path: &Path, overrides: &[(&'static str, &'static str)]) -> &'static str {
    find_override(path, overrides).unwrap_or_else(|| guess_content_type(path))
}
