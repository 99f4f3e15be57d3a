//! HTTP protocol layer module
//!
//! Response builders, MIME resolution, cache validators and the response
//! policy, kept apart from filesystem access.

pub mod cache;
pub mod mime;
pub mod policy;
pub mod response;

// Re-export commonly used types
pub use policy::ResponsePolicy;
pub use response::{
    build_301_response, build_304_response, build_501_response, build_error_response,
    build_file_response, build_html_response,
};
