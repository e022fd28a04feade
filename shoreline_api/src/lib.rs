//! HTTP client for the shoreline file sharing backend.
//!
//! All business logic (authentication, storage, access-control enforcement,
//! persistence) lives server-side. This crate wraps the REST surface and
//! carries the little client-side state that exists: the visibility
//! resolution for share links, the upload workflow, and the admin console's
//! locally patched lists.

#![warn(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    deprecated
)]

pub mod admin;
mod auth;
mod error;
mod files;
mod messages;
pub mod models;
pub mod upload;
pub mod validation;
pub mod visibility;

pub use error::{ApiError, UploadError};
pub use files::UploadRequest;

/// User agent presented to the backend.
pub(crate) const APP_USER_AGENT: &str = concat!("shoreline/", env!("CARGO_PKG_VERSION"));

/// A handle on the backend, shared by every view that needs one.
///
/// Construction is cheap; the underlying `reqwest::Client` pools
/// connections internally.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    /// Create a client for the backend at `server_address`
    /// (e.g. `http://localhost:2518`).
    pub fn new(server_address: &str) -> ApiClient {
        ApiClient {
            http: reqwest::Client::new(),
            base: server_address.trim_end_matches('/').to_owned(),
        }
    }

    /// The backend address this client talks to, without a trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}
