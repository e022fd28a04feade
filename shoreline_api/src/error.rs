//! Error types for communication with the backend, and for assembling
//! uploads client-side.

use std::error::Error;
use std::fmt;

/// Represents errors that can occur when attempting to communicate with the
/// file server.
#[derive(Debug)]
pub enum ApiError {
    /// The requested resource does not exist on the server.
    NotFound,
    /// The request was rejected by the server.
    Request(String),
    /// The server could not be reached, or the transfer failed.
    Http(reqwest::Error),
    /// The response could not be parsed into the expected shape.
    Parse(String),
    /// A local file could not be read.
    Io(std::io::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::NotFound => f.write_str("Not found on the server."),
            ApiError::Request(text) => write!(f, "Request rejected by the server: {}", text),
            ApiError::Http(e) => write!(f, "Unable to contact server: {}", e),
            ApiError::Parse(text) => write!(f, "Unexpected response from the server: {}", text),
            ApiError::Io(e) => write!(f, "Failed to read file: {}", e),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::Http(e) => Some(e),
            ApiError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(code) = error.status() {
            if code == reqwest::StatusCode::NOT_FOUND {
                return ApiError::NotFound;
            }
            return ApiError::Request(error.to_string());
        }

        ApiError::Http(error)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> ApiError {
        ApiError::Parse(error.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(error: std::io::Error) -> ApiError {
        ApiError::Io(error)
    }
}

/// Represents the errors that can occur when assembling an upload
/// client-side, before any network call is made.
#[derive(Debug)]
pub enum UploadError {
    /// The provided path does not exist.
    FileMissing(String),
    /// The provided path is a directory.
    IsDirectory(String),
    /// The file exceeds the configured size limit.
    TooLarge(String),
    /// The file name could not be read as UTF-8.
    FileNameError(String),
    /// A private upload was requested without any allowed viewers.
    EmptyAllowList,
    /// The workflow was started without any files selected.
    NoFilesSelected,
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UploadError::FileMissing(path) => write!(f, "File `{}` doesn't exist.", path),
            UploadError::IsDirectory(path) => write!(f, "`{}` is a directory, not a file.", path),
            UploadError::TooLarge(path) => {
                write!(f, "File `{}` exceeds the upload size limit.", path)
            }
            UploadError::FileNameError(path) => {
                write!(f, "Failed to parse the file name of `{}`.", path)
            }
            UploadError::EmptyAllowList => {
                f.write_str("Please add at least one email address for private files.")
            }
            UploadError::NoFilesSelected => f.write_str("No files selected for upload."),
        }
    }
}

impl Error for UploadError {}
