//! Models for the database schema

#![allow(unused_qualifications)]

use super::schema::*;
use diesel::prelude::*;

/// One of the user's own uploads, cached locally so the dashboard can still
/// render something when the backend is unreachable.
#[derive(Queryable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = cached_files)]
pub struct CachedFile {
    /// Identifier assigned by the backend on upload
    pub id: i64,
    /// Original name of the file
    pub file_name: String,
    /// MIME type of the file
    pub file_type: String,
    /// When the file was uploaded
    pub uploaded_at: String,
    /// Size of the file in bytes
    pub size: i64,
    /// Whether the file is publicly visible
    pub is_public: bool,
    /// The share link handed out on upload
    pub share_link: String,
}
