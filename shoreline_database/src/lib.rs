//! Local cache of the user's own uploads for the shoreline client.
//!
//! The backend owns the authoritative file registry; this cache only backs
//! the `files` view when the backend cannot be reached.

#![warn(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    deprecated
)]

pub mod models;
#[doc(hidden)]
#[allow(missing_docs)]
pub mod schema;

use diesel::prelude::*;
pub use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub use crate::models::CachedFile;

/// migration to initalise the database
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Create a new connection to the database
pub fn establish_connection(
    database_url: &str,
) -> Result<SqliteConnection, Box<dyn std::error::Error + Send + Sync + 'static>> {
    let mut conn = SqliteConnection::establish(database_url)?;
    conn.exclusive_transaction(move |conn| conn.run_pending_migrations(MIGRATIONS).map(|_| ()))?;
    Ok(conn)
}

/// Insert a newly uploaded file into the cache
pub fn insert_cached_file(
    conn: &mut SqliteConnection,
    file: &CachedFile,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    use schema::cached_files;

    diesel::insert_into(cached_files::table)
        .values(file)
        .execute(conn)?;

    Ok(())
}

/// Attempt to find a cached file by its backend-assigned ID
pub fn get_cached_file(
    conn: &mut SqliteConnection,
    search_id: i64,
) -> Result<Option<CachedFile>, Box<dyn std::error::Error + Send + Sync + 'static>> {
    use schema::cached_files::dsl::*;
    let mut f = cached_files
        .filter(id.eq(search_id))
        .load::<CachedFile>(conn)?;

    if f.is_empty() {
        Ok(None)
    } else {
        Ok(Some(f.remove(0)))
    }
}

/// Attempt to get all files currently in the cache
pub fn get_cached_files(
    conn: &mut SqliteConnection,
) -> Result<Vec<CachedFile>, Box<dyn std::error::Error + Send + Sync + 'static>> {
    use schema::cached_files::dsl::*;
    let f = cached_files.load::<CachedFile>(conn)?;

    Ok(f)
}

/// Attempt to remove a file from the cache
pub fn remove_cached_file(
    conn: &mut SqliteConnection,
    remove_id: i64,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    use schema::cached_files::dsl::*;
    diesel::delete(cached_files.filter(id.eq(remove_id))).execute(conn)?;

    Ok(())
}

/// Attempt to remove all files from the cache
pub fn remove_all_cached_files(
    conn: &mut SqliteConnection,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    use schema::cached_files::dsl::*;
    diesel::delete(cached_files).execute(conn)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: i64, name: &str, public: bool) -> CachedFile {
        CachedFile {
            id,
            file_name: name.to_string(),
            file_type: "application/pdf".to_string(),
            uploaded_at: "2024-01-15T10:30:00Z".to_string(),
            size: 2048,
            is_public: public,
            share_link: format!("http://localhost:2518/kelpie/files/{}", id),
        }
    }

    #[test]
    fn test_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("cache.db");
        let mut conn = establish_connection(&url.to_string_lossy()).unwrap();

        assert!(get_cached_files(&mut conn).unwrap().is_empty());

        let a = sample(1, "presentation.pdf", true);
        let b = sample(2, "confidential.pdf", false);
        insert_cached_file(&mut conn, &a).unwrap();
        insert_cached_file(&mut conn, &b).unwrap();

        let all = get_cached_files(&mut conn).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.contains(&a));
        assert!(all.contains(&b));

        assert_eq!(get_cached_file(&mut conn, 2).unwrap(), Some(b));
        assert_eq!(get_cached_file(&mut conn, 99).unwrap(), None);

        remove_cached_file(&mut conn, 1).unwrap();
        assert_eq!(get_cached_files(&mut conn).unwrap().len(), 1);

        remove_all_cached_files(&mut conn).unwrap();
        assert!(get_cached_files(&mut conn).unwrap().is_empty());
    }

    #[test]
    fn test_reopening_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("cache.db");

        {
            let mut conn = establish_connection(&url.to_string_lossy()).unwrap();
            insert_cached_file(&mut conn, &sample(5, "resume.pdf", true)).unwrap();
        }

        // running the embedded migrations twice must not wipe the cache
        let mut conn = establish_connection(&url.to_string_lossy()).unwrap();
        assert_eq!(get_cached_files(&mut conn).unwrap().len(), 1);
    }
}
