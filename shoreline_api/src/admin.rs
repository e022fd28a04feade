//! The admin console: aggregate fetches over users, files and messages,
//! moderation actions, and the derived statistics.

use std::collections::BTreeMap;

use log::{error, warn};

use crate::error::ApiError;
use crate::models::{ContactMessage, FileMeta, User};
use crate::ApiClient;

/// Platform-wide user statistics. Derived, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total_users: usize,
    pub total_files: usize,
    /// Sum of the decoded byte sizes of every stored file.
    pub total_storage: u64,
    pub public_files: usize,
    pub private_files: usize,
}

/// Platform-wide file statistics. Derived, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStats {
    pub total_files: usize,
    pub total_size: u64,
    pub average_size: u64,
    /// Count of files per top-level MIME group.
    pub file_types: BTreeMap<String, usize>,
}

pub fn compute_user_stats(users: &[User], files: &[FileMeta]) -> UserStats {
    let public_files = files.iter().filter(|f| f.public).count();

    UserStats {
        total_users: users.len(),
        total_files: files.len(),
        total_storage: files.iter().map(FileMeta::decoded_size).sum(),
        public_files,
        private_files: files.len() - public_files,
    }
}

pub fn compute_file_stats(files: &[FileMeta]) -> FileStats {
    let total_size: u64 = files.iter().map(FileMeta::decoded_size).sum();

    let mut file_types = BTreeMap::new();
    for file in files {
        *file_types.entry(file.top_level_type().to_owned()).or_insert(0) += 1;
    }

    FileStats {
        total_files: files.len(),
        total_size,
        average_size: if files.is_empty() {
            0
        } else {
            total_size / files.len() as u64
        },
        file_types,
    }
}

/// Moderation state for the admin dashboard.
///
/// Lists are fetched from the backend and then patched locally after each
/// successful moderation call; the stats are recomputed on every change.
#[derive(Debug)]
pub struct AdminConsole<'a> {
    client: &'a ApiClient,
    admin_email: String,
    pub users: Vec<User>,
    pub files: Vec<FileMeta>,
    pub messages: Vec<ContactMessage>,
    pub user_stats: UserStats,
    pub file_stats: FileStats,
}

impl<'a> AdminConsole<'a> {
    pub fn new(client: &'a ApiClient, admin_email: &str) -> AdminConsole<'a> {
        AdminConsole {
            client,
            admin_email: admin_email.to_owned(),
            users: Vec::new(),
            files: Vec::new(),
            messages: Vec::new(),
            user_stats: UserStats::default(),
            file_stats: FileStats::default(),
        }
    }

    /// Populate users, files and messages with three concurrent fetches.
    ///
    /// The calls are independent; one failing endpoint is logged and leaves
    /// an empty list for that slice only, never blocking the other two.
    pub async fn fetch_all(&mut self) {
        let (users, files, messages) = futures::join!(
            self.client.list_users(),
            self.client.list_all_files(),
            self.client.list_messages()
        );

        self.users = users.unwrap_or_else(|e| {
            error!("Error fetching users: {}", e);
            Vec::new()
        });
        self.files = files.unwrap_or_else(|e| {
            error!("Error fetching files: {}", e);
            Vec::new()
        });
        self.messages = messages.unwrap_or_else(|e| {
            error!("Error fetching messages: {}", e);
            Vec::new()
        });

        self.refresh_stats();
    }

    /// Per-user file counts, fetched concurrently. A failed count renders
    /// as unknown rather than failing the whole listing.
    pub async fn fetch_user_file_counts(&self) -> Vec<(i64, Option<usize>)> {
        futures::future::join_all(self.users.iter().map(|user| async move {
            match self.client.list_file_ids(user.id).await {
                Ok(ids) => (user.id, Some(ids.len())),
                Err(e) => {
                    error!("Error counting files for user {}: {}", user.id, e);
                    (user.id, None)
                }
            }
        }))
        .await
    }

    /// Delete an account, mirroring the backend's file cascade locally.
    ///
    /// The user's exact file set is captured before the delete so the local
    /// file list can be filtered by ownership rather than by guesswork.
    pub async fn delete_user(&mut self, user_id: i64) -> Result<(), ApiError> {
        let owned = self.client.files_by_user(user_id).await;

        self.client.delete_user(user_id).await?;
        self.users.retain(|u| u.id != user_id);

        match owned {
            Ok(files) => {
                let ids: Vec<i64> = files.iter().map(|f| f.id).collect();
                self.files.retain(|f| !ids.contains(&f.id));
            }
            Err(e) => warn!(
                "Could not resolve files owned by deleted user {}, file list is stale until the next fetch: {}",
                user_id, e
            ),
        }

        self.refresh_stats();
        Ok(())
    }

    /// Delete a single file on a user's behalf.
    pub async fn delete_file(&mut self, file_id: i64) -> Result<(), ApiError> {
        self.client
            .delete_file_content(file_id, &self.admin_email)
            .await?;

        self.files.retain(|f| f.id != file_id);
        self.refresh_stats();
        Ok(())
    }

    /// Mark a contact message as viewed.
    pub async fn mark_viewed(&mut self, message_id: i64) -> Result<(), ApiError> {
        self.client.mark_message_viewed(message_id).await?;

        for msg in &mut self.messages {
            if msg.id == message_id {
                msg.viewed = true;
            }
        }
        Ok(())
    }

    /// Delete a contact message.
    pub async fn delete_message(&mut self, message_id: i64) -> Result<(), ApiError> {
        self.client.delete_message(message_id).await?;

        self.messages.retain(|m| m.id != message_id);
        Ok(())
    }

    /// Recompute both stat blocks from the current lists.
    pub fn refresh_stats(&mut self) {
        self.user_stats = compute_user_stats(&self.users, &self.files);
        self.file_stats = compute_file_stats(&self.files);
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot;
    use warp::Filter;

    use super::{compute_file_stats, compute_user_stats, AdminConsole};
    use crate::models::{FileMeta, User};
    use crate::ApiClient;

    fn meta(id: i64, file_type: &str, data: &str, public: bool) -> FileMeta {
        FileMeta {
            id,
            file_name: format!("file-{}", id),
            file_type: file_type.to_string(),
            date: "2024-01-15".to_string(),
            data: data.to_string(),
            public,
            allowed_users: None,
        }
    }

    fn user(id: i64, username: &str) -> User {
        User {
            id,
            username: username.to_string(),
            email: format!("{}@example.com", username),
        }
    }

    #[test]
    fn test_compute_user_stats() {
        let users = vec![user(1, "john_doe"), user(2, "jane_smith")];
        let files = vec![
            meta(1, "application/pdf", "aGVsbG8=", true), // 5 bytes
            meta(2, "image/png", "aGk=", false),          // 2 bytes
            meta(3, "image/jpeg", "YQ==", true),          // 1 byte
        ];

        let stats = compute_user_stats(&users, &files);
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_storage, 8);
        assert_eq!(stats.public_files, 2);
        assert_eq!(stats.private_files, 1);
    }

    #[test]
    fn test_compute_file_stats() {
        let files = vec![
            meta(1, "application/pdf", "aGVsbG8=", true),
            meta(2, "image/png", "aGk=", false),
            meta(3, "image/jpeg", "YQ==", true),
        ];

        let stats = compute_file_stats(&files);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_size, 8);
        assert_eq!(stats.average_size, 2); // floor(8 / 3)
        assert_eq!(stats.file_types.get("application"), Some(&1));
        assert_eq!(stats.file_types.get("image"), Some(&2));
    }

    #[test]
    fn test_compute_file_stats_empty() {
        let stats = compute_file_stats(&[]);
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.average_size, 0);
        assert!(stats.file_types.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_all_survives_partial_failure() {
        // /users is broken; /files and /messages answer
        let users = warp::get().and(warp::path!("users")).map(|| {
            warp::reply::with_status("boom", warp::http::StatusCode::INTERNAL_SERVER_ERROR)
        });
        let files = warp::get().and(warp::path!("files")).map(|| {
            warp::reply::json(&serde_json::json!([{
                "id": 1,
                "fileName": "presentation.pdf",
                "fileType": "application/pdf",
                "date": "2024-01-15",
                "data": "aGVsbG8=",
                "public": true
            }]))
        });
        let messages = warp::get().and(warp::path!("messages")).map(|| {
            warp::reply::json(&serde_json::json!([{
                "id": 3,
                "username": "john_doe",
                "name": "John",
                "contact": "john@example.com",
                "message": "I am having trouble uploading large files.",
                "viewed": false
            }]))
        });

        let (tx, rx) = oneshot::channel();
        let (addr, server) = warp::serve(users.or(files).or(messages))
            .bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async {
                rx.await.ok();
            });
        tokio::task::spawn(server);

        let client = ApiClient::new(&format!("http://{}", addr));
        let mut console = AdminConsole::new(&client, "admin@fileshare.com");
        console.fetch_all().await;

        assert!(console.users.is_empty());
        assert_eq!(console.files.len(), 1);
        assert_eq!(console.messages.len(), 1);
        assert_eq!(console.file_stats.total_files, 1);

        let _ = tx.send(());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_user_drops_exactly_their_files() {
        let ids = warp::get()
            .and(warp::path!("files" / "user" / i64 / "files"))
            .map(|_uid: i64| {
                warp::reply::json(&serde_json::json!([
                    {
                        "id": 1,
                        "fileName": "file-1",
                        "fileType": "application/pdf",
                        "date": "2024-01-15",
                        "data": "aGVsbG8=",
                        "public": true
                    },
                    {
                        "id": 3,
                        "fileName": "file-3",
                        "fileType": "image/jpeg",
                        "date": "2024-01-15",
                        "data": "YQ==",
                        "public": false
                    }
                ]))
            });
        let delete = warp::delete()
            .and(warp::path!("users" / i64))
            .map(|_uid: i64| warp::reply::json(&true));

        let (tx, rx) = oneshot::channel();
        let (addr, server) = warp::serve(ids.or(delete))
            .bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async {
                rx.await.ok();
            });
        tokio::task::spawn(server);

        let client = ApiClient::new(&format!("http://{}", addr));
        let mut console = AdminConsole::new(&client, "admin@fileshare.com");
        console.users = vec![user(7, "john_doe"), user(8, "jane_smith")];
        console.files = vec![
            meta(1, "application/pdf", "aGVsbG8=", true),
            meta(2, "image/png", "aGk=", true),
            meta(3, "image/jpeg", "YQ==", false),
        ];
        console.refresh_stats();
        assert_eq!(console.user_stats.total_storage, 8);

        console.delete_user(7).await.unwrap();

        let remaining: Vec<i64> = console.files.iter().map(|f| f.id).collect();
        assert_eq!(remaining, vec![2]);
        assert_eq!(console.users.len(), 1);
        // stats follow the reduced totals
        assert_eq!(console.user_stats.total_users, 1);
        assert_eq!(console.user_stats.total_files, 1);
        assert_eq!(console.user_stats.total_storage, 2);

        let _ = tx.send(());
    }
}
