//! The file registry: listing, metadata, access checks, uploads and
//! deletions against the `/files` and `/users/*/files` endpoints.

use log::error;
use reqwest::header::USER_AGENT;
use reqwest::multipart::{Form, Part};

use crate::error::ApiError;
use crate::models::FileMeta;
use crate::{ApiClient, APP_USER_AGENT};

/// Everything needed to upload one file and record its ownership.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Account the upload is linked to once stored.
    pub user_id: i64,
    /// The uploader's email, used for the compensating delete if linking
    /// fails.
    pub owner_email: String,
    pub file_name: String,
    pub file_type: String,
    pub bytes: Vec<u8>,
    pub public: bool,
    /// Viewer emails, already including the uploader. Ignored for public
    /// uploads.
    pub allowed_users: Vec<String>,
}

impl ApiClient {
    /// IDs of the files owned by the given account.
    pub async fn list_file_ids(&self, user_id: i64) -> Result<Vec<i64>, ApiError> {
        let ids = self
            .http
            .get(self.url(&format!("/users/{}/files", user_id)))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<i64>>()
            .await?;

        Ok(ids)
    }

    /// Metadata for one file. A file the server doesn't know about resolves
    /// to `ApiError::NotFound`.
    pub async fn fetch_metadata(&self, file_id: i64) -> Result<FileMeta, ApiError> {
        let meta = self
            .http
            .get(self.url(&format!("/files/{}/meta", file_id)))
            .send()
            .await?
            .error_for_status()?
            .json::<FileMeta>()
            .await?;

        Ok(meta)
    }

    /// The user's own dashboard listing: the id list, then the metadata for
    /// each id fetched concurrently. A file whose metadata cannot be fetched
    /// is logged and skipped rather than failing the whole listing.
    pub async fn fetch_my_files(&self, user_id: i64) -> Result<Vec<FileMeta>, ApiError> {
        let ids = self.list_file_ids(user_id).await?;

        let metas =
            futures::future::join_all(ids.iter().map(|id| self.fetch_metadata(*id))).await;

        let mut files = Vec::with_capacity(metas.len());
        for (id, meta) in ids.iter().zip(metas) {
            match meta {
                Ok(meta) => files.push(meta),
                Err(e) => error!("Error fetching metadata for file {}: {}", id, e),
            }
        }

        Ok(files)
    }

    /// Ask the backend whether `viewer_email` may see the given file.
    /// This is the authoritative access decision.
    pub async fn check_access(
        &self,
        file_id: i64,
        viewer_email: Option<&str>,
    ) -> Result<bool, ApiError> {
        let mut req = self
            .http
            .get(self.url(&format!("/files/access/{}", file_id)));
        if let Some(mail) = viewer_email {
            req = req.query(&[("mail", mail)]);
        }

        let allowed = req
            .send()
            .await?
            .error_for_status()?
            .json::<bool>()
            .await?;

        Ok(allowed)
    }

    /// Files published under a username, as visible to the given viewer.
    pub async fn files_by_username(
        &self,
        username: &str,
        viewer_email: Option<&str>,
    ) -> Result<Vec<FileMeta>, ApiError> {
        let mut req = self
            .http
            .get(self.url(&format!("/files/username/{}/files", username)));
        if let Some(mail) = viewer_email {
            req = req.query(&[("mail", mail)]);
        }

        let files = req
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<FileMeta>>()
            .await?;

        Ok(files)
    }

    /// Exact ownership lookup by account id, used for the admin cascade.
    pub async fn files_by_user(&self, user_id: i64) -> Result<Vec<FileMeta>, ApiError> {
        let files = self
            .http
            .get(self.url(&format!("/files/user/{}/files", user_id)))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<FileMeta>>()
            .await?;

        Ok(files)
    }

    /// Every file on the platform (admin console).
    pub async fn list_all_files(&self) -> Result<Vec<FileMeta>, ApiError> {
        let files = self
            .http
            .get(self.url("/files"))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<FileMeta>>()
            .await?;

        Ok(files)
    }

    /// Store a file and record its ownership.
    ///
    /// Two dependent calls: the multipart upload returns the new file id,
    /// and only that id is then linked to the uploading account. A file is
    /// only "owned" once both succeed; if the link step fails the freshly
    /// stored content is deleted again so no orphan is left behind.
    pub async fn upload_file(&self, req: UploadRequest) -> Result<i64, ApiError> {
        let part = Part::bytes(req.bytes)
            .file_name(req.file_name.clone())
            .mime_str(&req.file_type)?;

        let mut form = Form::new()
            .part("file", part)
            .text("isPublic", if req.public { "true" } else { "false" });
        if !req.public {
            form = form.text("allowedUsers", req.allowed_users.join(","));
        }

        let body = self
            .http
            .post(self.url("/files/upload"))
            .header(USER_AGENT, APP_USER_AGENT)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let file_id: i64 = body.trim().parse().map_err(|_| {
            ApiError::Parse(format!("unexpected upload response: `{}`", body.trim()))
        })?;

        let link_result = match self
            .http
            .post(self.url(&format!("/users/{}/add-file/{}", req.user_id, file_id)))
            .send()
            .await
        {
            Ok(resp) => resp.error_for_status().map(|_| ()).map_err(ApiError::from),
            Err(e) => Err(ApiError::from(e)),
        };

        if let Err(e) = link_result {
            error!(
                "Failed to link file {} to user {}: {}",
                file_id, req.user_id, e
            );
            if let Err(cleanup) = self.delete_file_content(file_id, &req.owner_email).await {
                error!("Failed to clean up orphaned file {}: {}", file_id, cleanup);
            }
            return Err(e);
        }

        Ok(file_id)
    }

    /// Delete a file the session owns.
    ///
    /// The ownership linkage is removed first; the content is only deleted
    /// once the backend confirms the unlink. Returns whether the file was
    /// actually deleted.
    pub async fn delete_file(&self, file_id: i64, owner_email: &str) -> Result<bool, ApiError> {
        let unlinked = self
            .http
            .delete(self.url(&format!("/users/deletefile/{}", file_id)))
            .send()
            .await?
            .error_for_status()?
            .json::<bool>()
            .await?;

        if !unlinked {
            return Ok(false);
        }

        self.delete_file_content(file_id, owner_email).await?;
        Ok(true)
    }

    /// Raw content delete. Also used by the admin console and as the
    /// compensating action for a failed ownership link.
    pub(crate) async fn delete_file_content(
        &self,
        file_id: i64,
        email: &str,
    ) -> Result<(), ApiError> {
        self.http
            .delete(self.url(&format!("/files/{}", file_id)))
            .query(&[("email", email)])
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    /// Download the stored bytes of a file.
    pub async fn download_file(
        &self,
        file_id: i64,
        viewer_email: Option<&str>,
    ) -> Result<Vec<u8>, ApiError> {
        let mut req = self.http.get(self.url(&format!("/files/{}", file_id)));
        if let Some(mail) = viewer_email {
            req = req.query(&[("mail", mail)]);
        }

        let bytes = req.send().await?.error_for_status()?.bytes().await?;

        Ok(bytes.to_vec())
    }
}
