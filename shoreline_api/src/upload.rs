//! The upload workflow.
//!
//! `Idle -> FilesSelected -> Uploading -> {Complete, PartialFailure}`.
//! Selection and privacy are validated before anything leaves the machine;
//! each file then runs a client-side progress ticker before its two network
//! calls fire. Files progress independently, so one failure never aborts the
//! rest of the batch.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;

use crate::error::{ApiError, UploadError};
use crate::files::UploadRequest;
use crate::ApiClient;

/// Cadence of the simulated progress ticker.
const PROGRESS_TICK: Duration = Duration::from_millis(150);

/// Where the workflow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    FilesSelected,
    Uploading,
    Complete,
    PartialFailure,
}

/// Visibility choice made before uploading. Fixed for the file's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privacy {
    Public,
    Private,
}

/// A file that passed selection checks and is waiting to upload.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

/// The record handed back for a successful single upload: everything the
/// confirmation view shows.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub id: i64,
    pub file_name: String,
    pub file_type: String,
    pub size: u64,
    pub public: bool,
    pub allowed_users: Vec<String>,
    pub share_link: String,
    pub uploaded_at: String,
}

/// Per-file result of a workflow run.
#[derive(Debug)]
pub struct UploadOutcome {
    pub file_name: String,
    pub result: Result<UploadedFile, ApiError>,
}

/// The account performing the upload.
#[derive(Debug, Clone, Copy)]
pub struct UploadOwner<'a> {
    pub user_id: i64,
    pub username: &'a str,
    pub email: &'a str,
}

/// State machine driving one batch of uploads.
#[derive(Debug)]
pub struct UploadWorkflow {
    files: Vec<SelectedFile>,
    privacy: Privacy,
    allowed_users: Vec<String>,
    state: UploadState,
}

impl Default for UploadWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadWorkflow {
    pub fn new() -> UploadWorkflow {
        UploadWorkflow {
            files: Vec::new(),
            privacy: Privacy::Public,
            allowed_users: Vec::new(),
            state: UploadState::Idle,
        }
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn selected(&self) -> &[SelectedFile] {
        &self.files
    }

    /// Validate and stage the given paths. Every file must exist, be a
    /// regular file within the size limit, and carry a readable name.
    pub fn select_files(
        &mut self,
        paths: Vec<PathBuf>,
        size_limit_bytes: u64,
    ) -> Result<(), UploadError> {
        if paths.is_empty() {
            return Err(UploadError::NoFilesSelected);
        }

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let display = path.to_string_lossy().into_owned();

            if !path.exists() {
                return Err(UploadError::FileMissing(display));
            }
            if path.is_dir() {
                return Err(UploadError::IsDirectory(display));
            }

            let size = path
                .metadata()
                .map_err(|_| UploadError::FileMissing(display.clone()))?
                .len();
            if size > size_limit_bytes {
                return Err(UploadError::TooLarge(display));
            }

            let name = match path.file_name().and_then(OsStr::to_str) {
                Some(name) => name.to_owned(),
                None => return Err(UploadError::FileNameError(display)),
            };

            files.push(SelectedFile { path, name, size });
        }

        self.files = files;
        self.state = UploadState::FilesSelected;
        Ok(())
    }

    /// Choose the visibility of the batch. A private batch demands at least
    /// one allowed viewer up front.
    pub fn set_privacy(
        &mut self,
        privacy: Privacy,
        allowed_users: Vec<String>,
    ) -> Result<(), UploadError> {
        if privacy == Privacy::Private && allowed_users.is_empty() {
            return Err(UploadError::EmptyAllowList);
        }

        self.privacy = privacy;
        self.allowed_users = allowed_users;
        Ok(())
    }

    /// Upload the staged files in order.
    ///
    /// `progress` receives `(file name, percent)` pairs from the simulated
    /// ticker, finishing at 100 as the real transfer begins.
    pub async fn run(
        &mut self,
        client: &ApiClient,
        owner: &UploadOwner<'_>,
        link_base: &str,
        progress: &mut dyn FnMut(&str, u8),
    ) -> Result<Vec<UploadOutcome>, UploadError> {
        if self.state != UploadState::FilesSelected {
            return Err(UploadError::NoFilesSelected);
        }

        // The uploader always retains access to their own private files.
        let allowed_users = match self.privacy {
            Privacy::Private => normalize_allow_list(&self.allowed_users, owner.email),
            Privacy::Public => Vec::new(),
        };
        let public = self.privacy == Privacy::Public;

        self.state = UploadState::Uploading;

        let mut outcomes = Vec::with_capacity(self.files.len());
        for sel in &self.files {
            simulate_progress(&sel.name, progress).await;

            let result = upload_one(client, owner, link_base, public, &allowed_users, sel).await;
            outcomes.push(UploadOutcome {
                file_name: sel.name.clone(),
                result,
            });
        }

        self.state = if outcomes.iter().any(|o| o.result.is_err()) {
            UploadState::PartialFailure
        } else {
            UploadState::Complete
        };

        Ok(outcomes)
    }
}

/// Return the allow-list with the owner's email present. Idempotent.
pub fn normalize_allow_list(allowed: &[String], owner_email: &str) -> Vec<String> {
    let mut list = allowed.to_vec();
    if !list.iter().any(|e| e == owner_email) {
        list.push(owner_email.to_owned());
    }
    list
}

/// Best-effort MIME type from the file extension.
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("zip") => "application/zip",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        Some("txt") | Some("md") => "text/plain",
        Some("html") => "text/html",
        _ => "application/octet-stream",
    }
}

/// Tick the progress display up to 100 before the transfer starts. The bar
/// is cosmetic; it does not reflect real transfer progress.
async fn simulate_progress(file_name: &str, progress: &mut dyn FnMut(&str, u8)) {
    let mut percent = 0u8;
    loop {
        let step = rand::thread_rng().gen_range(5u8..=20u8);
        percent = percent.saturating_add(step);
        if percent >= 100 {
            progress(file_name, 100);
            break;
        }
        progress(file_name, percent);
        tokio::time::sleep(PROGRESS_TICK).await;
    }
}

async fn upload_one(
    client: &ApiClient,
    owner: &UploadOwner<'_>,
    link_base: &str,
    public: bool,
    allowed_users: &[String],
    sel: &SelectedFile,
) -> Result<UploadedFile, ApiError> {
    let bytes = tokio::fs::read(&sel.path).await?;
    let file_type = mime_type_for(&sel.path);

    let id = client
        .upload_file(UploadRequest {
            user_id: owner.user_id,
            owner_email: owner.email.to_owned(),
            file_name: sel.name.clone(),
            file_type: file_type.to_owned(),
            bytes,
            public,
            allowed_users: allowed_users.to_vec(),
        })
        .await?;

    Ok(UploadedFile {
        id,
        file_name: sel.name.clone(),
        file_type: file_type.to_owned(),
        size: sel.size,
        public,
        allowed_users: allowed_users.to_vec(),
        share_link: format!(
            "{}/{}/files/{}",
            link_base.trim_end_matches('/'),
            owner.username,
            id
        ),
        uploaded_at: chrono::Utc::now().to_rfc3339(),
    })
}
