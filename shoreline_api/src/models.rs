//! Wire types shared with the backend.

use serde::{Deserialize, Serialize};

/// An account on the platform. The email doubles as the access-control key
/// for private files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Metadata for a stored file, as returned by the backend.
///
/// The content travels inside `data` as a base64 blob; the client only ever
/// derives its byte length from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub id: i64,
    pub file_name: String,
    pub file_type: String,
    /// Upload timestamp, as formatted by the backend.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub data: String,
    pub public: bool,
    /// Viewer emails granted access. Only consulted for private files.
    #[serde(default)]
    pub allowed_users: Option<Vec<String>>,
}

impl FileMeta {
    /// Byte size of the stored content, derived from the base64 blob length.
    pub fn decoded_size(&self) -> u64 {
        decoded_len(&self.data)
    }

    /// The top-level MIME group ("image", "video", ...), used for the admin
    /// histogram and the file icons.
    pub fn top_level_type(&self) -> &str {
        self.file_type
            .split('/')
            .next()
            .filter(|t| !t.is_empty())
            .unwrap_or("other")
    }

    /// Whether the given viewer email appears on the allow-list. This is a
    /// rendering hint; the backend's access check is authoritative.
    pub fn is_allowed(&self, email: &str) -> bool {
        self.allowed_users
            .as_ref()
            .map_or(false, |list| list.iter().any(|e| e == email))
    }
}

/// Decoded byte length of a base64 blob, without decoding it.
pub fn decoded_len(blob: &str) -> u64 {
    let padding = if blob.ends_with("==") {
        2
    } else if blob.ends_with('=') {
        1
    } else {
        0
    };
    (blob.len() as u64 * 3 / 4).saturating_sub(padding)
}

/// A message submitted through the contact form, moderated by the admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub contact: String,
    pub message: String,
    pub viewed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(file_type: &str, data: &str, public: bool) -> FileMeta {
        FileMeta {
            id: 1,
            file_name: "sample".to_string(),
            file_type: file_type.to_string(),
            date: "2024-01-15T10:30:00Z".to_string(),
            data: data.to_string(),
            public,
            allowed_users: None,
        }
    }

    #[test]
    fn test_decoded_len() {
        assert_eq!(decoded_len(""), 0);
        // "hi"
        assert_eq!(decoded_len("aGk="), 2);
        // "a"
        assert_eq!(decoded_len("YQ=="), 1);
        // "hello"
        assert_eq!(decoded_len("aGVsbG8="), 5);
        // "hello!" - no padding
        assert_eq!(decoded_len("aGVsbG8h"), 6);
    }

    #[test]
    fn test_top_level_type() {
        assert_eq!(meta("image/png", "", true).top_level_type(), "image");
        assert_eq!(meta("application/pdf", "", true).top_level_type(), "application");
        assert_eq!(meta("", "", true).top_level_type(), "other");
    }

    #[test]
    fn test_is_allowed() {
        let mut m = meta("text/plain", "", false);
        assert!(!m.is_allowed("b@x.com"));
        m.allowed_users = Some(vec!["b@x.com".to_string()]);
        assert!(m.is_allowed("b@x.com"));
        assert!(!m.is_allowed("c@x.com"));
    }

    #[test]
    fn test_file_meta_wire_names() {
        let json = r#"{
            "id": 4,
            "fileName": "resume.pdf",
            "fileType": "application/pdf",
            "date": "2024-01-08",
            "data": "aGVsbG8=",
            "public": false,
            "allowedUsers": ["boss@company.com", "hr@company.com"]
        }"#;

        let m: FileMeta = serde_json::from_str(json).unwrap();
        assert_eq!(m.file_name, "resume.pdf");
        assert!(!m.public);
        assert_eq!(m.decoded_size(), 5);
        assert!(m.is_allowed("hr@company.com"));
    }
}
