#[derive(Debug)]
pub struct ConfigError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ConfigError {
    pub fn new<S>(kind: ErrorKind, message: S) -> ConfigError
    where
        S: AsRef<str>,
    {
        ConfigError {
            kind,
            message: message.as_ref().to_owned(),
        }
    }

    /// Get a basic message to be displayed to the user
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug)]
pub enum ErrorKind {
    IoError(std::io::Error),
    BincodeError(bincode::ErrorKind),
    NetworkError(ureq::Error),
    ParseError(String),
    NotFound,
    IsNotDirectory,
    IsDirectory,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ErrorKind::IoError(e) => write!(f, "{}: {}", self.message, e),
            ErrorKind::BincodeError(e) => write!(f, "{}: {}", self.message, e),
            ErrorKind::NetworkError(e) => write!(f, "{}: {}", self.message, e),
            ErrorKind::ParseError(e) => write!(f, "{}: {}", self.message, e),
            ErrorKind::NotFound
            | ErrorKind::IsNotDirectory
            | ErrorKind::IsDirectory => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::IoError(e) => Some(e),
            ErrorKind::NetworkError(e) => Some(e),
            _ => None,
        }
    }
}
