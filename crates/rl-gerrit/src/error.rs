use thiserror::Error;

/// Broad failure category shared by every repoload component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Transport,
    Protocol,
    Unsupported,
    NotFound,
    Process,
}

#[derive(Debug, Error)]
pub enum GerritError {
    #[error("Failed to start query command: {command}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error while executing: {command} (exit code: {exit_code}){}", stderr_suffix(.stderr))]
    Transport {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Empty response from gerrit query")]
    EmptyResponse,

    #[error("Gerrit response does not end with a stats record")]
    MissingStats,

    #[error("Invalid JSON on response line {line}: {source}")]
    InvalidJson {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed change record: {source}")]
    InvalidRecord {
        #[source]
        source: serde_json::Error,
    },

    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Gerrit's pagination not implemented ({row_count} rows returned, more pending)")]
    MoreChanges { row_count: u64 },

    #[error("Cannot find change for id {number} ({matches} matches)")]
    ChangeNotFound { number: String, matches: usize },
}

impl GerritError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GerritError::Spawn { .. } | GerritError::Transport { .. } => ErrorKind::Transport,
            GerritError::EmptyResponse
            | GerritError::MissingStats
            | GerritError::InvalidJson { .. }
            | GerritError::InvalidRecord { .. }
            | GerritError::Utf8(_) => ErrorKind::Protocol,
            GerritError::MoreChanges { .. } => ErrorKind::Unsupported,
            GerritError::ChangeNotFound { .. } => ErrorKind::NotFound,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

pub type GerritResult<T> = Result<T, GerritError>;
