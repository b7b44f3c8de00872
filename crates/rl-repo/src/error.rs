use rl_gerrit::{ErrorKind, GerritError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Cannot execute repo command: {command} (exit code: {exit_code})")]
    Process { command: String, exit_code: i32 },

    #[error("Failed to start repo command: {command}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Gerrit(#[from] GerritError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepoError::Process { .. } | RepoError::Spawn { .. } | RepoError::Io(_) => {
                ErrorKind::Process
            }
            RepoError::Gerrit(err) => err.kind(),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;
