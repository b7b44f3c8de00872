//! Drives `repo download` for single changes and whole topics.

pub mod download;
pub mod error;
pub mod identifier;

pub use download::{DownloadCommand, Downloader, ProcessRunner, Runner, REPO_TOOL};
pub use error::{RepoError, RepoResult};
pub use identifier::Identifier;
