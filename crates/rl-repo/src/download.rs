use rl_gerrit::{ChangeNumber, ChangeRecord, GerritError, QueryClient, Transport};
use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::{debug, info};

use crate::error::{RepoError, RepoResult};
use crate::identifier::Identifier;

/// Name of the repository tool invoked for downloads.
pub const REPO_TOOL: &str = "repo";

/// One `repo download <project> <number>` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadCommand {
    pub project: String,
    pub number: ChangeNumber,
}

impl DownloadCommand {
    pub fn from_change(change: &ChangeRecord) -> Self {
        Self {
            project: change.project.clone(),
            number: change.number,
        }
    }

    pub fn argv(&self) -> Vec<String> {
        vec![
            REPO_TOOL.to_string(),
            "download".to_string(),
            self.project.clone(),
            self.number.to_string(),
        ]
    }
}

impl fmt::Display for DownloadCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Executes a download command to completion.
pub trait Runner {
    fn run(&self, argv: &[String]) -> RepoResult<()>;
}

/// Runs the command as a child process sharing the caller's terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl Runner for ProcessRunner {
    fn run(&self, argv: &[String]) -> RepoResult<()> {
        let command = argv.join(" ");
        let (program, args) = argv.split_first().ok_or_else(|| RepoError::Spawn {
            command: command.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line"),
        })?;
        debug!(%command, "spawning repo");

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .status()
            .map_err(|source| RepoError::Spawn {
                command: command.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(RepoError::Process {
                command,
                exit_code: status.code().unwrap_or(-1),
            })
        }
    }
}

/// Resolves an identifier through Gerrit and downloads every matching change.
pub struct Downloader<'a, T, R = ProcessRunner> {
    client: &'a QueryClient<T>,
    runner: R,
}

impl<'a, T: Transport> Downloader<'a, T, ProcessRunner> {
    pub fn new(client: &'a QueryClient<T>) -> Self {
        Self::with_runner(client, ProcessRunner)
    }
}

impl<'a, T: Transport, R: Runner> Downloader<'a, T, R> {
    pub fn with_runner(client: &'a QueryClient<T>, runner: R) -> Self {
        Self { client, runner }
    }

    /// Changes named by `identifier`. A change number must match exactly one
    /// change; a topic may match none.
    pub fn resolve(&self, identifier: &Identifier) -> RepoResult<Vec<ChangeRecord>> {
        let changes = match identifier {
            Identifier::Change(digits) => {
                // Digits too large for a change number cannot name any change.
                let number: ChangeNumber =
                    digits.parse().map_err(|_| GerritError::ChangeNotFound {
                        number: digits.clone(),
                        matches: 0,
                    })?;
                vec![self.client.change(number)?]
            }
            Identifier::Topic(topic) => self.client.topic_changes(topic)?,
        };
        Ok(changes)
    }

    /// Download commands for `identifier`, ordered by project.
    pub fn plan(&self, identifier: &Identifier) -> RepoResult<Vec<DownloadCommand>> {
        let mut changes = self.resolve(identifier)?;
        changes.sort_by(|a, b| a.project.cmp(&b.project));
        Ok(changes.iter().map(DownloadCommand::from_change).collect())
    }

    /// Announce on `out` and run each planned command in order, stopping at
    /// the first failure. With `dry_run` nothing is executed.
    pub fn download<W: Write>(
        &self,
        identifier: &Identifier,
        dry_run: bool,
        out: &mut W,
    ) -> RepoResult<Vec<DownloadCommand>> {
        let commands = self.plan(identifier)?;
        debug!(%identifier, count = commands.len(), dry_run, "resolved download batch");

        for command in &commands {
            if dry_run {
                writeln!(out, "Would execute: {command}")?;
                continue;
            }

            writeln!(out, "Executing: {command}")?;
            out.flush()?;
            info!(project = %command.project, number = %command.number, "downloading change");
            self.runner.run(&command.argv())?;
        }

        Ok(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_shape() {
        let cmd = DownloadCommand {
            project: "platform/build".to_string(),
            number: ChangeNumber(4711),
        };
        assert_eq!(cmd.argv(), vec!["repo", "download", "platform/build", "4711"]);
        assert_eq!(cmd.to_string(), "repo download platform/build 4711");
    }

    #[cfg(unix)]
    #[test]
    fn process_runner_reports_exit_status() {
        ProcessRunner.run(&["true".to_string()]).unwrap();

        let err = ProcessRunner
            .run(&["sh".to_string(), "-c".to_string(), "exit 3".to_string()])
            .unwrap_err();
        assert!(matches!(err, RepoError::Process { exit_code: 3, .. }));
        assert_eq!(err.kind(), rl_gerrit::ErrorKind::Process);
    }

    #[test]
    fn process_runner_rejects_empty_command() {
        let err = ProcessRunner.run(&[]).unwrap_err();
        assert!(matches!(err, RepoError::Spawn { .. }));
    }
}
