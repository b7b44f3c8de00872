//! Remote `gerrit query` execution over SSH.
//!
//! See <https://gerrit-review.googlesource.com/Documentation/cmd-query.html> and
//! <https://gerrit-review.googlesource.com/Documentation/json.html> for the
//! command and its output format.

use serde_json::Value;
use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::{GerritError, GerritResult};
use crate::record::{ChangeNumber, ChangeRecord, StatsRecord};

/// Port of Gerrit's built-in SSH daemon.
pub const DEFAULT_SSH_PORT: u16 = 29418;

/// Runs a fully built command line to completion and hands back its stdout.
pub trait Transport {
    fn execute(&self, argv: &[String]) -> GerritResult<Vec<u8>>;
}

/// Spawns the command as a local process, normally the `ssh` client.
#[derive(Debug, Default, Clone, Copy)]
pub struct SshTransport;

impl Transport for SshTransport {
    fn execute(&self, argv: &[String]) -> GerritResult<Vec<u8>> {
        let command = argv.join(" ");
        let (program, args) = argv.split_first().ok_or_else(|| GerritError::Spawn {
            command: command.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line"),
        })?;
        debug!(%command, "running gerrit query");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| GerritError::Spawn {
                command: command.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(GerritError::Transport {
                command,
                exit_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Issues queries against one Gerrit server.
#[derive(Debug, Clone)]
pub struct QueryClient<T = SshTransport> {
    server: String,
    port: u16,
    ssh_program: String,
    debug: bool,
    transport: T,
}

impl QueryClient<SshTransport> {
    pub fn new(server: impl Into<String>) -> Self {
        Self::with_transport(server, SshTransport)
    }
}

impl<T: Transport> QueryClient<T> {
    pub fn with_transport(server: impl Into<String>, transport: T) -> Self {
        Self {
            server: server.into(),
            port: DEFAULT_SSH_PORT,
            ssh_program: "ssh".to_string(),
            debug: false,
            transport,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Use a different SSH client binary.
    pub fn with_ssh_program(mut self, program: impl Into<String>) -> Self {
        self.ssh_program = program.into();
        self
    }

    /// Echo every query command and its parsed response to stderr.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Argument vector that runs `query` on the server.
    pub fn command_line(&self, query: &str) -> Vec<String> {
        vec![
            self.ssh_program.clone(),
            "-p".to_string(),
            self.port.to_string(),
            self.server.clone(),
            "gerrit".to_string(),
            "query".to_string(),
            "--format=JSON".to_string(),
            quote_for_shell(query),
        ]
    }

    /// Run one query and return its change records together with the stats trailer.
    pub fn query(&self, query: &str) -> GerritResult<(Vec<ChangeRecord>, StatsRecord)> {
        let argv = self.command_line(query);
        let output = self.transport.execute(&argv)?;
        let values = decode_lines(output)?;

        if self.debug {
            eprint!("{}", debug_report(&argv, &values));
        }

        split_stats(values)
    }

    pub fn open_changes(&self) -> GerritResult<Vec<ChangeRecord>> {
        self.query("is:open").map(|(changes, _)| changes)
    }

    /// Look up a single change. Anything but exactly one match is an error.
    pub fn change(&self, number: ChangeNumber) -> GerritResult<ChangeRecord> {
        let (mut changes, _) = self.query(&number.to_string())?;
        if changes.len() != 1 {
            return Err(GerritError::ChangeNotFound {
                number: number.to_string(),
                matches: changes.len(),
            });
        }
        Ok(changes.remove(0))
    }

    /// Open changes carrying `topic`. No match is an empty list.
    pub fn topic_changes(&self, topic: &str) -> GerritResult<Vec<ChangeRecord>> {
        self.query(&format!("topic:'{topic}' is:open"))
            .map(|(changes, _)| changes)
    }
}

/// Diagnostic echo of a query: the command line followed by every parsed
/// response value, one per line.
pub fn debug_report(argv: &[String], values: &[Value]) -> String {
    let mut report = format!("Query: {}\nResponse:\n", argv.join(" "));
    for value in values {
        report.push_str(&value.to_string());
        report.push('\n');
    }
    report
}

/// Decode a raw query response into change records and the stats trailer.
pub fn parse_response(output: Vec<u8>) -> GerritResult<(Vec<ChangeRecord>, StatsRecord)> {
    split_stats(decode_lines(output)?)
}

/// One JSON value per line. The output uses terminator semantics, so a
/// trailing newline does not produce an extra value.
fn decode_lines(output: Vec<u8>) -> GerritResult<Vec<Value>> {
    let text = String::from_utf8(output)?;
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    if lines.is_empty() {
        return Err(GerritError::EmptyResponse);
    }

    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| GerritError::InvalidJson {
                line: idx + 1,
                source,
            })
        })
        .collect()
}

fn split_stats(mut values: Vec<Value>) -> GerritResult<(Vec<ChangeRecord>, StatsRecord)> {
    let last = values.pop().ok_or(GerritError::EmptyResponse)?;
    if !StatsRecord::is_stats(&last) {
        return Err(GerritError::MissingStats);
    }
    let stats: StatsRecord =
        serde_json::from_value(last).map_err(|source| GerritError::InvalidRecord { source })?;

    // TODO: follow `resume_sortkey` / `--start` to fetch the remaining pages.
    if stats.more_changes {
        return Err(GerritError::MoreChanges {
            row_count: stats.row_count,
        });
    }

    let changes = values
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<ChangeRecord>, _>>()
        .map_err(|source| GerritError::InvalidRecord { source })?;

    Ok((changes, stats))
}

/// Quote `arg` for the remote POSIX shell that `ssh` hands its command to.
pub fn quote_for_shell(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const STATS: &str = r#"{"type":"stats","rowCount":1,"runTimeMilliseconds":28,"moreChanges":false}"#;
    const CHANGE: &str = r#"{"number":5,"project":"libfoo","subject":"fix bug","owner":{"name":"A","email":"a@x"}}"#;

    #[test]
    fn parses_records_and_stats() {
        let output = format!("{CHANGE}\n{STATS}\n");
        let (changes, stats) = parse_response(output.into_bytes()).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].number, ChangeNumber(5));
        assert_eq!(changes[0].project, "libfoo");
        assert_eq!(stats.row_count, 1);
    }

    #[test]
    fn record_count_is_lines_minus_stats() {
        let mut output = String::new();
        for n in 1..=4 {
            output.push_str(&format!(
                r#"{{"number":{n},"project":"p{n}","subject":"s","owner":{{"name":"A","email":"a@x"}}}}"#
            ));
            output.push('\n');
        }
        output.push_str(STATS);
        output.push('\n');

        let (changes, _) = parse_response(output.into_bytes()).unwrap();
        assert_eq!(changes.len(), 4);
    }

    #[test]
    fn stats_only_response_is_empty_result() {
        let output = format!("{STATS}\n");
        let (changes, _) = parse_response(output.into_bytes()).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn missing_trailing_newline_is_tolerated() {
        let output = format!("{CHANGE}\n{STATS}");
        let (changes, _) = parse_response(output.into_bytes()).unwrap();
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn empty_response_is_protocol_error() {
        let err = parse_response(Vec::new()).unwrap_err();
        assert!(matches!(err, GerritError::EmptyResponse));
        assert_eq!(err.kind(), ErrorKind::Protocol);

        let err = parse_response(b"\n".to_vec()).unwrap_err();
        assert!(matches!(err, GerritError::EmptyResponse));
    }

    #[test]
    fn missing_stats_is_protocol_error() {
        let output = format!("{CHANGE}\n");
        let err = parse_response(output.into_bytes()).unwrap_err();
        assert!(matches!(err, GerritError::MissingStats));
        assert_eq!(err.kind(), ErrorKind::Protocol);

        let output = format!("{STATS}\n{CHANGE}\n");
        let err = parse_response(output.into_bytes()).unwrap_err();
        assert!(matches!(err, GerritError::MissingStats));
    }

    #[test]
    fn invalid_json_reports_line() {
        let output = format!("{CHANGE}\nnot json\n{STATS}\n");
        let err = parse_response(output.into_bytes()).unwrap_err();
        assert!(matches!(err, GerritError::InvalidJson { line: 2, .. }));
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn invalid_utf8_is_protocol_error() {
        let mut output = b"{\"type\":\"stats\",\"x\":\"".to_vec();
        output.push(0xff);
        output.extend_from_slice(b"\"}\n");
        let err = parse_response(output).unwrap_err();
        assert!(matches!(err, GerritError::Utf8(_)));
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn pagination_is_unsupported_even_with_bad_records() {
        let output = "{\"garbage\":true}\n{\"type\":\"stats\",\"rowCount\":500,\"moreChanges\":true}\n";
        let err = parse_response(output.as_bytes().to_vec()).unwrap_err();
        assert!(matches!(err, GerritError::MoreChanges { row_count: 500 }));
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn record_without_project_is_rejected() {
        let output = format!("{{\"number\":1,\"subject\":\"s\"}}\n{STATS}\n");
        let err = parse_response(output.into_bytes()).unwrap_err();
        assert!(matches!(err, GerritError::InvalidRecord { .. }));
    }

    #[test]
    fn debug_report_lists_command_and_values() {
        let client = QueryClient::new("review.example.com");
        let argv = client.command_line("is:open");
        let values = decode_lines(format!("{CHANGE}\n{STATS}\n").into_bytes()).unwrap();

        let report = debug_report(&argv, &values);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(
            lines[0],
            "Query: ssh -p 29418 review.example.com gerrit query --format=JSON 'is:open'"
        );
        assert_eq!(lines[1], "Response:");
        assert_eq!(lines.len(), 2 + values.len());
        assert!(lines[2].contains("\"project\":\"libfoo\""));
        assert!(lines[3].contains("\"type\":\"stats\""));
    }

    #[test]
    fn empty_command_line_is_an_error() {
        let err = SshTransport.execute(&[]).unwrap_err();
        assert!(matches!(err, GerritError::Spawn { .. }));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn shell_quoting() {
        assert_eq!(quote_for_shell("is:open"), "'is:open'");
        assert_eq!(
            quote_for_shell("topic:'x' is:open"),
            r"'topic:'\''x'\'' is:open'"
        );
    }

    #[test]
    fn command_line_shape() {
        let client = QueryClient::new("user@review.example.com");
        assert_eq!(
            client.command_line("is:open"),
            vec![
                "ssh",
                "-p",
                "29418",
                "user@review.example.com",
                "gerrit",
                "query",
                "--format=JSON",
                "'is:open'",
            ]
        );

        let client = QueryClient::new("review").with_port(2222).with_ssh_program("/usr/bin/ssh");
        let argv = client.command_line("42");
        assert_eq!(argv[0], "/usr/bin/ssh");
        assert_eq!(argv[2], "2222");
        assert_eq!(argv[7], "'42'");
    }
}
