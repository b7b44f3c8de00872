//! Gerrit access for repoload.
//!
//! Runs `gerrit query` over the server's SSH interface, turns the line-delimited
//! JSON reply into typed change records and builds the change and topic listings.

pub mod error;
pub mod query;
pub mod record;
pub mod report;

pub use error::{ErrorKind, GerritError, GerritResult};
pub use query::{debug_report, parse_response, quote_for_shell, QueryClient, SshTransport, Transport, DEFAULT_SSH_PORT};
pub use record::{ChangeNumber, ChangeRecord, Owner, StatsRecord};
pub use report::{format_change_line, group_by_topic, open_change_lines, topic_lines, TopicGroup};
