use anyhow::{Context, Result};
use clap::Args;
use rl_gerrit::{open_change_lines, topic_lines, QueryClient, Transport};
use rl_repo::{Downloader, Identifier};
use std::io::Write;
use tracing::debug;

use crate::Commands;

/// Arguments for downloading a change or topic
#[derive(Args)]
pub struct DownloadArgs {
    /// Change ID or topic name
    #[arg(value_name = "VALUE")]
    pub value: String,

    /// Just print the repo commands instead of executing.
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,
}

impl Commands {
    /// Execute the selected command, writing its report to `out`
    pub fn run<T: Transport, W: Write>(&self, client: &QueryClient<T>, out: &mut W) -> Result<()> {
        match self {
            Commands::Changes => print_open_changes(client, out),
            Commands::Topics => print_open_topics(client, out),
            Commands::Download(args) => args.run(client, out),
        }
    }
}

pub fn print_open_changes<T: Transport, W: Write>(client: &QueryClient<T>, out: &mut W) -> Result<()> {
    let changes = client
        .open_changes()
        .context("Failed to query open changes")?;
    debug!(count = changes.len(), "listing open changes");
    for line in open_change_lines(&changes) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Gerrit has no query for topics, so they are collected from all open changes.
pub fn print_open_topics<T: Transport, W: Write>(client: &QueryClient<T>, out: &mut W) -> Result<()> {
    let changes = client
        .open_changes()
        .context("Failed to query open changes")?;
    debug!(count = changes.len(), "grouping open changes by topic");
    for line in topic_lines(&changes) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

impl DownloadArgs {
    pub fn run<T: Transport, W: Write>(&self, client: &QueryClient<T>, out: &mut W) -> Result<()> {
        let identifier = Identifier::parse(&self.value);
        debug!(%identifier, dry_run = self.dry_run, "download requested");
        Downloader::new(client)
            .download(&identifier, self.dry_run, out)
            .with_context(|| format!("Failed to download {identifier}"))?;
        Ok(())
    }
}
