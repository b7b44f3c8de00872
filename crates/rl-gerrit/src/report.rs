//! Change and topic listings built from a query result.

use std::collections::{BTreeMap, BTreeSet};

use crate::record::ChangeRecord;

/// `<number>: <subject> (<name> <<email>>)` plus ` [topic: <topic>]` when set.
pub fn format_change_line(change: &ChangeRecord) -> String {
    let mut line = format!("{}: {} ({})", change.number, change.subject, change.owner);
    if let Some(topic) = &change.topic {
        line.push_str(&format!(" [topic: {topic}]"));
    }
    line
}

/// Listing lines ordered by ascending change number.
pub fn open_change_lines(changes: &[ChangeRecord]) -> Vec<String> {
    let mut sorted: Vec<&ChangeRecord> = changes.iter().collect();
    sorted.sort_by_key(|change| change.number);
    sorted.into_iter().map(format_change_line).collect()
}

/// Changes sharing one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicGroup {
    pub topic: String,
    pub changes: Vec<ChangeRecord>,
}

impl TopicGroup {
    /// Distinct owner names, alphabetically.
    pub fn owner_names(&self) -> Vec<&str> {
        self.changes
            .iter()
            .map(|change| change.owner.name.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Group changes by exact topic string, ordered by topic. Changes without a
/// topic are left out.
pub fn group_by_topic(changes: &[ChangeRecord]) -> Vec<TopicGroup> {
    let mut topics: BTreeMap<&str, Vec<ChangeRecord>> = BTreeMap::new();
    for change in changes {
        if let Some(topic) = change.topic.as_deref() {
            topics.entry(topic).or_default().push(change.clone());
        }
    }

    topics
        .into_iter()
        .map(|(topic, changes)| TopicGroup {
            topic: topic.to_string(),
            changes,
        })
        .collect()
}

/// `<topic> (<owner>, <owner>, ...)` for every topic.
pub fn topic_lines(changes: &[ChangeRecord]) -> Vec<String> {
    group_by_topic(changes)
        .iter()
        .map(|group| format!("{} ({})", group.topic, group.owner_names().join(", ")))
        .collect()
}
