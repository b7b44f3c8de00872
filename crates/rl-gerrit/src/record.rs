//! Typed views of the JSON objects emitted by `gerrit query --format=JSON`.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Value of the `type` field that marks the trailing stats object.
pub const STATS_TYPE: &str = "stats";

/// Numeric change identifier. Gerrit emits it either as a JSON number or as a
/// numeric string depending on server version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "RawNumber")]
pub struct ChangeNumber(pub u64);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(u64),
    Text(String),
}

impl TryFrom<RawNumber> for ChangeNumber {
    type Error = String;

    fn try_from(raw: RawNumber) -> Result<Self, Self::Error> {
        match raw {
            RawNumber::Number(n) => Ok(ChangeNumber(n)),
            RawNumber::Text(s) => s
                .parse()
                .map_err(|_| format!("change number is not numeric: {s:?}")),
        }
    }
}

impl FromStr for ChangeNumber {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ChangeNumber)
    }
}

impl fmt::Display for ChangeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// One open change as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeRecord {
    pub number: ChangeNumber,
    pub project: String,
    #[serde(default)]
    pub subject: String,
    /// `None` when the server sent no topic, `null` or an empty string.
    #[serde(default, deserialize_with = "non_empty_topic")]
    pub topic: Option<String>,
    #[serde(default)]
    pub owner: Owner,
}

fn non_empty_topic<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let topic = Option::<String>::deserialize(deserializer)?;
    Ok(topic.filter(|t| !t.is_empty()))
}

/// Trailer object closing every query response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub row_count: u64,
    #[serde(default)]
    pub more_changes: bool,
    #[serde(default)]
    pub run_time_milliseconds: Option<u64>,
}

impl StatsRecord {
    /// Whether a raw JSON value carries the stats tag.
    pub fn is_stats(value: &serde_json::Value) -> bool {
        value.get("type").and_then(|t| t.as_str()) == Some(STATS_TYPE)
    }
}
