use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CATALOG_ASSET: &str = "ifac_tcs";
pub const USER_TOPICS_KEY: &str = "user_tcs_json";
pub const USER_TOPIC_SEQ_KEY: &str = "user_topic_seq";
pub const PLACEHOLDER_ITEMS: [&str; 2] = ["Example bullet 1", "Example bullet 2"];

/// One checklist section. `items` keeps its order and may contain duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic {
    pub code: String,
    pub name: String,
    pub items: Vec<String>,
    #[serde(default)]
    pub keywords: String,
}

impl Topic {
    pub fn new(code: &str, name: &str, items: &[&str], keywords: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            items: items.iter().map(ToString::to_string).collect(),
            keywords: keywords.to_string(),
        }
    }
}

/// Wire shape shared by the bundled catalog and the persisted user topics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSet {
    pub tcs: Vec<Topic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionPhase {
    Uninitialized,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticSource {
    Catalog,
    UserTopics,
    CheckState,
    Persist,
}

impl DiagnosticSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::UserTopics => "user-topics",
            Self::CheckState => "check-state",
            Self::Persist => "persist",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub source: DiagnosticSource,
    pub message: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub total: usize,
    pub completed: usize,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicView {
    pub topic: Topic,
    pub progress: ProgressSummary,
}

/// Derived state handed back to the presentation layer after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub query: String,
    pub topic_count: usize,
    pub filtered: Vec<TopicView>,
    pub progress: ProgressSummary,
    pub last_error: Option<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SessionEvent {
    Initialized { topic_count: usize, progress: f64 },
    QueryChanged { query: String, matched: usize },
    ItemToggled { code: String, item: String, checked: bool, progress: f64 },
    TopicSaved { code: String, replaced: bool },
    TopicRemoved { code: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTopicPayload {
    pub code: Option<String>,
    pub name: String,
    pub items: Vec<String>,
    pub keywords: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerSettings {
    pub catalog_asset: String,
    pub catalog_dir: Option<PathBuf>,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            catalog_asset: DEFAULT_CATALOG_ASSET.to_string(),
            catalog_dir: None,
        }
    }
}
