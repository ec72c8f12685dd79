use crate::catalog::Catalog;
use crate::errors::AppError;
use crate::filter::filter;
use crate::keys::derive_key;
use crate::merge::merge;
use crate::models::{
    AddTopicPayload, Diagnostic, DiagnosticSource, SessionEvent, SessionPhase, SessionSnapshot, Topic, TopicView,
    PLACEHOLDER_ITEMS, USER_TOPIC_SEQ_KEY,
};
use crate::progress::{progress, summarize, topic_progress};
use crate::store::Store;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

const USER_CODE_PREFIX: &str = "USER-";
const EVENT_CAPACITY: usize = 64;
// Larger USER-N indices are treated as ordinary explicit codes, not sequence positions.
const MAX_USER_INDEX: u64 = u32::MAX as u64;

static USER_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^USER-(\d+)$").expect("valid user code regex"));

/// Owns the merged topic list and everything derived from it for one local session.
///
/// Mutations write through the store first and recompute derived state before returning, so
/// `filtered` and `overall_progress` always reflect the latest call. Persistence failures are
/// recorded as diagnostics instead of being returned.
pub struct SessionState {
    store: Arc<dyn Store>,
    catalog: Catalog,
    phase: SessionPhase,
    built_in: Vec<Topic>,
    user: Vec<Topic>,
    all: Vec<Topic>,
    filtered: Vec<Topic>,
    checked: HashMap<String, bool>,
    query: String,
    overall_progress: f64,
    diagnostics: Vec<Diagnostic>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionState {
    pub fn new(store: Arc<dyn Store>, catalog: Catalog) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            catalog,
            phase: SessionPhase::Uninitialized,
            built_in: Vec::new(),
            user: Vec::new(),
            all: Vec::new(),
            filtered: Vec::new(),
            checked: HashMap::new(),
            query: String::new(),
            overall_progress: 0.0,
            diagnostics: Vec::new(),
            events,
        }
    }

    pub async fn initialize(&mut self) -> SessionSnapshot {
        self.built_in = match self.catalog.load_built_in().await {
            Ok(topics) => topics,
            Err(error) => {
                self.record(DiagnosticSource::Catalog, &error);
                Vec::new()
            }
        };

        self.user = match self.store.try_load_user_topics() {
            Ok(topics) => topics,
            Err(error) => {
                self.record(DiagnosticSource::UserTopics, &error);
                Vec::new()
            }
        };

        self.checked = match self.store.load_checked() {
            Ok(checked) => checked,
            Err(error) => {
                self.record(DiagnosticSource::CheckState, &error);
                HashMap::new()
            }
        };

        self.phase = SessionPhase::Ready;
        self.merge_and_recalc();

        tracing::info!(
            asset = %self.catalog.name(),
            built_in = self.built_in.len(),
            user = self.user.len(),
            progress = self.overall_progress,
            "tracker session initialized"
        );
        self.publish(SessionEvent::Initialized {
            topic_count: self.all.len(),
            progress: self.overall_progress,
        });
        self.snapshot()
    }

    pub fn set_query(&mut self, query: &str) -> SessionSnapshot {
        self.query = query.to_string();
        self.apply_filter();
        self.publish(SessionEvent::QueryChanged {
            query: self.query.clone(),
            matched: self.filtered.len(),
        });
        self.snapshot()
    }

    /// Flips the check flag for one bullet of the topic with `code`.
    pub fn toggle_item(&mut self, code: &str, item: &str) -> SessionSnapshot {
        self.warn_if_uninitialized("toggle_item");
        let key = derive_key(code, item);
        let next = !self.checked.get(&key).copied().unwrap_or(false);

        if let Err(error) = self.store.set_checked(&key, next) {
            self.record(DiagnosticSource::Persist, &error);
        }
        self.checked.insert(key, next);
        self.recalc_progress();

        tracing::debug!(code = %code, checked = next, progress = self.overall_progress, "toggled item");
        self.publish(SessionEvent::ItemToggled {
            code: code.to_string(),
            item: item.to_string(),
            checked: next,
            progress: self.overall_progress,
        });
        self.snapshot()
    }

    /// Adds a user topic, replacing any user topic that already has the same code.
    /// Only empty fields are defaulted; everything else is stored exactly as given.
    pub fn add_or_replace_user_topic(&mut self, payload: AddTopicPayload) -> (Topic, SessionSnapshot) {
        self.warn_if_uninitialized("add_or_replace_user_topic");
        let AddTopicPayload {
            code,
            name,
            items,
            keywords,
        } = payload;

        let code = match code.filter(|code| !code.trim().is_empty()) {
            Some(code) => code,
            None => self.next_user_code(),
        };
        let name = if name.is_empty() {
            format!("Custom Topic {}", code)
        } else {
            name
        };
        let items = if items.is_empty() {
            PLACEHOLDER_ITEMS.iter().map(ToString::to_string).collect()
        } else {
            items
        };

        let topic = Topic {
            code: code.clone(),
            name,
            items,
            keywords,
        };

        let before = self.user.len();
        self.user.retain(|existing| existing.code != code);
        let replaced = self.user.len() != before;
        self.user.push(topic.clone());
        self.persist_user_topics();
        self.merge_and_recalc();

        tracing::info!(code = %code, replaced, "saved user topic");
        self.publish(SessionEvent::TopicSaved { code, replaced });
        (topic, self.snapshot())
    }

    /// Removes a user topic. Built-in topics are never removed; check flags for the removed
    /// bullets stay in the store.
    pub fn remove_user_topic(&mut self, code: &str) -> bool {
        let before = self.user.len();
        self.user.retain(|existing| existing.code != code);
        if self.user.len() == before {
            return false;
        }

        self.persist_user_topics();
        self.merge_and_recalc();

        tracing::info!(code = %code, "removed user topic");
        self.publish(SessionEvent::TopicRemoved { code: code.to_string() });
        true
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            query: self.query.clone(),
            topic_count: self.all.len(),
            filtered: self
                .filtered
                .iter()
                .map(|topic| TopicView {
                    topic: topic.clone(),
                    progress: topic_progress(topic, &self.checked),
                })
                .collect(),
            progress: summarize(&self.all, &self.checked),
            last_error: self.last_error().cloned(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn all(&self) -> &[Topic] {
        &self.all
    }

    pub fn filtered(&self) -> &[Topic] {
        &self.filtered
    }

    pub fn built_in(&self) -> &[Topic] {
        &self.built_in
    }

    pub fn user_topics(&self) -> &[Topic] {
        &self.user
    }

    pub fn checked(&self) -> &HashMap<String, bool> {
        &self.checked
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn overall_progress(&self) -> f64 {
        self.overall_progress
    }

    pub fn is_checked(&self, code: &str, item: &str) -> bool {
        self.checked.get(&derive_key(code, item)).copied().unwrap_or(false)
    }

    /// First topic in merged order with `code`; built-in entries win over user entries.
    pub fn find_topic(&self, code: &str) -> Option<&Topic> {
        self.all.iter().find(|topic| topic.code == code)
    }

    pub fn last_error(&self) -> Option<&Diagnostic> {
        self.diagnostics.last()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn merge_and_recalc(&mut self) {
        self.all = merge(&self.built_in, &self.user);
        self.apply_filter();
        self.recalc_progress();
    }

    fn apply_filter(&mut self) {
        self.filtered = filter(&self.all, &self.query);
    }

    fn recalc_progress(&mut self) {
        self.overall_progress = progress(&self.all, &self.checked);
    }

    fn persist_user_topics(&mut self) {
        if let Err(error) = self.store.save_user_topics(&self.user) {
            self.record(DiagnosticSource::Persist, &error);
        }
    }

    /// Next `USER-NNN` code. The counter only moves forward and skips codes already in use,
    /// so removing a topic never lets a later one inherit its code.
    fn next_user_code(&mut self) -> String {
        let stored = match self.store.read_blob(USER_TOPIC_SEQ_KEY) {
            Ok(raw) => raw
                .and_then(|raw| raw.trim().parse::<u64>().ok())
                .filter(|index| *index <= MAX_USER_INDEX)
                .unwrap_or(0),
            Err(error) => {
                self.record(DiagnosticSource::UserTopics, &error);
                0
            }
        };
        let highest = self
            .user
            .iter()
            .filter_map(|topic| USER_CODE_RE.captures(&topic.code))
            .filter_map(|caps| caps.get(1).and_then(|index| index.as_str().parse::<u64>().ok()))
            .filter(|index| *index <= MAX_USER_INDEX)
            .max()
            .unwrap_or(0);

        let mut next = stored.max(highest).max(self.user.len() as u64) + 1;
        let mut code = format!("{}{:03}", USER_CODE_PREFIX, next);
        while self.all.iter().any(|topic| topic.code == code) {
            next += 1;
            code = format!("{}{:03}", USER_CODE_PREFIX, next);
        }

        if let Err(error) = self.store.write_blob(USER_TOPIC_SEQ_KEY, &next.to_string()) {
            self.record(DiagnosticSource::Persist, &error);
        }
        code
    }

    fn record(&mut self, source: DiagnosticSource, error: &AppError) {
        tracing::warn!(source = source.as_str(), error = %error, "tracker degraded to default value");
        self.diagnostics.push(Diagnostic {
            source,
            message: error.to_string(),
            recorded_at: Utc::now(),
        });
    }

    fn warn_if_uninitialized(&self, operation: &str) {
        if self.phase == SessionPhase::Uninitialized {
            tracing::warn!(operation, "tracker session used before initialize");
        }
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
