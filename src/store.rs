use crate::errors::{AppError, AppResult};
use crate::models::{Topic, USER_TOPICS_KEY};
use crate::validation::{decode_topic_set, encode_topic_set};
use std::collections::HashMap;
use std::sync::Mutex;

/// Durable local persistence for check flags and user-authored topics.
///
/// Check flags and text documents live in separate namespaces, so enumerating check state never
/// picks up unrelated settings.
pub trait Store: Send + Sync {
    fn load_checked(&self) -> AppResult<HashMap<String, bool>>;
    fn set_checked(&self, key: &str, value: bool) -> AppResult<()>;
    fn read_blob(&self, name: &str) -> AppResult<Option<String>>;
    fn write_blob(&self, name: &str, value: &str) -> AppResult<()>;

    fn try_load_user_topics(&self) -> AppResult<Vec<Topic>> {
        match self.read_blob(USER_TOPICS_KEY)? {
            Some(raw) => decode_topic_set(&raw),
            None => Ok(Vec::new()),
        }
    }

    /// Corrupt or missing payloads degrade to an empty list; the stored blob is left untouched.
    fn load_user_topics(&self) -> Vec<Topic> {
        match self.try_load_user_topics() {
            Ok(topics) => topics,
            Err(error) => {
                tracing::warn!(error = %error, "failed to load user topics; using empty list");
                Vec::new()
            }
        }
    }

    fn save_user_topics(&self, topics: &[Topic]) -> AppResult<()> {
        let raw = encode_topic_set(topics)?;
        self.write_blob(USER_TOPICS_KEY, &raw)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    checked: HashMap<String, bool>,
    blobs: HashMap<String, String>,
}

/// Process-local store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("memory store mutex poisoned".to_string()))
    }
}

impl Store for MemoryStore {
    fn load_checked(&self) -> AppResult<HashMap<String, bool>> {
        Ok(self.lock()?.checked.clone())
    }

    fn set_checked(&self, key: &str, value: bool) -> AppResult<()> {
        self.lock()?.checked.insert(key.to_string(), value);
        Ok(())
    }

    fn read_blob(&self, name: &str) -> AppResult<Option<String>> {
        Ok(self.lock()?.blobs.get(name).cloned())
    }

    fn write_blob(&self, name: &str, value: &str) -> AppResult<()> {
        self.lock()?.blobs.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryStore, Store};
    use crate::models::{Topic, USER_TOPICS_KEY};

    #[test]
    fn set_checked_overwrites() {
        let store = MemoryStore::new();
        store.set_checked("abc", true).expect("set");
        store.set_checked("abc", true).expect("set again");
        store.set_checked("def", false).expect("set");
        store.set_checked("abc", false).expect("flip");

        let checked = store.load_checked().expect("load");
        assert_eq!(checked.len(), 2);
        assert_eq!(checked.get("abc"), Some(&false));
    }

    #[test]
    fn user_topics_default_to_empty() {
        let store = MemoryStore::new();
        assert!(store.load_user_topics().is_empty());
        assert!(store.try_load_user_topics().expect("load").is_empty());
    }

    #[test]
    fn save_replaces_whole_list() {
        let store = MemoryStore::new();
        store
            .save_user_topics(&[Topic::new("A", "a", &["x"], ""), Topic::new("B", "b", &["y"], "")])
            .expect("save");
        store
            .save_user_topics(&[Topic::new("C", "c", &["z"], "")])
            .expect("save");

        let loaded = store.load_user_topics();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].code, "C");
    }

    #[test]
    fn corrupt_blob_degrades_and_is_kept() {
        let store = MemoryStore::new();
        store.write_blob(USER_TOPICS_KEY, "{\"tcs\": [").expect("write");

        assert!(store.load_user_topics().is_empty());
        assert!(store.try_load_user_topics().is_err());
        assert_eq!(
            store.read_blob(USER_TOPICS_KEY).expect("read").as_deref(),
            Some("{\"tcs\": [")
        );
    }
}
