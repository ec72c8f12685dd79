use crate::keys::derive_key;
use crate::models::{ProgressSummary, Topic};
use std::collections::HashMap;

pub fn progress(topics: &[Topic], checked: &HashMap<String, bool>) -> f64 {
    summarize(topics, checked).ratio
}

pub fn summarize(topics: &[Topic], checked: &HashMap<String, bool>) -> ProgressSummary {
    topics
        .iter()
        .map(|topic| count(topic, checked))
        .fold(ProgressSummary::default(), |acc, (total, completed)| {
            summary(acc.total + total, acc.completed + completed)
        })
}

pub fn topic_progress(topic: &Topic, checked: &HashMap<String, bool>) -> ProgressSummary {
    let (total, completed) = count(topic, checked);
    summary(total, completed)
}

fn count(topic: &Topic, checked: &HashMap<String, bool>) -> (usize, usize) {
    let completed = topic
        .items
        .iter()
        .filter(|item| checked.get(&derive_key(&topic.code, item)).copied().unwrap_or(false))
        .count();
    (topic.items.len(), completed)
}

fn summary(total: usize, completed: usize) -> ProgressSummary {
    let ratio = if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    };
    ProgressSummary {
        total,
        completed,
        ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::{progress, summarize, topic_progress};
    use crate::keys::derive_key;
    use crate::models::Topic;
    use std::collections::HashMap;

    #[test]
    fn zero_items_is_zero() {
        assert_eq!(progress(&[], &HashMap::new()), 0.0);
        let empty = vec![Topic::new("TC1", "Empty", &[], "")];
        assert_eq!(progress(&empty, &HashMap::new()), 0.0);
    }

    #[test]
    fn counts_only_true_flags() {
        let topics = vec![
            Topic::new("TC1", "Intro", &["a", "b"], ""),
            Topic::new("TC2", "More", &["c", "d"], ""),
        ];
        let mut checked = HashMap::new();
        checked.insert(derive_key("TC1", "a"), true);
        checked.insert(derive_key("TC2", "c"), false);
        checked.insert("ffffffffffffffffffffffff".to_string(), true);

        let summary = summarize(&topics, &checked);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.ratio, 0.25);
        assert_eq!(topic_progress(&topics[1], &checked).completed, 0);
    }

    #[test]
    fn duplicate_items_share_a_key() {
        let topics = vec![Topic::new("TC1", "Dup", &["same", "same", "other"], "")];
        let mut checked = HashMap::new();
        checked.insert(derive_key("TC1", "same"), true);

        let summary = summarize(&topics, &checked);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 2);
    }

    #[test]
    fn shared_code_across_lists_counts_both_entries() {
        let topics = vec![
            Topic::new("TC1", "Built-in", &["a"], ""),
            Topic::new("TC1", "User", &["a", "b"], ""),
        ];
        let mut checked = HashMap::new();
        checked.insert(derive_key("TC1", "a"), true);

        assert_eq!(summarize(&topics, &checked).completed, 2);
        assert!((progress(&topics, &checked) - 2.0 / 3.0).abs() < f64::EPSILON);
    }
}
