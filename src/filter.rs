use crate::models::Topic;

/// Topics whose code, name, keywords or any item contain `query`, ignoring case.
/// A blank query keeps everything in its original order.
pub fn filter(topics: &[Topic], query: &str) -> Vec<Topic> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return topics.to_vec();
    }

    let needle = trimmed.to_lowercase();
    topics
        .iter()
        .filter(|topic| matches(topic, &needle))
        .cloned()
        .collect()
}

/// `needle` must already be lowercased.
pub fn matches(topic: &Topic, needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);
    contains(topic.code.as_str())
        || contains(topic.name.as_str())
        || contains(topic.keywords.as_str())
        || topic.items.iter().any(|item| contains(item.as_str()))
}

#[cfg(test)]
mod tests {
    use super::filter;
    use crate::models::Topic;

    fn sample() -> Vec<Topic> {
        vec![
            Topic::new("TC1", "Intro", &["Read the overview"], "basics"),
            Topic::new("USR-7", "Robust Control", &["Study H-infinity synthesis"], "uncertainty"),
            Topic::new("TC3", "Computers", &["Sampling and discretization"], "embedded, real-time"),
        ]
    }

    fn codes(topics: &[Topic]) -> Vec<&str> {
        topics.iter().map(|topic| topic.code.as_str()).collect()
    }

    #[test]
    fn blank_query_is_identity() {
        let topics = sample();
        assert_eq!(filter(&topics, ""), topics);
        assert_eq!(filter(&topics, "  \t\n"), topics);
    }

    #[test]
    fn case_insensitive_on_query_and_fields() {
        let topics = sample();
        assert_eq!(filter(&topics, "usr"), filter(&topics, "USR"));
        assert_eq!(codes(&filter(&topics, "usr")), vec!["USR-7"]);
        assert_eq!(codes(&filter(&topics, "ROBUST")), vec!["USR-7"]);
    }

    #[test]
    fn matches_name_only() {
        let topics = sample();
        assert_eq!(codes(&filter(&topics, "intro")), vec!["TC1"]);
        assert!(filter(&topics, "zzz").is_empty());
    }

    #[test]
    fn matches_keywords_and_items() {
        let topics = sample();
        assert_eq!(codes(&filter(&topics, "real-time")), vec!["TC3"]);
        assert_eq!(codes(&filter(&topics, "h-INFINITY")), vec!["USR-7"]);
    }

    #[test]
    fn keeps_original_order_for_multiple_hits() {
        let topics = sample();
        assert_eq!(codes(&filter(&topics, "tc")), vec!["TC1", "TC3"]);
        assert_eq!(codes(&filter(&topics, " tc ")), vec!["TC1", "TC3"]);
    }
}
