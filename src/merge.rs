use crate::models::Topic;

/// Built-in topics in catalog order, then user topics in insertion order. Codes shared across
/// the two lists are kept on both sides.
pub fn merge(built_in: &[Topic], user: &[Topic]) -> Vec<Topic> {
    let mut merged = Vec::with_capacity(built_in.len() + user.len());
    merged.extend_from_slice(built_in);
    merged.extend_from_slice(user);
    merged
}
