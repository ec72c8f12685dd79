use sha2::{Digest, Sha256};
use std::fmt::Write as _;

const KEY_HEX_LEN: usize = 24;

/// Storage key for one bullet: the first 24 hex chars of SHA-256 over `"<code>::<item>"`.
pub fn derive_key(code: &str, item: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hasher.update(b"::");
    hasher.update(item.as_bytes());
    let digest = hasher.finalize();

    let mut key = String::with_capacity(KEY_HEX_LEN);
    for byte in digest.iter().take(KEY_HEX_LEN / 2) {
        let _ = write!(key, "{:02x}", byte);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::derive_key;
    use std::collections::HashSet;

    #[test]
    fn matches_known_digest_prefix() {
        assert_eq!(derive_key("TC1", "a"), "24596e8c761def24315c0bee");
        assert_eq!(derive_key("TC1", "b"), "9011997f171d1d6fd394a5ca");
        let key = derive_key("TC1", "a");
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn empty_inputs_hash_the_separator() {
        assert_eq!(derive_key("", ""), "71546855d6279ef70d20909b");
        assert_ne!(derive_key("", ""), derive_key(":", ":"));
    }

    #[test]
    fn distinct_pairs_produce_distinct_keys() {
        let mut keys = HashSet::new();
        for topic in 0..60 {
            for item in 0..40 {
                let code = format!("TC{}.{}", topic / 10, topic % 10);
                let text = format!("Bullet {} of topic {}", item, topic);
                assert!(keys.insert(derive_key(&code, &text)));
            }
        }
        assert_eq!(keys.len(), 60 * 40);
    }

    #[test]
    fn separator_is_part_of_identity() {
        assert_ne!(derive_key("TC1", "a"), derive_key("TC1:", "a"));
        assert_ne!(derive_key("TC1", "a b"), derive_key("TC1 a", "b"));
    }

    #[test]
    fn handles_non_ascii_text() {
        let key = derive_key("TC9.1", "Regelungstechnik für Fahrzeuge");
        assert_eq!(key.len(), 24);
    }
}
