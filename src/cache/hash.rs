use sha2::{Digest, Sha256};

use crate::models::Style;

const CACHE_KEY_LEN: usize = 16;

pub fn compute_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}

/// Cache key for a generation request: the first 16 hex chars of
/// SHA-256 over `company:prompt:style:colors`, colors sorted and deduplicated.
pub fn derive_key(company: &str, prompt: &str, style: Option<Style>, colors: &[String]) -> String {
    let mut sorted: Vec<&str> = colors.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    let canonical = format!(
        "{}:{}:{}:{}",
        company,
        prompt,
        style.map(Style::as_str).unwrap_or("default"),
        sorted.join(",")
    );
    let mut digest = compute_hash(&canonical);
    digest.truncate(CACHE_KEY_LEN);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn key_is_sixteen_hex_chars() {
        let key = derive_key("Acme", "rockets", None, &[]);
        assert_eq!(key.len(), 16);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn key_matches_truncated_sha256_of_canonical_string() {
        let key = derive_key("A", "p", Some(Style::Bold), &colors(&["red", "blue"]));
        assert_eq!(key, compute_hash("A:p:bold:blue,red")[..16]);
        let plain = derive_key("A", "p", None, &[]);
        assert_eq!(plain, compute_hash("A:p:default:")[..16]);
    }

    #[test]
    fn color_order_does_not_matter() {
        assert_eq!(
            derive_key("A", "p", None, &colors(&["red", "blue"])),
            derive_key("A", "p", None, &colors(&["blue", "red"]))
        );
        assert_eq!(
            derive_key("A", "p", None, &colors(&["red", "blue", "red"])),
            derive_key("A", "p", None, &colors(&["blue", "red"]))
        );
    }

    #[test]
    fn every_other_field_changes_the_key() {
        let base = derive_key("A", "p", None, &[]);
        assert_ne!(base, derive_key("B", "p", None, &[]));
        assert_ne!(base, derive_key("A", "q", None, &[]));
        assert_ne!(base, derive_key("A", "p", Some(Style::Modern), &[]));
        assert_ne!(base, derive_key("A", "p", None, &colors(&["red"])));
    }
}
