use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;

const ROOT_KEY: &str = "root";

/// Identity of a node within one editor instance.
///
/// Keys are never persisted: the JSON tree carries no keys and a fresh set is
/// assigned every time a tree is imported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(String);

impl NodeKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key of the single root node of every document
    pub fn root() -> Self {
        Self(ROOT_KEY.to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_KEY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive a short, stable seed from an editor namespace using CRC32
pub fn namespace_seed(namespace: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(namespace.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential key generator for nodes created within one editor
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    seed: String,
    count: u64,
}

impl KeyGenerator {
    pub fn new(namespace: &str) -> Self {
        Self {
            seed: namespace_seed(namespace),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate the next key
    pub fn next_key(&mut self) -> NodeKey {
        self.count += 1;
        NodeKey(format!("{}-{}", self.seed, self.count))
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Number of keys handed out so far
    pub fn issued(&self) -> u64 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_seed_is_stable() {
        assert_eq!(namespace_seed("folio"), namespace_seed("folio"));
        assert_ne!(namespace_seed("folio"), namespace_seed("playground"));
    }

    #[test]
    fn test_sequential_keys() {
        let mut keys = KeyGenerator::new("folio");

        let k1 = keys.next_key();
        let k2 = keys.next_key();

        assert!(k1.as_str().ends_with("-1"));
        assert!(k2.as_str().ends_with("-2"));
        assert!(k1.as_str().starts_with(keys.seed()));
        assert_ne!(k1, k2);
        assert_eq!(keys.issued(), 2);
    }

    #[test]
    fn test_generated_keys_never_collide_with_root() {
        let mut keys = KeyGenerator::from_seed("root".to_string());
        assert!(!keys.next_key().is_root());
        assert!(NodeKey::root().is_root());
    }
}
