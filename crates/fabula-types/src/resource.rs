use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque key into one partition's packed resource blob.
///
/// Keys are issued by the resource packer from a per-partition counter, so a
/// given partition always produces the same sequence of keys. They carry no
/// meaning outside the partition that issued them.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKey(String);

impl ResourceKey {
    /// The key for the `n`-th registered resource in a partition.
    pub fn from_index(n: usize) -> Self {
        Self(format!("r_{n}"))
    }

    /// Wrap a key read back from an artifact.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceKey({})", self.0)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_sequential_and_stable() {
        assert_eq!(ResourceKey::from_index(0).as_str(), "r_0");
        assert_eq!(ResourceKey::from_index(7).as_str(), "r_7");
        assert_eq!(ResourceKey::from_index(7), ResourceKey::from_index(7));
    }

    #[test]
    fn serializes_as_bare_string() {
        let json = serde_json::to_string(&ResourceKey::from_index(3)).unwrap();
        assert_eq!(json, "\"r_3\"");
    }
}
