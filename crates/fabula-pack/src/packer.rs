use indexmap::IndexMap;

use fabula_types::ResourceKey;

/// `key → [offset, length]` in UTF-8 bytes into a partition's blob.
///
/// Serializes as a JSON object whose values are two-element arrays.
pub type ResourceIndex = IndexMap<ResourceKey, (usize, usize)>;

/// Builds one partition's resource blob by appending registered values at a
/// running byte offset.
#[derive(Debug, Default)]
pub struct ResourcePacker {
    blob: String,
    index: ResourceIndex,
    next_key: usize,
}

impl ResourcePacker {
    /// Create an empty packer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource value.
    ///
    /// Empty or absent values return `None`: no key is issued, no index
    /// entry is written and no bytes are appended, so the blob never grows
    /// placeholders. Every non-empty call appends, even for a value already
    /// registered (no intra-partition dedup).
    pub fn register(&mut self, value: &str) -> Option<ResourceKey> {
        if value.is_empty() {
            return None;
        }
        let key = ResourceKey::from_index(self.next_key);
        self.next_key += 1;
        let offset = self.blob.len();
        self.blob.push_str(value);
        self.index.insert(key.clone(), (offset, value.len()));
        Some(key)
    }

    /// Convenience for optional values.
    pub fn register_opt(&mut self, value: Option<&str>) -> Option<ResourceKey> {
        self.register(value.unwrap_or(""))
    }

    /// Number of index entries so far.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Consume the packer, yielding the blob and its index.
    pub fn finish(self) -> (String, ResourceIndex) {
        (self.blob, self.index)
    }
}
