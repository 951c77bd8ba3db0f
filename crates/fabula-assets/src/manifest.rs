use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use fabula_types::AssetDigest;

/// One manifest record per unique blob ever written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// The digest-derived filename the blob was stored under.
    #[serde(rename = "storedName")]
    pub stored_name: String,
    /// Declared MIME of the canonical bytes.
    pub mime: String,
    /// Byte length of the canonical bytes.
    #[serde(rename = "byteSize")]
    pub byte_size: u64,
}

/// Append-only digest → entry map, persisted inside the project document.
///
/// The manifest is owned by the project, not the store: it travels with
/// `proyecto.json` so an uploaded project still knows the MIME of every
/// referenced blob. Entries are never removed or rewritten.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl AssetManifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a blob. Returns `false` (and changes nothing) when the digest
    /// is already known — the manifest is append-only.
    pub fn record(&mut self, digest: &AssetDigest, entry: ManifestEntry) -> bool {
        let hex = digest.to_hex();
        if self.entries.contains_key(&hex) {
            return false;
        }
        self.entries.insert(hex, entry);
        true
    }

    /// Look up the entry for a digest.
    pub fn get(&self, digest: &AssetDigest) -> Option<&ManifestEntry> {
        self.entries.get(&digest.to_hex())
    }

    /// Number of unique blobs recorded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no blob has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in digest order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> ManifestEntry {
        ManifestEntry {
            stored_name: name.to_string(),
            mime: "image/png".to_string(),
            byte_size: 4,
        }
    }

    #[test]
    fn record_is_append_only() {
        let digest = AssetDigest::from_bytes(b"img");
        let mut manifest = AssetManifest::new();
        assert!(manifest.record(&digest, entry("a.png")));
        assert!(!manifest.record(&digest, entry("b.png")));
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.get(&digest).unwrap().stored_name, "a.png");
    }

    #[test]
    fn serializes_with_external_field_names() {
        let digest = AssetDigest::from_bytes(b"img");
        let mut manifest = AssetManifest::new();
        manifest.record(&digest, entry("a.png"));
        let json = serde_json::to_value(&manifest).unwrap();
        let record = &json[digest.to_hex()];
        assert_eq!(record["storedName"], "a.png");
        assert_eq!(record["byteSize"], 4);
        assert_eq!(record["mime"], "image/png");
    }
}
