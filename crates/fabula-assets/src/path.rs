//! Canonical store path construction and parsing.
//!
//! A canonical path is `Assets/<Category>/<digest>.<ext>`, always with `/`
//! separators regardless of platform, because it is persisted verbatim inside
//! the project document. The legacy layout is `Imagenes/<file>`.

use fabula_types::{AssetCategory, AssetDigest};

/// Root directory of the categorized layout.
pub const ASSETS_ROOT: &str = "Assets";

/// Root directory of the legacy flat layout (read-only compatibility).
pub const LEGACY_ROOT: &str = "Imagenes";

/// A parsed store-relative path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedPath<'a> {
    /// `Assets/<Category>/<file>`.
    Canonical {
        category: AssetCategory,
        file: &'a str,
    },
    /// `Imagenes/<file>`.
    Legacy { file: &'a str },
}

impl ParsedPath<'_> {
    /// The final path segment (the digest-named file).
    pub fn file_name(&self) -> &str {
        match self {
            Self::Canonical { file, .. } | Self::Legacy { file } => file,
        }
    }
}

/// Build the canonical relative path for a digest in a category.
pub fn canonical_path(category: AssetCategory, digest: &AssetDigest, ext: &str) -> String {
    format!(
        "{ASSETS_ROOT}/{}/{}.{ext}",
        category.dir_name(),
        digest.to_hex()
    )
}

/// Parse a store-relative path. Returns `None` for anything that is not in
/// the canonical or legacy layout (data URIs, remote URLs, plain strings).
pub fn parse_store_path(path: &str) -> Option<ParsedPath<'_>> {
    let mut parts = path.split('/');
    match parts.next()? {
        ASSETS_ROOT => {
            let category = AssetCategory::from_dir_name(parts.next()?).ok()?;
            let file = parts.next()?;
            if file.is_empty() || parts.next().is_some() {
                return None;
            }
            Some(ParsedPath::Canonical { category, file })
        }
        LEGACY_ROOT => {
            let file = parts.next()?;
            if file.is_empty() || parts.next().is_some() {
                return None;
            }
            Some(ParsedPath::Legacy { file })
        }
        _ => None,
    }
}

/// Whether a string is a canonical or legacy store path.
pub fn is_store_path(value: &str) -> bool {
    parse_store_path(value).is_some()
}

/// Extract the digest from a store path's file stem, if it parses as one.
///
/// Legacy files were not digest-named, so those return `None`.
pub fn digest_from_path(path: &str) -> Option<AssetDigest> {
    let file = parse_store_path(path)?.file_name().to_string();
    let stem = file.split('.').next()?;
    AssetDigest::from_hex(stem).ok()
}
