use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Stable, human-derived node identifier.
///
/// Action destinations in the story graph resolve by slug, not by an opaque
/// id, so slug derivation must be deterministic: lowercase, alphanumeric runs
/// preserved, everything else collapsed to single `-` separators. Two moments
/// whose titles normalize to the same slug are a fatal precondition at export
/// time, caught by the graph builder.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from a human title.
    pub fn new(title: &str) -> Result<Self, TypeError> {
        let mut out = String::with_capacity(title.len());
        let mut pending_sep = false;
        for ch in title.chars() {
            if ch.is_alphanumeric() {
                if pending_sep && !out.is_empty() {
                    out.push('-');
                }
                pending_sep = false;
                for lower in ch.to_lowercase() {
                    out.push(lower);
                }
            } else {
                pending_sep = true;
            }
        }
        if out.is_empty() {
            return Err(TypeError::EmptySlug(title.to_string()));
        }
        Ok(Self(out))
    }

    /// Wrap an already-normalized slug (e.g. read back from an artifact).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The slug text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slug({})", self.0)
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_separates() {
        assert_eq!(Slug::new("The Old Mill").unwrap().as_str(), "the-old-mill");
    }

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(
            Slug::new("  A dark -- stormy... night!  ").unwrap().as_str(),
            "a-dark-stormy-night"
        );
    }

    #[test]
    fn keeps_accented_letters() {
        assert_eq!(Slug::new("El Sótano").unwrap().as_str(), "el-sótano");
    }

    #[test]
    fn identical_titles_collide() {
        assert_eq!(Slug::new("Chapter One").unwrap(), Slug::new("chapter ONE").unwrap());
    }

    #[test]
    fn empty_title_is_rejected() {
        assert!(matches!(Slug::new("---"), Err(TypeError::EmptySlug(_))));
    }
}
