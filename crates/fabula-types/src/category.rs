use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The store subdirectory a blob is written to.
///
/// Categories are assigned at save time based on the calling context (which
/// collection the image field belongs to), never derived from the content
/// itself. The on-disk directory names are the original Spanish ones so that
/// existing project trees keep loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetCategory {
    /// Character portraits (`Personajes`).
    Character,
    /// Scene backdrops (`Escenas`).
    Scene,
    /// Chapter covers (`Capitulos`).
    Chapter,
    /// Moment illustrations (`Momentos`).
    Moment,
    /// Canvas compositor elements (`Compositor`).
    Compositor,
    /// Anything saved without a more specific context (`Datos`).
    Uncategorized,
}

impl AssetCategory {
    /// All categories, in on-disk creation order.
    pub const ALL: [Self; 6] = [
        Self::Uncategorized,
        Self::Chapter,
        Self::Scene,
        Self::Character,
        Self::Moment,
        Self::Compositor,
    ];

    /// The subdirectory name under `Assets/`.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Character => "Personajes",
            Self::Scene => "Escenas",
            Self::Chapter => "Capitulos",
            Self::Moment => "Momentos",
            Self::Compositor => "Compositor",
            Self::Uncategorized => "Datos",
        }
    }

    /// Parse an on-disk directory name back into a category.
    pub fn from_dir_name(name: &str) -> Result<Self, TypeError> {
        match name {
            "Personajes" => Ok(Self::Character),
            "Escenas" => Ok(Self::Scene),
            "Capitulos" => Ok(Self::Chapter),
            "Momentos" => Ok(Self::Moment),
            "Compositor" => Ok(Self::Compositor),
            "Datos" => Ok(Self::Uncategorized),
            other => Err(TypeError::UnknownCategory(other.to_string())),
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}
