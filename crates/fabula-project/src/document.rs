//! The typed `proyecto.json` schema.
//!
//! External field names (the serde renames) are the original Spanish ones so
//! that existing documents keep loading byte-for-byte. Unknown top-level
//! fields belong to collaborator subsystems (editor layout, LLM settings,
//! billing) and pass through untouched via the flattened `extra` map.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use fabula_assets::AssetManifest;

/// The serialized project graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "capitulos", default)]
    pub chapters: Vec<Chapter>,
    #[serde(rename = "escenas", default)]
    pub scenes: Vec<SceneRecord>,
    #[serde(rename = "personajes", default)]
    pub characters: Vec<Character>,
    #[serde(rename = "personajesArchivados", default)]
    pub archived_characters: Vec<Character>,
    #[serde(rename = "momentos", default)]
    pub moments: Vec<MomentRecord>,
    #[serde(rename = "posicionesElementos", default)]
    pub element_positions: Vec<ElementPosition>,
    #[serde(rename = "carpetas", default)]
    pub folders: Vec<Folder>,
    #[serde(rename = "manifestImagenes", default)]
    pub image_manifest: AssetManifest,
    /// Collaborator-subsystem fields, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A character sheet. Archived characters use the same shape.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Character {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "imagen", default)]
    pub image: String,
}

/// A chapter cover.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "imagen", default)]
    pub image: String,
}

/// A scene backdrop, grouped under a chapter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "capitulo", default)]
    pub chapter: String,
    #[serde(rename = "imagen", default)]
    pub image: String,
}

/// One story unit: title, prose, an optional illustration, embedded entity
/// references, and outgoing gated actions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MomentRecord {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "ilustracion", default)]
    pub illustration: String,
    #[serde(rename = "entidades", default)]
    pub entities: Vec<EmbeddedEntity>,
    #[serde(rename = "acciones", default)]
    pub actions: Vec<ActionRecord>,
}

/// An entity (usually a character) embedded in a moment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedEntity {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "imagen", default)]
    pub image: String,
}

/// An outgoing action: label, destination moment (by title), and gates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    #[serde(rename = "etiqueta")]
    pub label: String,
    #[serde(rename = "destino")]
    pub destination: String,
    #[serde(rename = "condiciones", default)]
    pub conditions: Vec<ConditionRecord>,
}

/// A gating condition attached to an action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo")]
pub enum ConditionRecord {
    /// Set a flag when the action is taken.
    #[serde(rename = "activarFlag")]
    SetFlag { flag: String },
    /// The action is visible only while the flag is set.
    #[serde(rename = "requerirFlag")]
    RequireFlag { flag: String },
    /// Adjust an inventory count when the action is taken.
    #[serde(rename = "modificarObjeto")]
    AdjustItem {
        #[serde(rename = "objeto")]
        item: String,
        #[serde(rename = "cantidad")]
        amount: i64,
    },
    /// The action is visible only while the inventory holds at least
    /// `amount` of the item.
    #[serde(rename = "requerirObjeto")]
    RequireItem {
        #[serde(rename = "objeto")]
        item: String,
        #[serde(rename = "cantidad")]
        amount: u64,
    },
}

/// A positioned canvas element from the compositor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPosition {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(rename = "imagen", default)]
    pub image: String,
}

/// An organizational folder in the editor sidebar.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "elementos", default)]
    pub elements: Vec<String>,
}
