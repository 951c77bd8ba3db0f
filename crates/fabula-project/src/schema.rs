//! The explicit image-field schema walk.
//!
//! Exactly one fixed list of (collection, field, category) triples decides
//! which document fields carry images and which store category each one
//! saves to. The serializer and rehydrator both iterate this walk; nothing
//! else in the codebase discovers image fields.

use fabula_types::AssetCategory;

use crate::document::ProjectDocument;

/// Visit every image-bearing field with its save-time category.
///
/// Categories are assigned by calling context: an entity embedded in a
/// moment is still character art, while a moment's own illustration files
/// under `Momentos`.
pub fn walk_image_fields<F>(doc: &mut ProjectDocument, mut visit: F)
where
    F: FnMut(&mut String, AssetCategory),
{
    for character in &mut doc.characters {
        visit(&mut character.image, AssetCategory::Character);
    }
    for character in &mut doc.archived_characters {
        visit(&mut character.image, AssetCategory::Character);
    }
    for chapter in &mut doc.chapters {
        visit(&mut chapter.image, AssetCategory::Chapter);
    }
    for scene in &mut doc.scenes {
        visit(&mut scene.image, AssetCategory::Scene);
    }
    for moment in &mut doc.moments {
        visit(&mut moment.illustration, AssetCategory::Moment);
        for entity in &mut moment.entities {
            visit(&mut entity.image, AssetCategory::Character);
        }
    }
    for position in &mut doc.element_positions {
        visit(&mut position.image, AssetCategory::Compositor);
    }
}
