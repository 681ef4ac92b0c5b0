//! Skill and specialty catalog schema
//!
//! Skills and specialties share one document shape stored in two
//! collections; `CatalogKind` selects the collection and the member field
//! the sync scans.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::{MemberDoc, Metadata};
use crate::taxonomy::Category;

/// Collection name for skills
pub const SKILL_COLLECTION: &str = "skills";

/// Collection name for specialties
pub const SPECIALTY_COLLECTION: &str = "specialties";

/// Which catalog a handler or sync pass operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Skill,
    Specialty,
}

impl CatalogKind {
    /// Target collection name
    pub fn collection_name(&self) -> &'static str {
        match self {
            CatalogKind::Skill => SKILL_COLLECTION,
            CatalogKind::Specialty => SPECIALTY_COLLECTION,
        }
    }

    /// Singular label for messages ("Skill created", ...)
    pub fn label(&self) -> &'static str {
        match self {
            CatalogKind::Skill => "Skill",
            CatalogKind::Specialty => "Specialty",
        }
    }

    /// The member field this catalog is derived from
    pub fn labels_of<'a>(&self, member: &'a MemberDoc) -> &'a [String] {
        match self {
            CatalogKind::Skill => &member.skills,
            CatalogKind::Specialty => &member.specialties,
        }
    }
}

/// Skill/specialty document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CatalogDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Display name (first-seen trimmed spelling)
    pub name: String,

    /// Normalized name (trimmed, lowercased), unique across the collection
    pub name_key: String,

    /// Category, supplied at creation or derived by classification
    #[serde(default)]
    pub category: Category,

    /// Number of members referencing this entry; recomputed on sync
    #[serde(default)]
    pub member_count: i64,

    /// Percentage of active members referencing this entry, in [0, 100];
    /// recomputed on sync, tolerably stale between syncs
    #[serde(default)]
    pub popularity: f64,

    /// False once no member references the entry anymore
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl CatalogDoc {
    /// Create a new catalog entry with zeroed derived state
    pub fn new(name: String, name_key: String, category: Category) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            name,
            name_key,
            category,
            member_count: 0,
            popularity: 0.0,
            is_active: true,
        }
    }
}

impl IntoIndexes for CatalogDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique index on the normalized name
            (
                doc! { "name_key": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("name_key_unique".to_string())
                        .build(),
                ),
            ),
            // Index on member_count for popularity listings
            (
                doc! { "member_count": -1 },
                Some(
                    IndexOptions::builder()
                        .name("member_count_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for CatalogDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
