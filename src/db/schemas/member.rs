//! Member document schema
//!
//! The central collection of the directory; skill/specialty sync scans it.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for members
pub const MEMBER_COLLECTION: &str = "members";

/// Maximum number of skills a member may declare
pub const MAX_SKILLS: usize = 20;

/// Maximum number of specialties a member may declare
pub const MAX_SPECIALTIES: usize = 10;

/// Member document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct MemberDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Display name
    pub name: String,

    /// Job title
    #[serde(default)]
    pub title: String,

    /// Contact email, unique across the collection
    pub email: String,

    /// Free-text specialty names, capped at MAX_SPECIALTIES
    #[serde(default)]
    pub specialties: Vec<String>,

    /// Free-text skill names, capped at MAX_SKILLS
    #[serde(default)]
    pub skills: Vec<String>,

    /// Employer or affiliation
    #[serde(default)]
    pub organization: String,

    /// Location (city, region)
    #[serde(default)]
    pub location: String,

    /// Years of professional experience
    #[serde(default)]
    pub experience_years: u32,

    /// Whether the member is active; inactive members are excluded from
    /// popularity statistics
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl MemberDoc {
    /// Create a new member document
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        title: String,
        email: String,
        specialties: Vec<String>,
        skills: Vec<String>,
        organization: String,
        location: String,
        experience_years: u32,
    ) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            name,
            title,
            email,
            specialties,
            skills,
            organization,
            location,
            experience_years,
            is_active: true,
        }
    }
}

impl IntoIndexes for MemberDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique index on email
            (
                doc! { "email": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("email_unique".to_string())
                        .build(),
                ),
            ),
            // Index on name for search
            (
                doc! { "name": 1 },
                Some(IndexOptions::builder().name("name_index".to_string()).build()),
            ),
            // Index on is_active for sync scans
            (
                doc! { "is_active": 1 },
                Some(
                    IndexOptions::builder()
                        .name("is_active_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for MemberDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
