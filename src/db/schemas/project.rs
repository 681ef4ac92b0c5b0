//! Project document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for projects
pub const PROJECT_COLLECTION: &str = "projects";

/// Project lifecycle status
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    /// Proposed, not yet started
    #[default]
    Idea,
    /// In progress
    Active,
    /// Finished
    Completed,
    /// Shelved
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Idea => "idea",
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Archived => "archived",
        }
    }
}

/// Project document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ProjectDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Project title
    pub title: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Member ID references (not validated at the storage layer)
    #[serde(default)]
    pub member_ids: Vec<String>,

    /// Lifecycle status
    #[serde(default)]
    pub status: ProjectStatus,

    /// Free-text tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProjectDoc {
    /// Create a new project document
    pub fn new(
        title: String,
        description: String,
        member_ids: Vec<String>,
        status: ProjectStatus,
        tags: Vec<String>,
    ) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            title,
            description,
            member_ids,
            status,
            tags,
        }
    }
}

impl IntoIndexes for ProjectDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Index on title for search
            (
                doc! { "title": 1 },
                Some(IndexOptions::builder().name("title_index".to_string()).build()),
            ),
            // Index on status for filtered listings
            (
                doc! { "status": 1 },
                Some(IndexOptions::builder().name("status_index".to_string()).build()),
            ),
        ]
    }
}

impl MutMetadata for ProjectDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
