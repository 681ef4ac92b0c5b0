//! Group document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for groups
pub const GROUP_COLLECTION: &str = "groups";

/// Group type
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    /// Working team with shared deliverables
    #[default]
    Team,
    /// Open interest community
    Community,
    /// Formal committee
    Committee,
}

impl GroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupType::Team => "team",
            GroupType::Community => "community",
            GroupType::Committee => "committee",
        }
    }
}

/// Group privacy
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GroupPrivacy {
    /// Visible to everyone
    #[default]
    Public,
    /// Membership by invitation
    Private,
}

impl GroupPrivacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupPrivacy::Public => "public",
            GroupPrivacy::Private => "private",
        }
    }
}

/// Group document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct GroupDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Group name
    pub name: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Group type
    #[serde(default)]
    pub group_type: GroupType,

    /// Privacy setting
    #[serde(default)]
    pub privacy: GroupPrivacy,

    /// Member ID references (not validated at the storage layer)
    #[serde(default)]
    pub member_ids: Vec<String>,

    /// Leader member ID reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<String>,
}

impl GroupDoc {
    /// Create a new group document
    pub fn new(
        name: String,
        description: String,
        group_type: GroupType,
        privacy: GroupPrivacy,
        member_ids: Vec<String>,
        leader_id: Option<String>,
    ) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            name,
            description,
            group_type,
            privacy,
            member_ids,
            leader_id,
        }
    }
}

impl IntoIndexes for GroupDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "name": 1 },
            Some(IndexOptions::builder().name("name_index".to_string()).build()),
        )]
    }
}

impl MutMetadata for GroupDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
