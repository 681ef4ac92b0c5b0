//! Interaction document schema
//!
//! Records directed interactions between members, optionally annotated with
//! an AI-produced analysis sub-record.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for interactions
pub const INTERACTION_COLLECTION: &str = "interactions";

/// Interaction type
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    #[default]
    Meeting,
    Introduction,
    Collaboration,
    Message,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::Meeting => "meeting",
            InteractionType::Introduction => "introduction",
            InteractionType::Collaboration => "collaboration",
            InteractionType::Message => "message",
        }
    }
}

/// Interaction status
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InteractionStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Completed,
}

impl InteractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionStatus::Pending => "pending",
            InteractionStatus::Accepted => "accepted",
            InteractionStatus::Declined => "declined",
            InteractionStatus::Completed => "completed",
        }
    }
}

/// Risk level in the AI analysis sub-record
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// AI-produced analysis attached to an interaction
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct AiAnalysis {
    /// Free-text strategic value assessment
    #[serde(default)]
    pub strategic_value: String,

    /// Risk level
    #[serde(default)]
    pub risk_level: RiskLevel,

    /// Recommended follow-up actions
    #[serde(default)]
    pub recommended_actions: Vec<String>,
}

/// Interaction document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct InteractionDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Interaction type
    #[serde(default)]
    pub interaction_type: InteractionType,

    /// Initiating member ID reference
    pub from_id: String,

    /// Target member ID references
    #[serde(default)]
    pub to_ids: Vec<String>,

    /// Interaction status
    #[serde(default)]
    pub status: InteractionStatus,

    /// Optional AI analysis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AiAnalysis>,
}

impl InteractionDoc {
    /// Create a new interaction document
    pub fn new(
        interaction_type: InteractionType,
        from_id: String,
        to_ids: Vec<String>,
        status: InteractionStatus,
        ai_analysis: Option<AiAnalysis>,
    ) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            interaction_type,
            from_id,
            to_ids,
            status,
            ai_analysis,
        }
    }
}

impl IntoIndexes for InteractionDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Index on initiator for per-member lookups
            (
                doc! { "from_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("from_id_index".to_string())
                        .build(),
                ),
            ),
            // Index on status for filtered listings
            (
                doc! { "status": 1 },
                Some(IndexOptions::builder().name("status_index".to_string()).build()),
            ),
        ]
    }
}

impl MutMetadata for InteractionDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
