//! Analysis document schema
//!
//! Stores batch analysis results with a free-form payload.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for analyses
pub const ANALYSIS_COLLECTION: &str = "analyses";

/// Analysis type
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    /// Skill coverage and gaps
    #[default]
    Skills,
    /// Member interaction network
    Network,
    /// Activity trends
    Activity,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Skills => "skills",
            AnalysisType::Network => "network",
            AnalysisType::Activity => "activity",
        }
    }
}

/// Analysis status
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Pending => "pending",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Failed => "failed",
        }
    }
}

/// Analysis document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct AnalysisDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Analysis type
    #[serde(default)]
    pub analysis_type: AnalysisType,

    /// Free-form insights payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<serde_json::Value>,

    /// Free-form suggestions payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<serde_json::Value>,

    /// Free-form statistics payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<serde_json::Value>,

    /// Analysis status
    #[serde(default)]
    pub status: AnalysisStatus,
}

impl AnalysisDoc {
    /// Create a new analysis document
    pub fn new(
        analysis_type: AnalysisType,
        insights: Option<serde_json::Value>,
        suggestions: Option<serde_json::Value>,
        statistics: Option<serde_json::Value>,
        status: AnalysisStatus,
    ) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            analysis_type,
            insights,
            suggestions,
            statistics,
            status,
        }
    }
}

impl IntoIndexes for AnalysisDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "analysis_type": 1 },
            Some(IndexOptions::builder().name("type_index".to_string()).build()),
        )]
    }
}

impl MutMetadata for AnalysisDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
