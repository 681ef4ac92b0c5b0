//! Database schemas for Annuaire
//!
//! Defines MongoDB document structures for the directory collections.

mod analysis;
mod catalog;
mod group;
mod interaction;
mod member;
mod metadata;
mod project;

pub use analysis::{AnalysisDoc, AnalysisStatus, AnalysisType, ANALYSIS_COLLECTION};
pub use catalog::{CatalogDoc, CatalogKind, SKILL_COLLECTION, SPECIALTY_COLLECTION};
pub use group::{GroupDoc, GroupPrivacy, GroupType, GROUP_COLLECTION};
pub use interaction::{
    AiAnalysis, InteractionDoc, InteractionStatus, InteractionType, RiskLevel,
    INTERACTION_COLLECTION,
};
pub use member::{MemberDoc, MAX_SKILLS, MAX_SPECIALTIES, MEMBER_COLLECTION};
pub use metadata::Metadata;
pub use project::{ProjectDoc, ProjectStatus, PROJECT_COLLECTION};
