//! Directory statistics endpoint
//!
//! `GET /api/stats` - per-collection document counts and the most
//! referenced skills/specialties. Counts reflect the last sync for the
//! catalog collections and live documents elsewhere.

use bson::doc;
use hyper::Response;
use mongodb::options::FindOptions;
use serde::Serialize;
use tracing::warn;

use crate::db::schemas::{
    AnalysisDoc, CatalogDoc, CatalogKind, GroupDoc, InteractionDoc, MemberDoc, ProjectDoc,
    ANALYSIS_COLLECTION, GROUP_COLLECTION, INTERACTION_COLLECTION, MEMBER_COLLECTION,
    PROJECT_COLLECTION,
};
use crate::db::MongoClient;
use crate::routes::envelope::{self, ApiBody};
use crate::routes::require_mongo;
use crate::server::AppState;
use crate::taxonomy::Category;
use crate::types::{AnnuaireError, Result};

const TOP_ENTRIES: i64 = 5;

/// A top catalog entry
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEntry {
    pub name: String,
    pub category: Category,
    pub member_count: i64,
    pub popularity: f64,
}

/// Directory statistics
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub members: u64,
    pub active_members: u64,
    pub projects: u64,
    pub groups: u64,
    pub skills: u64,
    pub specialties: u64,
    pub interactions: u64,
    pub analyses: u64,
    pub top_skills: Vec<TopEntry>,
    pub top_specialties: Vec<TopEntry>,
}

/// `GET /api/stats`
pub async fn stats(state: &AppState) -> Response<ApiBody> {
    let mongo = match require_mongo(state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    match build_stats(mongo).await {
        Ok(view) => envelope::data(view),
        Err(e) => {
            warn!("Error building stats: {}", e);
            envelope::error(&e)
        }
    }
}

async fn build_stats(mongo: &MongoClient) -> Result<StatsView> {
    let members = mongo.collection::<MemberDoc>(MEMBER_COLLECTION).await?;
    let member_total = members.count(doc! {}).await?;
    let active_members = members.count(doc! { "is_active": true }).await?;

    let projects = mongo
        .collection::<ProjectDoc>(PROJECT_COLLECTION)
        .await?
        .count(doc! {})
        .await?;
    let groups = mongo
        .collection::<GroupDoc>(GROUP_COLLECTION)
        .await?
        .count(doc! {})
        .await?;
    let interactions = mongo
        .collection::<InteractionDoc>(INTERACTION_COLLECTION)
        .await?
        .count(doc! {})
        .await?;
    let analyses = mongo
        .collection::<AnalysisDoc>(ANALYSIS_COLLECTION)
        .await?
        .count(doc! {})
        .await?;

    let skills = mongo
        .collection::<CatalogDoc>(CatalogKind::Skill.collection_name())
        .await?;
    let skill_total = skills.count(doc! {}).await?;
    let top_skills = top_entries(&skills).await?;

    let specialties = mongo
        .collection::<CatalogDoc>(CatalogKind::Specialty.collection_name())
        .await?;
    let specialty_total = specialties.count(doc! {}).await?;
    let top_specialties = top_entries(&specialties).await?;

    Ok(StatsView {
        members: member_total,
        active_members,
        projects,
        groups,
        skills: skill_total,
        specialties: specialty_total,
        interactions,
        analyses,
        top_skills,
        top_specialties,
    })
}

async fn top_entries(
    collection: &crate::db::MongoCollection<CatalogDoc>,
) -> Result<Vec<TopEntry>> {
    use futures::stream::StreamExt;

    let filter = doc! {
        "metadata.is_deleted": { "$ne": true },
        "is_active": true,
    };
    let options = FindOptions::builder()
        .sort(doc! { "member_count": -1, "name_key": 1 })
        .limit(TOP_ENTRIES)
        .build();

    let mut cursor = collection
        .inner()
        .find(filter)
        .with_options(options)
        .await
        .map_err(|e| AnnuaireError::Database(format!("Find failed: {e}")))?;

    let mut entries = Vec::new();
    while let Some(result) = cursor.next().await {
        if let Ok(entry) = result {
            entries.push(TopEntry {
                name: entry.name.clone(),
                category: entry.category,
                member_count: entry.member_count,
                popularity: entry.popularity,
            });
        }
    }

    Ok(entries)
}
