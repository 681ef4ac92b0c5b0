//! Skill/specialty synchronization
//!
//! Recomputes catalog state from member records: a frequency count of
//! normalized names, category derivation, popularity, one upsert per
//! distinct name, and deactivation of entries no member references anymore.
//!
//! The counting logic (`plan`) is pure; `run_sync` applies the plan with
//! best-effort semantics. Upserts are not transactional: each failure is
//! recorded in the report and the loop continues, so a partial failure
//! leaves some entries updated and others not. Running two syncs
//! concurrently may interleave upserts; there is no mutual exclusion.

use std::collections::{BTreeMap, BTreeSet};

use bson::{doc, DateTime};
use mongodb::options::UpdateOptions;
use serde::Serialize;
use tracing::{info, warn};

use crate::db::schemas::{CatalogDoc, CatalogKind, MemberDoc, MEMBER_COLLECTION};
use crate::db::MongoClient;
use crate::taxonomy::{classify, normalize, Category};
use crate::types::Result;

/// Popularity percentage: share of active members referencing an entry,
/// clamped to [0, 100]. Zero when there are no active members.
pub fn popularity(member_count: u64, total_active: u64) -> f64 {
    if total_active == 0 {
        return 0.0;
    }

    ((member_count as f64 / total_active as f64) * 100.0).clamp(0.0, 100.0)
}

/// One catalog entry the sync intends to upsert
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedEntry {
    /// Display name (first-seen trimmed spelling)
    pub name: String,
    /// Normalized name, the upsert key
    pub name_key: String,
    /// Derived category
    pub category: Category,
    /// Number of members referencing the name
    pub member_count: u64,
    /// Derived popularity percentage
    pub popularity: f64,
}

/// The full set of upserts derived from a member scan
#[derive(Debug, Clone)]
pub struct SyncPlan {
    /// Number of active members scanned
    pub total_active_members: u64,
    /// Entries keyed by normalized name, in key order
    pub entries: Vec<PlannedEntry>,
}

/// Per-entry upsert failure, reported instead of swallowed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub name: String,
    pub error: String,
}

/// Outcome of one sync run. Best-effort: `failures` lists every entry that
/// could not be written while the rest of the run proceeded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Active members scanned
    pub scanned_members: u64,
    /// Distinct normalized names planned for upsert
    pub planned: u64,
    /// Entries written (created or updated)
    pub upserted: u64,
    /// Previously active entries zeroed out and deactivated
    pub deactivated: u64,
    /// Per-entry failures
    pub failures: Vec<SyncFailure>,
}

/// Build the upsert plan from a member scan. Pure; exercised directly by
/// unit tests.
///
/// Each member contributes at most once per distinct normalized name, so a
/// member listing "Python" and "python " counts a single reference.
pub fn plan(members: &[MemberDoc], kind: CatalogKind) -> SyncPlan {
    let total_active = members.len() as u64;

    // name_key -> (display name, member count)
    let mut counts: BTreeMap<String, (String, u64)> = BTreeMap::new();

    for member in members {
        let mut seen: BTreeSet<String> = BTreeSet::new();

        for label in kind.labels_of(member) {
            let key = normalize(label);
            if key.is_empty() || !seen.insert(key.clone()) {
                continue;
            }

            let entry = counts
                .entry(key)
                .or_insert_with(|| (label.trim().to_string(), 0));
            entry.1 += 1;
        }
    }

    let entries = counts
        .into_iter()
        .map(|(name_key, (name, member_count))| PlannedEntry {
            category: classify(&name_key),
            popularity: popularity(member_count, total_active),
            name,
            name_key,
            member_count,
        })
        .collect();

    SyncPlan {
        total_active_members: total_active,
        entries,
    }
}

/// Scan active members and synchronize the target catalog collection.
pub async fn run_sync(mongo: &MongoClient, kind: CatalogKind) -> Result<SyncReport> {
    let members = mongo.collection::<MemberDoc>(MEMBER_COLLECTION).await?;
    let active = members.find_many(doc! { "is_active": true }).await?;

    let plan = plan(&active, kind);
    info!(
        "Syncing {}: {} active members, {} distinct names",
        kind.collection_name(),
        plan.total_active_members,
        plan.entries.len()
    );

    let catalog = mongo.collection::<CatalogDoc>(kind.collection_name()).await?;

    let mut report = SyncReport {
        scanned_members: plan.total_active_members,
        planned: plan.entries.len() as u64,
        upserted: 0,
        deactivated: 0,
        failures: Vec::new(),
    };

    // One upsert per distinct name; failures are recorded and the loop
    // continues.
    for entry in &plan.entries {
        let filter = doc! { "name_key": &entry.name_key };
        let update = doc! {
            "$set": {
                "member_count": entry.member_count as i64,
                "popularity": entry.popularity,
                "category": entry.category.as_str(),
                "is_active": true,
                "metadata.is_deleted": false,
                "metadata.updated_at": DateTime::now(),
            },
            "$setOnInsert": {
                "name": &entry.name,
                "metadata.created_at": DateTime::now(),
            },
        };

        let options = UpdateOptions::builder().upsert(true).build();
        match catalog
            .inner()
            .update_one(filter, update)
            .with_options(options)
            .await
        {
            Ok(_) => report.upserted += 1,
            Err(e) => {
                warn!("Upsert failed for '{}': {}", entry.name, e);
                report.failures.push(SyncFailure {
                    name: entry.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    // Zero out entries no longer referenced by any member.
    let referenced: Vec<String> = plan.entries.iter().map(|e| e.name_key.clone()).collect();
    let stale_filter = doc! { "name_key": { "$nin": referenced }, "is_active": true };
    let stale_update = doc! {
        "$set": {
            "member_count": 0_i64,
            "popularity": 0.0,
            "is_active": false,
            "metadata.updated_at": DateTime::now(),
        }
    };

    match catalog.inner().update_many(stale_filter, stale_update).await {
        Ok(result) => report.deactivated = result.modified_count,
        Err(e) => {
            warn!("Deactivation pass failed: {}", e);
            report.failures.push(SyncFailure {
                name: "<deactivation>".to_string(),
                error: e.to_string(),
            });
        }
    }

    info!(
        "Sync of {} done: {} upserted, {} deactivated, {} failures",
        kind.collection_name(),
        report.upserted,
        report.deactivated,
        report.failures.len()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member_with_skills(skills: &[&str]) -> MemberDoc {
        MemberDoc {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..MemberDoc::default()
        }
    }

    fn entry<'a>(plan: &'a SyncPlan, key: &str) -> &'a PlannedEntry {
        plan.entries
            .iter()
            .find(|e| e.name_key == key)
            .unwrap_or_else(|| panic!("no entry for '{key}'"))
    }

    #[test]
    fn test_popularity_bounds() {
        assert_eq!(popularity(0, 0), 0.0);
        assert_eq!(popularity(5, 0), 0.0);
        assert_eq!(popularity(0, 10), 0.0);
        assert_eq!(popularity(5, 10), 50.0);
        assert_eq!(popularity(10, 10), 100.0);
        // More references than members stays clamped
        assert_eq!(popularity(20, 10), 100.0);
    }

    #[test]
    fn test_plan_counts_members_not_occurrences() {
        // One member listing the same skill in two spellings counts once
        let members = vec![member_with_skills(&["Python", "python ", "REACT"])];
        let plan = plan(&members, CatalogKind::Skill);

        assert_eq!(plan.total_active_members, 1);
        assert_eq!(plan.entries.len(), 2);

        let python = entry(&plan, "python");
        assert_eq!(python.member_count, 1);
        assert_eq!(python.name, "Python");
        assert_eq!(python.popularity, 100.0);

        let react = entry(&plan, "react");
        assert_eq!(react.member_count, 1);
        assert_eq!(react.category, Category::Technique);
    }

    #[test]
    fn test_plan_folds_case_across_members() {
        let members = vec![
            member_with_skills(&["Python"]),
            member_with_skills(&["  PYTHON  "]),
            member_with_skills(&["Gestion de projet"]),
        ];
        let plan = plan(&members, CatalogKind::Skill);

        let python = entry(&plan, "python");
        assert_eq!(python.member_count, 2);
        assert!((python.popularity - 66.666).abs() < 0.01);

        let gestion = entry(&plan, "gestion de projet");
        assert_eq!(gestion.member_count, 1);
        assert_eq!(gestion.category, Category::Management);
    }

    #[test]
    fn test_plan_display_name_is_first_seen_trimmed() {
        let members = vec![
            member_with_skills(&["  Rust  "]),
            member_with_skills(&["RUST"]),
        ];
        let plan = plan(&members, CatalogKind::Skill);

        assert_eq!(entry(&plan, "rust").name, "Rust");
    }

    #[test]
    fn test_plan_skips_blank_labels() {
        let members = vec![member_with_skills(&["", "   ", "Python"])];
        let plan = plan(&members, CatalogKind::Skill);

        assert_eq!(plan.entries.len(), 1);
        assert_eq!(plan.entries[0].name_key, "python");
    }

    #[test]
    fn test_plan_uses_the_selected_member_field() {
        let mut member = member_with_skills(&["Python"]);
        member.specialties = vec!["Énergie solaire".to_string()];
        let members = vec![member];

        let skills = plan(&members, CatalogKind::Skill);
        assert_eq!(skills.entries.len(), 1);
        assert_eq!(skills.entries[0].name_key, "python");

        let specialties = plan(&members, CatalogKind::Specialty);
        assert_eq!(specialties.entries.len(), 1);
        assert_eq!(specialties.entries[0].category, Category::Energie);
    }

    #[test]
    fn test_plan_empty_member_set() {
        let plan = plan(&[], CatalogKind::Skill);
        assert_eq!(plan.total_active_members, 0);
        assert!(plan.entries.is_empty());
    }

    #[test]
    fn test_plan_is_deterministic() {
        let members = vec![
            member_with_skills(&["Python", "Rust", "Gestion"]),
            member_with_skills(&["rust", "python"]),
        ];
        let a = plan(&members, CatalogKind::Skill);
        let b = plan(&members, CatalogKind::Skill);
        assert_eq!(a.entries, b.entries);
    }
}
