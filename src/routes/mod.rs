//! HTTP routes for Annuaire

pub mod analyses;
pub mod catalog;
pub mod envelope;
pub mod groups;
pub mod health;
pub mod interactions;
pub mod members;
pub mod projects;
pub mod query;
pub mod stats;

use bson::oid::ObjectId;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::Request;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::db::schemas::CatalogKind;
use crate::db::MongoClient;
use crate::server::AppState;
use envelope::ApiBody;

pub use health::{health_check, readiness_check, version_info};
pub use stats::stats;

/// The closed set of collections served by the generic CRUD dispatch.
///
/// The collection path segment resolves through this enum to a typed
/// handler at compile time; anything else is rejected. Analyses are routed
/// through their own handler and deliberately kept out of this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Members,
    Projects,
    Groups,
    Skills,
    Specialties,
    Interactions,
}

impl Entity {
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "members" => Some(Entity::Members),
            "projects" => Some(Entity::Projects),
            "groups" => Some(Entity::Groups),
            "skills" => Some(Entity::Skills),
            "specialties" => Some(Entity::Specialties),
            "interactions" => Some(Entity::Interactions),
            _ => None,
        }
    }

    pub fn collection_name(&self) -> &'static str {
        match self {
            Entity::Members => "members",
            Entity::Projects => "projects",
            Entity::Groups => "groups",
            Entity::Skills => "skills",
            Entity::Specialties => "specialties",
            Entity::Interactions => "interactions",
        }
    }
}

/// Dispatch a request under `/api/` to its entity handler
pub async fn handle_api_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> hyper::Response<ApiBody> {
    let rest = path.strip_prefix("/api/").unwrap_or("").trim_end_matches('/');
    let (segment, tail) = match rest.split_once('/') {
        Some((seg, t)) => (seg, Some(t)),
        None => (rest, None),
    };

    if segment.is_empty() {
        return envelope::failure("Missing collection name", "UNSUPPORTED");
    }

    // Analyses live outside the generic allow-list
    if segment == "analyses" {
        return analyses::handle(req, state, tail).await;
    }

    match Entity::from_segment(segment) {
        Some(Entity::Members) => members::handle(req, state, tail).await,
        Some(Entity::Projects) => projects::handle(req, state, tail).await,
        Some(Entity::Groups) => groups::handle(req, state, tail).await,
        Some(Entity::Skills) => catalog::handle(req, state, CatalogKind::Skill, tail).await,
        Some(Entity::Specialties) => {
            catalog::handle(req, state, CatalogKind::Specialty, tail).await
        }
        Some(Entity::Interactions) => interactions::handle(req, state, tail).await,
        None => envelope::failure(
            format!("Unrecognized collection '{segment}'"),
            "UNSUPPORTED",
        ),
    }
}

/// Response for create operations
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: String,
}

/// Database handle, or the `DB_UNAVAILABLE` envelope when the service runs
/// without a configured/reachable database
#[allow(clippy::result_large_err)]
pub(crate) fn require_mongo(state: &AppState) -> Result<&MongoClient, hyper::Response<ApiBody>> {
    state.mongo.as_ref().ok_or_else(envelope::db_unavailable)
}

/// Validate an ID path segment before any lookup
#[allow(clippy::result_large_err)]
pub(crate) fn parse_object_id(
    raw: &str,
    what: &str,
) -> Result<ObjectId, hyper::Response<ApiBody>> {
    ObjectId::parse_str(raw)
        .map_err(|_| envelope::failure(format!("Invalid {what} identifier"), "INVALID_ID"))
}

/// Collect and deserialize a JSON request body
pub(crate) async fn read_json<T: DeserializeOwned>(
    req: Request<Incoming>,
) -> Result<T, hyper::Response<ApiBody>> {
    let bytes = req
        .into_body()
        .collect()
        .await
        .map_err(|_| envelope::failure("Invalid request body", "VALIDATION"))?
        .to_bytes();

    serde_json::from_slice(&bytes)
        .map_err(|_| envelope::failure("Invalid JSON body", "VALIDATION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_allow_list_is_closed() {
        assert_eq!(Entity::from_segment("members"), Some(Entity::Members));
        assert_eq!(Entity::from_segment("projects"), Some(Entity::Projects));
        assert_eq!(Entity::from_segment("groups"), Some(Entity::Groups));
        assert_eq!(Entity::from_segment("skills"), Some(Entity::Skills));
        assert_eq!(Entity::from_segment("specialties"), Some(Entity::Specialties));
        assert_eq!(
            Entity::from_segment("interactions"),
            Some(Entity::Interactions)
        );

        assert_eq!(Entity::from_segment("users"), None);
        assert_eq!(Entity::from_segment("analyses"), None);
        assert_eq!(Entity::from_segment("Members"), None);
        assert_eq!(Entity::from_segment(""), None);
    }

    #[test]
    fn test_entity_collection_names_round_trip() {
        for entity in [
            Entity::Members,
            Entity::Projects,
            Entity::Groups,
            Entity::Skills,
            Entity::Specialties,
            Entity::Interactions,
        ] {
            assert_eq!(Entity::from_segment(entity.collection_name()), Some(entity));
        }
    }
}
