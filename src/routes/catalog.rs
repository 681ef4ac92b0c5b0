//! Skill and specialty CRUD endpoints
//!
//! One handler serves both catalogs; `CatalogKind` selects the collection.
//!
//! ## Endpoints (same for `/api/specialties`)
//!
//! - `GET /api/skills` - List entries, most referenced first
//! - `GET /api/skills/{id}` - Get entry by ID
//! - `POST /api/skills` - Create entry (category derived when not supplied)
//! - `PUT /api/skills/{id}` - Update entry
//! - `DELETE /api/skills/{id}` - Soft delete entry
//! - `POST /api/skills/sync` - Recompute counts and popularity from members

use bson::{doc, DateTime};
use hyper::body::Incoming;
use hyper::{Method, Request, Response};
use mongodb::options::FindOptions;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::db::schemas::{CatalogDoc, CatalogKind};
use crate::routes::envelope::{self, ApiBody, Pagination};
use crate::routes::query::ListQuery;
use crate::routes::{parse_object_id, read_json, require_mongo, Created};
use crate::server::AppState;
use crate::sync::run_sync;
use crate::taxonomy::{classify, normalize, Category};
use crate::types::AnnuaireError;

/// Catalog entry as returned to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogView {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub member_count: i64,
    pub popularity: f64,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn catalog_view(entry: &CatalogDoc) -> CatalogView {
    CatalogView {
        id: entry._id.map(|o| o.to_hex()).unwrap_or_default(),
        name: entry.name.clone(),
        category: entry.category,
        member_count: entry.member_count,
        popularity: entry.popularity,
        is_active: entry.is_active,
        created_at: entry.metadata.created_at.map(|d| d.to_string()),
        updated_at: entry.metadata.updated_at.map(|d| d.to_string()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCatalogRequest {
    name: Option<String>,
    category: Option<Category>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCatalogRequest {
    name: Option<String>,
    category: Option<Category>,
    is_active: Option<bool>,
}

/// Route `/api/{skills|specialties}[/{id}|/sync]`
pub async fn handle(
    req: Request<Incoming>,
    state: Arc<AppState>,
    kind: CatalogKind,
    tail: Option<&str>,
) -> Response<ApiBody> {
    let method = req.method().clone();

    match (method, tail) {
        (Method::GET, None) => handle_list(req, state, kind).await,
        (Method::POST, None) => handle_create(req, state, kind).await,
        (Method::POST, Some("sync")) => handle_sync(state, kind).await,
        (Method::GET, Some(id)) if !id.contains('/') => handle_get(state, kind, id).await,
        (Method::PUT, Some(id)) if !id.contains('/') => handle_update(req, state, kind, id).await,
        (Method::DELETE, Some(id)) if !id.contains('/') => handle_delete(state, kind, id).await,
        _ => envelope::unsupported(),
    }
}

async fn handle_list(
    req: Request<Incoming>,
    state: Arc<AppState>,
    kind: CatalogKind,
) -> Response<ApiBody> {
    let params = ListQuery::from_query_string(req.uri().query());

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<CatalogDoc>(kind.collection_name()).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let mut filter = doc! { "metadata.is_deleted": { "$ne": true } };
    if let Some(ref search) = params.search {
        filter.insert("name", doc! { "$regex": search.clone(), "$options": "i" });
    }

    let total = match collection.inner().count_documents(filter.clone()).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error counting {}: {}", kind.collection_name(), e);
            return envelope::error(&AnnuaireError::Database(e.to_string()));
        }
    };

    // Most referenced first, name as tiebreaker
    let options = FindOptions::builder()
        .sort(doc! { "member_count": -1, "name_key": 1 })
        .skip(params.skip())
        .limit(params.limit as i64)
        .build();

    let mut cursor = match collection.inner().find(filter).with_options(options).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error listing {}: {}", kind.collection_name(), e);
            return envelope::error(&AnnuaireError::Database(e.to_string()));
        }
    };

    let mut entries = Vec::new();
    use futures::stream::StreamExt;
    while let Some(result) = cursor.next().await {
        if let Ok(entry) = result {
            entries.push(catalog_view(&entry));
        }
    }

    let pagination = Pagination::new(params.page, params.limit, total);
    envelope::list(entries, total, pagination)
}

async fn handle_get(state: Arc<AppState>, kind: CatalogKind, id: &str) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "entry") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<CatalogDoc>(kind.collection_name()).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    match collection.find_by_id(oid).await {
        Ok(Some(entry)) => envelope::data(catalog_view(&entry)),
        Ok(None) => envelope::failure(format!("{} not found", kind.label()), "NOT_FOUND"),
        Err(e) => {
            warn!("Error finding entry: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_create(
    req: Request<Incoming>,
    state: Arc<AppState>,
    kind: CatalogKind,
) -> Response<ApiBody> {
    let request: CreateCatalogRequest = match read_json(req).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let name = match request.name.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => {
            return envelope::failure(
                format!("{} name is required", kind.label()),
                "VALIDATION",
            )
        }
    };

    let name_key = normalize(&name);
    let category = request.category.unwrap_or_else(|| classify(&name));

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<CatalogDoc>(kind.collection_name()).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let entry = CatalogDoc::new(name, name_key, category);

    match collection.insert_one(entry).await {
        Ok(id) => envelope::data_message(
            Created { id: id.to_hex() },
            &format!("{} created", kind.label()),
        ),
        Err(AnnuaireError::Duplicate(_)) => envelope::failure(
            format!("{} with this name already exists", kind.label()),
            "DUPLICATE",
        ),
        Err(e) => {
            warn!("Error creating entry: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_update(
    req: Request<Incoming>,
    state: Arc<AppState>,
    kind: CatalogKind,
    id: &str,
) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "entry") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let request: UpdateCatalogRequest = match read_json(req).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let mut set_doc = doc! { "metadata.updated_at": DateTime::now() };

    if let Some(ref name) = request.name {
        let name = name.trim();
        if name.is_empty() {
            return envelope::failure(
                format!("{} name cannot be empty", kind.label()),
                "VALIDATION",
            );
        }
        // Renaming moves the unique key with it
        set_doc.insert("name", name);
        set_doc.insert("name_key", normalize(name));
    }
    if let Some(category) = request.category {
        set_doc.insert("category", category.as_str());
    }
    if let Some(is_active) = request.is_active {
        set_doc.insert("is_active", is_active);
    }

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<CatalogDoc>(kind.collection_name()).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let filter = doc! { "_id": oid, "metadata.is_deleted": { "$ne": true } };
    match collection.update_one(filter, doc! { "$set": set_doc }).await {
        Ok(r) if r.matched_count > 0 => {
            envelope::message(&format!("{} updated", kind.label()))
        }
        Ok(_) => envelope::failure(format!("{} not found", kind.label()), "NOT_FOUND"),
        Err(AnnuaireError::Duplicate(_)) => envelope::failure(
            format!("{} with this name already exists", kind.label()),
            "DUPLICATE",
        ),
        Err(e) => {
            warn!("Error updating entry: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_delete(state: Arc<AppState>, kind: CatalogKind, id: &str) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "entry") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<CatalogDoc>(kind.collection_name()).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    match collection.soft_delete(doc! { "_id": oid }).await {
        Ok(r) if r.modified_count > 0 => {
            envelope::message(&format!("{} deleted", kind.label()))
        }
        Ok(_) => envelope::failure(format!("{} not found", kind.label()), "NOT_FOUND"),
        Err(e) => {
            warn!("Error deleting entry: {}", e);
            envelope::error(&e)
        }
    }
}

/// `POST /api/{skills|specialties}/sync` - recompute derived state from
/// member records. Best-effort; the report lists per-entry failures.
async fn handle_sync(state: Arc<AppState>, kind: CatalogKind) -> Response<ApiBody> {
    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    match run_sync(mongo, kind).await {
        Ok(report) => {
            let message = if report.failures.is_empty() {
                format!("{} sync completed", kind.label())
            } else {
                format!(
                    "{} sync completed with {} failures",
                    kind.label(),
                    report.failures.len()
                )
            };
            envelope::data_message(report, &message)
        }
        Err(e) => {
            warn!("Sync failed: {}", e);
            envelope::error(&e)
        }
    }
}
