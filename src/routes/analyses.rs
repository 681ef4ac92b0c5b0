//! Analysis CRUD endpoints
//!
//! Analyses sit outside the generic collection allow-list and are routed
//! through this module directly.
//!
//! ## Endpoints
//!
//! - `GET /api/analyses` - List analyses with pagination
//! - `GET /api/analyses/{id}` - Get analysis by ID
//! - `POST /api/analyses` - Create analysis
//! - `PUT /api/analyses/{id}` - Update analysis
//! - `DELETE /api/analyses/{id}` - Soft delete analysis

use bson::{doc, DateTime};
use hyper::body::Incoming;
use hyper::{Method, Request, Response};
use mongodb::options::FindOptions;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::db::schemas::{AnalysisDoc, AnalysisStatus, AnalysisType, ANALYSIS_COLLECTION};
use crate::routes::envelope::{self, ApiBody, Pagination};
use crate::routes::query::ListQuery;
use crate::routes::{parse_object_id, read_json, require_mongo, Created};
use crate::server::AppState;
use crate::types::AnnuaireError;

/// Analysis as returned to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisView {
    pub id: String,
    #[serde(rename = "type")]
    pub analysis_type: AnalysisType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<serde_json::Value>,
    pub status: AnalysisStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn analysis_view(analysis: &AnalysisDoc) -> AnalysisView {
    AnalysisView {
        id: analysis._id.map(|o| o.to_hex()).unwrap_or_default(),
        analysis_type: analysis.analysis_type,
        insights: analysis.insights.clone(),
        suggestions: analysis.suggestions.clone(),
        statistics: analysis.statistics.clone(),
        status: analysis.status,
        created_at: analysis.metadata.created_at.map(|d| d.to_string()),
        updated_at: analysis.metadata.updated_at.map(|d| d.to_string()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAnalysisRequest {
    #[serde(rename = "type")]
    analysis_type: Option<AnalysisType>,
    insights: Option<serde_json::Value>,
    suggestions: Option<serde_json::Value>,
    statistics: Option<serde_json::Value>,
    #[serde(default)]
    status: AnalysisStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAnalysisRequest {
    #[serde(rename = "type")]
    analysis_type: Option<AnalysisType>,
    insights: Option<serde_json::Value>,
    suggestions: Option<serde_json::Value>,
    statistics: Option<serde_json::Value>,
    status: Option<AnalysisStatus>,
}

/// Route `/api/analyses[/{id}]`
pub async fn handle(
    req: Request<Incoming>,
    state: Arc<AppState>,
    tail: Option<&str>,
) -> Response<ApiBody> {
    let method = req.method().clone();

    match (method, tail) {
        (Method::GET, None) => handle_list(req, state).await,
        (Method::POST, None) => handle_create(req, state).await,
        (Method::GET, Some(id)) if !id.contains('/') => handle_get(state, id).await,
        (Method::PUT, Some(id)) if !id.contains('/') => handle_update(req, state, id).await,
        (Method::DELETE, Some(id)) if !id.contains('/') => handle_delete(state, id).await,
        _ => envelope::unsupported(),
    }
}

async fn handle_list(req: Request<Incoming>, state: Arc<AppState>) -> Response<ApiBody> {
    let params = ListQuery::from_query_string(req.uri().query());

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<AnalysisDoc>(ANALYSIS_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let filter = doc! { "metadata.is_deleted": { "$ne": true } };

    let total = match collection.inner().count_documents(filter.clone()).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error counting analyses: {}", e);
            return envelope::error(&AnnuaireError::Database(e.to_string()));
        }
    };

    let options = FindOptions::builder()
        .sort(doc! { "metadata.created_at": -1 })
        .skip(params.skip())
        .limit(params.limit as i64)
        .build();

    let mut cursor = match collection.inner().find(filter).with_options(options).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error listing analyses: {}", e);
            return envelope::error(&AnnuaireError::Database(e.to_string()));
        }
    };

    let mut analyses = Vec::new();
    use futures::stream::StreamExt;
    while let Some(result) = cursor.next().await {
        if let Ok(analysis) = result {
            analyses.push(analysis_view(&analysis));
        }
    }

    let pagination = Pagination::new(params.page, params.limit, total);
    envelope::list(analyses, total, pagination)
}

async fn handle_get(state: Arc<AppState>, id: &str) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "analysis") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<AnalysisDoc>(ANALYSIS_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    match collection.find_by_id(oid).await {
        Ok(Some(analysis)) => envelope::data(analysis_view(&analysis)),
        Ok(None) => envelope::failure("Analysis not found", "NOT_FOUND"),
        Err(e) => {
            warn!("Error finding analysis: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_create(req: Request<Incoming>, state: Arc<AppState>) -> Response<ApiBody> {
    let request: CreateAnalysisRequest = match read_json(req).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let analysis_type = match request.analysis_type {
        Some(t) => t,
        None => return envelope::failure("Analysis type is required", "VALIDATION"),
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<AnalysisDoc>(ANALYSIS_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let analysis = AnalysisDoc::new(
        analysis_type,
        request.insights,
        request.suggestions,
        request.statistics,
        request.status,
    );

    match collection.insert_one(analysis).await {
        Ok(id) => envelope::data_message(Created { id: id.to_hex() }, "Analysis created"),
        Err(e) => {
            warn!("Error creating analysis: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_update(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "analysis") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let request: UpdateAnalysisRequest = match read_json(req).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let mut set_doc = doc! { "metadata.updated_at": DateTime::now() };

    if let Some(analysis_type) = request.analysis_type {
        set_doc.insert("analysis_type", analysis_type.as_str());
    }
    if let Some(status) = request.status {
        set_doc.insert("status", status.as_str());
    }
    for (field, payload) in [
        ("insights", request.insights),
        ("suggestions", request.suggestions),
        ("statistics", request.statistics),
    ] {
        if let Some(value) = payload {
            match bson::to_bson(&value) {
                Ok(b) => {
                    set_doc.insert(field, b);
                }
                Err(_) => {
                    return envelope::failure(
                        format!("Invalid {field} payload"),
                        "VALIDATION",
                    );
                }
            }
        }
    }

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<AnalysisDoc>(ANALYSIS_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let filter = doc! { "_id": oid, "metadata.is_deleted": { "$ne": true } };
    match collection.update_one(filter, doc! { "$set": set_doc }).await {
        Ok(r) if r.matched_count > 0 => envelope::message("Analysis updated"),
        Ok(_) => envelope::failure("Analysis not found", "NOT_FOUND"),
        Err(e) => {
            warn!("Error updating analysis: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_delete(state: Arc<AppState>, id: &str) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "analysis") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<AnalysisDoc>(ANALYSIS_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    match collection.soft_delete(doc! { "_id": oid }).await {
        Ok(r) if r.modified_count > 0 => envelope::message("Analysis deleted"),
        Ok(_) => envelope::failure("Analysis not found", "NOT_FOUND"),
        Err(e) => {
            warn!("Error deleting analysis: {}", e);
            envelope::error(&e)
        }
    }
}
