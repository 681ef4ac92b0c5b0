//! Interaction CRUD endpoints
//!
//! ## Endpoints
//!
//! - `GET /api/interactions` - List interactions with pagination
//! - `GET /api/interactions/{id}` - Get interaction by ID
//! - `POST /api/interactions` - Create interaction
//! - `PUT /api/interactions/{id}` - Update interaction
//! - `DELETE /api/interactions/{id}` - Soft delete interaction

use bson::{doc, DateTime};
use hyper::body::Incoming;
use hyper::{Method, Request, Response};
use mongodb::options::FindOptions;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::db::schemas::{
    AiAnalysis, InteractionDoc, InteractionStatus, InteractionType, RiskLevel,
    INTERACTION_COLLECTION,
};
use crate::routes::envelope::{self, ApiBody, Pagination};
use crate::routes::query::ListQuery;
use crate::routes::{parse_object_id, read_json, require_mongo, Created};
use crate::server::AppState;
use crate::types::AnnuaireError;

/// AI analysis as carried in requests and responses
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysisView {
    #[serde(default)]
    pub strategic_value: String,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
}

impl AiAnalysisView {
    fn into_doc(self) -> AiAnalysis {
        AiAnalysis {
            strategic_value: self.strategic_value,
            risk_level: self.risk_level,
            recommended_actions: self.recommended_actions,
        }
    }

    fn from_doc(analysis: &AiAnalysis) -> Self {
        Self {
            strategic_value: analysis.strategic_value.clone(),
            risk_level: analysis.risk_level,
            recommended_actions: analysis.recommended_actions.clone(),
        }
    }
}

/// Interaction as returned to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionView {
    pub id: String,
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    pub from_id: String,
    pub to_ids: Vec<String>,
    pub status: InteractionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AiAnalysisView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn interaction_view(interaction: &InteractionDoc) -> InteractionView {
    InteractionView {
        id: interaction._id.map(|o| o.to_hex()).unwrap_or_default(),
        interaction_type: interaction.interaction_type,
        from_id: interaction.from_id.clone(),
        to_ids: interaction.to_ids.clone(),
        status: interaction.status,
        ai_analysis: interaction.ai_analysis.as_ref().map(AiAnalysisView::from_doc),
        created_at: interaction.metadata.created_at.map(|d| d.to_string()),
        updated_at: interaction.metadata.updated_at.map(|d| d.to_string()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateInteractionRequest {
    #[serde(rename = "type")]
    interaction_type: Option<InteractionType>,
    from_id: Option<String>,
    #[serde(default)]
    to_ids: Vec<String>,
    #[serde(default)]
    status: InteractionStatus,
    ai_analysis: Option<AiAnalysisView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateInteractionRequest {
    #[serde(rename = "type")]
    interaction_type: Option<InteractionType>,
    to_ids: Option<Vec<String>>,
    status: Option<InteractionStatus>,
    ai_analysis: Option<AiAnalysisView>,
}

/// Route `/api/interactions[/{id}]`
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

    let collection = match mongo
        .collection::<InteractionDoc>(INTERACTION_COLLECTION)
        .await
    {
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
            warn!("Error counting interactions: {}", e);
            return envelope::error(&AnnuaireError::Database(e.to_string()));
        }
    };

    // Newest first
    let options = FindOptions::builder()
        .sort(doc! { "metadata.created_at": -1 })
        .skip(params.skip())
        .limit(params.limit as i64)
        .build();

    let mut cursor = match collection.inner().find(filter).with_options(options).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error listing interactions: {}", e);
            return envelope::error(&AnnuaireError::Database(e.to_string()));
        }
    };

    let mut interactions = Vec::new();
    use futures::stream::StreamExt;
    while let Some(result) = cursor.next().await {
        if let Ok(interaction) = result {
            interactions.push(interaction_view(&interaction));
        }
    }

    let pagination = Pagination::new(params.page, params.limit, total);
    envelope::list(interactions, total, pagination)
}

async fn handle_get(state: Arc<AppState>, id: &str) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "interaction") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo
        .collection::<InteractionDoc>(INTERACTION_COLLECTION)
        .await
    {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    match collection.find_by_id(oid).await {
        Ok(Some(interaction)) => envelope::data(interaction_view(&interaction)),
        Ok(None) => envelope::failure("Interaction not found", "NOT_FOUND"),
        Err(e) => {
            warn!("Error finding interaction: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_create(req: Request<Incoming>, state: Arc<AppState>) -> Response<ApiBody> {
    let request: CreateInteractionRequest = match read_json(req).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let interaction_type = match request.interaction_type {
        Some(t) => t,
        None => return envelope::failure("Interaction type is required", "VALIDATION"),
    };
    let from_id = match request.from_id.as_deref().map(str::trim) {
        Some(f) if !f.is_empty() => f.to_string(),
        _ => return envelope::failure("Interaction initiator is required", "VALIDATION"),
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo
        .collection::<InteractionDoc>(INTERACTION_COLLECTION)
        .await
    {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let interaction = InteractionDoc::new(
        interaction_type,
        from_id,
        request.to_ids,
        request.status,
        request.ai_analysis.map(AiAnalysisView::into_doc),
    );

    match collection.insert_one(interaction).await {
        Ok(id) => envelope::data_message(Created { id: id.to_hex() }, "Interaction created"),
        Err(e) => {
            warn!("Error creating interaction: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_update(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "interaction") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let request: UpdateInteractionRequest = match read_json(req).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let mut set_doc = doc! { "metadata.updated_at": DateTime::now() };

    if let Some(interaction_type) = request.interaction_type {
        set_doc.insert("interaction_type", interaction_type.as_str());
    }
    if let Some(to_ids) = request.to_ids {
        set_doc.insert("to_ids", to_ids);
    }
    if let Some(status) = request.status {
        set_doc.insert("status", status.as_str());
    }
    if let Some(analysis) = request.ai_analysis {
        match bson::to_bson(&analysis.into_doc()) {
            Ok(value) => {
                set_doc.insert("ai_analysis", value);
            }
            Err(_) => {
                return envelope::failure("Invalid AI analysis payload", "VALIDATION");
            }
        }
    }

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo
        .collection::<InteractionDoc>(INTERACTION_COLLECTION)
        .await
    {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let filter = doc! { "_id": oid, "metadata.is_deleted": { "$ne": true } };
    match collection.update_one(filter, doc! { "$set": set_doc }).await {
        Ok(r) if r.matched_count > 0 => envelope::message("Interaction updated"),
        Ok(_) => envelope::failure("Interaction not found", "NOT_FOUND"),
        Err(e) => {
            warn!("Error updating interaction: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_delete(state: Arc<AppState>, id: &str) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "interaction") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo
        .collection::<InteractionDoc>(INTERACTION_COLLECTION)
        .await
    {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    match collection.soft_delete(doc! { "_id": oid }).await {
        Ok(r) if r.modified_count > 0 => envelope::message("Interaction deleted"),
        Ok(_) => envelope::failure("Interaction not found", "NOT_FOUND"),
        Err(e) => {
            warn!("Error deleting interaction: {}", e);
            envelope::error(&e)
        }
    }
}
