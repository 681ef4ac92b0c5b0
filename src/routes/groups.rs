//! Group CRUD endpoints
//!
//! ## Endpoints
//!
//! - `GET /api/groups` - List groups with pagination and search
//! - `GET /api/groups/{id}` - Get group by ID
//! - `POST /api/groups` - Create group
//! - `PUT /api/groups/{id}` - Update group
//! - `DELETE /api/groups/{id}` - Soft delete group

use bson::{doc, DateTime};
use hyper::body::Incoming;
use hyper::{Method, Request, Response};
use mongodb::options::FindOptions;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::db::schemas::{GroupDoc, GroupPrivacy, GroupType, GROUP_COLLECTION};
use crate::routes::envelope::{self, ApiBody, Pagination};
use crate::routes::query::ListQuery;
use crate::routes::{parse_object_id, read_json, require_mongo, Created};
use crate::server::AppState;
use crate::types::AnnuaireError;

/// Group as returned to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub group_type: GroupType,
    pub privacy: GroupPrivacy,
    pub member_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn group_view(group: &GroupDoc) -> GroupView {
    GroupView {
        id: group._id.map(|o| o.to_hex()).unwrap_or_default(),
        name: group.name.clone(),
        description: group.description.clone(),
        group_type: group.group_type,
        privacy: group.privacy,
        member_ids: group.member_ids.clone(),
        leader_id: group.leader_id.clone(),
        created_at: group.metadata.created_at.map(|d| d.to_string()),
        updated_at: group.metadata.updated_at.map(|d| d.to_string()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateGroupRequest {
    name: Option<String>,
    description: Option<String>,
    #[serde(rename = "type", default)]
    group_type: GroupType,
    #[serde(default)]
    privacy: GroupPrivacy,
    #[serde(default)]
    member_ids: Vec<String>,
    leader_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateGroupRequest {
    name: Option<String>,
    description: Option<String>,
    #[serde(rename = "type")]
    group_type: Option<GroupType>,
    privacy: Option<GroupPrivacy>,
    member_ids: Option<Vec<String>>,
    leader_id: Option<String>,
}

/// Route `/api/groups[/{id}]`
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

    let collection = match mongo.collection::<GroupDoc>(GROUP_COLLECTION).await {
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
            warn!("Error counting groups: {}", e);
            return envelope::error(&AnnuaireError::Database(e.to_string()));
        }
    };

    let options = FindOptions::builder()
        .sort(doc! { "name": 1 })
        .skip(params.skip())
        .limit(params.limit as i64)
        .build();

    let mut cursor = match collection.inner().find(filter).with_options(options).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error listing groups: {}", e);
            return envelope::error(&AnnuaireError::Database(e.to_string()));
        }
    };

    let mut groups = Vec::new();
    use futures::stream::StreamExt;
    while let Some(result) = cursor.next().await {
        if let Ok(group) = result {
            groups.push(group_view(&group));
        }
    }

    let pagination = Pagination::new(params.page, params.limit, total);
    envelope::list(groups, total, pagination)
}

async fn handle_get(state: Arc<AppState>, id: &str) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "group") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<GroupDoc>(GROUP_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    match collection.find_by_id(oid).await {
        Ok(Some(group)) => envelope::data(group_view(&group)),
        Ok(None) => envelope::failure("Group not found", "NOT_FOUND"),
        Err(e) => {
            warn!("Error finding group: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_create(req: Request<Incoming>, state: Arc<AppState>) -> Response<ApiBody> {
    let request: CreateGroupRequest = match read_json(req).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let name = match request.name.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => return envelope::failure("Group name is required", "VALIDATION"),
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<GroupDoc>(GROUP_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let group = GroupDoc::new(
        name,
        request.description.unwrap_or_default(),
        request.group_type,
        request.privacy,
        request.member_ids,
        request.leader_id,
    );

    match collection.insert_one(group).await {
        Ok(id) => envelope::data_message(Created { id: id.to_hex() }, "Group created"),
        Err(e) => {
            warn!("Error creating group: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_update(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "group") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let request: UpdateGroupRequest = match read_json(req).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let mut set_doc = doc! { "metadata.updated_at": DateTime::now() };

    if let Some(ref name) = request.name {
        let name = name.trim();
        if name.is_empty() {
            return envelope::failure("Group name cannot be empty", "VALIDATION");
        }
        set_doc.insert("name", name);
    }
    if let Some(description) = request.description {
        set_doc.insert("description", description);
    }
    if let Some(group_type) = request.group_type {
        set_doc.insert("group_type", group_type.as_str());
    }
    if let Some(privacy) = request.privacy {
        set_doc.insert("privacy", privacy.as_str());
    }
    if let Some(member_ids) = request.member_ids {
        set_doc.insert("member_ids", member_ids);
    }
    if let Some(leader_id) = request.leader_id {
        set_doc.insert("leader_id", leader_id);
    }

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<GroupDoc>(GROUP_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let filter = doc! { "_id": oid, "metadata.is_deleted": { "$ne": true } };
    match collection.update_one(filter, doc! { "$set": set_doc }).await {
        Ok(r) if r.matched_count > 0 => envelope::message("Group updated"),
        Ok(_) => envelope::failure("Group not found", "NOT_FOUND"),
        Err(e) => {
            warn!("Error updating group: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_delete(state: Arc<AppState>, id: &str) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "group") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<GroupDoc>(GROUP_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    match collection.soft_delete(doc! { "_id": oid }).await {
        Ok(r) if r.modified_count > 0 => envelope::message("Group deleted"),
        Ok(_) => envelope::failure("Group not found", "NOT_FOUND"),
        Err(e) => {
            warn!("Error deleting group: {}", e);
            envelope::error(&e)
        }
    }
}
