//! Project CRUD endpoints
//!
//! ## Endpoints
//!
//! - `GET /api/projects` - List projects with pagination and search
//! - `GET /api/projects/{id}` - Get project by ID
//! - `GET /api/projects/{id}/members` - Resolve the project's member list
//! - `POST /api/projects` - Create project
//! - `PUT /api/projects/{id}` - Update project
//! - `DELETE /api/projects/{id}` - Soft delete project

use bson::{doc, oid::ObjectId, DateTime};
use futures::future::join_all;
use hyper::body::Incoming;
use hyper::{Method, Request, Response};
use mongodb::options::FindOptions;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::db::schemas::{MemberDoc, ProjectDoc, ProjectStatus, MEMBER_COLLECTION, PROJECT_COLLECTION};
use crate::routes::envelope::{self, ApiBody, Pagination};
use crate::routes::members::{member_view, MemberView};
use crate::routes::query::ListQuery;
use crate::routes::{parse_object_id, read_json, require_mongo, Created};
use crate::server::AppState;
use crate::types::AnnuaireError;

/// Project as returned to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub member_ids: Vec<String>,
    pub status: ProjectStatus,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn project_view(project: &ProjectDoc) -> ProjectView {
    ProjectView {
        id: project._id.map(|o| o.to_hex()).unwrap_or_default(),
        title: project.title.clone(),
        description: project.description.clone(),
        member_ids: project.member_ids.clone(),
        status: project.status,
        tags: project.tags.clone(),
        created_at: project.metadata.created_at.map(|d| d.to_string()),
        updated_at: project.metadata.updated_at.map(|d| d.to_string()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectRequest {
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    member_ids: Vec<String>,
    #[serde(default)]
    status: ProjectStatus,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProjectRequest {
    title: Option<String>,
    description: Option<String>,
    member_ids: Option<Vec<String>>,
    status: Option<ProjectStatus>,
    tags: Option<Vec<String>>,
}

/// Route `/api/projects[/{id}[/members]]`
pub async fn handle(
    req: Request<Incoming>,
    state: Arc<AppState>,
    tail: Option<&str>,
) -> Response<ApiBody> {
    let method = req.method().clone();

    match (method, tail) {
        (Method::GET, None) => handle_list(req, state).await,
        (Method::POST, None) => handle_create(req, state).await,
        (Method::GET, Some(t)) if t.ends_with("/members") => {
            let id = t.strip_suffix("/members").unwrap_or("");
            handle_members_of(state, id).await
        }
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

    let collection = match mongo.collection::<ProjectDoc>(PROJECT_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let mut filter = doc! { "metadata.is_deleted": { "$ne": true } };
    if let Some(ref search) = params.search {
        filter.insert("title", doc! { "$regex": search.clone(), "$options": "i" });
    }

    let total = match collection.inner().count_documents(filter.clone()).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error counting projects: {}", e);
            return envelope::error(&AnnuaireError::Database(e.to_string()));
        }
    };

    let options = FindOptions::builder()
        .sort(doc! { "title": 1 })
        .skip(params.skip())
        .limit(params.limit as i64)
        .build();

    let mut cursor = match collection.inner().find(filter).with_options(options).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error listing projects: {}", e);
            return envelope::error(&AnnuaireError::Database(e.to_string()));
        }
    };

    let mut projects = Vec::new();
    use futures::stream::StreamExt;
    while let Some(result) = cursor.next().await {
        if let Ok(project) = result {
            projects.push(project_view(&project));
        }
    }

    let pagination = Pagination::new(params.page, params.limit, total);
    envelope::list(projects, total, pagination)
}

async fn handle_get(state: Arc<AppState>, id: &str) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "project") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<ProjectDoc>(PROJECT_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    match collection.find_by_id(oid).await {
        Ok(Some(project)) => envelope::data(project_view(&project)),
        Ok(None) => envelope::failure("Project not found", "NOT_FOUND"),
        Err(e) => {
            warn!("Error finding project: {}", e);
            envelope::error(&e)
        }
    }
}

/// Resolve the project's member ID list with one concurrent sub-lookup per
/// ID. Unparseable or failed sub-lookups are dropped from the result rather
/// than failing the whole request.
async fn handle_members_of(state: Arc<AppState>, id: &str) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "project") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let projects = match mongo.collection::<ProjectDoc>(PROJECT_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let project = match projects.find_by_id(oid).await {
        Ok(Some(p)) => p,
        Ok(None) => return envelope::failure("Project not found", "NOT_FOUND"),
        Err(e) => {
            warn!("Error finding project: {}", e);
            return envelope::error(&e);
        }
    };

    let members = match mongo.collection::<MemberDoc>(MEMBER_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let lookups = project
        .member_ids
        .iter()
        .filter_map(|raw| ObjectId::parse_str(raw).ok())
        .map(|member_oid| {
            let collection = members.clone();
            async move { collection.find_by_id(member_oid).await.ok().flatten() }
        });

    let resolved: Vec<MemberView> = join_all(lookups)
        .await
        .into_iter()
        .flatten()
        .map(|m| member_view(&m))
        .collect();

    let total = resolved.len() as u64;
    envelope::data_total(resolved, total)
}

async fn handle_create(req: Request<Incoming>, state: Arc<AppState>) -> Response<ApiBody> {
    let request: CreateProjectRequest = match read_json(req).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let title = match request.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => return envelope::failure("Project title is required", "VALIDATION"),
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<ProjectDoc>(PROJECT_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let project = ProjectDoc::new(
        title,
        request.description.unwrap_or_default(),
        request.member_ids,
        request.status,
        request.tags,
    );

    match collection.insert_one(project).await {
        Ok(id) => envelope::data_message(Created { id: id.to_hex() }, "Project created"),
        Err(e) => {
            warn!("Error creating project: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_update(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "project") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let request: UpdateProjectRequest = match read_json(req).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let mut set_doc = doc! { "metadata.updated_at": DateTime::now() };

    if let Some(ref title) = request.title {
        let title = title.trim();
        if title.is_empty() {
            return envelope::failure("Project title cannot be empty", "VALIDATION");
        }
        set_doc.insert("title", title);
    }
    if let Some(description) = request.description {
        set_doc.insert("description", description);
    }
    if let Some(member_ids) = request.member_ids {
        set_doc.insert("member_ids", member_ids);
    }
    if let Some(status) = request.status {
        set_doc.insert("status", status.as_str());
    }
    if let Some(tags) = request.tags {
        set_doc.insert("tags", tags);
    }

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<ProjectDoc>(PROJECT_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let filter = doc! { "_id": oid, "metadata.is_deleted": { "$ne": true } };
    match collection.update_one(filter, doc! { "$set": set_doc }).await {
        Ok(r) if r.matched_count > 0 => envelope::message("Project updated"),
        Ok(_) => envelope::failure("Project not found", "NOT_FOUND"),
        Err(e) => {
            warn!("Error updating project: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_delete(state: Arc<AppState>, id: &str) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "project") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<ProjectDoc>(PROJECT_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    match collection.soft_delete(doc! { "_id": oid }).await {
        Ok(r) if r.modified_count > 0 => envelope::message("Project deleted"),
        Ok(_) => envelope::failure("Project not found", "NOT_FOUND"),
        Err(e) => {
            warn!("Error deleting project: {}", e);
            envelope::error(&e)
        }
    }
}
