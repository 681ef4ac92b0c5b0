//! Member CRUD endpoints
//!
//! ## Endpoints
//!
//! - `GET /api/members` - List members with pagination and search
//! - `GET /api/members/{id}` - Get member by ID
//! - `POST /api/members` - Create member
//! - `PUT /api/members/{id}` - Update member
//! - `DELETE /api/members/{id}` - Soft delete member

use bson::{doc, DateTime};
use hyper::body::Incoming;
use hyper::{Method, Request, Response};
use mongodb::options::FindOptions;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::db::schemas::{MemberDoc, MAX_SKILLS, MAX_SPECIALTIES, MEMBER_COLLECTION};
use crate::routes::envelope::{self, ApiBody, Pagination};
use crate::routes::query::ListQuery;
use crate::routes::{parse_object_id, read_json, require_mongo, Created};
use crate::server::AppState;
use crate::types::AnnuaireError;

/// Member as returned to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: String,
    pub name: String,
    pub title: String,
    pub email: String,
    pub specialties: Vec<String>,
    pub skills: Vec<String>,
    pub organization: String,
    pub location: String,
    pub experience_years: u32,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

pub(crate) fn member_view(member: &MemberDoc) -> MemberView {
    MemberView {
        id: member._id.map(|o| o.to_hex()).unwrap_or_default(),
        name: member.name.clone(),
        title: member.title.clone(),
        email: member.email.clone(),
        specialties: member.specialties.clone(),
        skills: member.skills.clone(),
        organization: member.organization.clone(),
        location: member.location.clone(),
        experience_years: member.experience_years,
        is_active: member.is_active,
        created_at: member.metadata.created_at.map(|d| d.to_string()),
        updated_at: member.metadata.updated_at.map(|d| d.to_string()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateMemberRequest {
    name: Option<String>,
    title: Option<String>,
    email: Option<String>,
    #[serde(default)]
    specialties: Vec<String>,
    #[serde(default)]
    skills: Vec<String>,
    organization: Option<String>,
    location: Option<String>,
    experience_years: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateMemberRequest {
    name: Option<String>,
    title: Option<String>,
    email: Option<String>,
    specialties: Option<Vec<String>>,
    skills: Option<Vec<String>>,
    organization: Option<String>,
    location: Option<String>,
    experience_years: Option<u32>,
    is_active: Option<bool>,
}

/// Route `/api/members[/{id}]`
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

    let collection = match mongo.collection::<MemberDoc>(MEMBER_COLLECTION).await {
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
            warn!("Error counting members: {}", e);
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
            warn!("Error listing members: {}", e);
            return envelope::error(&AnnuaireError::Database(e.to_string()));
        }
    };

    let mut members = Vec::new();
    use futures::stream::StreamExt;
    while let Some(result) = cursor.next().await {
        if let Ok(member) = result {
            members.push(member_view(&member));
        }
    }

    let pagination = Pagination::new(params.page, params.limit, total);
    envelope::list(members, total, pagination)
}

async fn handle_get(state: Arc<AppState>, id: &str) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "member") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<MemberDoc>(MEMBER_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    match collection.find_by_id(oid).await {
        Ok(Some(member)) => envelope::data(member_view(&member)),
        Ok(None) => envelope::failure("Member not found", "NOT_FOUND"),
        Err(e) => {
            warn!("Error finding member: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_create(req: Request<Incoming>, state: Arc<AppState>) -> Response<ApiBody> {
    let request: CreateMemberRequest = match read_json(req).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    // Validate before any storage call
    let name = match request.name.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => return envelope::failure("Member name is required", "VALIDATION"),
    };
    let email = match request.email.as_deref().map(str::trim) {
        Some(e) if !e.is_empty() => e.to_string(),
        _ => return envelope::failure("Member email is required", "VALIDATION"),
    };
    if request.skills.len() > MAX_SKILLS {
        return envelope::failure(
            format!("A member may declare at most {MAX_SKILLS} skills"),
            "VALIDATION",
        );
    }
    if request.specialties.len() > MAX_SPECIALTIES {
        return envelope::failure(
            format!("A member may declare at most {MAX_SPECIALTIES} specialties"),
            "VALIDATION",
        );
    }

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<MemberDoc>(MEMBER_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let member = MemberDoc::new(
        name,
        request.title.unwrap_or_default(),
        email,
        request.specialties,
        request.skills,
        request.organization.unwrap_or_default(),
        request.location.unwrap_or_default(),
        request.experience_years.unwrap_or(0),
    );

    match collection.insert_one(member).await {
        Ok(id) => envelope::data_message(Created { id: id.to_hex() }, "Member created"),
        Err(AnnuaireError::Duplicate(_)) => {
            envelope::failure("A member with this email already exists", "DUPLICATE")
        }
        Err(e) => {
            warn!("Error creating member: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_update(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "member") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let request: UpdateMemberRequest = match read_json(req).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let mut set_doc = doc! { "metadata.updated_at": DateTime::now() };

    if let Some(ref name) = request.name {
        let name = name.trim();
        if name.is_empty() {
            return envelope::failure("Member name cannot be empty", "VALIDATION");
        }
        set_doc.insert("name", name);
    }
    if let Some(ref email) = request.email {
        let email = email.trim();
        if email.is_empty() {
            return envelope::failure("Member email cannot be empty", "VALIDATION");
        }
        set_doc.insert("email", email);
    }
    if let Some(ref skills) = request.skills {
        if skills.len() > MAX_SKILLS {
            return envelope::failure(
                format!("A member may declare at most {MAX_SKILLS} skills"),
                "VALIDATION",
            );
        }
        set_doc.insert("skills", skills.clone());
    }
    if let Some(ref specialties) = request.specialties {
        if specialties.len() > MAX_SPECIALTIES {
            return envelope::failure(
                format!("A member may declare at most {MAX_SPECIALTIES} specialties"),
                "VALIDATION",
            );
        }
        set_doc.insert("specialties", specialties.clone());
    }
    if let Some(title) = request.title {
        set_doc.insert("title", title);
    }
    if let Some(organization) = request.organization {
        set_doc.insert("organization", organization);
    }
    if let Some(location) = request.location {
        set_doc.insert("location", location);
    }
    if let Some(years) = request.experience_years {
        set_doc.insert("experience_years", years as i64);
    }
    if let Some(is_active) = request.is_active {
        set_doc.insert("is_active", is_active);
    }

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<MemberDoc>(MEMBER_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    let filter = doc! { "_id": oid, "metadata.is_deleted": { "$ne": true } };
    match collection.update_one(filter, doc! { "$set": set_doc }).await {
        Ok(r) if r.matched_count > 0 => envelope::message("Member updated"),
        Ok(_) => envelope::failure("Member not found", "NOT_FOUND"),
        Err(AnnuaireError::Duplicate(_)) => {
            envelope::failure("A member with this email already exists", "DUPLICATE")
        }
        Err(e) => {
            warn!("Error updating member: {}", e);
            envelope::error(&e)
        }
    }
}

async fn handle_delete(state: Arc<AppState>, id: &str) -> Response<ApiBody> {
    let oid = match parse_object_id(id, "member") {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let mongo = match require_mongo(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let collection = match mongo.collection::<MemberDoc>(MEMBER_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Error getting collection: {}", e);
            return envelope::error(&e);
        }
    };

    match collection.soft_delete(doc! { "_id": oid }).await {
        Ok(r) if r.modified_count > 0 => envelope::message("Member deleted"),
        Ok(_) => envelope::failure("Member not found", "NOT_FOUND"),
        Err(e) => {
            warn!("Error deleting member: {}", e);
            envelope::error(&e)
        }
    }
}
