//! Annuaire - member/project/skill directory API
//!
//! A MongoDB-backed HTTP service exposing CRUD endpoints for the directory
//! collections (members, projects, groups, skills, specialties,
//! interactions, analyses), a keyword classifier for skill/specialty
//! categories, and a sync operation that recomputes per-entry member counts
//! and popularity from member records.
//!
//! ## Modules
//!
//! - **config**: CLI/env configuration
//! - **db**: MongoDB client wrapper and document schemas
//! - **routes**: per-entity CRUD handlers and the response envelope
//! - **server**: hyper http1 server and request dispatch
//! - **sync**: skill/specialty aggregation
//! - **taxonomy**: keyword-based category classification

pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod sync;
pub mod taxonomy;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{AnnuaireError, Result};
