//! Data Transfer Objects for the HTTP API.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether the schedule feed has been fetched yet
    pub schedule_loaded: bool,
}

/// One document the server can render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfoDto {
    /// Name accepted by `/documents/{name}`
    pub name: String,
    pub file_name: String,
}

/// Response for the document listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentInfoDto>,
}
