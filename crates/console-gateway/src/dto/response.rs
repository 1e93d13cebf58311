//! Response DTOs.

use serde::{Deserialize, Serialize};

/// Processing state of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    /// Accepted, waiting for processing.
    Pending,
    /// Currently being processed.
    InProgress,
    /// Processing finished.
    Completed,
    /// Processing failed.
    Error,
}

/// A document record as the upstream returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    /// Document identifier.
    pub id: i64,
    /// Original file name.
    pub filename: String,
    /// MIME type, when known.
    pub content_type: Option<String>,
    /// Owning tenant.
    pub tenant_id: i64,
    /// Storage path on the backend.
    pub file_path: String,
    /// Processing state.
    pub status: DocumentStatus,
    /// Creation timestamp (upstream format, passed through).
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Normalized document listing: the upstream historically returned either a
/// bare array or an `{items, total}` object; the gateway always serves the
/// latter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListResponse {
    /// Documents, newest first.
    pub items: Vec<DocumentResponse>,
    /// Total document count.
    pub total: u64,
}

/// Polling response for a single document's processing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStatusResponse {
    /// Document identifier.
    pub id: i64,
    /// Processing state.
    pub status: DocumentStatus,
    /// Optional human-readable progress or error message.
    pub message: Option<String>,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}
