//! API DTOs (Data Transfer Objects)

use crate::domain::entities::NewHistoryRecord;
use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Request for POST /api/history
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRecordRequest {
    pub source_id: String,
    pub display_name: String,
    #[serde(default)]
    pub display_glyph: String,
    pub artifact_data: String,
    #[serde(default)]
    pub input_preview: Option<String>,
}

impl AddRecordRequest {
    pub fn into_new_record(self) -> AppResult<NewHistoryRecord> {
        if self.source_id.trim().is_empty() {
            return Err(AppError::invalid_input("sourceId must not be empty"));
        }
        if self.artifact_data.is_empty() {
            return Err(AppError::invalid_input("artifactData must not be empty"));
        }

        Ok(NewHistoryRecord {
            source_id: self.source_id,
            display_name: self.display_name,
            display_glyph: self.display_glyph,
            artifact_data: self.artifact_data,
            input_preview: self.input_preview.filter(|p| !p.is_empty()),
        })
    }
}

/// Response for GET /api/history/count
#[derive(Debug, Clone, Serialize)]
pub struct CountResponse {
    pub count: usize,
}
