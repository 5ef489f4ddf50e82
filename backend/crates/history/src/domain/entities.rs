//! Domain Entities

use chrono::{DateTime, Utc};
use kernel::id::HistoryRecordId;
use serde::{Deserialize, Serialize};

/// One generated artifact kept in local history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: HistoryRecordId,
    /// Recipe that produced the artifact
    pub source_id: String,
    pub display_name: String,
    pub display_glyph: String,
    /// Compacted, self-contained encoded image
    pub artifact_data: String,
    #[serde(rename = "createdAtIso")]
    pub created_at: DateTime<Utc>,
    /// Compacted thumbnail of the input image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_preview: Option<String>,
}

/// Caller-supplied part of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHistoryRecord {
    pub source_id: String,
    pub display_name: String,
    pub display_glyph: String,
    pub artifact_data: String,
    #[serde(default)]
    pub input_preview: Option<String>,
}

impl HistoryRecord {
    /// Stamp `input` with a fresh id and creation time
    ///
    /// Image fields are taken as given; compaction happens before this.
    pub fn new(input: NewHistoryRecord, created_at: DateTime<Utc>) -> Self {
        Self {
            id: HistoryRecordId::new(),
            source_id: input.source_id,
            display_name: input.display_name,
            display_glyph: input.display_glyph,
            artifact_data: input.artifact_data,
            created_at,
            input_preview: input.input_preview,
        }
    }
}
