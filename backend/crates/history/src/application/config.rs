//! History Configuration

use platform::compaction::CompactionProfile;

#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Store key holding the whole list
    pub storage_key: String,
    pub max_records: usize,
    /// List length kept when a write hits the storage quota
    pub quota_fallback_records: usize,
    pub artifact_profile: CompactionProfile,
    pub preview_profile: CompactionProfile,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            storage_key: "banana_stand_history_v1".to_string(),
            max_records: 20,
            quota_fallback_records: 5,
            artifact_profile: CompactionProfile::ARTIFACT,
            preview_profile: CompactionProfile::PREVIEW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HistoryConfig::default();
        assert_eq!(config.storage_key, "banana_stand_history_v1");
        assert_eq!(config.max_records, 20);
        assert_eq!(config.quota_fallback_records, 5);
        assert_eq!(config.artifact_profile, CompactionProfile::ARTIFACT);
        assert_eq!(config.preview_profile, CompactionProfile::PREVIEW);
    }
}
