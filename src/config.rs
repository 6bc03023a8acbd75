use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

const DEFAULT_DATA_ROOT: &str = "data";
const DEFAULT_SOURCE_ROOT: &str = "data/source";
const DEFAULT_REQUEST_DELAY_MS: u64 = 100;
const DEFAULT_MAX_RETRIES: u32 = 3;

pub const MATCH_DETAIL_DIR: &str = "matchDetail";
pub const META_DIR: &str = "meta";
pub const BRONZE_MATCH_DETAIL_FILE: &str = "matchDetail.jsonl";
pub const SILVER_MATCH_DETAIL_FILE: &str = "matchDetail_lv1.jsonl";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("FCO_TARGET_OUID is not set; the silver and gold stages need the account to analyse")]
    MissingTargetOuid,
    #[error("NEXON_API_KEY is not set")]
    MissingApiKey,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_root: PathBuf,
    pub source_root: PathBuf,
    pub target_ouid: Option<String>,
    pub api_key: Option<String>,
    pub request_delay: Duration,
    pub max_retries: u32,
    pub parallelism: Option<usize>,
}

impl PipelineConfig {
    /// Loads `.env.local` first so local overrides win over the shared `.env`.
    pub fn load_dotenv() {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            data_root: get("FCO_DATA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_ROOT)),
            source_root: get("FCO_SOURCE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_ROOT)),
            target_ouid: get("FCO_TARGET_OUID"),
            api_key: get("NEXON_API_KEY"),
            request_delay: Duration::from_millis(
                get("FCO_REQUEST_DELAY_MS")
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_REQUEST_DELAY_MS),
            ),
            max_retries: get("FCO_MAX_RETRIES")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(DEFAULT_MAX_RETRIES),
            parallelism: get("FCO_PARALLELISM")
                .and_then(|v| v.parse::<usize>().ok())
                .map(|n| n.clamp(1, 32)),
        }
    }

    pub fn require_target_ouid(&self) -> Result<&str, ConfigError> {
        self.target_ouid
            .as_deref()
            .ok_or(ConfigError::MissingTargetOuid)
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }

    pub fn source_match_detail_dir(&self) -> PathBuf {
        self.source_root.join(MATCH_DETAIL_DIR)
    }

    pub fn source_meta_dir(&self) -> PathBuf {
        self.source_root.join(META_DIR)
    }

    pub fn bronze_match_detail_file(&self) -> PathBuf {
        self.stage_dir("bronze")
            .join(MATCH_DETAIL_DIR)
            .join(BRONZE_MATCH_DETAIL_FILE)
    }

    pub fn bronze_meta_dir(&self) -> PathBuf {
        self.stage_dir("bronze").join(META_DIR)
    }

    pub fn silver_match_detail_file(&self) -> PathBuf {
        self.stage_dir("silver")
            .join(MATCH_DETAIL_DIR)
            .join(SILVER_MATCH_DETAIL_FILE)
    }

    pub fn gold_dir(&self) -> PathBuf {
        self.stage_dir("gold").join("match_summaries")
    }

    fn stage_dir(&self, stage: &str) -> PathBuf {
        self.data_root.join(stage)
    }

    pub fn with_data_root(mut self, root: impl AsRef<Path>) -> Self {
        self.data_root = root.as_ref().to_path_buf();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = PipelineConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg.data_root, PathBuf::from("data"));
        assert_eq!(cfg.request_delay, Duration::from_millis(100));
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.parallelism, None);
        assert_eq!(cfg.require_target_ouid(), Err(ConfigError::MissingTargetOuid));
        assert_eq!(cfg.require_api_key(), Err(ConfigError::MissingApiKey));
    }

    #[test]
    fn reads_and_sanitises_values() {
        let cfg = PipelineConfig::from_lookup(lookup(&[
            ("FCO_TARGET_OUID", "  abc123 "),
            ("NEXON_API_KEY", ""),
            ("FCO_REQUEST_DELAY_MS", "250"),
            ("FCO_MAX_RETRIES", "lots"),
            ("FCO_PARALLELISM", "64"),
        ]));
        assert_eq!(cfg.require_target_ouid(), Ok("abc123"));
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.request_delay, Duration::from_millis(250));
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.parallelism, Some(32));
    }

    #[test]
    fn stage_paths_follow_layout() {
        let cfg = PipelineConfig::from_lookup(lookup(&[])).with_data_root("/tmp/fco");
        assert_eq!(
            cfg.bronze_match_detail_file(),
            PathBuf::from("/tmp/fco/bronze/matchDetail/matchDetail.jsonl")
        );
        assert_eq!(
            cfg.silver_match_detail_file(),
            PathBuf::from("/tmp/fco/silver/matchDetail/matchDetail_lv1.jsonl")
        );
        assert_eq!(cfg.gold_dir(), PathBuf::from("/tmp/fco/gold/match_summaries"));
        assert_eq!(cfg.source_meta_dir(), PathBuf::from("data/source/meta"));
    }
}
