pub mod bronze;
pub mod config;
pub mod goal_time;
pub mod gold_export;
pub mod gold_stats;
pub mod gold_summary;
pub mod http_cache;
pub mod http_client;
pub mod jsonl;
pub mod meta;
pub mod nexon_api;
pub mod raw;
pub mod schema_codes;
pub mod silver;
pub mod zone;
