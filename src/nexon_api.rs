use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{MATCH_DETAIL_DIR, META_DIR};
use crate::http_cache::ConditionalCache;
use crate::http_client::http_client;
use crate::jsonl;
use crate::meta::{self, MetaKind};

pub const API_BASE: &str = "https://open.api.nexon.com/fconline/v1";
pub const META_BASE: &str = "https://open.api.nexon.com/static/fconline/meta";
pub const PAGE_LIMIT: usize = 100;
const API_KEY_HEADER: &str = "x-nxopen-api-key";
const MATCH_ID_DIR: &str = "match";
const KST_OFFSET_SECS: i32 = 9 * 3600;

fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

pub fn kst_date_folder(now: DateTime<Utc>) -> String {
    now.with_timezone(&kst()).format("%y-%m-%d").to_string()
}

pub fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn describe_status(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "bad request",
        401 | 403 => "authentication failed, check NEXON_API_KEY",
        404 => "resource not found",
        429 => "rate limit exceeded",
        500..=599 => "server error",
        _ => "unexpected status",
    }
}

/// Collect match ids page by page. Stops on an empty page, a short page or
/// once `max_matches` ids are gathered. `pause` runs between pages.
pub fn paginate(
    max_matches: Option<usize>,
    limit: usize,
    mut fetch_page: impl FnMut(usize, usize) -> Result<Vec<String>>,
    mut pause: impl FnMut(),
) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut offset = 0;
    loop {
        let page = match fetch_page(offset, limit) {
            Ok(page) => page,
            Err(err) if ids.is_empty() => return Err(err),
            Err(err) => {
                warn!(offset, error = %err, "match list page failed; keeping collected ids");
                break;
            }
        };
        if page.is_empty() {
            break;
        }
        let page_len = page.len();
        ids.extend(page);
        if let Some(max) = max_matches
            && ids.len() >= max
        {
            ids.truncate(max);
            break;
        }
        if page_len < limit {
            break;
        }
        offset += limit;
        pause();
    }
    Ok(ids)
}

#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub match_ids_file: PathBuf,
    pub detail_file: PathBuf,
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub struct NexonClient {
    client: &'static Client,
    api_key: String,
    delay: Duration,
    max_retries: u32,
}

impl NexonClient {
    pub fn new(api_key: impl Into<String>, delay: Duration, max_retries: u32) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            api_key: api_key.into(),
            delay,
            max_retries,
        })
    }

    /// GET an API path. `Ok(None)` means the resource does not exist.
    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<String>> {
        let url = Url::parse_with_params(&format!("{API_BASE}{path}"), query)
            .with_context(|| format!("invalid url for {path}"))?;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let sent = self
                .client
                .get(url.clone())
                .header(API_KEY_HEADER, &self.api_key)
                .send();
            match sent {
                Ok(resp) => {
                    let status = resp.status();
                    if status == StatusCode::NOT_FOUND {
                        return Ok(None);
                    }
                    if status.is_success() {
                        return resp.text().map(Some).context("failed reading body");
                    }
                    if !should_retry(status) || attempt > self.max_retries {
                        let body = resp.text().unwrap_or_default();
                        return Err(anyhow!("http {} ({}): {}", status, describe_status(status), body));
                    }
                    warn!(path, %status, attempt, "retrying request");
                }
                Err(err) => {
                    if attempt > self.max_retries {
                        return Err(err).context("request failed");
                    }
                    warn!(path, error = %err, attempt, "retrying request");
                }
            }
            thread::sleep(self.delay);
        }
    }

    fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<Value>> {
        let Some(body) = self.get(path, query)? else {
            return Ok(None);
        };
        let value = serde_json::from_str(body.trim()).with_context(|| format!("invalid json from {path}"))?;
        Ok(Some(value))
    }

    pub fn get_ouid(&self, nickname: &str) -> Result<Option<String>> {
        let value = self.get_json("/id", &[("character_name", nickname)])?;
        Ok(value.and_then(|v| v.get("ouid").and_then(Value::as_str).map(str::to_string)))
    }

    pub fn list_match_ids(
        &self,
        ouid: &str,
        match_type: i64,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<String>> {
        let match_type = match_type.to_string();
        let offset = offset.to_string();
        let limit = limit.min(PAGE_LIMIT).to_string();
        let value = self.get_json(
            "/user/match",
            &[
                ("ouid", ouid),
                ("matchtype", &match_type),
                ("offset", &offset),
                ("limit", &limit),
            ],
        )?;
        let Some(value) = value else {
            return Ok(Vec::new());
        };
        let ids = value
            .as_array()
            .ok_or_else(|| anyhow!("match list is not an array"))?
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        Ok(ids)
    }

    pub fn list_all_match_ids(
        &self,
        ouid: &str,
        match_type: i64,
        max_matches: Option<usize>,
    ) -> Result<Vec<String>> {
        paginate(
            max_matches,
            PAGE_LIMIT,
            |offset, limit| self.list_match_ids(ouid, match_type, offset, limit),
            || thread::sleep(self.delay),
        )
    }

    pub fn match_detail(&self, match_id: &str) -> Result<Option<Value>> {
        self.get_json("/match-detail", &[("matchid", match_id)])
    }

    pub fn crawl_matches(
        &self,
        ouid: &str,
        match_type: i64,
        max_matches: Option<usize>,
        source_root: &Path,
    ) -> Result<CrawlReport> {
        let ids = self.list_all_match_ids(ouid, match_type, max_matches)?;
        info!(ouid, match_type, ids = ids.len(), "match ids collected");

        let now = Utc::now();
        let day = kst_date_folder(now);
        let stamp = now.with_timezone(&kst()).format("%Y%m%d_%H%M%S");
        let file_name = format!("{ouid}_{match_type}_{stamp}.jsonl");
        let ids_dir = source_root.join(MATCH_ID_DIR).join(&day);
        let detail_dir = source_root.join(MATCH_DETAIL_DIR).join(&day);
        fs::create_dir_all(&ids_dir).with_context(|| format!("create {}", ids_dir.display()))?;
        fs::create_dir_all(&detail_dir).with_context(|| format!("create {}", detail_dir.display()))?;

        let mut report = CrawlReport {
            match_ids_file: ids_dir.join(&file_name),
            detail_file: detail_dir.join(&file_name),
            requested: ids.len(),
            ..CrawlReport::default()
        };
        if ids.is_empty() {
            return Ok(report);
        }

        let id_rows: Vec<Value> = ids.iter().map(|id| serde_json::json!({ "matchId": id })).collect();
        jsonl::write_jsonl(&report.match_ids_file, &id_rows)?;

        let file = fs::File::create(&report.detail_file)
            .with_context(|| format!("create {}", report.detail_file.display()))?;
        let mut out = BufWriter::new(file);
        for (idx, match_id) in ids.iter().enumerate() {
            match self.match_detail(match_id) {
                Ok(Some(detail)) => {
                    serde_json::to_writer(&mut out, &detail).context("serialize match detail")?;
                    out.write_all(b"\n").context("write match detail")?;
                    report.succeeded += 1;
                }
                Ok(None) => {
                    warn!(match_id, "match detail not found");
                    report.failed += 1;
                }
                Err(err) => {
                    warn!(match_id, error = %err, "match detail failed");
                    report.failed += 1;
                }
            }
            if (idx + 1) % 10 == 0 {
                debug!(done = idx + 1, total = ids.len(), "crawl progress");
            }
            thread::sleep(self.delay);
        }
        out.flush().context("flush match details")?;
        Ok(report)
    }
}

pub fn meta_url(kind: MetaKind) -> String {
    format!("{META_BASE}/{}", kind.file_name())
}

/// Download one static metadata file (no API key needed) and check its shape.
pub fn fetch_meta_table(cache: &ConditionalCache, kind: MetaKind) -> Result<String> {
    let client = http_client()?;
    let (body, outcome) = cache
        .fetch(client, &meta_url(kind), &[])
        .with_context(|| format!("fetch {kind}"))?;
    let entries = meta::parse_table(kind, &body)?.len();
    debug!(table = %kind, entries, ?outcome, "metadata fetched");
    Ok(body)
}

#[derive(Debug, Clone, Default)]
pub struct MetaCrawlReport {
    pub folder: PathBuf,
    pub written: Vec<MetaKind>,
    pub failed: Vec<MetaKind>,
}

pub fn crawl_meta(cache: &ConditionalCache, source_root: &Path) -> Result<MetaCrawlReport> {
    let folder = source_root.join(META_DIR).join(kst_date_folder(Utc::now()));
    fs::create_dir_all(&folder).with_context(|| format!("create {}", folder.display()))?;
    let mut report = MetaCrawlReport {
        folder: folder.clone(),
        ..MetaCrawlReport::default()
    };
    for kind in MetaKind::ALL {
        match fetch_meta_table(cache, kind) {
            Ok(body) => {
                let path = folder.join(kind.file_name());
                fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
                report.written.push(kind);
            }
            Err(err) => {
                warn!(table = %kind, error = %err, "metadata download failed");
                report.failed.push(kind);
            }
        }
    }
    Ok(report)
}
