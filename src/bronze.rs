use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::jsonl::{self, JsonlBatch};
use crate::meta::MetaKind;

/// Subdirectories whose name starts with a digit (`25-01-31`), sorted by name.
pub fn dated_folders(root: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let entries = fs::read_dir(root).with_context(|| format!("read {}", root.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read {}", root.display()))?;
        let path = entry.path();
        let dated = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.chars().next())
            .is_some_and(|c| c.is_ascii_digit());
        if dated && path.is_dir() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

pub fn latest_dated_folder(root: &Path) -> Result<Option<PathBuf>> {
    Ok(dated_folders(root)?.pop())
}

#[derive(Debug, Clone, Default)]
pub struct MetaSyncReport {
    pub source: PathBuf,
    pub copied: Vec<MetaKind>,
    pub missing: Vec<MetaKind>,
}

pub fn sync_meta(source_meta: &Path, bronze_meta: &Path) -> Result<MetaSyncReport> {
    let latest = latest_dated_folder(source_meta)?
        .ok_or_else(|| anyhow!("no dated metadata folder under {}", source_meta.display()))?;
    fs::create_dir_all(bronze_meta).with_context(|| format!("create {}", bronze_meta.display()))?;

    let mut report = MetaSyncReport {
        source: latest.clone(),
        ..MetaSyncReport::default()
    };
    for kind in MetaKind::ALL {
        let src = latest.join(kind.file_name());
        if !src.exists() {
            warn!(file = %src.display(), "metadata file missing from snapshot");
            report.missing.push(kind);
            continue;
        }
        let dst = bronze_meta.join(kind.file_name());
        fs::copy(&src, &dst).with_context(|| format!("copy {} to {}", src.display(), dst.display()))?;
        report.copied.push(kind);
    }
    info!(source = %latest.display(), copied = report.copied.len(), "metadata synced");
    Ok(report)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub files: usize,
    pub lines: usize,
    pub skipped: usize,
    pub without_id: usize,
    pub replaced: usize,
    pub merged: usize,
}

fn match_id(record: &Value) -> Option<&str> {
    record
        .get("matchId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

fn match_date(record: &Value) -> &str {
    record.get("matchDate").and_then(Value::as_str).unwrap_or("")
}

/// Deduplicate by `matchId`. Records arrive oldest crawl first, so a later
/// record replaces an earlier one. Output is newest `matchDate` first.
pub fn merge_records(records: impl IntoIterator<Item = Value>, report: &mut MergeReport) -> Vec<Value> {
    let mut by_id: HashMap<String, Value> = HashMap::new();
    for record in records {
        report.lines += 1;
        let Some(id) = match_id(&record).map(str::to_string) else {
            report.without_id += 1;
            continue;
        };
        if by_id.insert(id, record).is_some() {
            report.replaced += 1;
        }
    }
    let mut merged: Vec<Value> = by_id.into_values().collect();
    merged.sort_by(|a, b| {
        match_date(b)
            .cmp(match_date(a))
            .then_with(|| match_id(a).cmp(&match_id(b)))
    });
    report.merged = merged.len();
    merged
}

/// `YYYYmmdd_HHMMSS` from `<ouid>_<matchtype>_<YYYYmmdd>_<HHMMSS>.jsonl`.
pub fn crawl_stamp(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let mut parts = stem.rsplitn(3, '_');
    let time = parts.next()?;
    let date = parts.next()?;
    parts.next()?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    (digits(date) && digits(time)).then(|| format!("{date}_{time}"))
}

/// Crawl order within one folder; files without a stamp go first, by name.
fn sort_crawl_files(files: &mut [PathBuf]) {
    files.sort_by_cached_key(|path| (crawl_stamp(path), path.clone()));
}

pub fn merge_match_details(source_dir: &Path) -> Result<(Vec<Value>, MergeReport)> {
    let mut report = MergeReport::default();
    let mut records = Vec::new();
    for folder in dated_folders(source_dir)? {
        let mut files: Vec<PathBuf> = fs::read_dir(&folder)
            .with_context(|| format!("read {}", folder.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "jsonl"))
            .collect();
        sort_crawl_files(&mut files);
        for file in files {
            let batch: JsonlBatch<Value> = jsonl::read_jsonl(&file)?;
            debug!(file = %file.display(), rows = batch.rows.len(), skipped = batch.skipped, "read crawl file");
            report.files += 1;
            report.skipped += batch.skipped;
            records.extend(batch.rows);
        }
    }
    let merged = merge_records(records, &mut report);
    Ok((merged, report))
}

pub fn sync_match_detail(source_dir: &Path, bronze_file: &Path) -> Result<MergeReport> {
    let (merged, report) = merge_match_details(source_dir)?;
    jsonl::write_jsonl(bronze_file, &merged)?;
    info!(
        files = report.files,
        merged = report.merged,
        replaced = report.replaced,
        skipped = report.skipped,
        "match details synced"
    );
    Ok(report)
}
