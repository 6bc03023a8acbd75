use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct JsonlBatch<T> {
    pub rows: Vec<T>,
    pub skipped: usize,
}

impl<T> Default for JsonlBatch<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            skipped: 0,
        }
    }
}

pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<JsonlBatch<T>> {
    let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut batch = JsonlBatch::default();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("read {}", path.display()))?;
        push_line(&mut batch, &line, idx + 1, path);
    }
    Ok(batch)
}

pub fn parse_jsonl<T: DeserializeOwned>(raw: &str) -> JsonlBatch<T> {
    let mut batch = JsonlBatch::default();
    for (idx, line) in raw.lines().enumerate() {
        push_line(&mut batch, line, idx + 1, Path::new("<memory>"));
    }
    batch
}

fn push_line<T: DeserializeOwned>(batch: &mut JsonlBatch<T>, line: &str, line_no: usize, path: &Path) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return;
    }
    match serde_json::from_str::<T>(trimmed) {
        Ok(row) => batch.rows.push(row),
        Err(err) => {
            batch.skipped += 1;
            warn!(file = %path.display(), line = line_no, error = %err, "skipping malformed line");
        }
    }
}

/// Write one JSON document per line. The file is swapped in atomically.
pub fn write_jsonl<T: Serialize>(path: &Path, rows: &[T]) -> Result<usize> {
    ensure_parent(path)?;
    let tmp = path.with_extension("jsonl.tmp");
    {
        let file = fs::File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
        let mut out = BufWriter::new(file);
        for row in rows {
            serde_json::to_writer(&mut out, row).context("serialize jsonl row")?;
            out.write_all(b"\n").context("write jsonl row")?;
        }
        out.flush().context("flush jsonl")?;
    }
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(rows.len())
}

pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value).context("serialize json")?;
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    Ok(())
}
