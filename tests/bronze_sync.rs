use std::fs;
use std::path::Path;

use fco_pipeline::bronze;
use fco_pipeline::config::PipelineConfig;
use fco_pipeline::jsonl;
use fco_pipeline::meta::MetaTables;
use serde_json::{Value, json};

fn write_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, lines.join("\n") + "\n").unwrap();
}

fn record(id: &str, date: &str, tag: &str) -> String {
    json!({"matchId": id, "matchDate": date, "matchType": 50, "tag": tag, "matchInfo": []}).to_string()
}

fn test_config(root: &Path) -> PipelineConfig {
    let root = root.to_string_lossy().into_owned();
    PipelineConfig::from_lookup(|key| match key {
        "FCO_DATA_ROOT" => Some(format!("{root}/data")),
        "FCO_SOURCE_ROOT" => Some(format!("{root}/source")),
        "FCO_TARGET_OUID" => Some("ouid-me".to_string()),
        _ => None,
    })
}

#[test]
fn later_crawl_replaces_earlier_record() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let source = config.source_match_detail_dir();

    write_lines(
        &source.join("25-01-30").join("ouid-me_50_a.jsonl"),
        &[
            record("m1", "2025-01-30T10:00:00", "old"),
            record("m2", "2025-01-30T11:00:00", "only"),
        ],
    );
    write_lines(
        &source.join("25-01-31").join("ouid-me_50_b.jsonl"),
        &[
            record("m1", "2025-01-30T10:00:00", "new"),
            "{\"matchId\": \"broken\"".to_string(),
            record("m3", "2025-01-31T09:00:00", "latest"),
        ],
    );
    fs::create_dir_all(source.join("scratch")).unwrap();
    write_lines(
        &source.join("scratch").join("ignored.jsonl"),
        &[record("m9", "2030-01-01T00:00:00", "ignored")],
    );

    let bronze_file = config.bronze_match_detail_file();
    let report = bronze::sync_match_detail(&source, &bronze_file).unwrap();
    assert_eq!(report.files, 2);
    assert_eq!(report.lines, 4);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.replaced, 1);
    assert_eq!(report.merged, 3);

    let batch = jsonl::read_jsonl::<Value>(&bronze_file).unwrap();
    let ids: Vec<&str> = batch.rows.iter().map(|r| r["matchId"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["m3", "m2", "m1"]);
    assert_eq!(batch.rows[2]["tag"], "new");
}

#[test]
fn resync_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let source = config.source_match_detail_dir();
    write_lines(
        &source.join("25-02-01").join("crawl.jsonl"),
        &[record("a", "2025-02-01T00:00:00", "x")],
    );

    let bronze_file = config.bronze_match_detail_file();
    bronze::sync_match_detail(&source, &bronze_file).unwrap();
    let first = fs::read_to_string(&bronze_file).unwrap();
    bronze::sync_match_detail(&source, &bronze_file).unwrap();
    assert_eq!(fs::read_to_string(&bronze_file).unwrap(), first);
}

#[test]
fn metadata_snapshot_feeds_lookups() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let snapshot = config.source_meta_dir().join("25-01-31");
    fs::create_dir_all(&snapshot).unwrap();
    fs::write(
        snapshot.join("spid.json"),
        r#"[{"id": 241206517, "name": "Player X"}]"#,
    )
    .unwrap();
    fs::write(
        snapshot.join("matchtype.json"),
        r#"[{"matchtype": "50", "desc": "공식경기"}]"#,
    )
    .unwrap();

    let report = bronze::sync_meta(&config.source_meta_dir(), &config.bronze_meta_dir()).unwrap();
    assert_eq!(report.source, snapshot);
    assert_eq!(report.copied.len(), 2);
    assert_eq!(report.missing.len(), 3);

    let meta = MetaTables::load_dir(&config.bronze_meta_dir()).unwrap();
    assert_eq!(meta.match_type_name(50), "공식경기");
    assert_eq!(meta.season_name(241), "Unknown(241)");
}
