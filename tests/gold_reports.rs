use std::fs;
use std::path::PathBuf;

use fco_pipeline::gold_stats::{self, build_gold};
use fco_pipeline::gold_summary::summarize_match;
use fco_pipeline::goal_time::TimeRange;
use fco_pipeline::jsonl;
use fco_pipeline::meta::MetaTables;
use fco_pipeline::raw::parse_raw_match;
use fco_pipeline::silver::{self, MatchResult, NormalizedMatch};
use fco_pipeline::zone::Zone;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn fixture_match(target: &str) -> NormalizedMatch {
    let raw = fs::read_to_string(fixture_path("match_detail.json"))
        .expect("fixture file should be readable");
    let meta = MetaTables::load_dir(&fixture_path("meta")).expect("fixture metadata should load");
    silver::transform_match(&parse_raw_match(&raw).unwrap(), &meta, target)
}

#[test]
fn narrative_covers_scored_and_conceded_goals() {
    let summary = summarize_match(&fixture_match("ouid-me")).expect("self participant present");
    assert_eq!(summary.result, MatchResult::Win);
    assert_eq!((summary.score.me, summary.score.opponent), (2, 1));
    assert_eq!(summary.opponent_nickname, "Rival");
    assert_eq!(
        summary.summary_text,
        "2025년 01월 31일 공식경기에서 Rival을(를) 상대로 2:1 승리를 거뒀습니다. \
         점유율 55% vs 45%, 슈팅 3개(유효 2개) vs 4개(유효 2개)를 기록했습니다."
    );

    assert_eq!(summary.my_goals_text.len(), 2);
    assert_eq!(
        summary.my_goals_text[0],
        "전반 10분에 Player X(24TOTY, +5강)가 우측_공격코너라인부근(우측 공격 코너 라인 부근 (상대 골대 근처), 페널티박스내)에서 헤딩로 득점했습니다. 개인 돌파로 만든 골입니다."
    );
    assert_eq!(
        summary.my_goals_text[1],
        "후반 45분에 Player X(24TOTY, +5강)가 중앙_공격골대앞(중앙 공격 골대 앞 (상대 골대 정면, 슈팅 최적 위치), 페널티박스내)에서 일반 슛로 득점했습니다. 이 골은 Helper(24TOTY, +3강)가 중앙_공격큰박스라인부근에서 연결한 패스로 만들어졌습니다."
    );

    // The assisting player is missing from the metadata.
    assert_eq!(summary.conceded_goals_text.len(), 1);
    let conceded = &summary.conceded_goals_text[0];
    assert!(conceded.starts_with("후반 75분에 Rival Star(ICON, +8강)가 우측_공격코너라인부근"));
    assert!(conceded.contains("페널티박스외곽)에서 프리킥로 득점하며 실점했습니다."));
    assert!(conceded.ends_with(" 개인 돌파로 만든 골입니다."));

    let sections: Vec<&str> = summary.full_narrative.split("\n\n").collect();
    assert_eq!(sections.len(), 3);
    assert_eq!(sections[0], summary.summary_text);
    assert!(sections[1].starts_with("[득점]\n1. 전반 10분에"));
    assert!(sections[1].contains("\n2. 후반 45분에"));
    assert!(sections[2].starts_with("[실점]\n1. 후반 75분에"));
}

#[test]
fn match_without_self_participant_has_no_summary() {
    let m = fixture_match("somebody-else");
    assert!(summarize_match(&m).is_none());
    let report = build_gold(&[m]);
    assert_eq!(report.matches, 1);
    assert!(report.summaries.is_empty());
    assert_eq!(report.overall.total_matches, 0);
    assert_eq!(report.overall.win_rate, 0.0);
    assert_eq!(report.overall.shot_accuracy, 0.0);
}

#[test]
fn overall_and_time_range_stats() {
    let report = build_gold(&[fixture_match("ouid-me")]);
    let overall = &report.overall;
    assert_eq!(overall.total_matches, 1);
    assert_eq!((overall.wins, overall.draws, overall.losses), (1, 0, 0));
    assert_eq!(overall.win_rate, 100.0);
    assert_eq!(overall.goal_difference, 1);
    assert_eq!(overall.avg_possession, 55.0);
    assert_eq!(overall.shot_accuracy, 66.7);
    assert_eq!(overall.top_scorers.len(), 1);
    assert_eq!(overall.top_scorers[0].name, "Player X");
    assert_eq!(overall.top_assists[0].name, "Helper");
    // Unknown lineup entries are not counted.
    assert_eq!(overall.most_used_players.len(), 2);

    let ranges = &report.time_ranges;
    assert_eq!(ranges.shots_taken[&TimeRange::Opening], 1);
    assert_eq!(ranges.shots_taken[&TimeRange::FirstHalfEnd], 2);
    assert_eq!(ranges.shots_on_target[&TimeRange::FirstHalfEnd], 1);
    assert_eq!(ranges.goals_scored[&TimeRange::Opening], 1);
    assert_eq!(ranges.goals_conceded[&TimeRange::SecondHalfMiddle], 1);
    assert_eq!(ranges.goals_conceded.values().sum::<u32>(), 1);
}

#[test]
fn zone_concede_and_player_reports() {
    let report = build_gold(&[fixture_match("ouid-me")]);

    let mine = &report.zones.my_shots;
    assert_eq!(mine[&Zone::CenterAttackGoalFront].goals, 1);
    assert_eq!(mine[&Zone::CenterMidAttack].total, 1);
    assert_eq!(mine[&Zone::CenterMidAttack].on_target, 0);
    assert_eq!(report.zones.opponent_shots[&Zone::RightAttackCorner].shot_types["프리킥"], 1);

    let concede = &report.concede;
    assert_eq!(concede.total_conceded, 1);
    assert_eq!(concede.top_scorers_against[0].name, "Rival Star");
    assert_eq!(
        concede.analysis,
        vec![
            "가장 많이 실점한 구역: 우측_공격코너라인부근 (1골)".to_string(),
            "가장 많이 실점한 시간대: 61-75분 (1골)".to_string(),
            "가장 많이 허용한 슈팅 타입: 프리킥 (1골)".to_string(),
        ]
    );
    assert_eq!(concede.details[0].time, "후반 75분");

    let striker = report
        .players
        .iter()
        .find(|p| p.name == "Player X")
        .expect("striker row");
    assert_eq!(striker.goals, 2);
    assert_eq!(striker.shot_accuracy, 100.0);
    assert_eq!(striker.pass_accuracy, 80.0);
    assert_eq!(striker.main_position, "ST");
    assert_eq!(striker.goal_zones.values().sum::<u32>(), 2);
    assert!(report.players.iter().all(|p| !p.name.starts_with("Unknown(")));
}

#[test]
fn write_gold_emits_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let silver_file = dir.path().join("silver.jsonl");
    jsonl::write_jsonl(&silver_file, &[fixture_match("ouid-me")]).unwrap();
    fs::write(
        &silver_file,
        format!("{}not json\n", fs::read_to_string(&silver_file).unwrap()),
    )
    .unwrap();

    let gold_dir = dir.path().join("gold");
    let report = gold_stats::write_gold(&silver_file, &gold_dir).unwrap();
    assert_eq!(report.matches, 1);
    assert_eq!(report.skipped_lines, 1);

    for name in [
        "match_summaries.jsonl",
        "overall_stats.json",
        "time_zone_stats.json",
        "zone_stats.json",
        "concede_patterns.json",
        "player_stats.json",
    ] {
        assert!(gold_dir.join(name).is_file(), "{name} should be written");
    }

    let summaries = fs::read_to_string(gold_dir.join("match_summaries.jsonl")).unwrap();
    assert_eq!(summaries.lines().count(), 1);
    let overall: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(gold_dir.join("overall_stats.json")).unwrap())
            .unwrap();
    assert_eq!(overall["wins"], 1);
}
