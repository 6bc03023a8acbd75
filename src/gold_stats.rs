use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::goal_time::TimeRange;
use crate::gold_summary::{MatchSummary, split_sides, summarize_match};
use crate::jsonl;
use crate::meta::is_unknown_name;
use crate::silver::{MatchResult, NormalizedMatch, ShotRecord, percentage};
use crate::zone::Zone;

const TOP_N: usize = 10;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn average(total: f64, count: usize, decimals: i32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    round_to(total / count as f64, decimals)
}

fn usable_name(name: &str) -> bool {
    !name.is_empty() && !is_unknown_name(name)
}

/// Largest count; the first entry in key order wins ties.
fn top_entry<K: Clone>(counts: &BTreeMap<K, u32>) -> Option<(K, u32)> {
    let mut best: Option<(&K, u32)> = None;
    for (key, &count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((key, count));
        }
    }
    best.map(|(key, count)| (key.clone(), count))
}

type PlayerKey = (String, String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerRow {
    pub name: String,
    pub season: String,
    pub goals: i64,
    pub assists: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRow {
    pub name: String,
    pub season: String,
    pub appearances: u32,
    pub avg_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_matches: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub total_goals_scored: i64,
    pub total_goals_conceded: i64,
    pub goal_difference: i64,
    pub avg_goals_scored: f64,
    pub avg_goals_conceded: f64,
    pub avg_possession: f64,
    pub avg_shots: f64,
    pub shot_accuracy: f64,
    pub top_scorers: Vec<ScorerRow>,
    pub top_assists: Vec<ScorerRow>,
    pub most_used_players: Vec<UsageRow>,
}

#[derive(Default)]
struct Usage {
    appearances: u32,
    total_rating: f64,
    goals: i64,
    assists: i64,
}

pub fn overall_stats(matches: &[NormalizedMatch]) -> OverallStats {
    let (mut total, mut wins, mut draws, mut losses) = (0usize, 0usize, 0usize, 0usize);
    let (mut scored, mut conceded) = (0i64, 0i64);
    let (mut possession, mut shots, mut on_target) = (0i64, 0i64, 0i64);
    let mut usage: BTreeMap<PlayerKey, Usage> = BTreeMap::new();

    for (me, opponent) in matches.iter().filter_map(split_sides) {
        total += 1;
        match me.result {
            MatchResult::Win => wins += 1,
            MatchResult::Draw => draws += 1,
            MatchResult::Loss | MatchResult::Other(_) => losses += 1,
        }
        scored += me.shoot_summary.goals;
        conceded += opponent.map_or(0, |o| o.shoot_summary.goals);
        possession += me.stats.possession;
        shots += me.shoot_summary.total;
        on_target += me.shoot_summary.on_target;

        for player in me.players_stats.iter().filter(|p| usable_name(&p.name)) {
            let entry = usage
                .entry((player.name.clone(), player.season_name.clone()))
                .or_default();
            entry.appearances += 1;
            entry.total_rating += player.rating;
            entry.goals += player.stats.goal;
            entry.assists += player.stats.assist;
        }
    }

    let scorer_row = |(name, season): &PlayerKey, u: &Usage| ScorerRow {
        name: name.clone(),
        season: season.clone(),
        goals: u.goals,
        assists: u.assists,
    };

    let mut top_scorers: Vec<ScorerRow> = usage
        .iter()
        .filter(|(_, u)| u.goals > 0)
        .map(|(k, u)| scorer_row(k, u))
        .collect();
    top_scorers.sort_by(|a, b| (b.goals, b.assists).cmp(&(a.goals, a.assists)));
    top_scorers.truncate(TOP_N);

    let mut top_assists: Vec<ScorerRow> = usage
        .iter()
        .filter(|(_, u)| u.assists > 0)
        .map(|(k, u)| scorer_row(k, u))
        .collect();
    top_assists.sort_by(|a, b| (b.assists, b.goals).cmp(&(a.assists, a.goals)));
    top_assists.truncate(TOP_N);

    let mut most_used: Vec<UsageRow> = usage
        .iter()
        .map(|((name, season), u)| UsageRow {
            name: name.clone(),
            season: season.clone(),
            appearances: u.appearances,
            avg_rating: average(u.total_rating, u.appearances as usize, 2),
        })
        .collect();
    most_used.sort_by(|a, b| b.appearances.cmp(&a.appearances));
    most_used.truncate(TOP_N);

    OverallStats {
        total_matches: total,
        wins,
        draws,
        losses,
        win_rate: percentage(wins as i64, total as i64),
        total_goals_scored: scored,
        total_goals_conceded: conceded,
        goal_difference: scored - conceded,
        avg_goals_scored: average(scored as f64, total, 2),
        avg_goals_conceded: average(conceded as f64, total, 2),
        avg_possession: average(possession as f64, total, 1),
        avg_shots: average(shots as f64, total, 1),
        shot_accuracy: percentage(on_target, shots),
        top_scorers,
        top_assists,
        most_used_players: most_used,
    }
}

fn empty_buckets() -> BTreeMap<TimeRange, u32> {
    TimeRange::ALL.into_iter().map(|range| (range, 0)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRangeStats {
    pub goals_scored: BTreeMap<TimeRange, u32>,
    pub goals_conceded: BTreeMap<TimeRange, u32>,
    pub shots_taken: BTreeMap<TimeRange, u32>,
    pub shots_on_target: BTreeMap<TimeRange, u32>,
}

impl Default for TimeRangeStats {
    fn default() -> Self {
        Self {
            goals_scored: empty_buckets(),
            goals_conceded: empty_buckets(),
            shots_taken: empty_buckets(),
            shots_on_target: empty_buckets(),
        }
    }
}

fn bump<K: Ord>(map: &mut BTreeMap<K, u32>, key: K) {
    *map.entry(key).or_insert(0) += 1;
}

fn range_of(shot: &ShotRecord) -> TimeRange {
    TimeRange::from_raw(shot.time.raw)
}

pub fn time_range_stats(matches: &[NormalizedMatch]) -> TimeRangeStats {
    let mut stats = TimeRangeStats::default();
    for (me, opponent) in matches.iter().filter_map(split_sides) {
        for shot in &me.shoot_details {
            let range = range_of(shot);
            bump(&mut stats.shots_taken, range);
            if shot.result.is_on_target {
                bump(&mut stats.shots_on_target, range);
            }
            if shot.result.is_goal {
                bump(&mut stats.goals_scored, range);
            }
        }
        for shot in opponent.into_iter().flat_map(|o| o.goals()) {
            bump(&mut stats.goals_conceded, range_of(shot));
        }
    }
    stats
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneShotRow {
    pub total: u32,
    pub on_target: u32,
    pub goals: u32,
    pub shot_types: BTreeMap<String, u32>,
}

impl ZoneShotRow {
    fn record(&mut self, shot: &ShotRecord) {
        self.total += 1;
        if shot.result.is_on_target {
            self.on_target += 1;
        }
        if shot.result.is_goal {
            self.goals += 1;
        }
        bump(&mut self.shot_types, shot.shot_type.korean.clone());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneStats {
    pub my_shots: BTreeMap<Zone, ZoneShotRow>,
    pub opponent_shots: BTreeMap<Zone, ZoneShotRow>,
}

pub fn zone_stats(matches: &[NormalizedMatch]) -> ZoneStats {
    let mut stats = ZoneStats::default();
    for (me, opponent) in matches.iter().filter_map(split_sides) {
        for shot in &me.shoot_details {
            stats.my_shots.entry(shot.location.zone).or_default().record(shot);
        }
        for shot in opponent.into_iter().flat_map(|o| o.shoot_details.iter()) {
            stats
                .opponent_shots
                .entry(shot.location.zone)
                .or_default()
                .record(shot);
        }
    }
    stats
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerAgainst {
    pub name: String,
    pub season: String,
    pub goals: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcedeDetail {
    pub match_id: String,
    pub match_date: String,
    pub time: String,
    pub scorer: String,
    pub scorer_season: String,
    pub zone: Zone,
    pub shot_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcedePatterns {
    pub total_conceded: u32,
    pub by_zone: BTreeMap<Zone, u32>,
    pub by_time_zone: BTreeMap<TimeRange, u32>,
    pub by_shot_type: BTreeMap<String, u32>,
    pub top_scorers_against: Vec<ScorerAgainst>,
    pub analysis: Vec<String>,
    pub details: Vec<ConcedeDetail>,
}

pub fn concede_patterns(matches: &[NormalizedMatch]) -> ConcedePatterns {
    let mut out = ConcedePatterns::default();
    let mut scorers: BTreeMap<PlayerKey, u32> = BTreeMap::new();

    for m in matches {
        let Some((_, Some(opponent))) = split_sides(m) else {
            continue;
        };
        for shot in opponent.goals() {
            let range = range_of(shot);
            out.total_conceded += 1;
            bump(&mut out.by_zone, shot.location.zone);
            bump(&mut out.by_time_zone, range);
            bump(&mut out.by_shot_type, shot.shot_type.korean.clone());
            if usable_name(&shot.shooter.name) {
                bump(
                    &mut scorers,
                    (shot.shooter.name.clone(), shot.shooter.season_name.clone()),
                );
            }
            out.details.push(ConcedeDetail {
                match_id: m.match_id.clone(),
                match_date: m.match_date.clone(),
                time: shot.time.display.clone(),
                scorer: shot.shooter.name.clone(),
                scorer_season: shot.shooter.season_name.clone(),
                zone: shot.location.zone,
                shot_type: shot.shot_type.korean.clone(),
            });
        }
    }

    let mut top: Vec<ScorerAgainst> = scorers
        .into_iter()
        .map(|((name, season), goals)| ScorerAgainst {
            name,
            season,
            goals,
        })
        .collect();
    top.sort_by(|a, b| b.goals.cmp(&a.goals));
    top.truncate(TOP_N);
    out.top_scorers_against = top;

    if let Some((zone, goals)) = top_entry(&out.by_zone) {
        out.analysis
            .push(format!("가장 많이 실점한 구역: {zone} ({goals}골)"));
    }
    if let Some((range, goals)) = top_entry(&out.by_time_zone) {
        out.analysis
            .push(format!("가장 많이 실점한 시간대: {range} ({goals}골)"));
    }
    if let Some((kind, goals)) = top_entry(&out.by_shot_type) {
        out.analysis
            .push(format!("가장 많이 허용한 슈팅 타입: {kind} ({goals}골)"));
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatsRow {
    pub name: String,
    pub season: String,
    pub appearances: u32,
    pub avg_rating: f64,
    pub goals: i64,
    pub assists: i64,
    pub shots: i64,
    pub effective_shots: i64,
    pub shot_accuracy: f64,
    pub pass_accuracy: f64,
    pub main_position: String,
    pub positions: BTreeMap<String, u32>,
    pub shot_zones: BTreeMap<Zone, u32>,
    pub goal_zones: BTreeMap<Zone, u32>,
    pub shot_types: BTreeMap<String, u32>,
}

#[derive(Default)]
struct PlayerAcc {
    appearances: u32,
    total_rating: f64,
    goals: i64,
    assists: i64,
    shots: i64,
    effective_shots: i64,
    pass_try: i64,
    pass_success: i64,
    positions: BTreeMap<String, u32>,
    shot_zones: BTreeMap<Zone, u32>,
    goal_zones: BTreeMap<Zone, u32>,
    shot_types: BTreeMap<String, u32>,
}

/// Per-player totals for the target account's squad, most used first.
/// Shooters that never appear in a lineup row are left out.
pub fn player_stats(matches: &[NormalizedMatch]) -> Vec<PlayerStatsRow> {
    let mut acc: BTreeMap<PlayerKey, PlayerAcc> = BTreeMap::new();

    for (me, _) in matches.iter().filter_map(split_sides) {
        for player in me.players_stats.iter().filter(|p| usable_name(&p.name)) {
            let entry = acc
                .entry((player.name.clone(), player.season_name.clone()))
                .or_default();
            entry.appearances += 1;
            entry.total_rating += player.rating;
            entry.goals += player.stats.goal;
            entry.assists += player.stats.assist;
            entry.shots += player.stats.shoot;
            entry.effective_shots += player.stats.effective_shoot;
            entry.pass_try += player.stats.pass_try;
            entry.pass_success += player.stats.pass_success;
            bump(&mut entry.positions, player.position.name.clone());
        }
        for shot in me.shoot_details.iter().filter(|s| usable_name(&s.shooter.name)) {
            let entry = acc
                .entry((shot.shooter.name.clone(), shot.shooter.season_name.clone()))
                .or_default();
            bump(&mut entry.shot_zones, shot.location.zone);
            bump(&mut entry.shot_types, shot.shot_type.korean.clone());
            if shot.result.is_goal {
                bump(&mut entry.goal_zones, shot.location.zone);
            }
        }
    }

    let mut rows: Vec<PlayerStatsRow> = acc
        .into_iter()
        .filter(|(_, p)| p.appearances > 0)
        .map(|((name, season), p)| PlayerStatsRow {
            name,
            season,
            appearances: p.appearances,
            avg_rating: average(p.total_rating, p.appearances as usize, 2),
            goals: p.goals,
            assists: p.assists,
            shots: p.shots,
            effective_shots: p.effective_shots,
            shot_accuracy: percentage(p.effective_shots, p.shots),
            pass_accuracy: percentage(p.pass_success, p.pass_try),
            main_position: top_entry(&p.positions)
                .map(|(pos, _)| pos)
                .unwrap_or_default(),
            positions: p.positions,
            shot_zones: p.shot_zones,
            goal_zones: p.goal_zones,
            shot_types: p.shot_types,
        })
        .collect();
    rows.sort_by(|a, b| b.appearances.cmp(&a.appearances));
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoldReport {
    pub matches: usize,
    pub skipped_lines: usize,
    pub summaries: Vec<MatchSummary>,
    pub overall: OverallStats,
    pub time_ranges: TimeRangeStats,
    pub zones: ZoneStats,
    pub concede: ConcedePatterns,
    pub players: Vec<PlayerStatsRow>,
}

pub fn build_gold(matches: &[NormalizedMatch]) -> GoldReport {
    GoldReport {
        matches: matches.len(),
        skipped_lines: 0,
        summaries: matches.iter().filter_map(summarize_match).collect(),
        overall: overall_stats(matches),
        time_ranges: time_range_stats(matches),
        zones: zone_stats(matches),
        concede: concede_patterns(matches),
        players: player_stats(matches),
    }
}

pub fn write_gold(silver_file: &Path, gold_dir: &Path) -> Result<GoldReport> {
    let batch = jsonl::read_jsonl::<NormalizedMatch>(silver_file)?;
    let mut report = build_gold(&batch.rows);
    report.skipped_lines = batch.skipped;

    jsonl::write_jsonl(&gold_dir.join("match_summaries.jsonl"), &report.summaries)?;
    jsonl::write_json_pretty(&gold_dir.join("overall_stats.json"), &report.overall)?;
    jsonl::write_json_pretty(&gold_dir.join("time_zone_stats.json"), &report.time_ranges)?;
    jsonl::write_json_pretty(&gold_dir.join("zone_stats.json"), &report.zones)?;
    jsonl::write_json_pretty(&gold_dir.join("concede_patterns.json"), &report.concede)?;
    jsonl::write_json_pretty(&gold_dir.join("player_stats.json"), &report.players)?;

    info!(
        matches = report.matches,
        summaries = report.summaries.len(),
        players = report.players.len(),
        "gold artifacts written"
    );
    Ok(report)
}
