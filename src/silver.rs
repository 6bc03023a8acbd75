use std::path::Path;

use anyhow::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::goal_time::{self, Period};
use crate::jsonl;
use crate::meta::{MetaTables, SpId};
use crate::raw::{RawMatch, RawParticipant, RawPlayer, RawShot};
use crate::schema_codes;
use crate::zone::{self, PenaltyZone, Zone};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MatchResult {
    Win,
    Draw,
    Loss,
    Other(String),
}

impl MatchResult {
    pub fn label(&self) -> &str {
        match self {
            MatchResult::Win => "승",
            MatchResult::Draw => "무",
            MatchResult::Loss => "패",
            MatchResult::Other(raw) => raw,
        }
    }

    pub fn narrative(&self) -> &str {
        match self {
            MatchResult::Win => "승리",
            MatchResult::Draw => "무승부",
            MatchResult::Loss => "패배",
            MatchResult::Other(raw) => raw,
        }
    }
}

impl From<String> for MatchResult {
    fn from(raw: String) -> Self {
        match raw.trim() {
            "승" => MatchResult::Win,
            "무" => MatchResult::Draw,
            "패" => MatchResult::Loss,
            _ => MatchResult::Other(raw),
        }
    }
}

impl From<MatchResult> for String {
    fn from(result: MatchResult) -> Self {
        result.label().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMatch {
    pub match_id: String,
    pub match_date: String,
    pub match_type: CodeName,
    pub players: Vec<NormalizedParticipant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeName {
    pub code: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedParticipant {
    pub ouid: String,
    pub nickname: String,
    pub is_me: bool,
    pub result: MatchResult,
    pub end_type: CodeName,
    pub stats: ParticipantStats,
    pub shoot_summary: ShootSummary,
    pub shoot_details: Vec<ShotRecord>,
    pub pass_stats: PassStats,
    pub defence_stats: DefenceStats,
    pub players_stats: Vec<PlayerRecord>,
}

impl NormalizedParticipant {
    pub fn goals(&self) -> impl Iterator<Item = &ShotRecord> {
        self.shoot_details.iter().filter(|shot| shot.result.is_goal)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantStats {
    pub possession: i64,
    pub average_rating: f64,
    pub controller: String,
    pub controller_name: String,
    pub season_id: i64,
    pub foul: i64,
    pub injury: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
    pub offsides: i64,
    pub corner_kicks: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShootSummary {
    pub total: i64,
    pub on_target: i64,
    pub goals: i64,
    pub goals_display: i64,
    pub goals_in_penalty: i64,
    pub outside_penalty: i64,
    pub heading_goals: i64,
    pub freekick_goals: i64,
    pub penalty_goals: i64,
    pub own_goals: i64,
    pub shootout_shots: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub time: ShotTime,
    pub shooter: PlayerRef,
    pub location: ShotLocation,
    pub shot_type: ShotTypeInfo,
    pub result: ShotResultInfo,
    pub assist: Option<AssistRef>,
    pub in_penalty: bool,
    pub hit_post: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotTime {
    pub raw: i64,
    pub half: Period,
    pub minute: i64,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub sp_id: SpId,
    pub name: String,
    pub season_id: i64,
    pub season_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotLocation {
    pub x: f64,
    pub y: f64,
    pub zone: Zone,
    pub zone_desc: String,
    pub x_zone: Option<String>,
    pub y_zone: Option<String>,
    pub penalty_zone: PenaltyZone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotTypeInfo {
    pub code: i64,
    pub name: String,
    pub korean: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotResultInfo {
    pub code: i64,
    pub name: String,
    pub is_goal: bool,
    pub is_on_target: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistRef {
    pub sp_id: SpId,
    pub name: String,
    pub season_id: i64,
    pub season_name: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassStats {
    pub total_try: i64,
    pub total_success: i64,
    pub accuracy: f64,
    pub short_try: i64,
    pub short_success: i64,
    pub long_try: i64,
    pub long_success: i64,
    pub through_try: i64,
    pub through_success: i64,
    pub lobby_try: i64,
    pub lobby_success: i64,
    #[serde(rename = "bouncingLob_try")]
    pub bouncing_lob_try: i64,
    #[serde(rename = "bouncingLob_success")]
    pub bouncing_lob_success: i64,
    pub driven_ground_try: i64,
    pub driven_ground_success: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenceStats {
    pub block_try: i64,
    pub block_success: i64,
    pub tackle_try: i64,
    pub tackle_success: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub sp_id: SpId,
    pub name: String,
    pub season_id: i64,
    pub season_name: String,
    pub position: CodeName,
    pub grade: i64,
    pub rating: f64,
    pub stats: PlayerMatchStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMatchStats {
    pub goal: i64,
    pub assist: i64,
    pub shoot: i64,
    pub effective_shoot: i64,
    pub dribble_try: i64,
    pub dribble_success: i64,
    pub pass_try: i64,
    pub pass_success: i64,
    pub aerial_try: i64,
    pub aerial_success: i64,
    pub block_try: i64,
    pub block_success: i64,
    pub tackle_try: i64,
    pub tackle_success: i64,
    pub intercept: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
}

/// Success rate as a one-decimal percentage; `0.0` when nothing was tried.
pub fn percentage(success: i64, attempts: i64) -> f64 {
    if attempts <= 0 {
        return 0.0;
    }
    (success as f64 / attempts as f64 * 1000.0).round() / 10.0
}

fn player_ref(sp_id: SpId, meta: &MetaTables) -> PlayerRef {
    let season_id = sp_id.season_id();
    PlayerRef {
        sp_id,
        name: meta.player_name(sp_id),
        season_id,
        season_name: meta.season_name(season_id),
    }
}

pub fn transform_shot(shot: &RawShot, meta: &MetaTables) -> ShotRecord {
    let time = goal_time::decode(shot.goal_time);
    let detail = zone::classify(shot.x, shot.y);
    let assist = shot.assist_sp_id.is_player().then(|| {
        let who = player_ref(shot.assist_sp_id, meta);
        AssistRef {
            sp_id: who.sp_id,
            name: who.name,
            season_id: who.season_id,
            season_name: who.season_name,
            x: shot.assist_x,
            y: shot.assist_y,
        }
    });

    ShotRecord {
        time: ShotTime {
            raw: shot.goal_time,
            half: time.period,
            minute: time.minute,
            display: time.display,
        },
        shooter: player_ref(shot.sp_id, meta),
        location: ShotLocation {
            x: shot.x,
            y: shot.y,
            zone: detail.zone,
            zone_desc: detail.description.to_string(),
            x_zone: detail.x_zone.map(str::to_string),
            y_zone: detail.y_zone.map(str::to_string),
            penalty_zone: zone::penalty_zone(shot.x, shot.y),
        },
        shot_type: ShotTypeInfo {
            code: shot.kind,
            name: schema_codes::shot_type_slug(shot.kind).to_string(),
            korean: schema_codes::shot_type_korean(shot.kind).to_string(),
        },
        result: ShotResultInfo {
            code: shot.result,
            name: schema_codes::shot_result_name(shot.result).to_string(),
            is_goal: schema_codes::is_goal(shot.result),
            is_on_target: schema_codes::is_on_target(shot.result),
        },
        assist,
        in_penalty: shot.in_penalty,
        hit_post: shot.hit_post,
    }
}

pub fn transform_player(player: &RawPlayer, meta: &MetaTables) -> PlayerRecord {
    let who = player_ref(player.sp_id, meta);
    let status = &player.status;
    PlayerRecord {
        sp_id: who.sp_id,
        name: who.name,
        season_id: who.season_id,
        season_name: who.season_name,
        position: CodeName {
            code: player.sp_position,
            name: meta.position_name(player.sp_position),
        },
        grade: player.sp_grade,
        rating: status.sp_rating,
        stats: PlayerMatchStats {
            goal: status.goal,
            assist: status.assist,
            shoot: status.shoot,
            effective_shoot: status.effective_shoot,
            dribble_try: status.dribble_try,
            dribble_success: status.dribble_success,
            pass_try: status.pass_try,
            pass_success: status.pass_success,
            aerial_try: status.aerial_try,
            aerial_success: status.aerial_success,
            block_try: status.block_try,
            block_success: status.block_success,
            tackle_try: status.tackle_try,
            tackle_success: status.tackle_success,
            intercept: status.intercept,
            yellow_cards: status.yellow_cards,
            red_cards: status.red_cards,
        },
    }
}

pub fn transform_participant(
    raw: &RawParticipant,
    meta: &MetaTables,
    target_ouid: &str,
) -> NormalizedParticipant {
    let detail = &raw.match_detail;
    let shoot = &raw.shoot;
    let pass = &raw.pass;
    let defence = &raw.defence;

    let mut shots: Vec<&RawShot> = raw.shoot_detail.iter().collect();
    shots.sort_by_key(|shot| shot.goal_time);

    NormalizedParticipant {
        ouid: raw.ouid.clone(),
        nickname: raw.nickname.clone(),
        is_me: !target_ouid.is_empty() && raw.ouid == target_ouid,
        result: MatchResult::from(detail.match_result.clone()),
        end_type: CodeName {
            code: detail.match_end_type,
            name: schema_codes::match_end_type_name(detail.match_end_type).to_string(),
        },
        stats: ParticipantStats {
            possession: detail.possession,
            average_rating: detail.average_rating,
            controller: detail.controller.clone(),
            controller_name: schema_codes::controller_name(&detail.controller),
            season_id: detail.season_id,
            foul: detail.foul,
            injury: detail.injury,
            yellow_cards: detail.yellow_cards,
            red_cards: detail.red_cards,
            offsides: detail.offside_count,
            corner_kicks: detail.corner_kick,
        },
        shoot_summary: ShootSummary {
            total: shoot.shoot_total,
            on_target: shoot.effective_shoot_total,
            goals: shoot.goal_total,
            goals_display: shoot.goal_total_display,
            goals_in_penalty: shoot.goal_in_penalty,
            outside_penalty: shoot.goal_out_penalty,
            heading_goals: shoot.goal_heading,
            freekick_goals: shoot.goal_freekick,
            penalty_goals: shoot.goal_penalty_kick,
            own_goals: shoot.own_goal,
            shootout_shots: shoot.shoot_out_score,
        },
        shoot_details: shots
            .into_iter()
            .map(|shot| transform_shot(shot, meta))
            .collect(),
        pass_stats: PassStats {
            total_try: pass.pass_try,
            total_success: pass.pass_success,
            accuracy: percentage(pass.pass_success, pass.pass_try),
            short_try: pass.short_pass_try,
            short_success: pass.short_pass_success,
            long_try: pass.long_pass_try,
            long_success: pass.long_pass_success,
            through_try: pass.through_pass_try,
            through_success: pass.through_pass_success,
            lobby_try: pass.lobbed_through_pass_try,
            lobby_success: pass.lobbed_through_pass_success,
            bouncing_lob_try: pass.bouncing_lob_pass_try,
            bouncing_lob_success: pass.bouncing_lob_pass_success,
            driven_ground_try: pass.driven_ground_pass_try,
            driven_ground_success: pass.driven_ground_pass_success,
        },
        defence_stats: DefenceStats {
            block_try: defence.block_try,
            block_success: defence.block_success,
            tackle_try: defence.tackle_try,
            tackle_success: defence.tackle_success,
        },
        players_stats: raw
            .player
            .iter()
            .map(|player| transform_player(player, meta))
            .collect(),
    }
}

pub fn transform_match(raw: &RawMatch, meta: &MetaTables, target_ouid: &str) -> NormalizedMatch {
    NormalizedMatch {
        match_id: raw.match_id.clone(),
        match_date: raw.match_date.clone(),
        match_type: CodeName {
            code: raw.match_type,
            name: meta.match_type_name(raw.match_type),
        },
        players: raw
            .match_info
            .iter()
            .map(|participant| transform_participant(participant, meta, target_ouid))
            .collect(),
    }
}

// Output order follows input order.
pub fn transform_matches(
    raws: &[RawMatch],
    meta: &MetaTables,
    target_ouid: &str,
) -> Vec<NormalizedMatch> {
    raws.par_iter()
        .map(|raw| transform_match(raw, meta, target_ouid))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SilverReport {
    pub read: usize,
    pub skipped: usize,
    pub written: usize,
}

pub fn transform_file(
    bronze_file: &Path,
    silver_file: &Path,
    meta: &MetaTables,
    target_ouid: &str,
    parallelism: Option<usize>,
) -> Result<SilverReport> {
    let batch = jsonl::read_jsonl::<RawMatch>(bronze_file)?;
    let normalized = with_pool(parallelism, || transform_matches(&batch.rows, meta, target_ouid));
    let written = jsonl::write_jsonl(silver_file, &normalized)?;
    info!(
        read = batch.rows.len(),
        skipped = batch.skipped,
        written,
        "silver transform finished"
    );
    Ok(SilverReport {
        read: batch.rows.len(),
        skipped: batch.skipped,
        written,
    })
}

fn with_pool<T: Send>(threads: Option<usize>, action: impl FnOnce() -> T + Send) -> T {
    let Some(threads) = threads else {
        return action();
    };
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}
