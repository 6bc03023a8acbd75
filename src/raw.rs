use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

use crate::meta::SpId;

fn null_default<'de, D, T>(de: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

const DEFAULT_SHOT_CODE: i64 = 1;

fn null_shot_code<'de, D>(de: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(de)?.unwrap_or(DEFAULT_SHOT_CODE))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatch {
    #[serde(default, deserialize_with = "null_default")]
    pub match_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub match_date: String,
    #[serde(default, deserialize_with = "null_default")]
    pub match_type: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub match_info: Vec<RawParticipant>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParticipant {
    #[serde(default, deserialize_with = "null_default")]
    pub ouid: String,
    #[serde(default, deserialize_with = "null_default")]
    pub nickname: String,
    #[serde(default, deserialize_with = "null_default")]
    pub match_detail: RawMatchDetail,
    #[serde(default, deserialize_with = "null_default")]
    pub shoot: RawShootSummary,
    #[serde(default, deserialize_with = "null_default")]
    pub shoot_detail: Vec<RawShot>,
    #[serde(default, deserialize_with = "null_default")]
    pub pass: RawPass,
    #[serde(default, deserialize_with = "null_default")]
    pub defence: RawDefence,
    #[serde(default, deserialize_with = "null_default")]
    pub player: Vec<RawPlayer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMatchDetail {
    #[serde(deserialize_with = "null_default")]
    pub season_id: i64,
    #[serde(deserialize_with = "null_default")]
    pub match_result: String,
    #[serde(deserialize_with = "null_default")]
    pub match_end_type: i64,
    #[serde(deserialize_with = "null_default")]
    pub system_pause: i64,
    #[serde(deserialize_with = "null_default")]
    pub foul: i64,
    #[serde(deserialize_with = "null_default")]
    pub injury: i64,
    #[serde(deserialize_with = "null_default")]
    pub red_cards: i64,
    #[serde(deserialize_with = "null_default")]
    pub yellow_cards: i64,
    #[serde(deserialize_with = "null_default")]
    pub dribble: i64,
    #[serde(deserialize_with = "null_default")]
    pub corner_kick: i64,
    #[serde(deserialize_with = "null_default")]
    pub possession: i64,
    #[serde(rename = "OffsideCount", alias = "offsides", deserialize_with = "null_default")]
    pub offside_count: i64,
    #[serde(deserialize_with = "null_default")]
    pub average_rating: f64,
    #[serde(deserialize_with = "null_default")]
    pub controller: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawShootSummary {
    #[serde(deserialize_with = "null_default")]
    pub shoot_total: i64,
    #[serde(deserialize_with = "null_default")]
    pub effective_shoot_total: i64,
    #[serde(deserialize_with = "null_default")]
    pub shoot_out_score: i64,
    #[serde(deserialize_with = "null_default")]
    pub goal_total: i64,
    #[serde(deserialize_with = "null_default")]
    pub goal_total_display: i64,
    #[serde(alias = "goalOwnGoal", deserialize_with = "null_default")]
    pub own_goal: i64,
    #[serde(deserialize_with = "null_default")]
    pub shoot_heading: i64,
    #[serde(deserialize_with = "null_default")]
    pub goal_heading: i64,
    #[serde(deserialize_with = "null_default")]
    pub shoot_freekick: i64,
    #[serde(deserialize_with = "null_default")]
    pub goal_freekick: i64,
    #[serde(deserialize_with = "null_default")]
    pub shoot_in_penalty: i64,
    #[serde(deserialize_with = "null_default")]
    pub goal_in_penalty: i64,
    #[serde(deserialize_with = "null_default")]
    pub shoot_out_penalty: i64,
    #[serde(deserialize_with = "null_default")]
    pub goal_out_penalty: i64,
    #[serde(deserialize_with = "null_default")]
    pub shoot_penalty_kick: i64,
    #[serde(deserialize_with = "null_default")]
    pub goal_penalty_kick: i64,
}

// A missing or null `type`/`result` reads as code 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawShot {
    #[serde(deserialize_with = "null_default")]
    pub goal_time: i64,
    #[serde(deserialize_with = "null_default")]
    pub x: f64,
    #[serde(deserialize_with = "null_default")]
    pub y: f64,
    #[serde(rename = "type", deserialize_with = "null_shot_code")]
    pub kind: i64,
    #[serde(deserialize_with = "null_shot_code")]
    pub result: i64,
    #[serde(deserialize_with = "null_default")]
    pub sp_id: SpId,
    #[serde(deserialize_with = "null_default")]
    pub sp_grade: i64,
    #[serde(deserialize_with = "null_default")]
    pub sp_level: i64,
    #[serde(deserialize_with = "null_default")]
    pub sp_id_type: bool,
    #[serde(deserialize_with = "null_default")]
    pub assist: bool,
    #[serde(deserialize_with = "null_default")]
    pub assist_sp_id: SpId,
    #[serde(deserialize_with = "null_default")]
    pub assist_x: f64,
    #[serde(deserialize_with = "null_default")]
    pub assist_y: f64,
    #[serde(deserialize_with = "null_default")]
    pub hit_post: bool,
    #[serde(deserialize_with = "null_default")]
    pub in_penalty: bool,
}

impl Default for RawShot {
    fn default() -> Self {
        Self {
            goal_time: 0,
            x: 0.0,
            y: 0.0,
            kind: DEFAULT_SHOT_CODE,
            result: DEFAULT_SHOT_CODE,
            sp_id: SpId::default(),
            sp_grade: 0,
            sp_level: 0,
            sp_id_type: false,
            assist: false,
            assist_sp_id: SpId::default(),
            assist_x: 0.0,
            assist_y: 0.0,
            hit_post: false,
            in_penalty: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPass {
    #[serde(deserialize_with = "null_default")]
    pub pass_try: i64,
    #[serde(deserialize_with = "null_default")]
    pub pass_success: i64,
    #[serde(deserialize_with = "null_default")]
    pub short_pass_try: i64,
    #[serde(deserialize_with = "null_default")]
    pub short_pass_success: i64,
    #[serde(deserialize_with = "null_default")]
    pub long_pass_try: i64,
    #[serde(deserialize_with = "null_default")]
    pub long_pass_success: i64,
    #[serde(deserialize_with = "null_default")]
    pub bouncing_lob_pass_try: i64,
    #[serde(deserialize_with = "null_default")]
    pub bouncing_lob_pass_success: i64,
    #[serde(deserialize_with = "null_default")]
    pub driven_ground_pass_try: i64,
    #[serde(deserialize_with = "null_default")]
    pub driven_ground_pass_success: i64,
    #[serde(deserialize_with = "null_default")]
    pub through_pass_try: i64,
    #[serde(deserialize_with = "null_default")]
    pub through_pass_success: i64,
    #[serde(alias = "lobbPassTry", deserialize_with = "null_default")]
    pub lobbed_through_pass_try: i64,
    #[serde(alias = "lobbPassSuccess", deserialize_with = "null_default")]
    pub lobbed_through_pass_success: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDefence {
    #[serde(deserialize_with = "null_default")]
    pub block_try: i64,
    #[serde(deserialize_with = "null_default")]
    pub block_success: i64,
    #[serde(deserialize_with = "null_default")]
    pub tackle_try: i64,
    #[serde(deserialize_with = "null_default")]
    pub tackle_success: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPlayer {
    #[serde(deserialize_with = "null_default")]
    pub sp_id: SpId,
    #[serde(deserialize_with = "null_default")]
    pub sp_position: i64,
    #[serde(deserialize_with = "null_default")]
    pub sp_grade: i64,
    #[serde(deserialize_with = "null_default")]
    pub status: RawPlayerStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPlayerStatus {
    #[serde(deserialize_with = "null_default")]
    pub shoot: i64,
    #[serde(deserialize_with = "null_default")]
    pub effective_shoot: i64,
    #[serde(deserialize_with = "null_default")]
    pub assist: i64,
    #[serde(deserialize_with = "null_default")]
    pub goal: i64,
    #[serde(deserialize_with = "null_default")]
    pub dribble: i64,
    #[serde(deserialize_with = "null_default")]
    pub intercept: i64,
    #[serde(deserialize_with = "null_default")]
    pub defending: i64,
    #[serde(deserialize_with = "null_default")]
    pub pass_try: i64,
    #[serde(deserialize_with = "null_default")]
    pub pass_success: i64,
    #[serde(deserialize_with = "null_default")]
    pub dribble_try: i64,
    #[serde(deserialize_with = "null_default")]
    pub dribble_success: i64,
    #[serde(deserialize_with = "null_default")]
    pub aerial_try: i64,
    #[serde(deserialize_with = "null_default")]
    pub aerial_success: i64,
    #[serde(deserialize_with = "null_default")]
    pub block_try: i64,
    #[serde(rename = "block", alias = "blockSuccess", deserialize_with = "null_default")]
    pub block_success: i64,
    #[serde(deserialize_with = "null_default")]
    pub tackle_try: i64,
    #[serde(rename = "tackle", alias = "tackleSuccess", deserialize_with = "null_default")]
    pub tackle_success: i64,
    #[serde(deserialize_with = "null_default")]
    pub yellow_cards: i64,
    #[serde(deserialize_with = "null_default")]
    pub red_cards: i64,
    #[serde(deserialize_with = "null_default")]
    pub sp_rating: f64,
}

pub fn parse_raw_match(raw: &str) -> Result<RawMatch> {
    serde_json::from_str(raw.trim()).context("invalid match detail json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_null_blocks_default() {
        let m = parse_raw_match(
            r#"{"matchId":"m1","matchDate":null,"matchInfo":[{"ouid":"a","shoot":null,"shootDetail":null}]}"#,
        )
        .unwrap();
        assert_eq!(m.match_id, "m1");
        assert_eq!(m.match_date, "");
        assert_eq!(m.match_type, 0);
        let p = &m.match_info[0];
        assert_eq!(p.shoot.goal_total, 0);
        assert!(p.shoot_detail.is_empty());
        assert!(p.player.is_empty());
        assert_eq!(p.match_detail.match_result, "");
    }

    #[test]
    fn shot_codes_default_to_one() {
        let m = parse_raw_match(
            r#"{"matchInfo":[{"shootDetail":[{"goalTime":100,"x":0.5,"y":0.5,"spId":241206517}]}]}"#,
        )
        .unwrap();
        let shot = &m.match_info[0].shoot_detail[0];
        assert_eq!(shot.kind, 1);
        assert_eq!(shot.result, 1);
        assert_eq!(shot.sp_id, SpId(241206517));
        assert!(!shot.assist_sp_id.is_player());
    }

    #[test]
    fn null_shot_codes_keep_the_match() {
        let m = parse_raw_match(
            r#"{"matchId":"m2","matchInfo":[
                {"ouid":"a","shootDetail":[
                    {"goalTime":300,"type":null,"result":null,"spId":241206517},
                    {"goalTime":900,"type":3,"result":3}
                ]},
                {"ouid":"b"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(m.match_info.len(), 2);
        let shots = &m.match_info[0].shoot_detail;
        assert_eq!(shots.len(), 2);
        assert_eq!((shots[0].kind, shots[0].result), (1, 1));
        assert_eq!((shots[1].kind, shots[1].result), (3, 3));

        let line = r#"{"matchId":"m3","matchInfo":[{"shootDetail":[{"type":null,"result":null}]}]}"#;
        let batch = crate::jsonl::parse_jsonl::<RawMatch>(line);
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.skipped, 0);
    }

    #[test]
    fn accepts_vendor_key_variants() {
        let m = parse_raw_match(
            r#"{"matchInfo":[{
                "matchDetail":{"OffsideCount":2,"averageRating":7.5},
                "shoot":{"ownGoal":1},
                "pass":{"lobbedThroughPassTry":4},
                "player":[{"spId":1,"status":{"block":3,"tackle":5,"spRating":6.8}}]
            },{
                "matchDetail":{"offsides":1},
                "shoot":{"goalOwnGoal":2},
                "pass":{"lobbPassTry":6}
            }]}"#,
        )
        .unwrap();
        let (a, b) = (&m.match_info[0], &m.match_info[1]);
        assert_eq!(a.match_detail.offside_count, 2);
        assert_eq!(b.match_detail.offside_count, 1);
        assert_eq!(a.shoot.own_goal, 1);
        assert_eq!(b.shoot.own_goal, 2);
        assert_eq!(a.pass.lobbed_through_pass_try, 4);
        assert_eq!(b.pass.lobbed_through_pass_try, 6);
        assert_eq!(a.player[0].status.block_success, 3);
        assert_eq!(a.player[0].status.tackle_success, 5);
    }

    #[test]
    fn rejects_non_object() {
        assert!(parse_raw_match("[1,2]").is_err());
        assert!(parse_raw_match("{").is_err());
    }
}
