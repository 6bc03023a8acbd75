use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::meta::{SpId, is_unknown_name};
use crate::silver::{MatchResult, NormalizedMatch, NormalizedParticipant, ShotRecord};
use crate::zone;

const DEFAULT_OPPONENT: &str = "상대";

pub fn split_sides(
    m: &NormalizedMatch,
) -> Option<(&NormalizedParticipant, Option<&NormalizedParticipant>)> {
    let me = m.players.iter().find(|p| p.is_me)?;
    let opponent = m.players.iter().find(|p| !p.is_me);
    Some((me, opponent))
}

/// `name(season, +N강)`; a parenthesised suffix on the season name is dropped.
pub fn format_player(name: &str, season: &str, grade: i64) -> String {
    let season_short = season.split(" (").next().unwrap_or(season);
    format!("{name}({season_short}, +{grade}강)")
}

/// `YYYY년 MM월 DD일` from an ISO-like timestamp; the raw string if unparseable.
pub fn format_match_date(raw: &str) -> String {
    raw.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .map(|date| date.format("%Y년 %m월 %d일").to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalSide {
    Scored,
    Conceded,
}

fn grade_of(sp_id: SpId, side: &NormalizedParticipant) -> i64 {
    side.players_stats
        .iter()
        .find(|p| p.sp_id == sp_id)
        .map(|p| p.grade)
        .unwrap_or(0)
}

fn location_text(shot: &ShotRecord) -> String {
    let loc = &shot.location;
    if loc.zone_desc.is_empty() {
        format!("{}({})", loc.zone, loc.penalty_zone)
    } else {
        format!("{}({}, {})", loc.zone, loc.zone_desc, loc.penalty_zone)
    }
}

pub fn goal_sentence(shot: &ShotRecord, side: &NormalizedParticipant, kind: GoalSide) -> String {
    let shooter = &shot.shooter;
    let subject = if is_unknown_name(&shooter.name) {
        String::new()
    } else {
        let grade = grade_of(shooter.sp_id, side);
        format!("{}가 ", format_player(&shooter.name, &shooter.season_name, grade))
    };
    let verb = match kind {
        GoalSide::Scored => "득점했습니다",
        GoalSide::Conceded => "득점하며 실점했습니다",
    };
    let mut sentence = format!(
        "{}에 {}{}에서 {}로 {}.",
        shot.time.display,
        subject,
        location_text(shot),
        shot.shot_type.korean,
        verb
    );

    match shot.assist.as_ref().filter(|a| !is_unknown_name(&a.name)) {
        Some(assist) => {
            let grade = grade_of(assist.sp_id, side);
            sentence.push_str(&format!(
                " 이 골은 {}가 {}에서 연결한 패스로 만들어졌습니다.",
                format_player(&assist.name, &assist.season_name, grade),
                zone::zone_of(assist.x, assist.y)
            ));
        }
        None => sentence.push_str(" 개인 돌파로 만든 골입니다."),
    }
    sentence
}

pub fn goal_lines(side: &NormalizedParticipant, kind: GoalSide) -> Vec<String> {
    let mut goals: Vec<&ShotRecord> = side.goals().collect();
    goals.sort_by_key(|shot| shot.time.raw);
    goals
        .into_iter()
        .map(|shot| goal_sentence(shot, side, kind))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub me: i64,
    pub opponent: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryMetadata {
    pub my_possession: i64,
    pub my_shots: i64,
    pub my_shots_on_target: i64,
    pub my_goals: i64,
    pub opponent_goals: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub match_id: String,
    pub match_date: String,
    pub match_type: String,
    pub result: MatchResult,
    pub score: Score,
    pub opponent_nickname: String,
    pub summary_text: String,
    pub my_goals_text: Vec<String>,
    pub conceded_goals_text: Vec<String>,
    pub full_narrative: String,
    pub metadata: SummaryMetadata,
}

fn numbered_section(title: &str, lines: &[String], empty: &str) -> String {
    if lines.is_empty() {
        return format!("[{title}]\n{empty}");
    }
    let body: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{}. {line}", i + 1))
        .collect();
    format!("[{title}]\n{}", body.join("\n"))
}

/// `None` when the match has no self participant.
pub fn summarize_match(m: &NormalizedMatch) -> Option<MatchSummary> {
    let (me, opponent) = split_sides(m)?;

    let my_goals = me.shoot_summary.goals;
    let opponent_goals = opponent.map_or(0, |o| o.shoot_summary.goals);
    let opponent_nickname = opponent
        .map(|o| o.nickname.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_OPPONENT.to_string());
    let my_possession = me.stats.possession;
    let opponent_possession = opponent.map_or(100 - my_possession, |o| o.stats.possession);
    let my_shots = me.shoot_summary.total;
    let my_on_target = me.shoot_summary.on_target;
    let opponent_shots = opponent.map_or(0, |o| o.shoot_summary.total);
    let opponent_on_target = opponent.map_or(0, |o| o.shoot_summary.on_target);

    let summary_text = format!(
        "{} {}에서 {}을(를) 상대로 {}:{} {}를 거뒀습니다. 점유율 {}% vs {}%, 슈팅 {}개(유효 {}개) vs {}개(유효 {}개)를 기록했습니다.",
        format_match_date(&m.match_date),
        m.match_type.name,
        opponent_nickname,
        my_goals,
        opponent_goals,
        me.result.narrative(),
        my_possession,
        opponent_possession,
        my_shots,
        my_on_target,
        opponent_shots,
        opponent_on_target,
    );

    let my_goals_text = goal_lines(me, GoalSide::Scored);
    let conceded_goals_text = opponent
        .map(|o| goal_lines(o, GoalSide::Conceded))
        .unwrap_or_default();

    let full_narrative = [
        summary_text.clone(),
        numbered_section("득점", &my_goals_text, "이 경기에서 득점이 없었습니다."),
        numbered_section("실점", &conceded_goals_text, "이 경기에서 실점이 없었습니다."),
    ]
    .join("\n\n");

    Some(MatchSummary {
        match_id: m.match_id.clone(),
        match_date: m.match_date.clone(),
        match_type: m.match_type.name.clone(),
        result: me.result.clone(),
        score: Score {
            me: my_goals,
            opponent: opponent_goals,
        },
        opponent_nickname,
        summary_text,
        my_goals_text,
        conceded_goals_text,
        full_narrative,
        metadata: SummaryMetadata {
            my_possession,
            my_shots,
            my_shots_on_target: my_on_target,
            my_goals,
            opponent_goals,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_label_trims_season_suffix() {
        assert_eq!(format_player("손흥민", "24TOTY (24 Team of the Year)", 5), "손흥민(24TOTY, +5강)");
        assert_eq!(format_player("Kane", "LIVE", 0), "Kane(LIVE, +0강)");
    }

    #[test]
    fn match_date_formats_or_falls_back() {
        assert_eq!(format_match_date("2025-01-31T12:34:56"), "2025년 01월 31일");
        assert_eq!(format_match_date("2025-01-31T12:34:56Z"), "2025년 01월 31일");
        assert_eq!(format_match_date("yesterday"), "yesterday");
        assert_eq!(format_match_date(""), "");
    }

    #[test]
    fn empty_section_uses_placeholder() {
        assert_eq!(numbered_section("득점", &[], "없음"), "[득점]\n없음");
        let lines = vec!["a".to_string(), "b".to_string()];
        assert_eq!(numbered_section("실점", &lines, "없음"), "[실점]\n1. a\n2. b");
    }
}
