use std::fmt;

use serde::{Deserialize, Serialize};

// x = 0 is the acting side's own goal line, x = 1 the opponent's.
const X_GOAL_AREA: f64 = 0.17;
const X_DEFENSE: f64 = 0.33;
const X_MID_DEFENSE: f64 = 0.50;
const X_MID_ATTACK: f64 = 0.67;
const X_ATTACK: f64 = 0.83;

const Y_RIGHT_MAX: f64 = 0.33;
const Y_CENTER_MAX: f64 = 0.67;

const BOX_X_MIN: f64 = 0.83;
const BOX_Y_MIN: f64 = 0.21;
const BOX_Y_MAX: f64 = 0.79;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    Right,
    Center,
    Left,
}

impl Lane {
    pub fn of(y: f64) -> Self {
        if y <= Y_RIGHT_MAX {
            Lane::Right
        } else if y <= Y_CENTER_MAX {
            Lane::Center
        } else {
            Lane::Left
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Lane::Right => "우측",
            Lane::Center => "중앙",
            Lane::Left => "좌측",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    DefenseGoalArea,
    Defense,
    MidDefense,
    MidAttack,
    Attack,
    AttackGoalArea,
}

impl Band {
    pub fn of(x: f64) -> Self {
        if x <= X_GOAL_AREA {
            Band::DefenseGoalArea
        } else if x <= X_DEFENSE {
            Band::Defense
        } else if x <= X_MID_DEFENSE {
            Band::MidDefense
        } else if x <= X_MID_ATTACK {
            Band::MidAttack
        } else if x <= X_ATTACK {
            Band::Attack
        } else {
            Band::AttackGoalArea
        }
    }

    /// Band name as seen from `lane`; the outer four bands read differently in
    /// the central lane.
    pub fn label(self, lane: Lane) -> &'static str {
        let center = lane == Lane::Center;
        match self {
            Band::DefenseGoalArea if center => "수비골대앞",
            Band::DefenseGoalArea => "수비코너라인부근",
            Band::Defense if center => "수비큰박스라인부근",
            Band::Defense => "수비지역",
            Band::MidDefense => "미들수비지역",
            Band::MidAttack => "미들공격지역",
            Band::Attack if center => "공격큰박스라인부근",
            Band::Attack => "공격지역",
            Band::AttackGoalArea if center => "공격골대앞",
            Band::AttackGoalArea => "공격코너라인부근",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "좌측_수비코너라인부근")]
    LeftDefenseCorner,
    #[serde(rename = "중앙_수비골대앞")]
    CenterDefenseGoalFront,
    #[serde(rename = "우측_수비코너라인부근")]
    RightDefenseCorner,
    #[serde(rename = "좌측_수비지역")]
    LeftDefense,
    #[serde(rename = "중앙_수비큰박스라인부근")]
    CenterDefenseBoxLine,
    #[serde(rename = "우측_수비지역")]
    RightDefense,
    #[serde(rename = "좌측_미들수비지역")]
    LeftMidDefense,
    #[serde(rename = "중앙_미들수비지역")]
    CenterMidDefense,
    #[serde(rename = "우측_미들수비지역")]
    RightMidDefense,
    #[serde(rename = "좌측_미들공격지역")]
    LeftMidAttack,
    #[serde(rename = "중앙_미들공격지역")]
    CenterMidAttack,
    #[serde(rename = "우측_미들공격지역")]
    RightMidAttack,
    #[serde(rename = "좌측_공격지역")]
    LeftAttack,
    #[serde(rename = "중앙_공격큰박스라인부근")]
    CenterAttackBoxLine,
    #[serde(rename = "우측_공격지역")]
    RightAttack,
    #[serde(rename = "좌측_공격코너라인부근")]
    LeftAttackCorner,
    #[serde(rename = "중앙_공격골대앞")]
    CenterAttackGoalFront,
    #[serde(rename = "우측_공격코너라인부근")]
    RightAttackCorner,
    #[serde(rename = "경기장외각")]
    OutOfBounds,
}

impl Zone {
    pub const ALL: [Zone; 19] = [
        Zone::LeftDefenseCorner,
        Zone::CenterDefenseGoalFront,
        Zone::RightDefenseCorner,
        Zone::LeftDefense,
        Zone::CenterDefenseBoxLine,
        Zone::RightDefense,
        Zone::LeftMidDefense,
        Zone::CenterMidDefense,
        Zone::RightMidDefense,
        Zone::LeftMidAttack,
        Zone::CenterMidAttack,
        Zone::RightMidAttack,
        Zone::LeftAttack,
        Zone::CenterAttackBoxLine,
        Zone::RightAttack,
        Zone::LeftAttackCorner,
        Zone::CenterAttackGoalFront,
        Zone::RightAttackCorner,
        Zone::OutOfBounds,
    ];

    pub fn from_grid(band: Band, lane: Lane) -> Self {
        match (band, lane) {
            (Band::DefenseGoalArea, Lane::Left) => Zone::LeftDefenseCorner,
            (Band::DefenseGoalArea, Lane::Center) => Zone::CenterDefenseGoalFront,
            (Band::DefenseGoalArea, Lane::Right) => Zone::RightDefenseCorner,
            (Band::Defense, Lane::Left) => Zone::LeftDefense,
            (Band::Defense, Lane::Center) => Zone::CenterDefenseBoxLine,
            (Band::Defense, Lane::Right) => Zone::RightDefense,
            (Band::MidDefense, Lane::Left) => Zone::LeftMidDefense,
            (Band::MidDefense, Lane::Center) => Zone::CenterMidDefense,
            (Band::MidDefense, Lane::Right) => Zone::RightMidDefense,
            (Band::MidAttack, Lane::Left) => Zone::LeftMidAttack,
            (Band::MidAttack, Lane::Center) => Zone::CenterMidAttack,
            (Band::MidAttack, Lane::Right) => Zone::RightMidAttack,
            (Band::Attack, Lane::Left) => Zone::LeftAttack,
            (Band::Attack, Lane::Center) => Zone::CenterAttackBoxLine,
            (Band::Attack, Lane::Right) => Zone::RightAttack,
            (Band::AttackGoalArea, Lane::Left) => Zone::LeftAttackCorner,
            (Band::AttackGoalArea, Lane::Center) => Zone::CenterAttackGoalFront,
            (Band::AttackGoalArea, Lane::Right) => Zone::RightAttackCorner,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Zone::LeftDefenseCorner => "좌측_수비코너라인부근",
            Zone::CenterDefenseGoalFront => "중앙_수비골대앞",
            Zone::RightDefenseCorner => "우측_수비코너라인부근",
            Zone::LeftDefense => "좌측_수비지역",
            Zone::CenterDefenseBoxLine => "중앙_수비큰박스라인부근",
            Zone::RightDefense => "우측_수비지역",
            Zone::LeftMidDefense => "좌측_미들수비지역",
            Zone::CenterMidDefense => "중앙_미들수비지역",
            Zone::RightMidDefense => "우측_미들수비지역",
            Zone::LeftMidAttack => "좌측_미들공격지역",
            Zone::CenterMidAttack => "중앙_미들공격지역",
            Zone::RightMidAttack => "우측_미들공격지역",
            Zone::LeftAttack => "좌측_공격지역",
            Zone::CenterAttackBoxLine => "중앙_공격큰박스라인부근",
            Zone::RightAttack => "우측_공격지역",
            Zone::LeftAttackCorner => "좌측_공격코너라인부근",
            Zone::CenterAttackGoalFront => "중앙_공격골대앞",
            Zone::RightAttackCorner => "우측_공격코너라인부근",
            Zone::OutOfBounds => "경기장외각",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|z| z.label() == label)
    }

    pub fn description(self) -> &'static str {
        match self {
            Zone::LeftDefenseCorner => "좌측 수비 코너 라인 부근 (자기 골대 근처)",
            Zone::CenterDefenseGoalFront => "중앙 수비 골대 앞 (자기 골대 정면)",
            Zone::RightDefenseCorner => "우측 수비 코너 라인 부근 (자기 골대 근처)",
            Zone::LeftDefense => "좌측 수비 지역",
            Zone::CenterDefenseBoxLine => "중앙 수비 큰 박스 라인 부근 (페널티 에어리어 경계)",
            Zone::RightDefense => "우측 수비 지역",
            Zone::LeftMidDefense => "좌측 미드필드 수비 지역",
            Zone::CenterMidDefense => "중앙 미드필드 수비 지역",
            Zone::RightMidDefense => "우측 미드필드 수비 지역",
            Zone::LeftMidAttack => "좌측 미드필드 공격 지역",
            Zone::CenterMidAttack => "중앙 미드필드 공격 지역",
            Zone::RightMidAttack => "우측 미드필드 공격 지역",
            Zone::LeftAttack => "좌측 공격 지역 (상대 진영)",
            Zone::CenterAttackBoxLine => {
                "중앙 공격 큰 박스 라인 부근 (상대 페널티 에어리어 경계)"
            }
            Zone::RightAttack => "우측 공격 지역 (상대 진영)",
            Zone::LeftAttackCorner => "좌측 공격 코너 라인 부근 (상대 골대 근처)",
            Zone::CenterAttackGoalFront => "중앙 공격 골대 앞 (상대 골대 정면, 슈팅 최적 위치)",
            Zone::RightAttackCorner => "우측 공격 코너 라인 부근 (상대 골대 근처)",
            Zone::OutOfBounds => "경기장 밖",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Description for an arbitrary zone label; unknown labels describe themselves.
pub fn describe(label: &str) -> String {
    Zone::parse(label)
        .map(|zone| zone.description().to_string())
        .unwrap_or_else(|| label.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneDetail {
    pub zone: Zone,
    pub description: &'static str,
    pub x_zone: Option<&'static str>,
    pub y_zone: Option<&'static str>,
    pub is_outside: bool,
    pub x_normalized: f64,
    pub y_normalized: f64,
}

pub fn classify(x: f64, y: f64) -> ZoneDetail {
    let x_normalized = clamp_unit(x);
    let y_normalized = clamp_unit(y);

    if is_outside(x, y) {
        return ZoneDetail {
            zone: Zone::OutOfBounds,
            description: Zone::OutOfBounds.description(),
            x_zone: None,
            y_zone: None,
            is_outside: true,
            x_normalized,
            y_normalized,
        };
    }

    let lane = Lane::of(y);
    let band = Band::of(x);
    let zone = Zone::from_grid(band, lane);
    ZoneDetail {
        zone,
        description: zone.description(),
        x_zone: Some(band.label(lane)),
        y_zone: Some(lane.label()),
        is_outside: false,
        x_normalized,
        y_normalized,
    }
}

pub fn zone_of(x: f64, y: f64) -> Zone {
    if is_outside(x, y) {
        Zone::OutOfBounds
    } else {
        Zone::from_grid(Band::of(x), Lane::of(y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PenaltyZone {
    #[serde(rename = "페널티박스내")]
    InsideBox,
    #[serde(rename = "페널티박스외곽")]
    AroundBox,
    #[serde(rename = "원거리")]
    LongRange,
    #[serde(rename = "경기장외각")]
    OutOfBounds,
}

impl PenaltyZone {
    pub fn label(self) -> &'static str {
        match self {
            PenaltyZone::InsideBox => "페널티박스내",
            PenaltyZone::AroundBox => "페널티박스외곽",
            PenaltyZone::LongRange => "원거리",
            PenaltyZone::OutOfBounds => "경기장외각",
        }
    }
}

impl fmt::Display for PenaltyZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse split against the opponent's penalty box, independent of [`Zone`].
pub fn penalty_zone(x: f64, y: f64) -> PenaltyZone {
    if is_outside(x, y) {
        PenaltyZone::OutOfBounds
    } else if x >= BOX_X_MIN && (BOX_Y_MIN..=BOX_Y_MAX).contains(&y) {
        PenaltyZone::InsideBox
    } else if x >= X_MID_ATTACK {
        PenaltyZone::AroundBox
    } else {
        PenaltyZone::LongRange
    }
}

// NaN fails both range checks, so it lands out of bounds.
fn is_outside(x: f64, y: f64) -> bool {
    !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y)
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}
