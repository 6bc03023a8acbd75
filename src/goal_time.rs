use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// raw = period_index * 2^24 + seconds_into_period. Seconds restart every
// period, so the period's elapsed match time is added back on decode.
pub const PERIOD_BASE: i64 = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "전반")]
    FirstHalf,
    #[serde(rename = "후반")]
    SecondHalf,
    #[serde(rename = "연장전반")]
    ExtraFirst,
    #[serde(rename = "연장후반")]
    ExtraSecond,
    #[serde(rename = "승부차기")]
    Penalties,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::FirstHalf,
        Period::SecondHalf,
        Period::ExtraFirst,
        Period::ExtraSecond,
        Period::Penalties,
    ];

    pub fn index(self) -> i64 {
        match self {
            Period::FirstHalf => 0,
            Period::SecondHalf => 1,
            Period::ExtraFirst => 2,
            Period::ExtraSecond => 3,
            Period::Penalties => 4,
        }
    }

    pub fn from_index(idx: i64) -> Option<Self> {
        usize::try_from(idx)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::FirstHalf => "전반",
            Period::SecondHalf => "후반",
            Period::ExtraFirst => "연장전반",
            Period::ExtraSecond => "연장후반",
            Period::Penalties => "승부차기",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label.trim())
    }

    /// Match seconds already played when this period starts.
    pub fn elapsed_seconds(self) -> i64 {
        match self {
            Period::FirstHalf => 0,
            Period::SecondHalf => 45 * 60,
            Period::ExtraFirst => 90 * 60,
            Period::ExtraSecond => 105 * 60,
            Period::Penalties => 120 * 60,
        }
    }

    /// First raw value belonging to this period.
    pub fn base(self) -> i64 {
        self.index() * PERIOD_BASE
    }

    pub fn is_extra_time(self) -> bool {
        matches!(self, Period::ExtraFirst | Period::ExtraSecond)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalTime {
    pub raw: i64,
    pub period: Period,
    /// Seconds since the start of `period`.
    pub seconds: i64,
    pub total_seconds: i64,
    /// Match-wide minute, e.g. 45 for the first second of the second half.
    pub minute: i64,
    pub display: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GoalTimeError {
    #[error("goal time {0} is negative")]
    Negative(i64),
    #[error("goal time {0} lies beyond the penalties period")]
    OutOfRange(i64),
}

/// Decode a packed goal time.
///
/// Anything at or above the penalties base is reported as penalties with the
/// offset measured from that base, so values past `5 * 2^24` never wrap back
/// into an earlier period. Negative input is read as kick-off.
pub fn decode(raw: i64) -> GoalTime {
    let packed = raw.max(0);
    let period = Period::from_index(packed / PERIOD_BASE).unwrap_or(Period::Penalties);
    let seconds = packed - period.base();
    let total_seconds = seconds + period.elapsed_seconds();
    let minute = total_seconds / 60;
    GoalTime {
        raw,
        period,
        seconds,
        total_seconds,
        minute,
        display: format!("{} {}분", period.label(), minute),
    }
}

/// Like [`decode`], but rejects values outside the five defined periods.
pub fn decode_strict(raw: i64) -> Result<GoalTime, GoalTimeError> {
    if raw < 0 {
        return Err(GoalTimeError::Negative(raw));
    }
    if raw >= Period::ALL.len() as i64 * PERIOD_BASE {
        return Err(GoalTimeError::OutOfRange(raw));
    }
    Ok(decode(raw))
}

/// Inverse of [`decode`] for a match-wide minute inside `period`.
pub fn encode(period: Period, total_minute: i64) -> i64 {
    period.base() + (total_minute * 60 - period.elapsed_seconds())
}

/// Coarse display bucket used by the gold reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "0-15분")]
    Opening,
    #[serde(rename = "16-30분")]
    FirstHalfMiddle,
    #[serde(rename = "31-45분")]
    FirstHalfEnd,
    #[serde(rename = "46-60분")]
    SecondHalfOpening,
    #[serde(rename = "61-75분")]
    SecondHalfMiddle,
    #[serde(rename = "76-90분")]
    Closing,
    #[serde(rename = "연장전")]
    ExtraTime,
    #[serde(rename = "승부차기")]
    Shootout,
}

impl TimeRange {
    pub const ALL: [TimeRange; 8] = [
        TimeRange::Opening,
        TimeRange::FirstHalfMiddle,
        TimeRange::FirstHalfEnd,
        TimeRange::SecondHalfOpening,
        TimeRange::SecondHalfMiddle,
        TimeRange::Closing,
        TimeRange::ExtraTime,
        TimeRange::Shootout,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::Opening => "0-15분",
            TimeRange::FirstHalfMiddle => "16-30분",
            TimeRange::FirstHalfEnd => "31-45분",
            TimeRange::SecondHalfOpening => "46-60분",
            TimeRange::SecondHalfMiddle => "61-75분",
            TimeRange::Closing => "76-90분",
            TimeRange::ExtraTime => "연장전",
            TimeRange::Shootout => "승부차기",
        }
    }

    pub fn from_raw(raw: i64) -> Self {
        time_range(&decode(raw))
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn time_range(time: &GoalTime) -> TimeRange {
    match time.period {
        Period::Penalties => TimeRange::Shootout,
        Period::ExtraFirst | Period::ExtraSecond => TimeRange::ExtraTime,
        Period::FirstHalf | Period::SecondHalf => match time.minute {
            m if m <= 15 => TimeRange::Opening,
            m if m <= 30 => TimeRange::FirstHalfMiddle,
            m if m <= 45 => TimeRange::FirstHalfEnd,
            m if m <= 60 => TimeRange::SecondHalfOpening,
            m if m <= 75 => TimeRange::SecondHalfMiddle,
            _ => TimeRange::Closing,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minute_span(period: Period) -> std::ops::Range<i64> {
        let start = period.elapsed_seconds() / 60;
        start..start + 40
    }

    #[test]
    fn round_trips_every_period() {
        for period in Period::ALL {
            for minute in minute_span(period) {
                let decoded = decode(encode(period, minute));
                assert_eq!(decoded.period, period, "minute {minute}");
                assert_eq!(decoded.minute, minute);
            }
        }
    }

    #[test]
    fn second_half_kickoff() {
        let t = decode(PERIOD_BASE);
        assert_eq!(t.period, Period::SecondHalf);
        assert_eq!(t.seconds, 0);
        assert_eq!(t.total_seconds, 2700);
        assert_eq!(t.minute, 45);
        assert_eq!(t.display, "후반 45분");
    }

    #[test]
    fn plain_seconds_stay_in_first_half() {
        let t = decode(2700);
        assert_eq!(t.period, Period::FirstHalf);
        assert_eq!(t.display, "전반 45분");
    }

    #[test]
    fn decoded_seconds_are_monotonic() {
        let raws: Vec<i64> = Period::ALL
            .iter()
            .flat_map(|p| [p.base(), p.base() + 59, p.base() + 600, p.base() + 899])
            .collect();
        for pair in raws.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(decode(pair[0]).total_seconds <= decode(pair[1]).total_seconds);
        }
    }

    #[test]
    fn values_past_penalties_do_not_wrap() {
        let raw = 5 * PERIOD_BASE + 30;
        let t = decode(raw);
        assert_eq!(t.period, Period::Penalties);
        assert_eq!(t.seconds, PERIOD_BASE + 30);
        assert_eq!(decode_strict(raw), Err(GoalTimeError::OutOfRange(raw)));
        assert_eq!(decode_strict(-1), Err(GoalTimeError::Negative(-1)));
        assert!(decode_strict(4 * PERIOD_BASE).is_ok());
    }

    #[test]
    fn negative_reads_as_kickoff() {
        let t = decode(-5);
        assert_eq!(t.raw, -5);
        assert_eq!(t.period, Period::FirstHalf);
        assert_eq!(t.total_seconds, 0);
    }

    #[test]
    fn buckets_by_match_minute() {
        assert_eq!(time_range(&decode(0)), TimeRange::Opening);
        assert_eq!(time_range(&decode(15 * 60 + 59)), TimeRange::Opening);
        assert_eq!(time_range(&decode(16 * 60)), TimeRange::FirstHalfMiddle);
        assert_eq!(time_range(&decode(45 * 60 + 30)), TimeRange::FirstHalfEnd);
        assert_eq!(TimeRange::from_raw(PERIOD_BASE), TimeRange::FirstHalfEnd);
        assert_eq!(TimeRange::from_raw(PERIOD_BASE + 60), TimeRange::SecondHalfOpening);
        assert_eq!(TimeRange::from_raw(encode(Period::SecondHalf, 75)), TimeRange::SecondHalfMiddle);
        assert_eq!(TimeRange::from_raw(encode(Period::SecondHalf, 97)), TimeRange::Closing);
        assert_eq!(TimeRange::from_raw(encode(Period::ExtraFirst, 95)), TimeRange::ExtraTime);
        assert_eq!(TimeRange::from_raw(encode(Period::ExtraSecond, 110)), TimeRange::ExtraTime);
        assert_eq!(TimeRange::from_raw(encode(Period::Penalties, 120)), TimeRange::Shootout);
    }

    #[test]
    fn serializes_korean_labels() {
        let json = serde_json::to_string(&Period::SecondHalf).unwrap();
        assert_eq!(json, "\"후반\"");
        let json = serde_json::to_string(&TimeRange::ExtraTime).unwrap();
        assert_eq!(json, "\"연장전\"");
        assert_eq!(Period::parse("연장후반"), Some(Period::ExtraSecond));
        assert_eq!(Period::parse("하프타임"), None);
    }
}
