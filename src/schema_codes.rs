const SHOT_TYPES: [(i64, &str, &str); 12] = [
    (1, "normal", "일반 슛"),
    (2, "finesse", "감아차기"),
    (3, "header", "헤딩"),
    (4, "lob", "로빙슛"),
    (5, "flare", "플레어슛"),
    (6, "low", "낮은 슛"),
    (7, "volley", "발리"),
    (8, "free-kick", "프리킥"),
    (9, "penalty", "페널티킥"),
    (10, "knuckle", "무회전슛"),
    (11, "bicycle", "바이시클킥"),
    (12, "super", "파워샷"),
];

const SHOT_RESULTS: [(i64, &str); 3] = [(1, "유효슈팅"), (2, "빗나감"), (3, "골")];

const MATCH_END_TYPES: [(i64, &str); 3] = [(0, "정상종료"), (1, "몰수승"), (2, "몰수패")];

const CONTROLLERS: [(&str, &str); 3] = [("keyboard", "키보드"), ("pad", "패드"), ("etc", "기타")];

pub const UNKNOWN_LABEL: &str = "알수없음";

pub const SHOT_RESULT_ON_TARGET: i64 = 1;
pub const SHOT_RESULT_OFF_TARGET: i64 = 2;
pub const SHOT_RESULT_GOAL: i64 = 3;

pub fn shot_type_slug(code: i64) -> &'static str {
    SHOT_TYPES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, slug, _)| *slug)
        .unwrap_or("normal")
}

pub fn shot_type_korean(code: i64) -> &'static str {
    SHOT_TYPES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, _, korean)| *korean)
        .unwrap_or("일반 슛")
}

pub fn shot_result_name(code: i64) -> &'static str {
    lookup(&SHOT_RESULTS, code)
}

pub fn match_end_type_name(code: i64) -> &'static str {
    lookup(&MATCH_END_TYPES, code)
}

/// Controller names pass through unchanged when the vendor adds a new one.
pub fn controller_name(code: &str) -> String {
    CONTROLLERS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

pub fn is_goal(result_code: i64) -> bool {
    result_code == SHOT_RESULT_GOAL
}

pub fn is_on_target(result_code: i64) -> bool {
    matches!(result_code, SHOT_RESULT_ON_TARGET | SHOT_RESULT_GOAL)
}

fn lookup(table: &[(i64, &'static str)], code: i64) -> &'static str {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN_LABEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shot_types_cover_all_codes() {
        let slugs: Vec<&str> = (1..=12).map(shot_type_slug).collect();
        assert_eq!(slugs[2], "header");
        assert_eq!(slugs[7], "free-kick");
        assert_eq!(shot_type_korean(10), "무회전슛");
        assert_eq!(shot_type_slug(0), "normal");
        assert_eq!(shot_type_korean(99), "일반 슛");
    }

    #[test]
    fn unknown_codes_use_fallback_labels() {
        assert_eq!(shot_result_name(3), "골");
        assert_eq!(shot_result_name(7), "알수없음");
        assert_eq!(match_end_type_name(1), "몰수승");
        assert_eq!(match_end_type_name(-1), "알수없음");
        assert_eq!(controller_name("pad"), "패드");
        assert_eq!(controller_name("wheel"), "wheel");
    }

    #[test]
    fn result_flags() {
        assert!(is_goal(3));
        assert!(!is_goal(1));
        assert!(is_on_target(1));
        assert!(is_on_target(3));
        assert!(!is_on_target(2));
    }
}
