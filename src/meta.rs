use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

const SEASON_FACTOR: i64 = 1_000_000;
const UNKNOWN_PREFIX: &str = "Unknown(";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKind {
    Player,
    Season,
    MatchType,
    Division,
    Position,
}

impl MetaKind {
    pub const ALL: [MetaKind; 5] = [
        MetaKind::Player,
        MetaKind::Season,
        MetaKind::MatchType,
        MetaKind::Division,
        MetaKind::Position,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            MetaKind::Player => "spid.json",
            MetaKind::Season => "seasonid.json",
            MetaKind::MatchType => "matchtype.json",
            MetaKind::Division => "division.json",
            MetaKind::Position => "spposition.json",
        }
    }

    /// Id keys in precedence order; the vendor is not consistent across files.
    pub fn id_keys(self) -> &'static [&'static str] {
        match self {
            MetaKind::Player => &["id"],
            MetaKind::Season => &["seasonId", "id"],
            MetaKind::MatchType => &["matchtype", "id"],
            MetaKind::Division => &["divisionId", "id"],
            MetaKind::Position => &["spposition", "id"],
        }
    }

    pub fn name_keys(self) -> &'static [&'static str] {
        match self {
            MetaKind::Player => &["name"],
            MetaKind::Season => &["className", "name"],
            MetaKind::MatchType => &["desc", "name"],
            MetaKind::Division => &["divisionName", "name"],
            MetaKind::Position => &["desc", "name"],
        }
    }
}

impl fmt::Display for MetaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Combined season + player identifier (`season_id * 1_000_000 + player_id`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SpId(pub i64);

impl SpId {
    pub fn from_parts(season_id: i64, player_id: i64) -> Self {
        Self(season_id * SEASON_FACTOR + player_id)
    }

    pub fn season_id(self) -> i64 {
        self.0 / SEASON_FACTOR
    }

    pub fn player_id(self) -> i64 {
        self.0 % SEASON_FACTOR
    }

    pub fn decompose(self) -> (i64, i64) {
        (self.season_id(), self.player_id())
    }

    /// `0` and negative ids mark "no player" (e.g. an unassisted goal).
    pub fn is_player(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for SpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn unknown_name(code: impl fmt::Display) -> String {
    format!("{UNKNOWN_PREFIX}{code})")
}

pub fn is_unknown_name(name: &str) -> bool {
    name.starts_with(UNKNOWN_PREFIX) && name.ends_with(')')
}

#[derive(Debug, Clone, Default)]
pub struct MetaTables {
    player: HashMap<i64, String>,
    season: HashMap<i64, String>,
    match_type: HashMap<i64, String>,
    division: HashMap<i64, String>,
    position: HashMap<i64, String>,
}

impl MetaTables {
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut tables = Self::default();
        for kind in MetaKind::ALL {
            let path = dir.join(kind.file_name());
            if !path.exists() {
                warn!(file = %path.display(), "metadata file missing; lookups will be unknown");
                continue;
            }
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("read metadata {}", path.display()))?;
            let table = parse_table(kind, &raw)
                .with_context(|| format!("parse metadata {}", path.display()))?;
            debug!(table = %kind, entries = table.len(), "loaded metadata table");
            *tables.table_mut(kind) = table;
        }
        Ok(tables)
    }

    pub fn with_entries<I, S>(mut self, kind: MetaKind, entries: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        self.table_mut(kind)
            .extend(entries.into_iter().map(|(id, name)| (id, name.into())));
        self
    }

    pub fn table(&self, kind: MetaKind) -> &HashMap<i64, String> {
        match kind {
            MetaKind::Player => &self.player,
            MetaKind::Season => &self.season,
            MetaKind::MatchType => &self.match_type,
            MetaKind::Division => &self.division,
            MetaKind::Position => &self.position,
        }
    }

    fn table_mut(&mut self, kind: MetaKind) -> &mut HashMap<i64, String> {
        match kind {
            MetaKind::Player => &mut self.player,
            MetaKind::Season => &mut self.season,
            MetaKind::MatchType => &mut self.match_type,
            MetaKind::Division => &mut self.division,
            MetaKind::Position => &mut self.position,
        }
    }

    pub fn resolve(&self, kind: MetaKind, code: i64) -> String {
        self.table(kind)
            .get(&code)
            .cloned()
            .unwrap_or_else(|| unknown_name(code))
    }

    /// The player table is keyed by the full combined id, so no decomposition
    /// happens before the lookup.
    pub fn player_name(&self, sp_id: SpId) -> String {
        self.resolve(MetaKind::Player, sp_id.0)
    }

    pub fn season_name(&self, season_id: i64) -> String {
        self.resolve(MetaKind::Season, season_id)
    }

    pub fn match_type_name(&self, match_type: i64) -> String {
        self.resolve(MetaKind::MatchType, match_type)
    }

    pub fn division_name(&self, division_id: i64) -> String {
        self.resolve(MetaKind::Division, division_id)
    }

    pub fn position_name(&self, position: i64) -> String {
        self.resolve(MetaKind::Position, position)
    }
}

pub fn parse_table(kind: MetaKind, raw: &str) -> Result<HashMap<i64, String>> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid metadata json")?;
    let Some(items) = root.as_array() else {
        return Err(anyhow!("{kind}: expected a json array"));
    };
    Ok(table_from_values(kind, items))
}

pub fn table_from_values(kind: MetaKind, items: &[Value]) -> HashMap<i64, String> {
    let mut out = HashMap::with_capacity(items.len());
    let mut skipped = 0usize;
    for item in items {
        let Some(id) = pick_id(item, kind.id_keys()) else {
            skipped += 1;
            continue;
        };
        let name = pick_string(item, kind.name_keys()).unwrap_or_default();
        out.insert(id, name);
    }
    if skipped > 0 {
        debug!(table = %kind, skipped, "metadata entries without a usable id");
    }
    out
}

fn pick_id(value: &Value, keys: &[&str]) -> Option<i64> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(num) = v.as_i64() {
                return Some(num);
            }
            if let Some(num) = v.as_str().and_then(|s| s.trim().parse::<i64>().ok()) {
                return Some(num);
            }
        }
    }
    None
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
