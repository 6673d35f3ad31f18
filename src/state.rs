use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Columns that identify a team rather than describe it.
pub const ID_COLUMNS: [&str; 2] = ["TEAM_ID", "TEAM_NAME"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GamePair {
    pub home: String,
    pub away: String,
}

impl GamePair {
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
        }
    }

    pub fn odds_key(&self) -> String {
        odds_key(&self.home, &self.away)
    }
}

impl fmt::Display for GamePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.home, self.away)
    }
}

pub fn odds_key(home: &str, away: &str) -> String {
    format!("{home}:{away}")
}

/// Lines for one game. Money lines are American odds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameOdds {
    pub under_over: f64,
    pub home_money_line: f64,
    pub away_money_line: f64,
}

/// Odds keyed by `"home:away"`.
pub type OddsBook = BTreeMap<String, GameOdds>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl StatsTable {
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn row(&self, offset: usize) -> Option<&[Value]> {
        self.rows.get(offset).map(Vec::as_slice)
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Stacked home+away rows, identifiers included.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl FeatureTable {
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UnknownHome,
    UnknownAway,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedGame {
    pub game: GamePair,
    pub reason: SkipReason,
}

/// Model-ready view of today's slate. Every per-game vector is index-aligned with `games`.
#[derive(Debug, Clone)]
pub struct AssembledGames {
    pub features: Vec<Vec<f64>>,
    pub under_over: Vec<f64>,
    pub table: FeatureTable,
    pub home_odds: Vec<f64>,
    pub away_odds: Vec<f64>,
    pub games: Vec<GamePair>,
    pub skipped: Vec<SkippedGame>,
}

impl AssembledGames {
    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn feature_width(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odds_key_is_home_then_away() {
        let game = GamePair::new("Los Angeles Lakers", "Boston Celtics");
        assert_eq!(game.odds_key(), "Los Angeles Lakers:Boston Celtics");
        assert_eq!(game.to_string(), "Los Angeles Lakers vs Boston Celtics");
    }

    #[test]
    fn stats_table_column_lookup() {
        let table = StatsTable {
            headers: vec!["TEAM_ID".into(), "TEAM_NAME".into(), "W".into()],
            rows: vec![],
        };
        assert_eq!(table.column("W"), Some(2));
        assert_eq!(table.column("L"), None);
        assert!(table.row(0).is_none());
    }
}
