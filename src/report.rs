use std::collections::BTreeMap;
use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use crate::predict::{GamePrediction, ModelKind};
use crate::state::{OddsBook, SkippedGame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamLine {
    pub name: String,
    pub money_line_odds: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OddsEntry {
    pub away_team: TeamLine,
    pub home_team: TeamLine,
    pub under_over_odds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// JSON envelope for `--format json`.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub date: String,
    pub sport: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odds_source: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub odds_data: Vec<OddsEntry>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub predictions: BTreeMap<String, Vec<GamePrediction>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedGame>,
    pub warnings: Vec<String>,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Report {
    pub fn new(date: &str, sport: &str) -> Self {
        Self {
            date: date.to_string(),
            sport: sport.to_string(),
            odds_source: None,
            odds_data: Vec::new(),
            predictions: BTreeMap::new(),
            skipped: Vec::new(),
            warnings: Vec::new(),
            status: Status::Ok,
            error: None,
        }
    }

    pub fn fail(&mut self, message: &str) {
        self.status = Status::Error;
        self.error = Some(message.to_string());
    }

    pub fn add_predictions(&mut self, kind: ModelKind, predictions: Vec<GamePrediction>) {
        let key = match kind {
            ModelKind::Nn => "nn",
            ModelKind::Xgb => "xgb",
        };
        self.predictions.insert(key.to_string(), predictions);
    }
}

pub fn odds_entries(book: &OddsBook) -> Vec<OddsEntry> {
    book.iter()
        .filter_map(|(key, odds)| {
            let (home, away) = key.split_once(':')?;
            Some(OddsEntry {
                away_team: TeamLine {
                    name: away.to_string(),
                    money_line_odds: odds.away_money_line,
                },
                home_team: TeamLine {
                    name: home.to_string(),
                    money_line_odds: odds.home_money_line,
                },
                under_over_odds: odds.under_over,
            })
        })
        .collect()
}

/// `Away (ml) @ Home (ml)`, one line per game.
pub fn render_odds_board<W: Write>(out: &mut W, sportsbook: &str, book: &OddsBook) -> io::Result<()> {
    writeln!(out, "------------------{sportsbook} odds data------------------")?;
    for entry in odds_entries(book) {
        writeln!(
            out,
            "{} ({}) @ {} ({})",
            entry.away_team.name,
            entry.away_team.money_line_odds,
            entry.home_team.name,
            entry.home_team.money_line_odds
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GameOdds;

    fn book() -> OddsBook {
        let mut book = OddsBook::new();
        book.insert(
            "Boston Celtics:Miami Heat".to_string(),
            GameOdds {
                under_over: 214.5,
                home_money_line: -180.0,
                away_money_line: 155.0,
            },
        );
        book
    }

    #[test]
    fn board_prints_away_at_home() {
        let mut out = Vec::new();
        render_odds_board(&mut out, "fanduel", &book()).expect("write to vec");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Miami Heat (155) @ Boston Celtics (-180)"));
    }

    #[test]
    fn envelope_omits_empty_sections() {
        let mut report = Report::new("2023-01-10", "NBA");
        let json = serde_json::to_value(&report).expect("serializes");
        assert_eq!(json["status"], "ok");
        assert!(json.get("odds_data").is_none());
        assert!(json.get("error").is_none());
        assert_eq!(json["warnings"], serde_json::json!([]));

        report.odds_data = odds_entries(&book());
        report.fail("no games found");
        let json = serde_json::to_value(&report).expect("serializes");
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "no games found");
        assert_eq!(json["odds_data"][0]["home_team"]["money_line_odds"], -180.0);
    }
}
