use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::http_client::{fetch_text, http_client};
use crate::state::StatsTable;

// Fixed leaguedashteamstats query; only the season varies.
const STATS_QUERY: &[(&str, &str)] = &[
    ("Conference", ""),
    ("DateFrom", ""),
    ("DateTo", ""),
    ("Division", ""),
    ("GameScope", ""),
    ("GameSegment", ""),
    ("LastNGames", "0"),
    ("LeagueID", "00"),
    ("Location", ""),
    ("MeasureType", "Base"),
    ("Month", "0"),
    ("OpponentTeamID", "0"),
    ("Outcome", ""),
    ("PORound", "0"),
    ("PaceAdjust", "N"),
    ("PerMode", "PerGame"),
    ("Period", "0"),
    ("PlayerExperience", ""),
    ("PlayerPosition", ""),
    ("PlusMinus", "N"),
    ("Rank", "N"),
    ("Season", ""),
    ("SeasonSegment", ""),
    ("SeasonType", "Regular+Season"),
    ("ShotClockRange", ""),
    ("StarterBench", ""),
    ("TeamID", "0"),
    ("TwoWay", "0"),
    ("VsConference", ""),
    ("VsDivision", ""),
];

const STATS_HEADERS: &[(&str, &str)] = &[
    ("Referer", "https://www.nba.com/"),
    ("Origin", "https://www.nba.com"),
    ("x-nba-stats-origin", "stats"),
    ("x-nba-stats-token", "true"),
    ("Accept-Language", "en-US,en;q=0.9"),
];

pub fn stats_url(cfg: &PipelineConfig) -> String {
    let query = STATS_QUERY
        .iter()
        .map(|(key, value)| {
            let value = if *key == "Season" {
                cfg.season.as_str()
            } else {
                value
            };
            format!("{key}={value}")
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{query}", cfg.stats_url)
}

pub fn fetch_team_stats(cfg: &PipelineConfig) -> Result<StatsTable> {
    let client = http_client(cfg.timeout_secs)?;
    let url = stats_url(cfg);
    let body = fetch_text(client, &url, STATS_HEADERS).context("team stats request failed")?;
    let table = parse_team_stats_json(&body)?;
    debug!(teams = table.rows.len(), columns = table.width(), "parsed team stats");
    Ok(table)
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(rename = "resultSets", default)]
    result_sets: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    #[serde(default)]
    headers: Vec<String>,
    #[serde(rename = "rowSet", default)]
    row_set: Vec<Vec<Value>>,
}

pub fn parse_team_stats_json(raw: &str) -> Result<StatsTable> {
    let data: StatsResponse =
        serde_json::from_str(raw.trim()).context("invalid team stats json")?;
    let set = data
        .result_sets
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("team stats response has no result sets"))?;

    let width = set.headers.len();
    if let Some((idx, row)) = set
        .row_set
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != width)
    {
        return Err(anyhow!(
            "team stats row {idx} has {} values, expected {width}",
            row.len()
        ));
    }

    Ok(StatsTable {
        headers: set.headers,
        rows: set.row_set,
    })
}
