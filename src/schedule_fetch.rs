use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::http_client::{fetch_text, http_client};
use crate::state::GamePair;

pub fn fetch_todays_games(cfg: &PipelineConfig) -> Result<Vec<GamePair>> {
    let client = http_client(cfg.timeout_secs)?;
    let body = fetch_text(client, &cfg.schedule_url, &[]).context("schedule request failed")?;
    let games = parse_todays_games_json(&body)?;
    debug!(games = games.len(), "parsed schedule");
    Ok(games)
}

#[derive(Debug, Deserialize)]
struct ScoresResponse {
    gs: Option<ScoresDay>,
}

#[derive(Debug, Deserialize)]
struct ScoresDay {
    #[serde(default)]
    g: Vec<ScoresGame>,
}

#[derive(Debug, Deserialize)]
struct ScoresGame {
    h: ScoresTeam,
    v: ScoresTeam,
}

#[derive(Debug, Deserialize)]
struct ScoresTeam {
    #[serde(default)]
    tc: String,
    #[serde(default)]
    tn: String,
}

impl ScoresTeam {
    fn display_name(&self) -> String {
        format!("{} {}", self.tc.trim(), self.tn.trim())
            .trim()
            .to_string()
    }
}

pub fn parse_todays_games_json(raw: &str) -> Result<Vec<GamePair>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let data: ScoresResponse = serde_json::from_str(trimmed).context("invalid schedule json")?;
    let Some(day) = data.gs else {
        return Ok(Vec::new());
    };

    Ok(day
        .g
        .iter()
        .map(|game| GamePair::new(game.h.display_name(), game.v.display_name()))
        .collect())
}
