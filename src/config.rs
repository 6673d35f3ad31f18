use std::env;
use std::path::PathBuf;

pub const DEFAULT_SCHEDULE_URL: &str =
    "https://data.nba.com/data/10s/v2015/json/mobile_teams/nba/2022/scores/00_todays_scores.json";
pub const DEFAULT_STATS_URL: &str = "https://stats.nba.com/stats/leaguedashteamstats";
pub const DEFAULT_SEASON: &str = "2022-23";
pub const DEFAULT_SBR_BASE_URL: &str = "https://www.sportsbookreview.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Data sources and runtime knobs for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub schedule_url: String,
    pub stats_url: String,
    pub season: String,
    pub sbr_base_url: String,
    pub timeout_secs: u64,
    pub model_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            schedule_url: DEFAULT_SCHEDULE_URL.to_string(),
            stats_url: DEFAULT_STATS_URL.to_string(),
            season: DEFAULT_SEASON.to_string(),
            sbr_base_url: DEFAULT_SBR_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            model_dir: PathBuf::from("models"),
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);

        Self {
            schedule_url: env_string("NBA_SCHEDULE_URL").unwrap_or(defaults.schedule_url),
            stats_url: env_string("NBA_STATS_URL").unwrap_or(defaults.stats_url),
            season: env_string("NBA_SEASON").unwrap_or(defaults.season),
            sbr_base_url: env_string("SBR_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.sbr_base_url),
            timeout_secs,
            model_dir: env_string("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_current_season_feeds() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.season, "2022-23");
        assert!(cfg.schedule_url.ends_with("00_todays_scores.json"));
        assert_eq!(cfg.timeout_secs, 10);
    }
}
