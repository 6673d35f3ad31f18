use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use nba_picks::features::assemble_todays_games;
use nba_picks::odds_source::BookOdds;
use nba_picks::schedule_fetch::parse_todays_games_json;
use nba_picks::state::OddsBook;
use nba_picks::stats_fetch::parse_team_stats_json;
use nba_picks::team_index::team_index;

/// Assembles saved schedule/stats/odds payloads without touching the network, to check
/// the team index against a new season's feeds.
#[derive(Debug, Parser)]
#[command(name = "assemble_offline")]
struct Args {
    /// Saved todays-scores JSON
    #[arg(long, value_name = "FILE")]
    schedule: PathBuf,

    /// Saved leaguedashteamstats JSON
    #[arg(long, value_name = "FILE")]
    stats: PathBuf,

    /// Odds book JSON keyed by "home:away"
    #[arg(long, value_name = "FILE")]
    odds: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let games = parse_todays_games_json(&read(&args.schedule)?)?;
    let table = parse_team_stats_json(&read(&args.stats)?)?;
    let book: OddsBook =
        serde_json::from_str(&read(&args.odds)?).context("invalid odds book json")?;

    let assembled = assemble_todays_games(&games, &table, team_index(), &mut BookOdds::new(&book))
        .context("assembly failed")?;

    println!("Games: {}", assembled.len());
    println!("Feature width: {}", assembled.feature_width());
    for (game, line) in assembled.games.iter().zip(&assembled.under_over) {
        println!("  {game} (O/U {line})");
    }
    if !assembled.skipped.is_empty() {
        println!("Skipped: {}", assembled.skipped.len());
        for skip in &assembled.skipped {
            println!("   - {} ({:?})", skip.game, skip.reason);
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_three_inputs_are_required() {
        let args = Args::try_parse_from([
            "assemble_offline", "--schedule", "s.json", "--stats", "t.json", "--odds=o.json",
        ])
        .expect("valid args");
        assert_eq!(args.odds, PathBuf::from("o.json"));
        assert!(Args::try_parse_from(["assemble_offline", "--schedule", "s.json"]).is_err());
    }
}
