use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::error::AssembleError;
use crate::odds_source::OddsSource;
use crate::state::{
    AssembledGames, FeatureTable, GamePair, ID_COLUMNS, SkipReason, SkippedGame, StatsTable,
};

/// Joins today's games with season stats into one feature row per game.
///
/// Games with a team missing from `index` are left out of every output and listed in
/// `skipped`. Odds are requested from `odds` once per retained game, in game order.
/// A run that retains no games fails with [`AssembleError::NoGames`].
pub fn assemble_todays_games(
    games: &[GamePair],
    stats: &StatsTable,
    index: &HashMap<&str, usize>,
    odds: &mut dyn OddsSource,
) -> Result<AssembledGames, AssembleError> {
    let mut match_rows: Vec<Vec<Value>> = Vec::new();
    let mut under_over = Vec::new();
    let mut home_odds = Vec::new();
    let mut away_odds = Vec::new();
    let mut kept = Vec::new();
    let mut skipped = Vec::new();

    for game in games {
        let (home_offset, away_offset) = match (
            index.get(game.home.as_str()),
            index.get(game.away.as_str()),
        ) {
            (Some(h), Some(a)) => (*h, *a),
            (None, _) => {
                debug!(game = %game, team = %game.home, "team not in index, skipping game");
                skipped.push(SkippedGame {
                    game: game.clone(),
                    reason: SkipReason::UnknownHome,
                });
                continue;
            }
            (_, None) => {
                debug!(game = %game, team = %game.away, "team not in index, skipping game");
                skipped.push(SkippedGame {
                    game: game.clone(),
                    reason: SkipReason::UnknownAway,
                });
                continue;
            }
        };

        let line = odds.odds_for(game)?;
        under_over.push(line.under_over);
        home_odds.push(line.home_money_line);
        away_odds.push(line.away_money_line);

        let home_row = stats_row(stats, &game.home, home_offset)?;
        let away_row = stats_row(stats, &game.away, away_offset)?;
        let mut row = Vec::with_capacity(home_row.len() + away_row.len());
        row.extend_from_slice(home_row);
        row.extend_from_slice(away_row);
        match_rows.push(row);
        kept.push(game.clone());
    }

    if match_rows.is_empty() {
        return Err(AssembleError::NoGames);
    }

    let mut columns = stats.headers.clone();
    columns.extend(stats.headers.iter().cloned());
    let table = FeatureTable {
        columns,
        rows: match_rows,
    };
    let features = numeric_matrix(&table)?;
    debug!(
        games = kept.len(),
        skipped = skipped.len(),
        width = features.first().map_or(0, Vec::len),
        "assembled feature rows"
    );

    Ok(AssembledGames {
        features,
        under_over,
        table,
        home_odds,
        away_odds,
        games: kept,
        skipped,
    })
}

fn stats_row<'a>(
    stats: &'a StatsTable,
    team: &str,
    offset: usize,
) -> Result<&'a [Value], AssembleError> {
    stats
        .row(offset)
        .ok_or_else(|| AssembleError::StatsRowMissing {
            team: team.to_string(),
            offset,
        })
}

/// Drops identifier columns and casts the rest to `f64`.
pub fn numeric_matrix(table: &FeatureTable) -> Result<Vec<Vec<f64>>, AssembleError> {
    let keep: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| !ID_COLUMNS.contains(&name.as_str()))
        .map(|(idx, _)| idx)
        .collect();

    table
        .rows
        .iter()
        .map(|row| {
            keep.iter()
                .map(|&idx| {
                    let value = row.get(idx).unwrap_or(&Value::Null);
                    cast_f64(value).ok_or_else(|| AssembleError::NonNumeric {
                        column: table.columns[idx].clone(),
                        value: value.to_string(),
                    })
                })
                .collect()
        })
        .collect()
}

fn cast_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
