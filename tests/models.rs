use std::fs;
use std::path::PathBuf;

use nba_picks::features::assemble_todays_games;
use nba_picks::odds_source::BookOdds;
use nba_picks::predict::{ModelKind, ModelSet, OuPick, render_text, run_models};
use nba_picks::schedule_fetch::parse_todays_games_json;
use nba_picks::state::{AssembledGames, OddsBook};
use nba_picks::stats_fetch::parse_team_stats_json;
use nba_picks::team_index::team_index;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture file should be readable")
}

fn assembled_slate() -> AssembledGames {
    let games = parse_todays_games_json(&read_fixture("todays_scores.json")).expect("parses");
    let stats = parse_team_stats_json(&read_fixture("team_stats.json")).expect("parses");
    let book: OddsBook = serde_json::from_str(&read_fixture("odds_book.json")).expect("book");
    assemble_todays_games(&games, &stats, team_index(), &mut BookOdds::new(&book))
        .expect("fixture slate assembles")
}

#[test]
fn tree_models_pick_winners_and_totals() {
    let slate = assembled_slate();
    let models = ModelSet::load(&fixture_path("models"), ModelKind::Xgb).expect("models load");
    let preds = run_models(&models, &slate).expect("widths match");

    assert_eq!(preds.len(), 2);
    // Lakers (+2.8) at Celtics (-1.8): the away side is favoured.
    assert_eq!(preds[0].winner, "Los Angeles Lakers");
    assert!(!preds[0].home_wins);
    assert_eq!(preds[0].winner_confidence, 80.2);
    assert!((preds[0].home_prob + preds[0].away_prob - 1.0).abs() < 1e-9);
    // 229.5 is above the split, 221 below.
    assert_eq!(preds[0].under_over, OuPick::Under);
    assert_eq!(preds[0].ou_line, 229.5);
    assert_eq!(preds[1].under_over, OuPick::Over);
}

#[test]
fn network_models_run_on_normalized_rows() {
    let slate = assembled_slate();
    let models = ModelSet::load(&fixture_path("models"), ModelKind::Nn).expect("models load");
    let preds = run_models(&models, &slate).expect("widths match");

    assert_eq!(preds.len(), 2);
    // More wins for the away side in both games.
    assert_eq!(preds[0].winner, "Los Angeles Lakers");
    assert_eq!(preds[1].winner, "Dallas Mavericks");
    assert!(preds.iter().all(|p| p.winner_confidence > 50.0 && p.winner_confidence < 100.0));
    assert_eq!(preds[0].under_over, OuPick::Under);
}

#[test]
fn expected_value_uses_the_aligned_money_lines() {
    let slate = assembled_slate();
    let models = ModelSet::load(&fixture_path("models"), ModelKind::Xgb).expect("models load");
    let preds = run_models(&models, &slate).expect("widths match");

    let p = &preds[0];
    let expected_home = p.home_prob * (100.0 / 210.0 * 100.0) - (1.0 - p.home_prob) * 100.0;
    assert!((p.home_ev - expected_home).abs() < 0.01);
    let expected_away = p.away_prob * 175.0 - (1.0 - p.away_prob) * 100.0;
    assert!((p.away_ev - expected_away).abs() < 0.01);
    assert!(p.away_kelly > 0.0);
    assert_eq!(p.home_kelly, 0.0);
}

#[test]
fn text_output_lists_every_game_and_ev_block() {
    let slate = assembled_slate();
    let models = ModelSet::load(&fixture_path("models"), ModelKind::Xgb).expect("models load");
    let preds = run_models(&models, &slate).expect("widths match");

    let mut out = Vec::new();
    render_text(&mut out, &preds).expect("write to vec");
    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains("Boston Celtics"));
    assert!(text.contains("Dallas Mavericks"));
    assert!(text.contains("UNDER"));
    assert!(text.contains("Expected Value & Kelly Criterion"));
    assert_eq!(text.matches(" EV: ").count(), 4);
}

#[test]
fn missing_model_directory_is_a_read_error() {
    let err = ModelSet::load(&fixture_path("no_such_models"), ModelKind::Nn)
        .err()
        .expect("nothing to load");
    assert!(err.to_string().contains("ml.json"));
}
