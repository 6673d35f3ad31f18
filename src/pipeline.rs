use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use crossterm::style::{Stylize, style};
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::features::assemble_todays_games;
use crate::odds_fetch::{SbrOddsProvider, Sport, games_from_odds};
use crate::odds_source::{BookOdds, OddsSource, PromptOdds};
use crate::predict::{ModelKind, ModelSet, render_text, run_models};
use crate::report::{OutputFormat, Report, odds_entries, render_odds_board};
use crate::schedule_fetch::fetch_todays_games;
use crate::state::{GamePair, OddsBook, StatsTable};
use crate::stats_fetch::fetch_team_stats;
use crate::team_index::{team_index, team_offset};

pub const STALE_GAMES_WARNING: &str =
    "Games list not up to date for todays games. Scraping disabled until list is updated";

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub models: Vec<ModelKind>,
    pub sportsbook: Option<String>,
    pub date: NaiveDate,
    pub sport: Sport,
    pub format: OutputFormat,
}

/// Games, optional scraped book and stats for one run, fetched and ready to assemble.
pub struct Slate {
    pub games: Vec<GamePair>,
    pub book: Option<OddsBook>,
    pub stats: StatsTable,
}

/// One full run: games, odds, stats, assembly, then each requested model.
pub fn run<W: Write>(cfg: &PipelineConfig, opts: &RunOptions, out: &mut W) -> Result<Report> {
    let text = opts.format == OutputFormat::Text;
    let mut report = Report::new(&opts.date.format("%Y-%m-%d").to_string(), opts.sport.code());

    let (games, book) = match opts.sportsbook.as_deref() {
        Some(sportsbook) => {
            report.odds_source = Some(sportsbook.to_string());
            let provider = SbrOddsProvider::new(
                &cfg.sbr_base_url,
                sportsbook,
                opts.date,
                opts.sport,
                cfg.timeout_secs,
            )?;
            let scraped = provider.get_odds()?;
            match screen_scraped(scraped, &mut report, out, text, sportsbook)? {
                Some(found) => found,
                None => return Ok(report),
            }
        }
        None => (fetch_todays_games(cfg)?, None),
    };
    info!(games = games.len(), date = %report.date, "loaded schedule");

    let slate = Slate {
        games,
        book,
        stats: fetch_team_stats(cfg)?,
    };
    // Keep stdout clean for the JSON report.
    let prompt_out: Box<dyn Write> = if text {
        Box::new(io::stdout())
    } else {
        Box::new(io::stderr())
    };
    let mut prompts = PromptOdds::stdin(prompt_out);
    run_slate(cfg, opts, &slate, &mut prompts, &mut report, out)?;
    Ok(report)
}

/// Everything after the network: assembly, then each requested model. `prompts` is asked
/// for lines only when the slate has no book.
pub fn run_slate<W: Write>(
    cfg: &PipelineConfig,
    opts: &RunOptions,
    slate: &Slate,
    prompts: &mut dyn OddsSource,
    report: &mut Report,
    out: &mut W,
) -> Result<()> {
    let text = opts.format == OutputFormat::Text;
    let assembled = match slate.book.as_ref() {
        Some(book) => assemble_todays_games(
            &slate.games,
            &slate.stats,
            team_index(),
            &mut BookOdds::new(book),
        ),
        None => assemble_todays_games(&slate.games, &slate.stats, team_index(), prompts),
    }
    .context("failed to assemble todays games")?;
    report.skipped = assembled.skipped.clone();

    if opts.models.is_empty() && text {
        writeln!(
            out,
            "Assembled {} games ({} features each), {} skipped",
            assembled.len(),
            assembled.feature_width(),
            assembled.skipped.len()
        )?;
        for game in &assembled.games {
            writeln!(out, "{} @ {}", game.away, game.home)?;
        }
    }

    for kind in &opts.models {
        let models = ModelSet::load(&cfg.model_dir, *kind)
            .with_context(|| format!("failed to load {kind:?} models"))?;
        let predictions = run_models(&models, &assembled)?;
        if text {
            writeln!(out, "{}", kind.banner())?;
            render_text(out, &predictions)?;
            writeln!(out, "-------------------------------------------------------")?;
        }
        report.add_predictions(*kind, predictions);
    }
    Ok(())
}

// An empty board ends the run with an error status; otherwise the board is screened
// against the team index.
fn screen_scraped<W: Write>(
    scraped: OddsBook,
    report: &mut Report,
    out: &mut W,
    text: bool,
    sportsbook: &str,
) -> Result<Option<(Vec<GamePair>, Option<OddsBook>)>> {
    let games = games_from_odds(&scraped);
    if games.is_empty() {
        if text {
            writeln!(out, "No games found.")?;
        }
        report.fail("no games found");
        return Ok(None);
    }
    let book = screen_book(&games, scraped, report, out, text, sportsbook)?;
    Ok(Some((games, book)))
}

// A board whose first game uses names the team index does not know means the index is
// out of date; fall back to asking for odds by hand.
fn screen_book<W: Write>(
    games: &[GamePair],
    book: OddsBook,
    report: &mut Report,
    out: &mut W,
    text: bool,
    sportsbook: &str,
) -> Result<Option<OddsBook>> {
    let first = &games[0];
    if team_offset(&first.home).is_none() || team_offset(&first.away).is_none() {
        warn!(game = %first.odds_key(), "{STALE_GAMES_WARNING}");
        if text {
            writeln!(out, "{}", first.odds_key())?;
            writeln!(
                out,
                "{}",
                style(format!("--------------{STALE_GAMES_WARNING}!!!--------------")).red()
            )?;
        }
        report.warnings.push(STALE_GAMES_WARNING.to_string());
        return Ok(None);
    }

    if text {
        render_odds_board(out, sportsbook, &book)?;
    }
    report.odds_data = odds_entries(&book);
    Ok(Some(book))
}

/// Models in the order they run. `all` runs the trees first.
pub fn selected_models(nn: bool, xgb: bool, all: bool) -> Vec<ModelKind> {
    if all {
        return vec![ModelKind::Xgb, ModelKind::Nn];
    }
    let mut out = Vec::new();
    if nn {
        out.push(ModelKind::Nn);
    }
    if xgb {
        out.push(ModelKind::Xgb);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;

    use super::*;
    use crate::report::Status;
    use crate::state::GameOdds;
    use crate::stats_fetch::parse_team_stats_json;

    fn fixture(name: &str) -> PathBuf {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("tests");
        path.push("fixtures");
        path.push(name);
        path
    }

    fn read_fixture(name: &str) -> String {
        fs::read_to_string(fixture(name)).expect("fixture file should be readable")
    }

    fn fixture_config() -> PipelineConfig {
        PipelineConfig {
            model_dir: fixture("models"),
            ..PipelineConfig::default()
        }
    }

    fn options(models: Vec<ModelKind>, format: OutputFormat) -> RunOptions {
        RunOptions {
            models,
            sportsbook: None,
            date: NaiveDate::from_ymd_opt(2023, 1, 10).expect("valid date"),
            sport: Sport::Nba,
            format,
        }
    }

    fn fixture_slate(book: Option<OddsBook>) -> Slate {
        Slate {
            games: vec![
                GamePair::new("Boston Celtics", "Los Angeles Lakers"),
                GamePair::new("LA Clippers", "Dallas Mavericks"),
                GamePair::new("Team World", "Miami Heat"),
            ],
            book,
            stats: parse_team_stats_json(&read_fixture("team_stats.json")).expect("parses"),
        }
    }

    #[test]
    fn all_flag_runs_trees_then_network() {
        assert_eq!(
            selected_models(false, false, true),
            vec![ModelKind::Xgb, ModelKind::Nn]
        );
        assert_eq!(
            selected_models(true, true, false),
            vec![ModelKind::Nn, ModelKind::Xgb]
        );
        assert!(selected_models(false, false, false).is_empty());
    }

    fn one_game_book(home: &str, away: &str) -> (Vec<GamePair>, OddsBook) {
        let mut book = OddsBook::new();
        book.insert(
            format!("{home}:{away}"),
            GameOdds {
                under_over: 230.0,
                home_money_line: -120.0,
                away_money_line: 100.0,
            },
        );
        (games_from_odds(&book), book)
    }

    #[test]
    fn unknown_first_team_disables_scraped_odds() {
        let (games, book) = one_game_book("Seattle SuperSonics", "Utah Jazz");
        let mut report = Report::new("2023-01-10", "NBA");
        let mut out = Vec::new();
        let kept = screen_book(&games, book, &mut report, &mut out, false, "fanduel")
            .expect("writes to vec");
        assert!(kept.is_none());
        assert_eq!(report.warnings, vec![STALE_GAMES_WARNING.to_string()]);
        assert!(report.odds_data.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn known_teams_keep_the_book_and_print_the_board() {
        let (games, book) = one_game_book("Utah Jazz", "Miami Heat");
        let mut report = Report::new("2023-01-10", "NBA");
        let mut out = Vec::new();
        let kept = screen_book(&games, book, &mut report, &mut out, true, "fanduel")
            .expect("writes to vec");
        assert!(kept.is_some());
        assert!(report.warnings.is_empty());
        assert_eq!(report.odds_data.len(), 1);
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("fanduel odds data"));
        assert!(text.contains("Miami Heat (100) @ Utah Jazz (-120)"));
    }

    #[test]
    fn empty_board_ends_the_run_with_error_status() {
        let mut report = Report::new("2023-01-10", "NBA");
        let mut out = Vec::new();
        let found = screen_scraped(OddsBook::new(), &mut report, &mut out, true, "fanduel")
            .expect("writes to vec");
        assert!(found.is_none());
        assert_eq!(report.status, Status::Error);
        assert_eq!(report.error.as_deref(), Some("no games found"));
        assert_eq!(String::from_utf8(out).expect("utf8"), "No games found.\n");

        let mut report = Report::new("2023-01-10", "NBA");
        let mut out = Vec::new();
        let found = screen_scraped(OddsBook::new(), &mut report, &mut out, false, "fanduel")
            .expect("writes to vec");
        assert!(found.is_none());
        assert!(out.is_empty());
        let json = serde_json::to_value(&report).expect("serializes");
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "no games found");
    }

    #[test]
    fn json_run_keeps_prompts_off_the_report_stream() {
        let cfg = fixture_config();
        let opts = options(vec![ModelKind::Xgb], OutputFormat::Json);
        let slate = fixture_slate(None);
        let answers = "229.5\n-210\n175\n221\n-115\n-105\n";
        let mut report = Report::new("2023-01-10", "NBA");
        let mut out = Vec::new();
        let mut prompt_text = Vec::new();
        {
            let mut prompts = PromptOdds::new(Cursor::new(answers), &mut prompt_text);
            run_slate(&cfg, &opts, &slate, &mut prompts, &mut report, &mut out)
                .expect("slate runs");
        }

        assert!(out.is_empty());
        let prompts = String::from_utf8(prompt_text).expect("utf8");
        assert!(prompts.contains("Boston Celtics vs Los Angeles Lakers: "));
        assert!(prompts.contains("Dallas Mavericks odds: "));
        assert_eq!(report.predictions["xgb"].len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].game.home, "Team World");
    }

    #[test]
    fn run_without_models_prints_assembled_games() {
        let cfg = fixture_config();
        let opts = options(Vec::new(), OutputFormat::Text);
        let book: OddsBook = serde_json::from_str(&read_fixture("odds_book.json")).expect("book");
        let slate = fixture_slate(Some(book));
        let mut report = Report::new("2023-01-10", "NBA");
        let mut out = Vec::new();
        let mut unused = PromptOdds::new(Cursor::new(""), io::sink());
        run_slate(&cfg, &opts, &slate, &mut unused, &mut report, &mut out).expect("slate runs");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.starts_with("Assembled 2 games (12 features each), 1 skipped\n"));
        assert!(text.contains("Los Angeles Lakers @ Boston Celtics\n"));
        assert!(text.contains("Dallas Mavericks @ LA Clippers\n"));
        assert!(report.predictions.is_empty());
    }
}
