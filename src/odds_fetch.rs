use std::collections::HashMap;
use std::fmt;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::http_client::{fetch_text, http_client};
use crate::odds_source::parse_american_odds;
use crate::state::{GameOdds, GamePair, OddsBook, odds_key};

pub const SUPPORTED_BOOKS: &[&str] = &[
    "fanduel",
    "draftkings",
    "betmgm",
    "pointsbet",
    "caesars",
    "wynn",
    "bet_rivers_ny",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sport {
    Nba,
    Nfl,
    Nhl,
    Mlb,
    Ncaab,
}

impl Sport {
    pub fn parse_code(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "NBA" => Ok(Sport::Nba),
            "NFL" => Ok(Sport::Nfl),
            "NHL" => Ok(Sport::Nhl),
            "MLB" => Ok(Sport::Mlb),
            "NCAAB" => Ok(Sport::Ncaab),
            other => Err(format!(
                "unsupported sport {other}, expected NBA, NFL, NHL, MLB or NCAAB"
            )),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Sport::Nba => "NBA",
            Sport::Nfl => "NFL",
            Sport::Nhl => "NHL",
            Sport::Mlb => "MLB",
            Sport::Ncaab => "NCAAB",
        }
    }

    fn board_slug(self) -> &'static str {
        match self {
            Sport::Nba => "nba-basketball",
            Sport::Nfl => "nfl-football",
            Sport::Nhl => "nhl-hockey",
            Sport::Mlb => "mlb-baseball",
            Sport::Ncaab => "ncaa-basketball",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SbrMarket {
    MoneyLine,
    Totals,
}

impl SbrMarket {
    fn path(self) -> &'static str {
        match self {
            SbrMarket::MoneyLine => "money-line/full-game",
            SbrMarket::Totals => "totals/full-game",
        }
    }
}

/// One row of an SBR odds board, as seen from a single sportsbook.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardLine {
    pub home: String,
    pub away: String,
    pub home_odds: Option<f64>,
    pub away_odds: Option<f64>,
    pub total: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SbrOddsProvider {
    pub base_url: String,
    pub sportsbook: String,
    pub date: NaiveDate,
    pub sport: Sport,
    pub timeout_secs: u64,
}

impl SbrOddsProvider {
    pub fn new(
        base_url: &str,
        sportsbook: &str,
        date: NaiveDate,
        sport: Sport,
        timeout_secs: u64,
    ) -> Result<Self> {
        let sportsbook = sportsbook.trim().to_ascii_lowercase();
        if !SUPPORTED_BOOKS.contains(&sportsbook.as_str()) {
            return Err(anyhow!(
                "unsupported sportsbook {sportsbook}, expected one of {}",
                SUPPORTED_BOOKS.join(", ")
            ));
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            sportsbook,
            date,
            sport,
            timeout_secs,
        })
    }

    pub fn board_url(&self, market: SbrMarket) -> String {
        format!(
            "{}/betting-odds/{}/{}/?date={}",
            self.base_url,
            self.sport.board_slug(),
            market.path(),
            self.date.format("%Y-%m-%d")
        )
    }

    pub fn get_odds(&self) -> Result<OddsBook> {
        let client = http_client(self.timeout_secs)?;
        let money_html = fetch_text(client, &self.board_url(SbrMarket::MoneyLine), &[])
            .context("money line board request failed")?;
        let totals_html = fetch_text(client, &self.board_url(SbrMarket::Totals), &[])
            .context("totals board request failed")?;

        let money = parse_sbr_board(&money_html, &self.sportsbook, SbrMarket::MoneyLine)?;
        let totals = parse_sbr_board(&totals_html, &self.sportsbook, SbrMarket::Totals)?;
        let book = merge_boards(&money, &totals);
        debug!(
            sportsbook = %self.sportsbook,
            sport = %self.sport,
            games = book.len(),
            "scraped odds"
        );
        Ok(book)
    }
}

/// Joins money line and totals boards into a book keyed by `"home:away"`.
pub fn merge_boards(money: &[BoardLine], totals: &[BoardLine]) -> OddsBook {
    let totals_by_key: HashMap<String, f64> = totals
        .iter()
        .filter_map(|line| line.total.map(|t| (odds_key(&line.home, &line.away), t)))
        .collect();

    let mut book = OddsBook::new();
    for line in money {
        let key = odds_key(&line.home, &line.away);
        let (Some(home_ml), Some(away_ml)) = (line.home_odds, line.away_odds) else {
            warn!(game = %key, "no money line posted, leaving game out");
            continue;
        };
        let Some(total) = totals_by_key.get(&key).copied() else {
            warn!(game = %key, "no total posted, leaving game out");
            continue;
        };
        book.insert(
            key,
            GameOdds {
                under_over: total,
                home_money_line: home_ml,
                away_money_line: away_ml,
            },
        );
    }
    book
}

/// Recovers the game list from a scraped book.
pub fn games_from_odds(book: &OddsBook) -> Vec<GamePair> {
    book.keys()
        .filter_map(|key| key.split_once(':'))
        .map(|(home, away)| GamePair::new(home, away))
        .collect()
}

// -- Deserialization structs for the embedded Next.js payload --

#[derive(Debug, Deserialize)]
struct NextData {
    props: NextProps,
}

#[derive(Debug, Deserialize)]
struct NextProps {
    #[serde(rename = "pageProps")]
    page_props: PageProps,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    #[serde(rename = "oddsTables", default)]
    odds_tables: Vec<OddsTable>,
}

#[derive(Debug, Deserialize)]
struct OddsTable {
    #[serde(rename = "oddsTableModel")]
    odds_table_model: Option<OddsTableModel>,
}

#[derive(Debug, Deserialize)]
struct OddsTableModel {
    #[serde(rename = "gameRows", default)]
    game_rows: Vec<GameRow>,
}

#[derive(Debug, Deserialize)]
struct GameRow {
    #[serde(rename = "gameView")]
    game_view: GameView,
    #[serde(rename = "oddsViews", default)]
    odds_views: Vec<Option<OddsView>>,
}

#[derive(Debug, Deserialize)]
struct GameView {
    #[serde(rename = "homeTeam")]
    home_team: SbrTeam,
    #[serde(rename = "awayTeam")]
    away_team: SbrTeam,
}

#[derive(Debug, Deserialize)]
struct SbrTeam {
    #[serde(rename = "fullName")]
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct OddsView {
    sportsbook: String,
    #[serde(rename = "currentLine")]
    current_line: Option<SbrLine>,
}

#[derive(Debug, Deserialize)]
struct SbrLine {
    #[serde(rename = "homeOdds")]
    home_odds: Option<serde_json::Value>,
    #[serde(rename = "awayOdds")]
    away_odds: Option<serde_json::Value>,
    total: Option<serde_json::Value>,
}

pub fn parse_sbr_board(html: &str, sportsbook: &str, market: SbrMarket) -> Result<Vec<BoardLine>> {
    let payload = extract_next_data(html).context("odds page has no __NEXT_DATA__ block")?;
    let data: NextData = serde_json::from_str(payload).context("invalid __NEXT_DATA__ json")?;

    let Some(model) = data
        .props
        .page_props
        .odds_tables
        .into_iter()
        .next()
        .and_then(|t| t.odds_table_model)
    else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for row in model.game_rows {
        let view = row
            .odds_views
            .iter()
            .flatten()
            .find(|v| v.sportsbook.eq_ignore_ascii_case(sportsbook));
        let line = view.and_then(|v| v.current_line.as_ref());

        let (home_odds, away_odds, total) = match (market, line) {
            (SbrMarket::MoneyLine, Some(l)) => (
                l.home_odds.as_ref().and_then(number_of),
                l.away_odds.as_ref().and_then(number_of),
                None,
            ),
            (SbrMarket::Totals, Some(l)) => (None, None, l.total.as_ref().and_then(number_of)),
            (_, None) => (None, None, None),
        };

        out.push(BoardLine {
            home: canonical_team_name(&row.game_view.home_team.full_name),
            away: canonical_team_name(&row.game_view.away_team.full_name),
            home_odds,
            away_odds,
            total,
        });
    }
    Ok(out)
}

fn extract_next_data(html: &str) -> Option<&str> {
    let marker = "id=\"__NEXT_DATA__\"";
    let tag = html.find(marker)?;
    let start = html[tag..].find('>')? + tag + 1;
    let end = html[start..].find("</script>")? + start;
    Some(html[start..end].trim())
}

fn number_of(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => parse_american_odds(s),
        _ => None,
    }
}

/// SBR spells the Clippers out; the stats feed does not.
fn canonical_team_name(raw: &str) -> String {
    let name = raw.trim();
    if name == "Los Angeles Clippers" {
        return "LA Clippers".to_string();
    }
    name.to_string()
}
