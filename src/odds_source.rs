use std::io::{self, BufRead, Write};

use crate::error::AssembleError;
use crate::state::{GameOdds, GamePair, OddsBook};

/// Where per-game lines come from during assembly.
pub trait OddsSource {
    fn odds_for(&mut self, game: &GamePair) -> Result<GameOdds, AssembleError>;
}

/// Lines scraped ahead of time. Lookup is by the exact `"home:away"` key.
pub struct BookOdds<'a> {
    book: &'a OddsBook,
}

impl<'a> BookOdds<'a> {
    pub fn new(book: &'a OddsBook) -> Self {
        Self { book }
    }
}

impl OddsSource for BookOdds<'_> {
    fn odds_for(&mut self, game: &GamePair) -> Result<GameOdds, AssembleError> {
        let key = game.odds_key();
        match self.book.get(&key) {
            Some(odds) => Ok(*odds),
            None => Err(AssembleError::MissingOdds { key }),
        }
    }
}

/// Asks the operator for each line, one prompt per field.
pub struct PromptOdds<R, W> {
    input: R,
    output: W,
}

impl<W: Write> PromptOdds<io::StdinLock<'static>, W> {
    /// Reads answers from the process stdin, prompting on `output`.
    pub fn stdin(output: W) -> Self {
        Self::new(io::stdin().lock(), output)
    }
}

impl<R: BufRead, W: Write> PromptOdds<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, prompt: &str, column: &str) -> Result<f64, AssembleError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let raw = line.trim();
        parse_american_odds(raw).ok_or_else(|| AssembleError::NonNumeric {
            column: column.to_string(),
            value: raw.to_string(),
        })
    }
}

impl<R: BufRead, W: Write> OddsSource for PromptOdds<R, W> {
    fn odds_for(&mut self, game: &GamePair) -> Result<GameOdds, AssembleError> {
        let under_over = self.ask(&format!("{} vs {}: ", game.home, game.away), "OU")?;
        let home_money_line = self.ask(&format!("{} odds: ", game.home), "home_odds")?;
        let away_money_line = self.ask(&format!("{} odds: ", game.away), "away_odds")?;
        Ok(GameOdds {
            under_over,
            home_money_line,
            away_money_line,
        })
    }
}

/// Parses `"-150"`, `"+130"`, `"220.5"` or `"EVEN"`.
pub fn parse_american_odds(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("EVEN") {
        return Some(100.0);
    }
    let s = s.strip_prefix('+').unwrap_or(s);
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_american_odds_forms() {
        assert_eq!(parse_american_odds("-150"), Some(-150.0));
        assert_eq!(parse_american_odds("+130"), Some(130.0));
        assert_eq!(parse_american_odds(" 220.5 "), Some(220.5));
        assert_eq!(parse_american_odds("even"), Some(100.0));
        assert_eq!(parse_american_odds(""), None);
        assert_eq!(parse_american_odds("abc"), None);
        assert_eq!(parse_american_odds("NaN"), None);
    }

    #[test]
    fn prompts_in_order_and_parses_answers() {
        let input = b"221.5\n-110\n+105\n".as_slice();
        let mut out = Vec::new();
        let game = GamePair::new("Miami Heat", "Utah Jazz");
        let odds = PromptOdds::new(input, &mut out)
            .odds_for(&game)
            .expect("answers are numeric");
        assert_eq!(odds.under_over, 221.5);
        assert_eq!(odds.home_money_line, -110.0);
        assert_eq!(odds.away_money_line, 105.0);

        let shown = String::from_utf8(out).expect("utf8 prompts");
        assert_eq!(
            shown,
            "Miami Heat vs Utah Jazz: Miami Heat odds: Utah Jazz odds: "
        );
    }

    #[test]
    fn malformed_answer_is_a_conversion_failure() {
        let input = b"two-twenty\n".as_slice();
        let game = GamePair::new("Miami Heat", "Utah Jazz");
        let err = PromptOdds::new(input, io::sink())
            .odds_for(&game)
            .expect_err("non-numeric answer");
        match err {
            AssembleError::NonNumeric { column, value } => {
                assert_eq!(column, "OU");
                assert_eq!(value, "two-twenty");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn book_lookup_does_not_try_the_reverse_key() {
        let mut book = OddsBook::new();
        book.insert(
            "Boston Celtics:Miami Heat".to_string(),
            GameOdds {
                under_over: 215.0,
                home_money_line: -200.0,
                away_money_line: 170.0,
            },
        );
        let mut source = BookOdds::new(&book);
        let hit = source
            .odds_for(&GamePair::new("Boston Celtics", "Miami Heat"))
            .expect("exact key present");
        assert_eq!(hit.home_money_line, -200.0);

        let err = source
            .odds_for(&GamePair::new("Miami Heat", "Boston Celtics"))
            .expect_err("reverse key is not matched");
        assert!(matches!(err, AssembleError::MissingOdds { key } if key == "Miami Heat:Boston Celtics"));
    }
}
