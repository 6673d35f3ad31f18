use std::fmt;
use std::io::{self, Write};
use std::path::Path;

use crossterm::style::{Stylize, style};
use serde::Serialize;
use tracing::debug;

use crate::betting::{expected_value, kelly_fraction};
use crate::error::ModelError;
use crate::nn_model::DenseNetwork;
use crate::state::AssembledGames;
use crate::tree_model::TreeEnsemble;

/// A trained model that maps one feature row to class probabilities.
pub trait Classifier {
    /// Feature count the model was trained on, 0 when the file does not say.
    fn input_width(&self) -> usize;
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Nn,
    Xgb,
}

impl ModelKind {
    fn dir_name(self) -> &'static str {
        match self {
            ModelKind::Nn => "nn",
            ModelKind::Xgb => "xgb",
        }
    }

    pub fn banner(self) -> &'static str {
        match self {
            ModelKind::Nn => "------------Neural Network Model Predictions-----------",
            ModelKind::Xgb => "---------------XGBoost Model Predictions---------------",
        }
    }

    // The network was trained on L2-normalized rows; the trees on raw stats.
    fn normalizes_input(self) -> bool {
        matches!(self, ModelKind::Nn)
    }
}

/// Money-line and over/under models of one kind.
pub struct ModelSet {
    pub kind: ModelKind,
    pub money_line: Box<dyn Classifier>,
    pub under_over: Box<dyn Classifier>,
}

impl ModelSet {
    pub fn load(dir: &Path, kind: ModelKind) -> Result<Self, ModelError> {
        let base = dir.join(kind.dir_name());
        let (money_line, under_over): (Box<dyn Classifier>, Box<dyn Classifier>) = match kind {
            ModelKind::Nn => (
                Box::new(DenseNetwork::load(&base.join("ml.json"))?),
                Box::new(DenseNetwork::load(&base.join("uo.json"))?),
            ),
            ModelKind::Xgb => (
                Box::new(TreeEnsemble::load(&base.join("ml.json"))?),
                Box::new(TreeEnsemble::load(&base.join("uo.json"))?),
            ),
        };
        debug!(kind = ?kind, dir = %base.display(), "loaded models");
        Ok(Self {
            kind,
            money_line,
            under_over,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OuPick {
    Under,
    Over,
    Push,
}

impl fmt::Display for OuPick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OuPick::Under => "UNDER",
            OuPick::Over => "OVER",
            OuPick::Push => "PUSH",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GamePrediction {
    pub home: String,
    pub away: String,
    pub winner: String,
    pub home_wins: bool,
    pub winner_confidence: f64,
    pub home_prob: f64,
    pub away_prob: f64,
    pub under_over: OuPick,
    pub ou_confidence: f64,
    pub ou_line: f64,
    pub home_ev: f64,
    pub away_ev: f64,
    pub home_kelly: f64,
    pub away_kelly: f64,
}

/// L2-normalizes each row; all-zero rows are left as they are.
pub fn normalize_rows(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|row| {
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            let norm = if norm == 0.0 { 1.0 } else { norm };
            row.iter().map(|v| v / norm).collect()
        })
        .collect()
}

pub fn run_models(
    models: &ModelSet,
    games: &AssembledGames,
) -> Result<Vec<GamePrediction>, ModelError> {
    let expected = models.money_line.input_width();
    if expected > 0 && !games.is_empty() && expected != games.feature_width() {
        return Err(ModelError::FeatureWidth {
            expected,
            got: games.feature_width(),
        });
    }

    let ml_rows = prepare(models.kind, games.features.clone());
    let uo_rows = prepare(
        models.kind,
        games
            .features
            .iter()
            .zip(&games.under_over)
            .map(|(row, line)| {
                let mut row = row.clone();
                row.push(*line);
                row
            })
            .collect(),
    );

    let mut out = Vec::with_capacity(games.len());
    for (i, game) in games.games.iter().enumerate() {
        let ml = models.money_line.predict_proba(&ml_rows[i])?;
        let uo = models.under_over.predict_proba(&uo_rows[i])?;
        if ml.len() < 2 {
            return Err(ModelError::Invalid(format!(
                "money line model returned {} classes",
                ml.len()
            )));
        }

        let (winner_idx, winner_p) = argmax(&ml);
        let (uo_idx, uo_p) = argmax(&uo);
        let home_wins = winner_idx == 1;
        let (home_prob, away_prob) = (ml[1], ml[0]);
        let (home_line, away_line) = (games.home_odds[i], games.away_odds[i]);

        out.push(GamePrediction {
            home: game.home.clone(),
            away: game.away.clone(),
            winner: if home_wins {
                game.home.clone()
            } else {
                game.away.clone()
            },
            home_wins,
            winner_confidence: percent(winner_p),
            home_prob,
            away_prob,
            under_over: match uo_idx {
                0 => OuPick::Under,
                1 => OuPick::Over,
                _ => OuPick::Push,
            },
            ou_confidence: percent(uo_p),
            ou_line: games.under_over[i],
            home_ev: round2(expected_value(home_prob, home_line)),
            away_ev: round2(expected_value(away_prob, away_line)),
            home_kelly: kelly_fraction(home_prob, home_line),
            away_kelly: kelly_fraction(away_prob, away_line),
        });
    }
    Ok(out)
}

fn prepare(kind: ModelKind, rows: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
    if kind.normalizes_input() {
        normalize_rows(&rows)
    } else {
        rows
    }
}

fn argmax(xs: &[f64]) -> (usize, f64) {
    xs.iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, v)| {
            if v > best.1 { (i, v) } else { best }
        })
}

fn percent(p: f64) -> f64 {
    (p * 1000.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn render_text<W: Write>(out: &mut W, predictions: &[GamePrediction]) -> io::Result<()> {
    for p in predictions {
        let (home, away) = if p.home_wins {
            (style(p.home.as_str()).green(), style(p.away.as_str()).red())
        } else {
            (style(p.home.as_str()).red(), style(p.away.as_str()).green())
        };
        let confidence = style(format!(" ({}%)", p.winner_confidence)).cyan();
        let pick = match p.under_over {
            OuPick::Under => style(p.under_over.to_string()).magenta(),
            OuPick::Over | OuPick::Push => style(p.under_over.to_string()).blue(),
        };
        let ou_conf = style(format!(" ({}%)", p.ou_confidence)).cyan();
        if p.home_wins {
            writeln!(out, "{home}{confidence} vs {away}: {pick} {}{ou_conf}", p.ou_line)?;
        } else {
            writeln!(out, "{home} vs {away}{confidence}: {pick} {}{ou_conf}", p.ou_line)?;
        }
    }

    writeln!(out, "------------Expected Value & Kelly Criterion-----------")?;
    for p in predictions {
        for (team, ev, kelly) in [
            (&p.home, p.home_ev, p.home_kelly),
            (&p.away, p.away_ev, p.away_kelly),
        ] {
            let ev_text = if ev > 0.0 {
                style(ev.to_string()).green()
            } else {
                style(ev.to_string()).red()
            };
            writeln!(out, "{team} EV: {ev_text} Fraction of Bankroll: {kelly}%")?;
        }
    }
    Ok(())
}
