/// Profit on a winning 100 stake at the given American odds.
pub fn payout(american_odds: f64) -> f64 {
    if american_odds > 0.0 {
        american_odds
    } else {
        100.0 / american_odds.abs() * 100.0
    }
}

/// Expected profit per 100 staked.
pub fn expected_value(prob: f64, american_odds: f64) -> f64 {
    prob * payout(american_odds) - (1.0 - prob) * 100.0
}

pub fn american_to_decimal(american_odds: f64) -> f64 {
    if american_odds >= 0.0 {
        american_odds / 100.0 + 1.0
    } else {
        100.0 / american_odds.abs() + 1.0
    }
}

pub fn american_to_implied(american_odds: f64) -> f64 {
    1.0 / american_to_decimal(american_odds)
}

/// Kelly stake as a percent of bankroll, two decimals, never negative.
pub fn kelly_fraction(prob: f64, american_odds: f64) -> f64 {
    let d = american_to_decimal(american_odds);
    let pct = 100.0 * (d * prob - (1.0 - prob)) / d;
    let rounded = (pct * 100.0).round() / 100.0;
    rounded.max(0.0)
}
