use thiserror::Error;

/// Failures of the feature assembly step.
#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("no odds for game {key}")]
    MissingOdds { key: String },

    #[error("no games left to assemble after filtering")]
    NoGames,

    #[error("non-numeric value {value:?} in column {column}")]
    NonNumeric { column: String, value: String },

    #[error("stats table has no row {offset} for {team}")]
    StatsRowMissing { team: String, offset: usize },

    #[error("failed reading odds input: {0}")]
    Input(#[from] std::io::Error),
}

/// Failures loading or evaluating a trained model.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed reading model {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid model json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid model: {0}")]
    Invalid(String),

    #[error("expected {expected} features, got {got}")]
    FeatureWidth { expected: usize, got: usize },
}
