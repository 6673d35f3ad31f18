pub mod betting;
pub mod config;
pub mod error;
pub mod features;
pub mod http_client;
pub mod nn_model;
pub mod odds_fetch;
pub mod odds_source;
pub mod pipeline;
pub mod predict;
pub mod report;
pub mod schedule_fetch;
pub mod state;
pub mod stats_fetch;
pub mod team_index;
pub mod tree_model;
