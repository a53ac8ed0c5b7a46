pub mod anchor;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod results;
pub mod source;
pub mod tally;
pub mod tasks;
pub mod tiebreak;

pub use error::FairError;
pub use tally::{compute_quorum, compute_results};
