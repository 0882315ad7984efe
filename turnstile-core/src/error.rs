use thiserror::Error;

use crate::routing::raptor::RaptorError;
use crate::turns::TurnCostError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No nearby points found for snapping")]
    NoPointsFound,
    #[error("Invalid node index")]
    InvalidNodeIndex,
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to serialize result: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("Turn cost error: {0}")]
    TurnCost(#[from] TurnCostError),
    #[error("Transit search error: {0}")]
    Raptor(#[from] RaptorError),
}
