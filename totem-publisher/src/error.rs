use std::io;
use std::result;

use thiserror::Error as ThisError;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Connection, channel, queue declaration or publish failure reported by the broker client.
    #[error("Broker error: {0}")]
    Broker(#[from] lapin::Error),
    /// A task request could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The configuration file is not valid TOML or has unexpected fields.
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),
    /// Reading the configuration or writing to the terminal failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
