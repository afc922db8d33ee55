use thiserror::Error;

/// Failures while setting up the player runtime.
#[derive(Error, Debug)]
pub enum Error {
    /// A `PlayerConfig` value failed validation.
    #[error("Invalid player configuration: {0}")]
    Config(String),

    /// The log filter could not be parsed or a subscriber is already set.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
