use std::io;

use thiserror::Error;

/// Failure talking to the cloud provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{command} failed: {message}")]
    Command { command: String, message: String },

    #[error("could not decode {command} output: {source}")]
    Decode {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

/// An image key that is not of the form `region:identifier`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid AMI key format: {0:?}")]
pub struct KeyError(pub String);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no regions configured")]
    NoRegions,

    #[error("name filter must not be empty")]
    EmptyNameFilter,

    #[error("{0} must not be empty")]
    EmptyValue(&'static str),

    #[error("aws CLI not available at {path:?}: {source}")]
    CliUnavailable {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Fatal errors that end the program with a non-zero exit code.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("unable to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to fetch AMIs: every region failed ({0} regions)")]
    CollectionFailed(usize),

    #[error("unable to initialise logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
