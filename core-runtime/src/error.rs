use thiserror::Error;

/// Errors raised while assembling the core at the composition root.
#[derive(Error, Debug)]
pub enum Error {
    /// A provided setting is invalid (bad log filter, zero daily limit).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required bridge was not provided; the message names the adapter
    /// the host should inject.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
