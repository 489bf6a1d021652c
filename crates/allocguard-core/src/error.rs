use thiserror::Error;

/// Typed failures for configuration construction. Operational paths
/// (stores, calendars, caches) use `anyhow` instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
