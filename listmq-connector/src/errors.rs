use listmq_models::SendableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("invalid connection uri '{uri}': {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },
    #[error("scheme '{scheme}' is not handled by this connector (expected one of {expected:?})")]
    UnsupportedScheme {
        scheme: String,
        expected: &'static [&'static str],
    },
    #[error("connection uri '{0}' has no host")]
    MissingHost(String),
    #[error("connector used before set_up was called")]
    NotConfigured,
    #[cfg(feature = "redis")]
    #[error("redis transport error: {0}")]
    Transport(#[from] redis::RedisError),
    #[error("error handler failed: {0}")]
    Handler(#[source] SendableError),
    #[error("internal connector error: {0}")]
    Internal(String),
}
