#[cfg(feature = "redis")]
pub mod adapters;
mod errors;
pub mod in_memory;
pub mod list;
mod settings;
mod transport;

pub use errors::ConnectorError;
pub use settings::ConnectionSettings;
pub use transport::{ListTransport, BLOCK_INDEFINITELY};

use async_trait::async_trait;
use listmq_models::{Envelope, Outcome, Pipe, SendableError};
use std::sync::Arc;
use url::Url;

/// Called for every consumed envelope; the returned outcome drives what
/// happens to the message next.
pub type ReceiveHandler<'a> =
    dyn FnMut(&Envelope) -> Result<Outcome, SendableError> + Send + 'a;

/// Called instead of the receive handler's result when that handler fails.
/// Returning an error stops consumption.
pub type ErrorHandler<'a> =
    dyn FnMut(&Envelope, SendableError) -> Result<Outcome, SendableError> + Send + 'a;

/// Capabilities every list-backed queue connector provides.
#[async_trait]
pub trait Connector: Send + Sync {
    /// URI schemes this connector accepts.
    fn schema(&self) -> &'static [&'static str];

    /// Store connection parameters. Does not connect.
    fn set_up(&mut self, uri: &Url) -> Result<(), ConnectorError>;

    /// Return the broker connection, opening it on first use.
    async fn driver(&self) -> Result<Arc<dyn ListTransport>, ConnectorError>;

    /// Push the envelope's body onto the list named after its pipe.
    async fn publish(&self, envelope: &Envelope) -> Result<(), ConnectorError> {
        let driver = self.driver().await?;
        list::publish_envelope(driver.as_ref(), envelope).await
    }

    /// Consume `pipe` until a handler returns an outcome containing `EXIT`.
    async fn consume(
        &self,
        pipe: &Pipe,
        on_receive: &mut ReceiveHandler<'_>,
        on_error: &mut ErrorHandler<'_>,
        identification: Option<&str>,
    ) -> Result<(), ConnectorError> {
        let driver = self.driver().await?;
        list::consume_pipe(driver.as_ref(), pipe, on_receive, on_error, identification).await
    }
}
