//! Publish and consume logic shared by every list-backed connector.
//!
//! Publishing pushes onto the head of a list and consuming pops from its
//! tail. A consumed message's handler outcome decides whether it is copied
//! to the pipe's dead letter, pushed back onto its own pipe, and whether
//! consumption continues.

use crate::{ConnectorError, ErrorHandler, ListTransport, ReceiveHandler, BLOCK_INDEFINITELY};
use listmq_models::{
    Envelope, Message, Outcome, Pipe, RuntimeError, SendableError, CONTENT_TYPE_PROPERTY,
    DEFAULT_CONTENT_TYPE,
};
use log::{debug, info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

const ANONYMOUS_CONSUMER: &str = "anonymous";

pub async fn publish_envelope(
    transport: &dyn ListTransport,
    envelope: &Envelope,
) -> Result<(), ConnectorError> {
    // content_type only lives on the local copy; the body is all that is sent
    let message = envelope
        .message()
        .with_default_property(CONTENT_TYPE_PROPERTY, DEFAULT_CONTENT_TYPE);
    let pipe = envelope.pipe();

    debug!(
        "Publishing {} bytes to '{}' ({})",
        message.body().len(),
        pipe.name(),
        message
            .property(CONTENT_TYPE_PROPERTY)
            .and_then(|value| value.as_str())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    );
    transport.push_head(pipe.name(), message.body()).await
}

pub async fn consume_pipe(
    transport: &dyn ListTransport,
    pipe: &Pipe,
    on_receive: &mut ReceiveHandler<'_>,
    on_error: &mut ErrorHandler<'_>,
    identification: Option<&str>,
) -> Result<(), ConnectorError> {
    let pipe = pipe.clone();
    let consumer = identification.unwrap_or(ANONYMOUS_CONSUMER);
    info!("Consumer '{}' waiting on '{}'", consumer, pipe.name());

    loop {
        let Some(body) = transport
            .pop_tail_blocking(pipe.name(), BLOCK_INDEFINITELY)
            .await?
        else {
            debug!("Empty pop on '{}', waiting again", pipe.name());
            continue;
        };

        let envelope = Envelope::new(pipe.clone(), Message::new(body));
        let outcome = dispatch(&envelope, on_receive, on_error)?;
        debug!(
            "Consumer '{}' got outcome {:?} for message on '{}'",
            consumer,
            outcome,
            pipe.name()
        );

        if outcome.is_nack() {
            if let Some(dead_letter) = pipe.dead_letter() {
                info!(
                    "Routing rejected message from '{}' to dead letter '{}'",
                    pipe.name(),
                    dead_letter.name()
                );
                let rejected = Envelope::new(
                    dead_letter.clone(),
                    Message::new(envelope.message().body().to_vec()),
                );
                publish_envelope(transport, &rejected).await?;
            }
        }

        if outcome.is_requeue() {
            info!("Requeueing message on '{}'", pipe.name());
            let requeued = Envelope::new(pipe.clone(), envelope.message().clone());
            publish_envelope(transport, &requeued).await?;
        }

        if outcome.is_exit() {
            info!("Consumer '{}' leaving '{}'", consumer, pipe.name());
            break;
        }
    }

    Ok(())
}

/// Run the receive handler, falling back to the error handler when it fails
/// or panics. Whatever the error handler returns is final.
fn dispatch(
    envelope: &Envelope,
    on_receive: &mut ReceiveHandler<'_>,
    on_error: &mut ErrorHandler<'_>,
) -> Result<Outcome, ConnectorError> {
    let fault = match panic::catch_unwind(AssertUnwindSafe(|| on_receive(envelope))) {
        Ok(Ok(outcome)) => return Ok(outcome),
        Ok(Err(err)) => err,
        Err(payload) => panic_fault(payload),
    };

    warn!(
        "Receive handler failed on '{}': {}",
        envelope.pipe().name(),
        fault
    );
    on_error(envelope, fault).map_err(ConnectorError::Handler)
}

fn panic_fault(payload: Box<dyn Any + Send>) -> SendableError {
    let message = if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    };
    Box::new(RuntimeError::new("handler.panic".into(), message))
}
