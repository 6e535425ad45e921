use listmq_config::{parse_config, Command};
use listmq_connector::adapters::redis::RedisQueueConnector;
use listmq_connector::in_memory::InMemoryConnector;
use listmq_connector::{Connector, ListTransport};
use listmq_models::{
    errors::{RuntimeError, SendableError},
    Envelope, Message, Outcome, Pipe, CONTENT_TYPE_PROPERTY,
};
use listmq_utilities::startup::startup;
use log::{error, info};
use url::Url;

fn build_connector(uri: &str) -> Result<Box<dyn Connector>, SendableError> {
    let url = Url::parse(uri).map_err(|err| -> SendableError {
        Box::new(RuntimeError::new(
            "listmq.uri.invalid".into(),
            format!("'{uri}': {err}"),
        ))
    })?;

    let mut connector: Box<dyn Connector> = match url.scheme() {
        "redis" => Box::new(RedisQueueConnector::new()),
        "memory" => Box::new(InMemoryConnector::default()),
        other => {
            return Err(Box::new(RuntimeError::new(
                "listmq.uri.unknown_scheme".into(),
                format!("No connector handles scheme '{other}'"),
            )))
        }
    };
    connector.set_up(&url)?;
    Ok(connector)
}

async fn consume(
    connector: &dyn Connector,
    pipe: Pipe,
    count: Option<u64>,
    outcome: Outcome,
    identification: Option<String>,
) -> Result<(), SendableError> {
    let mut received = 0u64;
    connector
        .consume(
            &pipe,
            &mut |envelope: &Envelope| -> Result<Outcome, SendableError> {
                received += 1;
                println!("{}", envelope.message().body_str());
                if count.is_some_and(|count| received >= count) {
                    Ok(outcome | Outcome::EXIT)
                } else {
                    Ok(outcome)
                }
            },
            &mut |envelope: &Envelope, err: SendableError| -> Result<Outcome, SendableError> {
                error!(
                    "Failed to handle message on '{}': {}",
                    envelope.pipe().name(),
                    err
                );
                Err(err)
            },
            identification.as_deref(),
        )
        .await?;

    info!("Consumed {} message(s) from '{}'", received, pipe.name());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), SendableError> {
    let config = parse_config();
    startup("listmq", config.log_level, config.log_file.as_deref())?;

    let connector = build_connector(&config.uri)?;

    match config.command {
        Command::Publish {
            pipe,
            body,
            content_type,
        } => {
            let message = Message::new(body).with_property(CONTENT_TYPE_PROPERTY, content_type);
            connector
                .publish(&Envelope::new(Pipe::new(pipe.clone()), message))
                .await?;
            info!("Published to '{}'", pipe);
        }
        Command::Consume {
            pipe,
            dead_letter,
            count,
            nack,
            requeue,
            identification,
        } => {
            let mut pipe = Pipe::new(pipe);
            if let Some(dead_letter) = dead_letter {
                pipe = pipe.with_dead_letter(Pipe::new(dead_letter));
            }
            let outcome = Command::consume_outcome(nack, requeue);
            consume(connector.as_ref(), pipe, count, outcome, identification).await?;
        }
        Command::Purge { pipe } => {
            connector.driver().await?.purge(&pipe).await?;
            info!("Purged '{}'", pipe);
        }
    }

    Ok(())
}
