use std::path::PathBuf;

use clap::{Parser, Subcommand};
use listmq_models::{Outcome, DEFAULT_CONTENT_TYPE};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "listmq",
    author,
    version,
    about = "Publish to and consume from list-backed message queues"
)]
pub struct Config {
    /// Broker URI, e.g. redis://:password@localhost:6379
    #[arg(long, global = true, env = "LISTMQ_URI", default_value = "redis://127.0.0.1")]
    pub uri: String,

    #[arg(long, global = true, env = "LISTMQ_LOG_LEVEL", default_value = "info")]
    pub log_level: log::LevelFilter,

    /// Also append log lines to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Push one message onto a pipe.
    Publish {
        #[arg(long)]
        pipe: String,

        #[arg(long)]
        body: String,

        #[arg(long, default_value = DEFAULT_CONTENT_TYPE)]
        content_type: String,
    },
    /// Consume messages from a pipe and print their bodies.
    Consume {
        #[arg(long)]
        pipe: String,

        /// Pipe that rejected messages are routed to.
        #[arg(long)]
        dead_letter: Option<String>,

        /// Stop after this many messages; runs until interrupted when omitted.
        #[arg(long)]
        count: Option<u64>,

        /// Reject every message instead of acknowledging it.
        #[arg(long, default_value_t = false)]
        nack: bool,

        /// Push every message back onto the pipe after printing it.
        #[arg(long, default_value_t = false)]
        requeue: bool,

        #[arg(long)]
        identification: Option<String>,
    },
    /// Drop every message waiting on a pipe.
    Purge {
        #[arg(long)]
        pipe: String,
    },
}

impl Command {
    /// Outcome a `consume` run answers with for each message, before the
    /// message count decides whether to add `EXIT`.
    pub fn consume_outcome(nack: bool, requeue: bool) -> Outcome {
        let mut outcome = Outcome::empty();
        if nack {
            outcome |= Outcome::NACK;
        } else {
            outcome |= Outcome::ACK;
        }
        if requeue {
            outcome |= Outcome::REQUEUE;
        }
        outcome
    }
}

pub fn parse_config() -> Config {
    Config::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Config::command().debug_assert();
    }

    #[test]
    fn consume_flags_parse() {
        let config = Config::try_parse_from([
            "listmq",
            "--uri",
            "memory://local",
            "consume",
            "--pipe",
            "test2",
            "--dead-letter",
            "dlq_test2",
            "--count",
            "1",
            "--nack",
        ])
        .unwrap();

        assert_eq!(config.uri, "memory://local");
        match config.command {
            Command::Consume {
                pipe,
                dead_letter,
                count,
                nack,
                requeue,
                ..
            } => {
                assert_eq!(pipe, "test2");
                assert_eq!(dead_letter.as_deref(), Some("dlq_test2"));
                assert_eq!(count, Some(1));
                assert!(nack);
                assert!(!requeue);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn consume_outcome_maps_flags() {
        assert_eq!(Command::consume_outcome(false, false), Outcome::ACK);
        assert_eq!(Command::consume_outcome(true, false), Outcome::NACK);
        assert_eq!(
            Command::consume_outcome(false, true),
            Outcome::ACK | Outcome::REQUEUE
        );
    }

    #[test]
    fn publish_defaults_content_type() {
        let config =
            Config::try_parse_from(["listmq", "publish", "--pipe", "test", "--body", "hi"]).unwrap();
        match config.command {
            Command::Publish { content_type, .. } => assert_eq!(content_type, "text/plain"),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
