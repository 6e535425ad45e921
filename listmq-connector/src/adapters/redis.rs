//! Redis list connector (`redis://` URIs).
//!
//! Publishing is `LPUSH`, consuming is `BRPOP`. One multiplexed connection is
//! opened lazily per connector and reused for every command afterwards.

use crate::{ConnectionSettings, Connector, ConnectorError, ListTransport};
use async_trait::async_trait;
use log::{debug, info};
use redis::aio::MultiplexedConnection;
use redis::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

pub const REDIS_SCHEMES: &[&str] = &["redis"];
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Live connection to a Redis server.
#[derive(Clone)]
pub struct RedisTransport {
    connection: MultiplexedConnection,
}

impl RedisTransport {
    /// Connect, authenticate and check the server answers.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self, ConnectorError> {
        let url = redis_url(settings)?;
        let client = Client::open(url.as_str())?;
        let connection = client.get_multiplexed_tokio_connection().await?;
        let transport = Self { connection };

        let version = transport.server_version().await?;
        info!(
            "Connected to redis {} at {}:{}",
            version.as_deref().unwrap_or("(unknown version)"),
            settings.host(),
            settings.port()
        );
        Ok(transport)
    }

    /// `redis_version` as reported by `INFO server`.
    pub async fn server_version(&self) -> Result<Option<String>, ConnectorError> {
        let mut conn = self.connection.clone();
        let info: String = redis::cmd("INFO")
            .arg("server")
            .query_async(&mut conn)
            .await?;
        Ok(parse_redis_version(&info))
    }
}

#[async_trait]
impl ListTransport for RedisTransport {
    async fn push_head(&self, list: &str, body: &[u8]) -> Result<(), ConnectorError> {
        let mut conn = self.connection.clone();
        let length: i64 = redis::cmd("LPUSH")
            .arg(list)
            .arg(body)
            .query_async(&mut conn)
            .await?;
        debug!("LPUSH '{}' -> length {}", list, length);
        Ok(())
    }

    async fn pop_tail_blocking(
        &self,
        list: &str,
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, ConnectorError> {
        let mut conn = self.connection.clone();
        let mut cmd = redis::cmd("BRPOP");
        cmd.arg(list);
        if timeout.subsec_nanos() == 0 {
            cmd.arg(timeout.as_secs());
        } else {
            cmd.arg(timeout.as_secs_f64());
        }

        // nil reply means the wait ended empty; anything else is an error
        let reply: Option<(String, Vec<u8>)> = cmd.query_async(&mut conn).await?;
        Ok(reply.map(|(_, body)| body))
    }

    async fn len(&self, list: &str) -> Result<usize, ConnectorError> {
        let mut conn = self.connection.clone();
        let length: usize = redis::cmd("LLEN").arg(list).query_async(&mut conn).await?;
        Ok(length)
    }

    async fn purge(&self, list: &str) -> Result<(), ConnectorError> {
        let mut conn = self.connection.clone();
        let _: i64 = redis::cmd("DEL").arg(list).query_async(&mut conn).await?;
        Ok(())
    }
}

/// Connector for Redis lists.
#[derive(Default)]
pub struct RedisQueueConnector {
    settings: Option<ConnectionSettings>,
    driver: OnceCell<Arc<RedisTransport>>,
}

impl RedisQueueConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_uri(uri: &Url) -> Result<Self, ConnectorError> {
        let mut connector = Self::new();
        connector.set_up(uri)?;
        Ok(connector)
    }

    pub fn settings(&self) -> Option<&ConnectionSettings> {
        self.settings.as_ref()
    }

    async fn open(&self) -> Result<Arc<RedisTransport>, ConnectorError> {
        let settings = self.settings.as_ref().ok_or(ConnectorError::NotConfigured)?;
        Ok(Arc::new(RedisTransport::connect(settings).await?))
    }
}

#[async_trait]
impl Connector for RedisQueueConnector {
    fn schema(&self) -> &'static [&'static str] {
        REDIS_SCHEMES
    }

    fn set_up(&mut self, uri: &Url) -> Result<(), ConnectorError> {
        self.settings = Some(ConnectionSettings::from_uri(
            uri,
            REDIS_SCHEMES,
            DEFAULT_REDIS_PORT,
        )?);
        self.driver = OnceCell::new();
        Ok(())
    }

    async fn driver(&self) -> Result<Arc<dyn ListTransport>, ConnectorError> {
        let transport = self.driver.get_or_try_init(|| self.open()).await?;
        Ok(transport.clone())
    }
}

fn redis_url(settings: &ConnectionSettings) -> Result<Url, ConnectorError> {
    let base = format!("redis://{}:{}", settings.host(), settings.port());
    let mut url = Url::parse(&base).map_err(|source| ConnectorError::InvalidUri {
        uri: base.clone(),
        source,
    })?;

    if let Some((username, password)) = settings.credentials() {
        let invalid = || ConnectorError::Internal(format!("cannot attach credentials to {base}"));
        url.set_password(Some(password)).map_err(|_| invalid())?;
        if let Some(username) = username {
            url.set_username(username).map_err(|_| invalid())?;
        }
    }
    Ok(url)
}

fn parse_redis_version(info: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.trim().strip_prefix("redis_version:"))
        .map(str::to_string)
}
