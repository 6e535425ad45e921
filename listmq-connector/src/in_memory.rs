use crate::{Connector, ConnectionSettings, ConnectorError, ListTransport};
use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use url::Url;

pub const MEMORY_SCHEMES: &[&str] = &["memory"];

#[derive(Default)]
struct ListState {
    lists: HashMap<String, VecDeque<Vec<u8>>>,
}

/// Process-local list substrate.
///
/// Clones share the same lists, so several connectors built from one
/// `InMemoryLists` behave like independent clients of a single broker.
#[derive(Clone, Default)]
pub struct InMemoryLists {
    state: Arc<Mutex<ListState>>,
    notify: Arc<Notify>,
}

impl InMemoryLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every list that currently holds at least one item.
    pub fn list_names(&self) -> Vec<String> {
        let guard = self.state.lock();
        let mut names: Vec<String> = guard.lists.keys().cloned().collect();
        names.sort();
        names
    }

    fn try_pop(&self, list: &str) -> Option<Vec<u8>> {
        let mut guard = self.state.lock();
        let items = guard.lists.get_mut(list)?;
        let item = items.pop_back();
        if items.is_empty() {
            guard.lists.remove(list);
        }
        item
    }
}

#[async_trait]
impl ListTransport for InMemoryLists {
    async fn push_head(&self, list: &str, body: &[u8]) -> Result<(), ConnectorError> {
        let mut guard = self.state.lock();
        guard
            .lists
            .entry(list.to_string())
            .or_default()
            .push_front(body.to_vec());
        drop(guard);
        self.notify.notify_waiters();
        Ok(())
    }

    async fn pop_tail_blocking(
        &self,
        list: &str,
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, ConnectorError> {
        let deadline = (!timeout.is_zero()).then(|| Instant::now() + timeout);

        loop {
            // register before checking so a push between the check and the
            // await still wakes us
            let mut notified = pin!(self.notify.notified());
            notified.as_mut().enable();

            if let Some(item) = self.try_pop(list) {
                return Ok(Some(item));
            }

            match deadline {
                None => notified.await,
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        debug!("Pop on '{}' timed out", list);
                        return Ok(None);
                    }
                }
            }
        }
    }

    async fn len(&self, list: &str) -> Result<usize, ConnectorError> {
        Ok(self
            .state
            .lock()
            .lists
            .get(list)
            .map(VecDeque::len)
            .unwrap_or_default())
    }

    async fn purge(&self, list: &str) -> Result<(), ConnectorError> {
        self.state.lock().lists.remove(list);
        Ok(())
    }
}

/// Connector over an [`InMemoryLists`] substrate, handling `memory://` URIs.
#[derive(Clone, Default)]
pub struct InMemoryConnector {
    lists: InMemoryLists,
    settings: Option<ConnectionSettings>,
}

impl InMemoryConnector {
    pub fn new(lists: InMemoryLists) -> Self {
        Self {
            lists,
            settings: None,
        }
    }

    pub fn settings(&self) -> Option<&ConnectionSettings> {
        self.settings.as_ref()
    }
}

#[async_trait]
impl Connector for InMemoryConnector {
    fn schema(&self) -> &'static [&'static str] {
        MEMORY_SCHEMES
    }

    fn set_up(&mut self, uri: &Url) -> Result<(), ConnectorError> {
        self.settings = Some(ConnectionSettings::from_uri(uri, MEMORY_SCHEMES, 0)?);
        Ok(())
    }

    async fn driver(&self) -> Result<Arc<dyn ListTransport>, ConnectorError> {
        Ok(Arc::new(self.lists.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pops_in_push_order() {
        let lists = InMemoryLists::new();
        lists.push_head("jobs", b"first").await.unwrap();
        lists.push_head("jobs", b"second").await.unwrap();
        assert_eq!(lists.len("jobs").await.unwrap(), 2);

        let first = lists.pop_tail_blocking("jobs", Duration::from_millis(10)).await.unwrap();
        let second = lists.pop_tail_blocking("jobs", Duration::from_millis(10)).await.unwrap();
        assert_eq!(first.as_deref(), Some(&b"first"[..]));
        assert_eq!(second.as_deref(), Some(&b"second"[..]));
        assert!(lists.list_names().is_empty());
    }

    #[tokio::test]
    async fn timed_pop_reports_empty() {
        let lists = InMemoryLists::new();
        let popped = lists
            .pop_tail_blocking("idle", Duration::from_millis(20))
            .await
            .unwrap();
        assert!(popped.is_none());
    }

    #[tokio::test]
    async fn blocking_pop_wakes_on_push() {
        let lists = InMemoryLists::new();
        let reader = lists.clone();
        let waiter = tokio::spawn(async move {
            reader
                .pop_tail_blocking("wake", crate::BLOCK_INDEFINITELY)
                .await
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        lists.push_head("other", b"ignored").await.unwrap();
        lists.push_head("wake", b"payload").await.unwrap();

        let popped = waiter.await.unwrap().unwrap();
        assert_eq!(popped.as_deref(), Some(&b"payload"[..]));
        assert_eq!(lists.len("other").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn purge_drops_waiting_items() {
        let lists = InMemoryLists::new();
        lists.push_head("stale", b"a").await.unwrap();
        lists.push_head("stale", b"b").await.unwrap();
        lists.purge("stale").await.unwrap();
        assert_eq!(lists.len("stale").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn driver_shares_the_connector_lists() {
        let lists = InMemoryLists::new();
        let connector = InMemoryConnector::new(lists.clone());

        connector.driver().await.unwrap().push_head("shared", b"a").await.unwrap();
        connector.driver().await.unwrap().push_head("shared", b"b").await.unwrap();

        assert_eq!(lists.len("shared").await.unwrap(), 2);
        assert_eq!(lists.list_names(), ["shared"]);
    }

    #[test]
    fn set_up_accepts_memory_uris_only() {
        let mut connector = InMemoryConnector::default();
        connector
            .set_up(&Url::parse("memory://local").unwrap())
            .unwrap();
        assert_eq!(connector.settings().map(|s| s.host()), Some("local"));

        let err = connector
            .set_up(&Url::parse("redis://localhost").unwrap())
            .unwrap_err();
        assert!(matches!(err, ConnectorError::UnsupportedScheme { .. }));
    }
}
