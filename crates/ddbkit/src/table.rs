//! Async table façade.
//!
//! [`Table`] binds a [`TableDefinition`] to a [`Store`]. Each operation takes
//! a configure closure, applies it once to a fresh builder and sends the
//! resulting request; queries and scans come back as lazy streams driven by
//! the shared pagination engine.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_stream::Stream;

use ddbkit_core::builder::{QueryBuilder, ScanBuilder, TableSupport, UpdateBuilder};
use ddbkit_core::definition::TableDefinition;
use ddbkit_core::pagination::{paginate, Paginated, Paginator, QueryPages, ScanPages};
use ddbkit_core::storage::{Result, Store, StoreError};

/// Table DDL by definition: create, delete and recreate.
#[derive(Clone)]
pub struct Tables {
    store: Arc<dyn Store>,
}

impl Tables {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Creates the table on demand (pay-per-request) with the definition's
    /// key schema and waits until it is active.
    pub async fn create<T>(&self, definition: &Arc<TableDefinition<T>>) -> Result<()> {
        let support = TableSupport::new(Arc::clone(definition));
        self.store.create_table(support.create_table_request()).await
    }

    pub async fn delete<T>(&self, definition: &Arc<TableDefinition<T>>) -> Result<()> {
        let support = TableSupport::new(Arc::clone(definition));
        self.store.delete_table(support.delete_table_request()).await
    }

    /// Deletes the table if it exists, then creates it again empty.
    pub async fn recreate<T>(&self, definition: &Arc<TableDefinition<T>>) -> Result<()> {
        match self.delete(definition).await {
            Ok(()) | Err(StoreError::ResourceNotFound(_)) => {}
            Err(err) => return Err(err),
        }
        self.create(definition).await
    }
}

/// How [`Table::get_many`] resubmits keys a BatchGetItem call left
/// unprocessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchGetRetry {
    /// Calls per chunk, the first one included.
    pub max_attempts: u32,
    /// Wait before the first resubmission; doubles on each further one.
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl BatchGetRetry {
    /// Wait before resubmitting after the `attempt`-th call (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for BatchGetRetry {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
        }
    }
}

/// Async access to one table of `T` values.
pub struct Table<T> {
    store: Arc<dyn Store>,
    support: TableSupport<T>,
    batch_get_retry: BatchGetRetry,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            support: self.support.clone(),
            batch_get_retry: self.batch_get_retry,
        }
    }
}

impl<T: Send + 'static> Table<T> {
    pub fn new(store: Arc<dyn Store>, definition: TableDefinition<T>) -> Self {
        Self::from_shared(store, Arc::new(definition))
    }

    /// Creates a façade over a definition shared with other façades.
    pub fn from_shared(store: Arc<dyn Store>, definition: Arc<TableDefinition<T>>) -> Self {
        Self {
            store,
            support: TableSupport::new(definition),
            batch_get_retry: BatchGetRetry::default(),
        }
    }

    /// Replaces the resubmission policy of [`Table::get_many`].
    pub fn with_batch_get_retry(mut self, retry: BatchGetRetry) -> Self {
        self.batch_get_retry = retry;
        self
    }

    pub fn definition(&self) -> &Arc<TableDefinition<T>> {
        self.support.definition()
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    fn tables(&self) -> Tables {
        Tables::new(Arc::clone(&self.store))
    }

    pub async fn create(&self) -> Result<()> {
        self.tables().create(self.definition()).await
    }

    pub async fn delete_table(&self) -> Result<()> {
        self.tables().delete(self.definition()).await
    }

    pub async fn recreate(&self) -> Result<()> {
        self.tables().recreate(self.definition()).await
    }

    fn query_builder<F>(&self, configure: F) -> QueryBuilder<T>
    where
        F: FnOnce(&mut QueryBuilder<T>),
    {
        let mut builder = QueryBuilder::new(self.definition());
        configure(&mut builder);
        builder
    }

    fn scan_builder<F>(&self, configure: F) -> ScanBuilder<T>
    where
        F: FnOnce(&mut ScanBuilder<T>),
    {
        let mut builder = ScanBuilder::new(self.definition());
        configure(&mut builder);
        builder
    }

    /// Configures a query and returns the page source plus a fresh paginator.
    pub(crate) fn prepare_query<F>(&self, configure: F) -> (QueryPages<T>, Paginator<T>)
    where
        F: FnOnce(&mut QueryBuilder<T>),
    {
        let builder = self.query_builder(configure);
        let paginator = Paginator::new(builder.decoder(), builder.decode_policy());
        (QueryPages::new(Arc::clone(&self.store), builder), paginator)
    }

    pub(crate) fn prepare_scan<F>(&self, configure: F) -> (ScanPages<T>, Paginator<T>)
    where
        F: FnOnce(&mut ScanBuilder<T>),
    {
        let builder = self.scan_builder(configure);
        let paginator = Paginator::new(builder.decoder(), builder.decode_policy());
        (ScanPages::new(Arc::clone(&self.store), builder), paginator)
    }

    /// Streams every item matching the configured query, across all pages.
    ///
    /// Nothing is sent until the stream is first polled.
    ///
    /// ```rust,ignore
    /// let top = table.query(|q| {
    ///     q.key_condition(|k| {
    ///         k.eq("userId", "a");
    ///     });
    /// });
    /// ```
    pub fn query<F>(&self, configure: F) -> impl Stream<Item = Result<T>> + Send + 'static
    where
        F: FnOnce(&mut QueryBuilder<T>),
    {
        let (source, paginator) = self.prepare_query(configure);
        paginate(source, paginator)
    }

    /// Page-at-a-time access to the configured query.
    pub fn query_pages<F>(&self, configure: F) -> Paginated<T>
    where
        F: FnOnce(&mut QueryBuilder<T>),
    {
        let builder = self.query_builder(configure);
        let (decoder, policy) = (builder.decoder(), builder.decode_policy());
        Paginated::new(QueryPages::new(Arc::clone(&self.store), builder), decoder, policy)
    }

    /// Streams every item matching the configured scan, across all pages.
    pub fn scan<F>(&self, configure: F) -> impl Stream<Item = Result<T>> + Send + 'static
    where
        F: FnOnce(&mut ScanBuilder<T>),
    {
        let (source, paginator) = self.prepare_scan(configure);
        paginate(source, paginator)
    }

    /// Page-at-a-time access to the configured scan.
    pub fn scan_pages<F>(&self, configure: F) -> Paginated<T>
    where
        F: FnOnce(&mut ScanBuilder<T>),
    {
        let builder = self.scan_builder(configure);
        let (decoder, policy) = (builder.decoder(), builder.decode_policy());
        Paginated::new(ScanPages::new(Arc::clone(&self.store), builder), decoder, policy)
    }

    /// Writes `value`, replacing any item with the same key.
    pub async fn put(&self, value: &T) -> Result<()> {
        self.store.put_item(self.support.put_request(value)).await
    }

    /// Reads the item with the key of `key`.
    ///
    /// Only key attributes of `key` are sent. Items the mapper cannot decode
    /// are reported as absent.
    pub async fn get(&self, key: &T) -> Result<Option<T>> {
        let request = self.support.get_request(key);
        let Some(item) = self.store.get_item(request).await? else {
            return Ok(None);
        };

        match self.definition().from_item(&item) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(
                    table = %self.definition().name(),
                    error = %err,
                    "Dropping item that could not be decoded"
                );
                Ok(None)
            }
        }
    }

    /// Reads every existing item among `keys`.
    ///
    /// Keys are deduplicated and sent in chunks of at most 100, one chunk at
    /// a time. Keys the store leaves unprocessed are resubmitted with
    /// exponential backoff, up to [`BatchGetRetry::max_attempts`] calls per
    /// chunk; keys still unprocessed after that fail the whole call with
    /// [`StoreError::ThroughputExceeded`]. Missing and undecodable items are
    /// left out.
    pub async fn get_many<'a, I>(&self, keys: I) -> Result<Vec<T>>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let mut found = Vec::new();
        for mut request in self.support.batch_get_requests(keys) {
            let mut attempt = 1;
            loop {
                let output = self.store.batch_get_item(request.clone()).await?;
                tracing::debug!(
                    table = %request.table_name,
                    attempt,
                    requested = request.keys.len(),
                    found = output.items.len(),
                    unprocessed = output.unprocessed_keys.len(),
                    "Fetched batch"
                );
                found.extend(output.items);
                if output.unprocessed_keys.is_empty() {
                    break;
                }
                if attempt >= self.batch_get_retry.max_attempts {
                    return Err(StoreError::ThroughputExceeded(format!(
                        "{} keys of {} still unprocessed after {attempt} BatchGetItem calls",
                        output.unprocessed_keys.len(),
                        request.table_name
                    )));
                }

                let delay = self.batch_get_retry.delay(attempt);
                tracing::warn!(
                    table = %request.table_name,
                    unprocessed = output.unprocessed_keys.len(),
                    delay_ms = delay.as_millis() as u64,
                    "Resubmitting unprocessed keys"
                );
                tokio::time::sleep(delay).await;
                request = request.with_keys(output.unprocessed_keys);
                attempt += 1;
            }
        }

        let definition = self.definition();
        Ok(found
            .iter()
            .filter_map(|item| match definition.from_item(item) {
                Ok(value) => Some(value),
                Err(err) => {
                    tracing::warn!(
                        table = %definition.name(),
                        error = %err,
                        "Dropping item that could not be decoded"
                    );
                    None
                }
            })
            .collect())
    }

    /// Applies the configured partial update to one item.
    ///
    /// The closure runs immediately; the returned future only sends the
    /// request.
    pub fn update<F>(&self, configure: F) -> impl Future<Output = Result<()>> + Send + 'static
    where
        F: FnOnce(&mut UpdateBuilder),
    {
        let mut builder = UpdateBuilder::new(self.definition());
        configure(&mut builder);
        let request = builder.build();
        let store = Arc::clone(&self.store);
        async move { store.update_item(request).await }
    }

    /// Deletes the item with the key of `key`. Deleting a missing item
    /// succeeds.
    pub async fn delete(&self, key: &T) -> Result<()> {
        self.store.delete_item(self.support.delete_request(key)).await
    }
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use tokio_stream::StreamExt;

    use super::*;
    use crate::inmemory::InMemoryStore;
    use crate::testing::{
        cursor, ranking_item, rankings_definition, seeded_rankings, ScriptedStore, UserRanking,
        RANKINGS,
    };
    use ddbkit_core::attributes::{get_string, AttributeValue, Item};
    use ddbkit_core::pagination::DecodePolicy;
    use ddbkit_core::storage::{BatchGetOutput, Cursor, DecodeError, Page};

    fn scripted(store: ScriptedStore) -> (Arc<ScriptedStore>, Table<UserRanking>) {
        let store = Arc::new(store);
        let table = Table::new(store.clone(), rankings_definition());
        (store, table)
    }

    #[tokio::test]
    async fn test_query_single_partition() {
        let table = seeded_rankings().await;

        let rankings: Vec<UserRanking> = table
            .query(|q| {
                q.key_condition(|k| {
                    k.eq("userId", "a");
                });
            })
            .collect::<Result<Vec<_>>>()
            .await
            .unwrap();

        assert_eq!(rankings, vec![UserRanking::new("a", 10)]);
    }

    #[tokio::test]
    async fn test_scan_with_filter() {
        let table = seeded_rankings().await;

        let mut rankings: Vec<UserRanking> = table
            .scan(|s| {
                s.filter(|f| {
                    f.eq("score", 20);
                });
            })
            .collect::<Result<Vec<_>>>()
            .await
            .unwrap();
        rankings.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        assert_eq!(
            rankings,
            vec![UserRanking::new("b", 20), UserRanking::new("c", 20)]
        );
    }

    #[tokio::test]
    async fn test_scan_walks_every_page() {
        let table = seeded_rankings().await;

        let rankings: Vec<UserRanking> = table
            .scan(|s| {
                s.limit(1);
            })
            .collect::<Result<Vec<_>>>()
            .await
            .unwrap();

        assert_eq!(rankings.len(), 3);
    }

    #[tokio::test]
    async fn test_update_then_get() {
        let table = seeded_rankings().await;

        table
            .update(|u| {
                u.key(|k| {
                    k.eq("userId", "a");
                })
                .set("score", 15);
            })
            .await
            .unwrap();

        let ranking = table.get(&UserRanking::key("a")).await.unwrap();
        assert_eq!(ranking, Some(UserRanking::new("a", 15)));
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let table = Table::new(Arc::new(InMemoryStore::new()), rankings_definition());
        table.create().await.unwrap();

        table.put(&UserRanking::new("z", 7)).await.unwrap();

        assert_eq!(
            table.get(&UserRanking::key("z")).await.unwrap(),
            Some(UserRanking::new("z", 7))
        );
        assert_eq!(table.get(&UserRanking::key("y")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_undecodable_item_is_absent() {
        let store = Arc::new(InMemoryStore::new());
        let raw = Table::new(
            store.clone(),
            TableDefinition::raw(RANKINGS, rankings_definition().key_attributes().to_vec()),
        );
        raw.create().await.unwrap();
        raw.put(&Item::from([(
            "userId".to_string(),
            AttributeValue::S("broken".to_string()),
        )]))
        .await
        .unwrap();

        let table = Table::new(store, rankings_definition());

        assert_eq!(table.get(&UserRanking::key("broken")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_many_returns_found_subset() {
        let table = seeded_rankings().await;

        let mut found = table
            .get_many(&[
                UserRanking::key("a"),
                UserRanking::key("missing"),
                UserRanking::key("c"),
                UserRanking::key("a"),
            ])
            .await
            .unwrap();
        found.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        assert_eq!(
            found,
            vec![UserRanking::new("a", 10), UserRanking::new("c", 20)]
        );
    }

    #[tokio::test]
    async fn test_get_many_with_no_keys_sends_nothing() {
        let (store, table) = scripted(ScriptedStore::default());

        let keys: Vec<UserRanking> = Vec::new();
        let found = table.get_many(&keys).await.unwrap();

        assert!(found.is_empty());
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_many_resubmits_unprocessed_keys() {
        let (store, table) = scripted(ScriptedStore::with_batches(vec![
            Ok(BatchGetOutput {
                items: vec![ranking_item("a", 10)],
                unprocessed_keys: vec![UserRankingKey::item("b")],
            }),
            Ok(BatchGetOutput {
                items: vec![ranking_item("b", 20)],
                unprocessed_keys: Vec::new(),
            }),
        ]));

        let found = table
            .get_many(&[UserRanking::key("a"), UserRanking::key("b")])
            .await
            .unwrap();

        assert_eq!(
            found,
            vec![UserRanking::new("a", 10), UserRanking::new("b", 20)]
        );
        let requests = store.batch_gets.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].keys, vec![UserRankingKey::item("b")]);
    }

    #[tokio::test]
    async fn test_get_many_chunks_sequentially() {
        let (store, table) = scripted(ScriptedStore::default());
        let keys: Vec<UserRanking> = (0..150).map(|i| UserRanking::key(&format!("u{i}"))).collect();

        table.get_many(&keys).await.unwrap();

        let sizes: Vec<usize> = store
            .batch_gets
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.keys.len())
            .collect();
        assert_eq!(sizes, vec![100, 50]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let table = seeded_rankings().await;

        table.delete(&UserRanking::key("a")).await.unwrap();
        table.delete(&UserRanking::key("a")).await.unwrap();

        assert_eq!(table.get(&UserRanking::key("a")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_recreate_empties_table() {
        let table = seeded_rankings().await;

        table.recreate().await.unwrap();

        let all: Vec<UserRanking> = table
            .scan(|_| {})
            .collect::<Result<Vec<_>>>()
            .await
            .unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_recreate_missing_table() {
        let table = Table::new(Arc::new(InMemoryStore::new()), rankings_definition());

        table.recreate().await.unwrap();

        assert!(table.get(&UserRanking::key("a")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_fetches_each_scripted_page_once() {
        let (store, table) = scripted(ScriptedStore::with_pages(vec![
            Ok(Page::new(vec![ranking_item("a", 1)], cursor("a"))),
            Ok(Page::new(vec![ranking_item("a", 2)], cursor("b"))),
            Ok(Page::last(vec![ranking_item("a", 3)])),
        ]));

        let scores: Vec<i64> = table
            .query(|q| {
                q.key_condition(|k| {
                    k.eq("userId", "a");
                })
                .limit(1);
            })
            .map(|r| r.map(|ranking| ranking.score))
            .collect::<Result<Vec<_>>>()
            .await
            .unwrap();

        assert_eq!(scores, vec![1, 2, 3]);
        let queries = store.queries.lock().unwrap();
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0].exclusive_start_key, None);
        assert_eq!(queries[1].exclusive_start_key, Some(cursor("a").into_item()));
        assert_eq!(queries[2].exclusive_start_key, Some(cursor("b").into_item()));
        assert_eq!(queries[2].limit, Some(1));
    }

    #[tokio::test]
    async fn test_query_is_cold() {
        let (store, table) = scripted(ScriptedStore::with_pages(vec![Ok(Page::last(vec![
            ranking_item("a", 1),
        ]))]));

        let stream = table.query(|q| {
            q.key_condition(|k| {
                k.eq("userId", "a");
            });
        });
        assert_eq!(store.calls(), 0);
        drop(stream);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_query_with_custom_mapper() {
        let table = seeded_rankings().await;

        let users: Vec<String> = Table::from_shared(table.store().clone(), {
            let definition = TableDefinition::with_fns(
                RANKINGS,
                rankings_definition().key_attributes().to_vec(),
                |user: &String| {
                    Item::from([("userId".to_string(), AttributeValue::S(user.clone()))])
                },
                |item: &Item| get_string(item, "userId"),
            );
            Arc::new(definition)
        })
        .query(|q| {
            q.key_condition(|k| {
                k.eq("userId", "b");
            })
            .mapping_items(|item| get_string(item, "userId").map(|id| id.to_uppercase()));
        })
        .collect::<Result<Vec<_>>>()
        .await
        .unwrap();

        assert_eq!(users, vec!["B".to_string()]);
    }

    #[tokio::test]
    async fn test_scan_decode_policy() {
        let pages = || {
            vec![Ok(Page::last(vec![
                ranking_item("a", 1),
                UserRankingKey::item("broken"),
                ranking_item("c", 3),
            ]))]
        };

        let (_, table) = scripted(ScriptedStore::with_pages(pages()));
        let skipped: Vec<Result<UserRanking>> = table.scan(|_| {}).collect().await;
        assert_eq!(
            skipped,
            vec![Ok(UserRanking::new("a", 1)), Ok(UserRanking::new("c", 3))]
        );

        let (_, table) = scripted(ScriptedStore::with_pages(pages()));
        let failed: Vec<Result<UserRanking>> = table
            .scan(|s| {
                s.on_decode_error(DecodePolicy::Fail);
            })
            .collect()
            .await;
        assert_eq!(
            failed,
            vec![Err(StoreError::Decode(DecodeError::MissingAttribute(
                "score".to_string()
            )))]
        );
    }

    #[tokio::test]
    async fn test_query_pages_explicit_mode() {
        let table = seeded_rankings().await;
        let pages = table.scan_pages(|s| {
            s.limit(2);
        });

        let first = pages.next_page(&Cursor::empty()).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert!(first.has_more());

        let second = pages.next_page(&first.cursor).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(!second.has_more());

        let single = table
            .query_pages(|q| {
                q.key_condition(|k| {
                    k.eq("userId", "c");
                });
            })
            .next_page(&Cursor::empty())
            .await
            .unwrap();
        assert_eq!(single.items, vec![UserRanking::new("c", 20)]);
    }

    #[tokio::test]
    async fn test_update_sends_one_request() {
        let (store, table) = scripted(ScriptedStore::default());

        table
            .update(|u| {
                u.key(|k| {
                    k.eq("userId", "a");
                })
                .set("score", 1)
                .remove("nickname");
            })
            .await
            .unwrap();

        let updates = store.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].table_name, RANKINGS);
        assert_eq!(updates[0].update_expression, "SET #u0 = :u0 REMOVE #u1");
    }

    fn always_unprocessed(calls: usize) -> ScriptedStore {
        ScriptedStore::with_batches(
            (0..calls)
                .map(|_| {
                    Ok(BatchGetOutput {
                        items: Vec::new(),
                        unprocessed_keys: vec![UserRankingKey::item("a")],
                    })
                })
                .collect(),
        )
    }

    fn quick_retry(max_attempts: u32) -> BatchGetRetry {
        BatchGetRetry {
            max_attempts,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(25),
        }
    }

    #[test]
    fn test_batch_get_retry_delay_doubles_up_to_cap() {
        let retry = quick_retry(5);

        let delays: Vec<Duration> = (1..=4).map(|attempt| retry.delay(attempt)).collect();

        assert_eq!(
            delays,
            vec![
                Duration::from_millis(10),
                Duration::from_millis(20),
                Duration::from_millis(25),
                Duration::from_millis(25),
            ]
        );
        assert_eq!(retry.delay(u32::MAX), Duration::from_millis(25));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_many_gives_up_on_persistent_unprocessed_keys() {
        let (store, table) = scripted(always_unprocessed(100));
        let table = table.with_batch_get_retry(quick_retry(3));

        let result = table.get_many(&[UserRanking::key("a")]).await;

        assert!(matches!(result, Err(StoreError::ThroughputExceeded(_))));
        assert_eq!(store.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_many_backs_off_between_resubmissions() {
        let mut batches: Vec<Result<BatchGetOutput>> = (0..3)
            .map(|_| {
                Ok(BatchGetOutput {
                    items: Vec::new(),
                    unprocessed_keys: vec![UserRankingKey::item("a")],
                })
            })
            .collect();
        batches.push(Ok(BatchGetOutput {
            items: vec![ranking_item("a", 10)],
            unprocessed_keys: Vec::new(),
        }));
        let (store, table) = scripted(ScriptedStore::with_batches(batches));
        let table = table.with_batch_get_retry(quick_retry(4));

        let started = tokio::time::Instant::now();
        let found = table.get_many(&[UserRanking::key("a")]).await.unwrap();
        let waited = started.elapsed();

        assert_eq!(found, vec![UserRanking::new("a", 10)]);
        assert_eq!(store.calls(), 4);
        // 10ms + 20ms + 25ms (capped)
        assert!(waited >= Duration::from_millis(55), "waited {waited:?}");
        assert!(waited < Duration::from_millis(60), "waited {waited:?}");
    }

    #[tokio::test]
    async fn test_rankings_scenario() {
        let table = Table::new(Arc::new(InMemoryStore::new()), rankings_definition());
        table.create().await.unwrap();
        table.put(&UserRanking::new("a", 10)).await.unwrap();
        table.put(&UserRanking::new("b", 20)).await.unwrap();

        let mut all: Vec<UserRanking> = table
            .scan(|_| {})
            .collect::<Result<Vec<_>>>()
            .await
            .unwrap();
        all.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        assert_eq!(
            all,
            vec![UserRanking::new("a", 10), UserRanking::new("b", 20)]
        );

        assert_eq!(table.get(&UserRanking::key("c")).await.unwrap(), None);

        table
            .update(|u| {
                u.key(|k| {
                    k.eq("userId", "a");
                })
                .set("score", 99);
            })
            .await
            .unwrap();
        assert_eq!(
            table.get(&UserRanking::key("a")).await.unwrap(),
            Some(UserRanking::new("a", 99))
        );
    }

    /// Key-only items, as found in `UnprocessedKeys`.
    struct UserRankingKey;

    impl UserRankingKey {
        fn item(user_id: &str) -> Item {
            Item::from([(
                "userId".to_string(),
                AttributeValue::S(user_id.to_string()),
            )])
        }
    }
}
