//! Pagination engine.
//!
//! Turns "fetch the page starting at cursor C" into a lazy sequence of
//! decoded items. [`Paginator`] holds the whole algorithm as a state machine
//! with no I/O of its own; drivers only differ in how they wait for a page:
//!
//! - [`paginate`] awaits it and exposes a cold `Stream`.
//! - the blocking iterator in the `ddbkit` crate blocks on it.
//! - [`Paginated`] hands single pages to callers that pace themselves.
//!
//! A page is requested only after every item of the previous page has been
//! handed out, and the sequence ends after the first page whose cursor is
//! empty. There is no cap on the number of pages.

use std::collections::VecDeque;
use std::sync::Arc;

use async_stream::try_stream;
use async_trait::async_trait;
use tokio_stream::Stream;

use crate::builder::{ItemDecoder, QueryBuilder, ScanBuilder};
use crate::storage::{Cursor, Page, RawPage, Result, Store};

/// What to do with an item the mapper cannot decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Drop the item and keep going.
    #[default]
    Skip,
    /// End the sequence with [`StoreError::Decode`](crate::storage::StoreError::Decode).
    Fail,
}

/// Source of raw pages, usually a request builder bound to a store.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, cursor: &Cursor) -> Result<RawPage>;
}

/// Next action for a pagination driver.
#[derive(Debug, PartialEq)]
pub enum Step<T> {
    /// Hand this item to the consumer.
    Item(T),
    /// Fetch the page starting at this cursor and [`Paginator::accept`] it.
    Fetch(Cursor),
    /// The sequence is over.
    Done,
}

/// Pagination state for one consumption of a paginated operation.
pub struct Paginator<T> {
    decoder: ItemDecoder<T>,
    policy: DecodePolicy,
    buffer: VecDeque<T>,
    cursor: Cursor,
    exhausted: bool,
    pages: usize,
}

impl<T> Paginator<T> {
    /// A paginator positioned before the first page.
    pub fn new(decoder: ItemDecoder<T>, policy: DecodePolicy) -> Self {
        Self {
            decoder,
            policy,
            buffer: VecDeque::new(),
            cursor: Cursor::empty(),
            exhausted: false,
            pages: 0,
        }
    }

    pub fn step(&mut self) -> Step<T> {
        if let Some(item) = self.buffer.pop_front() {
            return Step::Item(item);
        }
        if self.exhausted {
            Step::Done
        } else {
            Step::Fetch(self.cursor.clone())
        }
    }

    /// Decodes a fetched page and advances the cursor.
    ///
    /// On error the paginator is halted.
    pub fn accept(&mut self, page: RawPage) -> Result<()> {
        self.pages += 1;
        tracing::debug!(
            page = self.pages,
            items = page.items.len(),
            more = page.has_more(),
            "Fetched page"
        );

        match decode_page(&self.decoder, self.policy, page) {
            Ok(page) => {
                self.buffer.extend(page.items);
                self.exhausted = page.cursor.is_empty();
                self.cursor = page.cursor;
                Ok(())
            }
            Err(err) => {
                self.halt();
                Err(err)
            }
        }
    }

    /// Stops the sequence, e.g. after a failed fetch.
    pub fn halt(&mut self) {
        self.buffer.clear();
        self.exhausted = true;
    }

    /// Number of pages accepted so far.
    pub fn pages(&self) -> usize {
        self.pages
    }
}

/// Decodes every item of `page`, applying `policy` to failures.
pub fn decode_page<T>(
    decoder: &ItemDecoder<T>,
    policy: DecodePolicy,
    page: RawPage,
) -> Result<Page<T>> {
    let mut items = Vec::with_capacity(page.items.len());
    for raw in &page.items {
        match decoder(raw) {
            Ok(item) => items.push(item),
            Err(err) => match policy {
                DecodePolicy::Skip => {
                    tracing::warn!(error = %err, "Dropping item that could not be decoded");
                }
                DecodePolicy::Fail => return Err(err.into()),
            },
        }
    }
    Ok(Page::new(items, page.cursor))
}

/// Streams every item of every page of `source`.
///
/// The stream is cold: no page is fetched before the first poll. A fetch or
/// decode failure is yielded once and ends the stream. Dropping the stream
/// stops further fetches.
pub fn paginate<T, S>(source: S, paginator: Paginator<T>) -> impl Stream<Item = Result<T>> + Send
where
    T: Send + 'static,
    S: PageSource + 'static,
{
    try_stream! {
        let mut paginator = paginator;
        loop {
            match paginator.step() {
                Step::Item(item) => yield item,
                Step::Fetch(cursor) => {
                    let page = source.fetch_page(&cursor).await?;
                    paginator.accept(page)?;
                }
                Step::Done => break,
            }
        }
    }
}

/// Explicit-page access to a paginated operation.
///
/// Callers keep the cursor themselves: start from [`Cursor::empty`] and stop
/// when a returned page has an empty cursor.
pub struct Paginated<T> {
    source: Box<dyn PageSource>,
    decoder: ItemDecoder<T>,
    policy: DecodePolicy,
}

impl<T> Paginated<T> {
    pub fn new(source: impl PageSource + 'static, decoder: ItemDecoder<T>, policy: DecodePolicy) -> Self {
        Self {
            source: Box::new(source),
            decoder,
            policy,
        }
    }

    /// Fetches and decodes the page starting at `cursor`.
    pub async fn next_page(&self, cursor: &Cursor) -> Result<Page<T>> {
        let page = self.source.fetch_page(cursor).await?;
        decode_page(&self.decoder, self.policy, page)
    }
}

/// Query pages of a configured [`QueryBuilder`].
pub struct QueryPages<T> {
    store: Arc<dyn Store>,
    builder: QueryBuilder<T>,
}

impl<T> QueryPages<T> {
    pub fn new(store: Arc<dyn Store>, builder: QueryBuilder<T>) -> Self {
        Self { store, builder }
    }
}

#[async_trait]
impl<T: 'static> PageSource for QueryPages<T> {
    async fn fetch_page(&self, cursor: &Cursor) -> Result<RawPage> {
        let request = self.builder.build(cursor);
        tracing::debug!(
            table = %request.table_name,
            resumed = request.exclusive_start_key.is_some(),
            "Querying page"
        );
        self.store.query(request).await
    }
}

/// Scan pages of a configured [`ScanBuilder`].
pub struct ScanPages<T> {
    store: Arc<dyn Store>,
    builder: ScanBuilder<T>,
}

impl<T> ScanPages<T> {
    pub fn new(store: Arc<dyn Store>, builder: ScanBuilder<T>) -> Self {
        Self { store, builder }
    }
}

#[async_trait]
impl<T: 'static> PageSource for ScanPages<T> {
    async fn fetch_page(&self, cursor: &Cursor) -> Result<RawPage> {
        let request = self.builder.build(cursor);
        tracing::debug!(
            table = %request.table_name,
            resumed = request.exclusive_start_key.is_some(),
            "Scanning page"
        );
        self.store.scan(request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use tokio_stream::StreamExt;

    use super::*;
    use crate::attributes::{get_number, AttributeValue, Item};
    use crate::storage::{DecodeError, StoreError};

    fn item(n: i64) -> Item {
        Item::from([("n".to_string(), AttributeValue::N(n.to_string()))])
    }

    fn bad_item() -> Item {
        Item::from([("n".to_string(), AttributeValue::S("oops".to_string()))])
    }

    fn cursor(n: i64) -> Cursor {
        Cursor::from(item(n))
    }

    fn decoder() -> ItemDecoder<i64> {
        Arc::new(|item: &Item| get_number::<i64>(item, "n"))
    }

    /// Serves pre-scripted responses in order and records the cursors asked for.
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<RawPage>>>,
        calls: AtomicUsize,
        cursors: Mutex<Vec<Cursor>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<RawPage>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
                cursors: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageSource for Arc<ScriptedSource> {
        async fn fetch_page(&self, cursor: &Cursor) -> Result<RawPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.cursors.lock().unwrap().push(cursor.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Page::last(Vec::new())))
        }
    }

    /// A source whose cursor never becomes empty.
    struct EndlessSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageSource for Arc<EndlessSource> {
        async fn fetch_page(&self, _cursor: &Cursor) -> Result<RawPage> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as i64;
            Ok(Page::new(vec![item(n)], cursor(n)))
        }
    }

    fn three_pages() -> Vec<Result<RawPage>> {
        vec![
            Ok(Page::new(vec![item(1), item(2)], cursor(2))),
            Ok(Page::new(vec![item(3)], cursor(3))),
            Ok(Page::last(vec![item(4), item(5)])),
        ]
    }

    #[test]
    fn test_paginator_starts_with_fetch_from_empty_cursor() {
        let mut paginator = Paginator::new(decoder(), DecodePolicy::Skip);
        assert_eq!(paginator.step(), Step::Fetch(Cursor::empty()));
    }

    #[test]
    fn test_paginator_drains_page_before_next_fetch() {
        let mut paginator = Paginator::new(decoder(), DecodePolicy::Skip);

        paginator
            .accept(Page::new(vec![item(1), item(2)], cursor(2)))
            .unwrap();

        assert_eq!(paginator.step(), Step::Item(1));
        assert_eq!(paginator.step(), Step::Item(2));
        assert_eq!(paginator.step(), Step::Fetch(cursor(2)));

        paginator.accept(Page::last(vec![item(3)])).unwrap();

        assert_eq!(paginator.step(), Step::Item(3));
        assert_eq!(paginator.step(), Step::Done);
        assert_eq!(paginator.step(), Step::Done);
        assert_eq!(paginator.pages(), 2);
    }

    #[test]
    fn test_paginator_empty_page_with_cursor_keeps_going() {
        let mut paginator = Paginator::new(decoder(), DecodePolicy::Skip);

        paginator.accept(Page::new(Vec::new(), cursor(7))).unwrap();

        assert_eq!(paginator.step(), Step::Fetch(cursor(7)));
    }

    #[test]
    fn test_decode_page_skips_undecodable_items() {
        let page = Page::last(vec![item(1), bad_item(), item(3)]);

        let decoded = decode_page(&decoder(), DecodePolicy::Skip, page).unwrap();

        assert_eq!(decoded.items, vec![1, 3]);
    }

    #[test]
    fn test_decode_page_fails_fast_when_configured() {
        let page = Page::last(vec![item(1), bad_item()]);

        let result = decode_page(&decoder(), DecodePolicy::Fail, page);

        assert!(matches!(
            result,
            Err(StoreError::Decode(DecodeError::InvalidType { .. }))
        ));
    }

    #[test]
    fn test_paginator_halts_on_decode_failure() {
        let mut paginator = Paginator::new(decoder(), DecodePolicy::Fail);

        assert!(paginator
            .accept(Page::new(vec![bad_item()], cursor(1)))
            .is_err());
        assert_eq!(paginator.step(), Step::Done);
    }

    #[tokio::test]
    async fn test_stream_yields_all_pages_in_order_with_one_call_per_page() {
        let source = ScriptedSource::new(three_pages());
        let stream = paginate(
            Arc::clone(&source),
            Paginator::new(decoder(), DecodePolicy::Skip),
        );

        let items: Vec<i64> = stream.collect::<Result<Vec<_>>>().await.unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(source.calls(), 3);
        assert_eq!(
            *source.cursors.lock().unwrap(),
            vec![Cursor::empty(), cursor(2), cursor(3)]
        );
    }

    #[tokio::test]
    async fn test_stream_is_cold() {
        let source = ScriptedSource::new(three_pages());
        let stream = paginate(
            Arc::clone(&source),
            Paginator::new(decoder(), DecodePolicy::Skip),
        );

        assert_eq!(source.calls(), 0);
        drop(stream);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_stream_fetches_only_when_page_is_consumed() {
        let source = ScriptedSource::new(three_pages());
        let stream = paginate(
            Arc::clone(&source),
            Paginator::new(decoder(), DecodePolicy::Skip),
        );
        tokio::pin!(stream);

        assert_eq!(stream.next().await, Some(Ok(1)));
        assert_eq!(source.calls(), 1);
        assert_eq!(stream.next().await, Some(Ok(2)));
        assert_eq!(source.calls(), 1);
        assert_eq!(stream.next().await, Some(Ok(3)));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_stream_stops_fetching() {
        let source = ScriptedSource::new(three_pages());
        let first: Vec<i64> = paginate(
            Arc::clone(&source),
            Paginator::new(decoder(), DecodePolicy::Skip),
        )
        .take(2)
        .collect::<Result<Vec<_>>>()
        .await
        .unwrap();

        assert_eq!(first, vec![1, 2]);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_stream_skips_undecodable_items() {
        let source = ScriptedSource::new(vec![
            Ok(Page::new(vec![item(1), bad_item()], cursor(1))),
            Ok(Page::last(vec![bad_item(), item(2)])),
        ]);
        let items: Vec<i64> = paginate(source, Paginator::new(decoder(), DecodePolicy::Skip))
            .collect::<Result<Vec<_>>>()
            .await
            .unwrap();

        assert_eq!(items, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_stream_ends_after_fetch_failure() {
        let source = ScriptedSource::new(vec![
            Ok(Page::new(vec![item(1)], cursor(1))),
            Err(StoreError::ThroughputExceeded("slow down".to_string())),
            Ok(Page::last(vec![item(2)])),
        ]);
        let results: Vec<Result<i64>> = paginate(
            Arc::clone(&source),
            Paginator::new(decoder(), DecodePolicy::Skip),
        )
        .collect()
        .await;

        assert_eq!(
            results,
            vec![
                Ok(1),
                Err(StoreError::ThroughputExceeded("slow down".to_string()))
            ]
        );
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_stream_has_no_page_cap() {
        let source = Arc::new(EndlessSource {
            calls: AtomicUsize::new(0),
        });
        let items: Vec<i64> = paginate(
            Arc::clone(&source),
            Paginator::new(decoder(), DecodePolicy::Skip),
        )
        .take(1_000)
        .collect::<Result<Vec<_>>>()
        .await
        .unwrap();

        assert_eq!(items.len(), 1_000);
        assert_eq!(items[999], 999);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1_000);
    }

    #[tokio::test]
    async fn test_paginated_next_page() {
        let source = ScriptedSource::new(vec![
            Ok(Page::new(vec![item(1), bad_item()], cursor(1))),
            Ok(Page::last(vec![item(2)])),
        ]);
        let paginated = Paginated::new(Arc::clone(&source), decoder(), DecodePolicy::Skip);

        let first = paginated.next_page(&Cursor::empty()).await.unwrap();
        assert_eq!(first.items, vec![1]);
        assert!(first.has_more());

        let second = paginated.next_page(&first.cursor).await.unwrap();
        assert_eq!(second.items, vec![2]);
        assert!(!second.has_more());

        assert_eq!(
            *source.cursors.lock().unwrap(),
            vec![Cursor::empty(), cursor(1)]
        );
    }
}
