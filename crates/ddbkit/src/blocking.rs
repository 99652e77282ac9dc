//! Blocking table façade.
//!
//! [`BlockingTable`] exposes the operations of [`Table`] as plain blocking
//! calls. It owns a small tokio runtime and blocks the calling thread on each
//! store call. When the caller is itself inside a tokio runtime, the call is
//! moved to a scoped thread first, so the façade also works from async code.
//!
//! Queries and scans return [`BlockingItems`], an `Iterator` over the same
//! pagination state machine the async streams use.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};

use ddbkit_core::builder::{QueryBuilder, ScanBuilder, UpdateBuilder};
use ddbkit_core::definition::TableDefinition;
use ddbkit_core::pagination::{PageSource, Paginated, Paginator, Step};
use ddbkit_core::storage::{Cursor, Page, Result, Store, StoreError};

use crate::table::Table;

/// Runtime that drives the store calls of the blocking façade.
///
/// Dropping it never blocks, so façades can be dropped inside async code.
struct IoRuntime {
    runtime: Option<Runtime>,
}

impl IoRuntime {
    fn new() -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("ddbkit-io")
            .enable_all()
            .build()
            .map_err(|e| StoreError::Runtime(format!("Failed to start I/O runtime: {e}")))?;
        Ok(Self::from_runtime(runtime))
    }

    fn from_runtime(runtime: Runtime) -> Self {
        Self {
            runtime: Some(runtime),
        }
    }

    /// Runs `future` to completion on the I/O runtime.
    ///
    /// Inside an ambient tokio runtime the current thread must not block on
    /// another runtime, so the wait happens on a scoped thread instead.
    fn block_on<F, R>(&self, future: F) -> Result<R>
    where
        F: Future<Output = Result<R>> + Send,
        R: Send,
    {
        let Some(runtime) = &self.runtime else {
            return Err(StoreError::Runtime("I/O runtime is shut down".to_string()));
        };

        if Handle::try_current().is_err() {
            return runtime.block_on(future);
        }

        std::thread::scope(|scope| {
            scope
                .spawn(|| runtime.block_on(future))
                .join()
                .map_err(|_| StoreError::Runtime("I/O thread panicked".to_string()))?
        })
    }
}

impl Drop for IoRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Blocking access to one table of `T` values.
pub struct BlockingTable<T> {
    inner: Table<T>,
    io: Arc<IoRuntime>,
}

impl<T> Clone for BlockingTable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            io: Arc::clone(&self.io),
        }
    }
}

impl<T: Send + Sync + 'static> BlockingTable<T> {
    pub fn new(store: Arc<dyn Store>, definition: TableDefinition<T>) -> Result<Self> {
        Ok(Self::wrap(Table::new(store, definition), IoRuntime::new()?))
    }

    /// Wraps an async façade, running its calls on `runtime`.
    ///
    /// The runtime is shut down in the background when the last façade or
    /// iterator using it is dropped.
    pub fn with_runtime(inner: Table<T>, runtime: Runtime) -> Self {
        Self::wrap(inner, IoRuntime::from_runtime(runtime))
    }

    fn wrap(inner: Table<T>, io: IoRuntime) -> Self {
        Self {
            inner,
            io: Arc::new(io),
        }
    }

    /// Connects to the DynamoDB target described by `config`.
    #[cfg(feature = "dynamodb")]
    pub fn connect(
        config: &crate::config::StoreConfig,
        definition: TableDefinition<T>,
    ) -> Result<Self> {
        let io = IoRuntime::new()?;
        let store =
            io.block_on(async { Ok(crate::dynamodb::DynamoDbStore::from_config(config).await) })?;
        Ok(Self::wrap(Table::new(Arc::new(store), definition), io))
    }

    /// The async façade this table delegates to.
    pub fn as_async(&self) -> &Table<T> {
        &self.inner
    }

    pub fn definition(&self) -> &Arc<TableDefinition<T>> {
        self.inner.definition()
    }

    pub fn create(&self) -> Result<()> {
        self.io.block_on(self.inner.create())
    }

    pub fn delete_table(&self) -> Result<()> {
        self.io.block_on(self.inner.delete_table())
    }

    pub fn recreate(&self) -> Result<()> {
        self.io.block_on(self.inner.recreate())
    }

    /// Iterates every item matching the configured query, across all pages.
    ///
    /// Nothing is sent until the first call to `next`.
    pub fn query<F>(&self, configure: F) -> BlockingItems<T>
    where
        F: FnOnce(&mut QueryBuilder<T>),
    {
        let (source, paginator) = self.inner.prepare_query(configure);
        BlockingItems::new(Box::new(source), paginator, Arc::clone(&self.io))
    }

    pub fn query_pages<F>(&self, configure: F) -> BlockingPaginated<T>
    where
        F: FnOnce(&mut QueryBuilder<T>),
    {
        BlockingPaginated {
            inner: self.inner.query_pages(configure),
            io: Arc::clone(&self.io),
        }
    }

    /// Iterates every item matching the configured scan, across all pages.
    pub fn scan<F>(&self, configure: F) -> BlockingItems<T>
    where
        F: FnOnce(&mut ScanBuilder<T>),
    {
        let (source, paginator) = self.inner.prepare_scan(configure);
        BlockingItems::new(Box::new(source), paginator, Arc::clone(&self.io))
    }

    pub fn scan_pages<F>(&self, configure: F) -> BlockingPaginated<T>
    where
        F: FnOnce(&mut ScanBuilder<T>),
    {
        BlockingPaginated {
            inner: self.inner.scan_pages(configure),
            io: Arc::clone(&self.io),
        }
    }

    pub fn put(&self, value: &T) -> Result<()> {
        self.io.block_on(self.inner.put(value))
    }

    pub fn get(&self, key: &T) -> Result<Option<T>> {
        self.io.block_on(self.inner.get(key))
    }

    pub fn get_many<'a, I>(&self, keys: I) -> Result<Vec<T>>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let keys: Vec<&T> = keys.into_iter().collect();
        self.io.block_on(self.inner.get_many(keys))
    }

    pub fn update<F>(&self, configure: F) -> Result<()>
    where
        F: FnOnce(&mut UpdateBuilder),
    {
        self.io.block_on(self.inner.update(configure))
    }

    pub fn delete(&self, key: &T) -> Result<()> {
        self.io.block_on(self.inner.delete(key))
    }
}

/// Lazy, single-pass iterator over the items of a query or scan.
///
/// A fetch or decode failure is returned once; the iterator is exhausted
/// afterwards.
pub struct BlockingItems<T> {
    source: Box<dyn PageSource>,
    paginator: Paginator<T>,
    io: Arc<IoRuntime>,
}

impl<T> BlockingItems<T> {
    fn new(source: Box<dyn PageSource>, paginator: Paginator<T>, io: Arc<IoRuntime>) -> Self {
        Self {
            source,
            paginator,
            io,
        }
    }
}

impl<T> Iterator for BlockingItems<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.paginator.step() {
                Step::Item(item) => return Some(Ok(item)),
                Step::Done => return None,
                Step::Fetch(cursor) => {
                    let fetched = self.io.block_on(self.source.fetch_page(&cursor));
                    let accepted = fetched.and_then(|page| self.paginator.accept(page));
                    if let Err(err) = accepted {
                        self.paginator.halt();
                        return Some(Err(err));
                    }
                }
            }
        }
    }
}

/// Blocking page-at-a-time access to a query or scan.
pub struct BlockingPaginated<T> {
    inner: Paginated<T>,
    io: Arc<IoRuntime>,
}

impl<T: Send> BlockingPaginated<T> {
    /// Fetches and decodes the page starting at `cursor`.
    pub fn next_page(&self, cursor: &Cursor) -> Result<Page<T>> {
        self.io.block_on(self.inner.next_page(cursor))
    }
}
