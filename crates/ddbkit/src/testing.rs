//! Shared test fixtures.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use ddbkit_core::attributes::{get_number, get_string, AttributeValue, Item};
use ddbkit_core::definition::{KeyAttribute, TableDefinition};
use ddbkit_core::request::{
    BatchGetRequest, CreateTableRequest, DeleteRequest, DeleteTableRequest, GetRequest,
    PutRequest, QueryRequest, ScanRequest, UpdateRequest,
};
use ddbkit_core::storage::{BatchGetOutput, Cursor, Page, RawPage, Result, Store};

use crate::inmemory::InMemoryStore;
use crate::table::Table;

pub const RANKINGS: &str = "user_rankings";

#[derive(Debug, Clone, PartialEq)]
pub struct UserRanking {
    pub user_id: String,
    pub score: i64,
}

impl UserRanking {
    pub fn new(user_id: &str, score: i64) -> Self {
        Self {
            user_id: user_id.to_string(),
            score,
        }
    }

    /// A value carrying only the key, for gets and deletes.
    pub fn key(user_id: &str) -> Self {
        Self::new(user_id, 0)
    }
}

pub fn ranking_item(user_id: &str, score: i64) -> Item {
    Item::from([
        ("userId".to_string(), AttributeValue::S(user_id.to_string())),
        ("score".to_string(), AttributeValue::N(score.to_string())),
    ])
}

pub fn rankings_definition() -> TableDefinition<UserRanking> {
    TableDefinition::with_fns(
        RANKINGS,
        [KeyAttribute::string("userId")],
        |ranking: &UserRanking| ranking_item(&ranking.user_id, ranking.score),
        |item: &Item| {
            Ok(UserRanking {
                user_id: get_string(item, "userId")?,
                score: get_number(item, "score")?,
            })
        },
    )
}

/// A rankings table on a fresh in-memory store, created and seeded with
/// `("a", 10)`, `("b", 20)` and `("c", 20)`.
pub async fn seeded_rankings() -> Table<UserRanking> {
    let table = Table::new(Arc::new(InMemoryStore::new()), rankings_definition());
    table.create().await.unwrap();
    for (user_id, score) in [("a", 10), ("b", 20), ("c", 20)] {
        table.put(&UserRanking::new(user_id, score)).await.unwrap();
    }
    table
}

pub fn cursor(user_id: &str) -> Cursor {
    Cursor::from(Item::from([(
        "userId".to_string(),
        AttributeValue::S(user_id.to_string()),
    )]))
}

/// A `Store` that serves pre-scripted pages and batch responses in order and
/// records every request it receives.
#[derive(Default)]
pub struct ScriptedStore {
    pages: Mutex<VecDeque<Result<RawPage>>>,
    batches: Mutex<VecDeque<Result<BatchGetOutput>>>,
    pub queries: Mutex<Vec<QueryRequest>>,
    pub scans: Mutex<Vec<ScanRequest>>,
    pub batch_gets: Mutex<Vec<BatchGetRequest>>,
    pub updates: Mutex<Vec<UpdateRequest>>,
    calls: AtomicUsize,
}

impl ScriptedStore {
    pub fn with_pages(pages: Vec<Result<RawPage>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Self::default()
        }
    }

    pub fn with_batches(batches: Vec<Result<BatchGetOutput>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            ..Self::default()
        }
    }

    /// Total number of store calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_page(&self) -> Result<RawPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Page::last(Vec::new())))
    }
}

#[async_trait]
impl Store for ScriptedStore {
    async fn query(&self, request: QueryRequest) -> Result<RawPage> {
        self.queries.lock().unwrap().push(request);
        self.next_page()
    }

    async fn scan(&self, request: ScanRequest) -> Result<RawPage> {
        self.scans.lock().unwrap().push(request);
        self.next_page()
    }

    async fn get_item(&self, _request: GetRequest) -> Result<Option<Item>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }

    async fn batch_get_item(&self, request: BatchGetRequest) -> Result<BatchGetOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batch_gets.lock().unwrap().push(request);
        self.batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(BatchGetOutput::default()))
    }

    async fn put_item(&self, _request: PutRequest) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_item(&self, request: UpdateRequest) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.updates.lock().unwrap().push(request);
        Ok(())
    }

    async fn delete_item(&self, _request: DeleteRequest) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create_table(&self, _request: CreateTableRequest) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_table(&self, _request: DeleteTableRequest) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
