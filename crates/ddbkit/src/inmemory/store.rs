//! In-memory store implementation.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use ddbkit_core::attributes::{AttributeValue, Item};
use ddbkit_core::builder::MAX_BATCH_GET_KEYS;
use ddbkit_core::definition::{AttributeType, KeyAttribute};
use ddbkit_core::request::{
    BatchGetRequest, CreateTableRequest, DeleteRequest, DeleteTableRequest, GetRequest,
    PutRequest, QueryRequest, ScanRequest, UpdateRequest,
};
use ddbkit_core::storage::{BatchGetOutput, Cursor, Page, RawPage, Result, Store, StoreError};

use super::expression::{apply_update, matches, parse_equalities, parse_update};

/// One component of a primary key, ordered the way DynamoDB orders keys.
#[derive(Debug, Clone)]
enum KeyPart {
    String(String),
    Number(f64),
    Binary(Vec<u8>),
}

impl KeyPart {
    fn rank(&self) -> u8 {
        match self {
            KeyPart::String(_) => 0,
            KeyPart::Number(_) => 1,
            KeyPart::Binary(_) => 2,
        }
    }
}

impl Ord for KeyPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (KeyPart::String(a), KeyPart::String(b)) => a.cmp(b),
            (KeyPart::Number(a), KeyPart::Number(b)) => a.total_cmp(b),
            (KeyPart::Binary(a), KeyPart::Binary(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for KeyPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for KeyPart {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyPart {}

type PrimaryKey = Vec<KeyPart>;

fn invalid(message: impl Into<String>) -> StoreError {
    StoreError::InvalidRequest(message.into())
}

fn table_not_found(table_name: &str) -> StoreError {
    StoreError::ResourceNotFound(format!("Table not found: {table_name}"))
}

#[derive(Debug, Clone)]
struct MemoryTable {
    key_attributes: Vec<KeyAttribute>,
    items: BTreeMap<PrimaryKey, Item>,
}

impl MemoryTable {
    fn new(key_attributes: Vec<KeyAttribute>) -> Self {
        Self {
            key_attributes,
            items: BTreeMap::new(),
        }
    }

    /// Extracts the primary key of a full item.
    fn primary_key(&self, item: &Item) -> Result<PrimaryKey> {
        self.key_attributes
            .iter()
            .map(|key| {
                let value = item
                    .get(&key.name)
                    .ok_or_else(|| invalid(format!("Missing key attribute: {}", key.name)))?;
                key_part(key, value)
            })
            .collect()
    }

    /// Like [`Self::primary_key`], but `key` must hold nothing else.
    fn exact_key(&self, key: &Item) -> Result<PrimaryKey> {
        if key.len() != self.key_attributes.len() {
            return Err(invalid(
                "The provided key element does not match the schema",
            ));
        }
        self.primary_key(key)
    }

    /// The key attributes of `item`, as returned in a cursor.
    fn key_item(&self, item: &Item) -> Item {
        self.key_attributes
            .iter()
            .filter_map(|key| {
                item.get(&key.name)
                    .map(|value| (key.name.clone(), value.clone()))
            })
            .collect()
    }

    /// Evaluates one page: skip past `start`, take `limit` items, then filter.
    fn page<'a>(
        &self,
        candidates: impl Iterator<Item = (&'a PrimaryKey, &'a Item)>,
        forward: bool,
        start: Option<&Item>,
        limit: Option<i32>,
        filter: &[(String, AttributeValue)],
    ) -> Result<RawPage> {
        let start = start.map(|item| self.exact_key(item)).transpose()?;
        let limit = match limit {
            Some(limit) if limit < 1 => return Err(invalid("Limit must be at least 1")),
            Some(limit) => limit as usize,
            None => usize::MAX,
        };

        let mut remaining = candidates
            .skip_while(|(key, _)| match &start {
                Some(start) if forward => *key <= start,
                Some(start) => *key >= start,
                None => false,
            })
            .peekable();

        let mut evaluated = Vec::new();
        while evaluated.len() < limit {
            match remaining.next() {
                Some((_, item)) => evaluated.push(item),
                None => break,
            }
        }

        let cursor = match (remaining.peek(), evaluated.last()) {
            (Some(_), Some(last)) => Cursor::from(self.key_item(last)),
            _ => Cursor::empty(),
        };
        let items = evaluated
            .into_iter()
            .filter(|item| matches(item, filter))
            .cloned()
            .collect();

        Ok(Page::new(items, cursor))
    }
}

fn key_part(key: &KeyAttribute, value: &AttributeValue) -> Result<KeyPart> {
    let mismatch = || {
        invalid(format!(
            "Type mismatch for key attribute {}: expected {:?}",
            key.name, key.attribute_type
        ))
    };
    match (key.attribute_type, value) {
        (AttributeType::String, AttributeValue::S(s)) => Ok(KeyPart::String(s.clone())),
        (AttributeType::Number, AttributeValue::N(n)) => n
            .parse()
            .map(KeyPart::Number)
            .map_err(|_| invalid(format!("Invalid number for key attribute {}", key.name))),
        (AttributeType::Binary, AttributeValue::B(b)) => Ok(KeyPart::Binary(b.as_ref().to_vec())),
        _ => Err(mismatch()),
    }
}

fn filter_equalities(
    expression: Option<&str>,
    names: &HashMap<String, String>,
    values: &Item,
) -> Result<Vec<(String, AttributeValue)>> {
    match expression {
        Some(expression) => parse_equalities(expression, names, values),
        None => Ok(Vec::new()),
    }
}

/// In-memory storage backend for testing.
///
/// Tables live in a `HashMap` wrapped in `Arc<RwLock<_>>`; clones share
/// data. Items are kept in primary key order, so queries and scans page
/// through them deterministically. Data is lost when the last clone is
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<String, MemoryTable>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items currently stored in `table_name`.
    pub async fn item_count(&self, table_name: &str) -> Result<usize> {
        let tables = self.tables.read().await;
        tables
            .get(table_name)
            .map(|table| table.items.len())
            .ok_or_else(|| table_not_found(table_name))
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn query(&self, request: QueryRequest) -> Result<RawPage> {
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or_else(|| table_not_found(&request.table_name))?;

        let key_condition = request
            .key_condition_expression
            .as_deref()
            .ok_or_else(|| invalid("Query requires a key condition expression"))?;
        let key_equalities = parse_equalities(
            key_condition,
            &request.expression_attribute_names,
            &request.expression_attribute_values,
        )?;
        let partition_key = table
            .key_attributes
            .first()
            .map(|key| key.name.as_str())
            .unwrap_or_default();
        if !key_equalities.iter().any(|(name, _)| name == partition_key) {
            return Err(invalid(format!(
                "Query condition missed key schema element: {partition_key}"
            )));
        }
        let filter = filter_equalities(
            request.filter_expression.as_deref(),
            &request.expression_attribute_names,
            &request.expression_attribute_values,
        )?;

        let candidates = table
            .items
            .iter()
            .filter(|(_, item)| matches(item, &key_equalities));

        if request.scan_index_forward {
            table.page(
                candidates,
                true,
                request.exclusive_start_key.as_ref(),
                request.limit,
                &filter,
            )
        } else {
            let candidates: Vec<_> = candidates.collect();
            table.page(
                candidates.into_iter().rev(),
                false,
                request.exclusive_start_key.as_ref(),
                request.limit,
                &filter,
            )
        }
    }

    async fn scan(&self, request: ScanRequest) -> Result<RawPage> {
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or_else(|| table_not_found(&request.table_name))?;

        let filter = filter_equalities(
            request.filter_expression.as_deref(),
            &request.expression_attribute_names,
            &request.expression_attribute_values,
        )?;

        table.page(
            table.items.iter(),
            true,
            request.exclusive_start_key.as_ref(),
            request.limit,
            &filter,
        )
    }

    async fn get_item(&self, request: GetRequest) -> Result<Option<Item>> {
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or_else(|| table_not_found(&request.table_name))?;

        let key = table.exact_key(&request.key)?;
        Ok(table.items.get(&key).cloned())
    }

    async fn batch_get_item(&self, request: BatchGetRequest) -> Result<BatchGetOutput> {
        if request.keys.is_empty() || request.keys.len() > MAX_BATCH_GET_KEYS {
            return Err(invalid(format!(
                "BatchGetItem accepts between 1 and {MAX_BATCH_GET_KEYS} keys"
            )));
        }

        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or_else(|| table_not_found(&request.table_name))?;

        let mut seen = Vec::with_capacity(request.keys.len());
        let mut items = Vec::new();
        for key in &request.keys {
            let key = table.exact_key(key)?;
            if seen.contains(&key) {
                return Err(invalid("Provided list of item keys contains duplicates"));
            }
            if let Some(item) = table.items.get(&key) {
                items.push(item.clone());
            }
            seen.push(key);
        }

        Ok(BatchGetOutput {
            items,
            unprocessed_keys: Vec::new(),
        })
    }

    async fn put_item(&self, request: PutRequest) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&request.table_name)
            .ok_or_else(|| table_not_found(&request.table_name))?;

        let key = table.primary_key(&request.item)?;
        table.items.insert(key, request.item);
        Ok(())
    }

    async fn update_item(&self, request: UpdateRequest) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&request.table_name)
            .ok_or_else(|| table_not_found(&request.table_name))?;

        let key = table.exact_key(&request.key)?;
        let ops = parse_update(
            &request.update_expression,
            &request.expression_attribute_names,
            &request.expression_attribute_values,
        )?;
        if let Some(op) = ops
            .iter()
            .find(|op| request.key.contains_key(op.attribute()))
        {
            return Err(invalid(format!(
                "Cannot update attribute {}. This attribute is part of the key",
                op.attribute()
            )));
        }

        let mut item = table
            .items
            .get(&key)
            .cloned()
            .unwrap_or_else(|| request.key.clone());
        apply_update(&mut item, ops)?;
        table.items.insert(key, item);
        Ok(())
    }

    async fn delete_item(&self, request: DeleteRequest) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&request.table_name)
            .ok_or_else(|| table_not_found(&request.table_name))?;

        let key = table.exact_key(&request.key)?;
        table.items.remove(&key);
        Ok(())
    }

    async fn create_table(&self, request: CreateTableRequest) -> Result<()> {
        if request.key_attributes.is_empty() || request.key_attributes.len() > 2 {
            return Err(invalid("A table needs a partition key and at most one sort key"));
        }

        let mut tables = self.tables.write().await;
        if tables.contains_key(&request.table_name) {
            return Err(StoreError::Service(format!(
                "Table already exists: {}",
                request.table_name
            )));
        }
        tables.insert(
            request.table_name.clone(),
            MemoryTable::new(request.key_attributes),
        );
        tracing::info!(table = %request.table_name, "Created in-memory table");
        Ok(())
    }

    async fn delete_table(&self, request: DeleteTableRequest) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.remove(&request.table_name).is_none() {
            return Err(table_not_found(&request.table_name));
        }
        tracing::info!(table = %request.table_name, "Deleted in-memory table");
        Ok(())
    }
}
