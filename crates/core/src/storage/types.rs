use crate::attributes::Item;

/// Continuation key returned by a paginated response.
///
/// The empty cursor is both the starting position and the terminal
/// "no more pages" signal. A non-empty cursor means more data may exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor(Item);

impl Cursor {
    /// The empty cursor.
    pub fn empty() -> Self {
        Self(Item::new())
    }

    /// Returns `true` when no further page should be requested.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_item(&self) -> &Item {
        &self.0
    }

    pub fn into_item(self) -> Item {
        self.0
    }
}

impl From<Item> for Cursor {
    fn from(item: Item) -> Self {
        Self(item)
    }
}

impl From<Option<Item>> for Cursor {
    fn from(item: Option<Item>) -> Self {
        Self(item.unwrap_or_default())
    }
}

/// One page of results plus the cursor to resume from.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<I> {
    pub items: Vec<I>,
    pub cursor: Cursor,
}

impl<I> Page<I> {
    pub fn new(items: Vec<I>, cursor: Cursor) -> Self {
        Self { items, cursor }
    }

    /// A page with no continuation.
    pub fn last(items: Vec<I>) -> Self {
        Self::new(items, Cursor::empty())
    }

    /// Returns `true` if another page may follow this one.
    pub fn has_more(&self) -> bool {
        !self.cursor.is_empty()
    }
}

/// A page of undecoded items, as returned by the store.
pub type RawPage = Page<Item>;

/// Result of a single BatchGetItem call for one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchGetOutput {
    pub items: Vec<Item>,
    /// Keys the store did not process in this call.
    pub unprocessed_keys: Vec<Item>,
}
