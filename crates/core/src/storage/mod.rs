mod error;
mod traits;
mod types;

pub use error::{DecodeError, Result, StoreError};
pub use traits::Store;
pub use types::{BatchGetOutput, Cursor, Page, RawPage};
