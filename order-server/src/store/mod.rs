//! Order store contract
//!
//! [`OrderStore`] is the keyed store behind every handler: orders are
//! partitioned by `orderDate` and sorted by `orderNum`, with a secondary
//! index on the credit flag and one counter record per date.
//!
//! | Operation | Purpose |
//! |-----------|---------|
//! | `get` / `put` / `insert` / `delete` | point access by [`OrderKey`] |
//! | `query_date` | one date partition, either direction, limited |
//! | `query_credit` | credit-status index, ordered by key |
//! | `scan` | filtered full scan, paginated |
//! | `settle_credit` | flip `creditStatus` 1 → 0 |
//! | `read_counter` / `compare_and_swap_counter` | per-date order number counter |
//!
//! Implementations: [`RedbOrderStore`] (embedded, durable) and
//! [`MemoryOrderStore`] (tests and local runs).

pub mod memory;
pub mod redb;

pub use memory::MemoryOrderStore;
pub use self::redb::RedbOrderStore;

use async_trait::async_trait;
use shared::{CreditStatus, Order, OrderDate, OrderKey};
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not serve the call (I/O, transaction, injected fault)
    #[error("Store backend error: {0}")]
    Backend(String),

    /// A stored record could not be decoded
    #[error("Corrupt record {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// Conditional insert found an existing record
    #[error("Order already exists: {0}")]
    AlreadyExists(OrderKey),
}

impl From<::redb::DatabaseError> for StoreError {
    fn from(e: ::redb::DatabaseError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<::redb::TransactionError> for StoreError {
    fn from(e: ::redb::TransactionError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<::redb::TableError> for StoreError {
    fn from(e: ::redb::TableError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<::redb::StorageError> for StoreError {
    fn from(e: ::redb::StorageError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<::redb::CommitError> for StoreError {
    fn from(e: ::redb::CommitError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Conjunction of an inclusive date range and an optional credit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanFilter {
    pub date_from: OrderDate,
    pub date_to: OrderDate,
    pub credit_status: Option<CreditStatus>,
}

impl ScanFilter {
    /// Every order dated within `[from, to]`
    pub fn date_range(date_from: OrderDate, date_to: OrderDate) -> Self {
        Self {
            date_from,
            date_to,
            credit_status: None,
        }
    }

    pub fn with_credit_status(mut self, status: CreditStatus) -> Self {
        self.credit_status = Some(status);
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        order.order_date >= self.date_from
            && order.order_date <= self.date_to
            && self.credit_status.is_none_or(|s| s == order.credit_status)
    }
}

/// One page of a filtered scan
#[derive(Debug, Clone, Default)]
pub struct ScanPage {
    pub orders: Vec<Order>,
    /// Resume point for the next page; `None` once the scan is exhausted
    pub last_key: Option<OrderKey>,
}

/// Keyed order store
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get(&self, key: OrderKey) -> StoreResult<Option<Order>>;

    /// Unconditional upsert
    async fn put(&self, order: &Order) -> StoreResult<()>;

    /// Insert only if the key is absent, otherwise [`StoreError::AlreadyExists`]
    async fn insert(&self, order: &Order) -> StoreResult<()>;

    /// Remove and return the previous record
    async fn delete(&self, key: OrderKey) -> StoreResult<Option<Order>>;

    /// Orders of one date sorted by `orderNum`
    async fn query_date(
        &self,
        date: OrderDate,
        descending: bool,
        limit: usize,
    ) -> StoreResult<Vec<Order>>;

    /// Orders carrying `status`, sorted by `(orderDate, orderNum)`
    async fn query_credit(&self, status: CreditStatus, ascending: bool)
    -> StoreResult<Vec<Order>>;

    /// One page of orders matching `filter`, in key order, strictly after `start_after`
    ///
    /// A page may hold fewer than `page_size` matches (even zero) while
    /// `last_key` is still set; callers keep paging until it is `None`.
    async fn scan(
        &self,
        filter: &ScanFilter,
        start_after: Option<OrderKey>,
        page_size: usize,
    ) -> StoreResult<ScanPage>;

    /// Mark the order settled, returning the updated record
    async fn settle_credit(&self, key: OrderKey) -> StoreResult<Option<Order>>;

    /// Current value of the per-date order number counter
    async fn read_counter(&self, date: OrderDate) -> StoreResult<Option<u32>>;

    /// Set the counter to `new` only if it currently equals `expected`
    /// (`None` = no counter yet). Returns whether the swap happened.
    async fn compare_and_swap_counter(
        &self,
        date: OrderDate,
        expected: Option<u32>,
        new: u32,
    ) -> StoreResult<bool>;
}
