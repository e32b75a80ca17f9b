//! redb-based order store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `(order_date, order_num)` | JSON `Order` | Primary records |
//! | `credit_index` | `(credit_flag, order_date, order_num)` | `()` | Credit status index |
//! | `order_counters` | `order_date` | `u32` | Per-date order number counter |
//!
//! Dates are stored in their `YYYY-MM-DD` form, so byte order of the key is
//! chronological order.
//!
//! # Atomicity
//!
//! Each mutation (including index maintenance) runs in a single write
//! transaction. redb admits one writer at a time, which makes
//! [`compare_and_swap_counter`](OrderStore::compare_and_swap_counter) and the
//! conditional [`insert`](OrderStore::insert) atomic.

use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::{CreditStatus, Order, OrderDate, OrderKey};

use super::{OrderStore, ScanFilter, ScanPage, StoreError, StoreResult};

/// Primary table: key = (order_date, order_num), value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<(&str, u32), &[u8]> = TableDefinition::new("orders");

/// Secondary index: key = (credit_flag, order_date, order_num), value = empty
const CREDIT_INDEX_TABLE: TableDefinition<(u8, &str, u32), ()> =
    TableDefinition::new("credit_index");

/// Per-date order number counter
const COUNTERS_TABLE: TableDefinition<&str, u32> = TableDefinition::new("order_counters");

/// Order store backed by redb
#[derive(Clone)]
pub struct RedbOrderStore {
    db: Arc<Database>,
}

impl RedbOrderStore {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate` by default: a record is on
    /// disk once `commit()` returns.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StoreResult<Self> {
        // Create all tables so read transactions never see a missing table
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(CREDIT_INDEX_TABLE)?;
            let _ = write_txn.open_table(COUNTERS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Number of stored orders
    pub fn order_count(&self) -> StoreResult<u64> {
        use redb::ReadableTableMetadata;

        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        Ok(table.len()?)
    }

    // ========== Transaction helpers ==========

    fn read_order_txn(txn: &WriteTransaction, key: OrderKey) -> StoreResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        let date = key.order_date.to_string();
        match table.get((date.as_str(), key.order_num))? {
            Some(value) => Ok(Some(decode(key, value.value())?)),
            None => Ok(None),
        }
    }

    /// Write the record and move its index entry to the current status
    fn write_order_txn(
        txn: &WriteTransaction,
        order: &Order,
        previous: Option<&Order>,
    ) -> StoreResult<()> {
        let date = order.order_date.to_string();
        let value = encode(order)?;

        let mut orders = txn.open_table(ORDERS_TABLE)?;
        orders.insert((date.as_str(), order.order_num), value.as_slice())?;

        let mut index = txn.open_table(CREDIT_INDEX_TABLE)?;
        if let Some(prev) = previous {
            index.remove((prev.credit_status.as_flag(), date.as_str(), prev.order_num))?;
        }
        index.insert((order.credit_status.as_flag(), date.as_str(), order.order_num), ())?;
        Ok(())
    }
}

fn encode(order: &Order) -> StoreResult<Vec<u8>> {
    serde_json::to_vec(order).map_err(|e| StoreError::Corrupt {
        key: order.key().to_string(),
        reason: e.to_string(),
    })
}

fn decode(key: OrderKey, bytes: &[u8]) -> StoreResult<Order> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Decode a stored record for a listing, skipping one that cannot be read
fn decode_or_skip(key: OrderKey, bytes: &[u8]) -> Option<Order> {
    match decode(key, bytes) {
        Ok(order) => Some(order),
        Err(e) => {
            tracing::warn!(order = %key, error = %e, "Skipping unreadable order record");
            None
        }
    }
}

fn parse_key(date: &str, num: u32) -> StoreResult<OrderKey> {
    let order_date = OrderDate::parse(date).map_err(|e| StoreError::Corrupt {
        key: format!("{date}#{num}"),
        reason: e.to_string(),
    })?;
    Ok(OrderKey::new(order_date, num))
}

// ========== Blocking operations ==========
//
// redb transactions are synchronous; the async trait methods below run
// these on the blocking pool.

impl RedbOrderStore {
    async fn blocking<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Database) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| StoreError::Backend(format!("Task join failed: {}", e)))?
    }

    fn get_sync(db: &Database, key: OrderKey) -> StoreResult<Option<Order>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let date = key.order_date.to_string();

        match table.get((date.as_str(), key.order_num))? {
            Some(value) => Ok(Some(decode(key, value.value())?)),
            None => Ok(None),
        }
    }

    fn put_sync(db: &Database, order: &Order) -> StoreResult<()> {
        let txn = db.begin_write()?;
        let previous = Self::read_order_txn(&txn, order.key())?;
        Self::write_order_txn(&txn, order, previous.as_ref())?;
        txn.commit()?;
        Ok(())
    }

    fn insert_sync(db: &Database, order: &Order) -> StoreResult<()> {
        let txn = db.begin_write()?;
        if Self::read_order_txn(&txn, order.key())?.is_some() {
            txn.abort()?;
            return Err(StoreError::AlreadyExists(order.key()));
        }
        Self::write_order_txn(&txn, order, None)?;
        txn.commit()?;
        Ok(())
    }

    fn delete_sync(db: &Database, key: OrderKey) -> StoreResult<Option<Order>> {
        let txn = db.begin_write()?;
        let date = key.order_date.to_string();

        let previous = {
            let mut orders = txn.open_table(ORDERS_TABLE)?;
            let removed = orders.remove((date.as_str(), key.order_num))?;
            match removed {
                Some(value) => Some(decode(key, value.value())?),
                None => None,
            }
        };

        if let Some(prev) = &previous {
            let mut index = txn.open_table(CREDIT_INDEX_TABLE)?;
            index.remove((prev.credit_status.as_flag(), date.as_str(), key.order_num))?;
        }

        txn.commit()?;
        Ok(previous)
    }

    fn query_date_sync(
        db: &Database,
        date: OrderDate,
        descending: bool,
        limit: usize,
    ) -> StoreResult<Vec<Order>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let day = date.to_string();

        let range = table.range((day.as_str(), 0u32)..=(day.as_str(), u32::MAX))?;
        let entries: Box<dyn Iterator<Item = _>> = if descending {
            Box::new(range.rev())
        } else {
            Box::new(range)
        };

        let mut orders = Vec::new();
        for result in entries {
            if orders.len() >= limit {
                break;
            }
            let (key, value) = result?;
            let (_, num) = key.value();
            if let Some(order) = decode_or_skip(OrderKey::new(date, num), value.value()) {
                orders.push(order);
            }
        }

        Ok(orders)
    }

    fn query_credit_sync(
        db: &Database,
        status: CreditStatus,
        ascending: bool,
    ) -> StoreResult<Vec<Order>> {
        let read_txn = db.begin_read()?;
        let index = read_txn.open_table(CREDIT_INDEX_TABLE)?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;
        let flag = status.as_flag();

        let mut result = Vec::new();
        for entry in index.range((flag, "", 0u32)..(flag + 1, "", 0u32))? {
            let (key, _) = entry?;
            let (_, date, num) = key.value();
            let order_key = parse_key(date, num)?;

            // Index entries without a record are skipped
            if let Some(value) = orders.get((date, num))? {
                result.extend(decode_or_skip(order_key, value.value()));
            }
        }

        if !ascending {
            result.reverse();
        }
        Ok(result)
    }

    fn scan_sync(
        db: &Database,
        filter: &ScanFilter,
        start_after: Option<OrderKey>,
        page_size: usize,
    ) -> StoreResult<ScanPage> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let from = filter.date_from.to_string();
        let to = filter.date_to.to_string();
        let resume = start_after.map(|k| (k.order_date.to_string(), k.order_num));

        let lower = match &resume {
            Some((date, num)) if date.as_str() >= from.as_str() => {
                Bound::Excluded((date.as_str(), *num))
            }
            _ => Bound::Included((from.as_str(), 0u32)),
        };
        let upper = Bound::Included((to.as_str(), u32::MAX));

        let mut page = ScanPage::default();
        if from > to {
            return Ok(page);
        }

        let page_size = page_size.max(1);
        let mut entries = table.range((lower, upper))?;
        let mut examined = 0usize;
        let mut last_examined = None;

        for result in entries.by_ref() {
            let (key, value) = result?;
            let (date, num) = key.value();
            let order_key = parse_key(date, num)?;

            // Unreadable records still count as examined so paging moves past them
            let order = decode_or_skip(order_key, value.value());
            page.orders.extend(order.filter(|o| filter.matches(o)));

            examined += 1;
            last_examined = Some(order_key);
            if examined >= page_size {
                break;
            }
        }

        if examined >= page_size && entries.next().is_some() {
            page.last_key = last_examined;
        }

        Ok(page)
    }

    fn settle_credit_sync(db: &Database, key: OrderKey) -> StoreResult<Option<Order>> {
        let txn = db.begin_write()?;

        let Some(previous) = Self::read_order_txn(&txn, key)? else {
            txn.abort()?;
            return Ok(None);
        };

        let mut updated = previous.clone();
        updated.credit_status = CreditStatus::Settled;
        Self::write_order_txn(&txn, &updated, Some(&previous))?;

        txn.commit()?;
        Ok(Some(updated))
    }

    fn read_counter_sync(db: &Database, date: OrderDate) -> StoreResult<Option<u32>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(COUNTERS_TABLE)?;
        let day = date.to_string();
        Ok(table.get(day.as_str())?.map(|g| g.value()))
    }

    fn compare_and_swap_counter_sync(
        db: &Database,
        date: OrderDate,
        expected: Option<u32>,
        new: u32,
    ) -> StoreResult<bool> {
        let txn = db.begin_write()?;
        let day = date.to_string();

        let swapped = {
            let mut table = txn.open_table(COUNTERS_TABLE)?;
            let current = table.get(day.as_str())?.map(|g| g.value());
            if current == expected {
                table.insert(day.as_str(), new)?;
                true
            } else {
                false
            }
        };

        if swapped {
            txn.commit()?;
        } else {
            txn.abort()?;
        }
        Ok(swapped)
    }
}

#[async_trait]
impl OrderStore for RedbOrderStore {
    async fn get(&self, key: OrderKey) -> StoreResult<Option<Order>> {
        self.blocking(move |db| Self::get_sync(db, key)).await
    }

    async fn put(&self, order: &Order) -> StoreResult<()> {
        let order = order.clone();
        self.blocking(move |db| Self::put_sync(db, &order)).await
    }

    async fn insert(&self, order: &Order) -> StoreResult<()> {
        let order = order.clone();
        self.blocking(move |db| Self::insert_sync(db, &order)).await
    }

    async fn delete(&self, key: OrderKey) -> StoreResult<Option<Order>> {
        self.blocking(move |db| Self::delete_sync(db, key)).await
    }

    async fn query_date(
        &self,
        date: OrderDate,
        descending: bool,
        limit: usize,
    ) -> StoreResult<Vec<Order>> {
        self.blocking(move |db| Self::query_date_sync(db, date, descending, limit))
            .await
    }

    async fn query_credit(
        &self,
        status: CreditStatus,
        ascending: bool,
    ) -> StoreResult<Vec<Order>> {
        self.blocking(move |db| Self::query_credit_sync(db, status, ascending))
            .await
    }

    async fn scan(
        &self,
        filter: &ScanFilter,
        start_after: Option<OrderKey>,
        page_size: usize,
    ) -> StoreResult<ScanPage> {
        let filter = *filter;
        self.blocking(move |db| Self::scan_sync(db, &filter, start_after, page_size))
            .await
    }

    async fn settle_credit(&self, key: OrderKey) -> StoreResult<Option<Order>> {
        self.blocking(move |db| Self::settle_credit_sync(db, key)).await
    }

    async fn read_counter(&self, date: OrderDate) -> StoreResult<Option<u32>> {
        self.blocking(move |db| Self::read_counter_sync(db, date)).await
    }

    async fn compare_and_swap_counter(
        &self,
        date: OrderDate,
        expected: Option<u32>,
        new: u32,
    ) -> StoreResult<bool> {
        self.blocking(move |db| Self::compare_and_swap_counter_sync(db, date, expected, new))
            .await
    }
}
