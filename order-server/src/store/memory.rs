//! In-memory order store
//!
//! Backs tests and `STORE_BACKEND=memory` runs. Scans honour a fixed page
//! size so callers must follow `last_key`, and [`MemoryOrderStore::fail_next`]
//! injects backend failures.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::{CreditStatus, Order, OrderDate, OrderKey};

use super::{OrderStore, ScanFilter, ScanPage, StoreError, StoreResult};

/// Default number of records examined per scan page
pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Default)]
struct Inner {
    orders: BTreeMap<OrderKey, Order>,
    counters: BTreeMap<OrderDate, u32>,
}

/// Order store held in a `BTreeMap`
#[derive(Debug, Clone)]
pub struct MemoryOrderStore {
    inner: Arc<Mutex<Inner>>,
    /// Upper bound on records examined per scan page, regardless of the caller's size
    max_page_size: usize,
    pending_failures: Arc<AtomicUsize>,
    scan_calls: Arc<AtomicUsize>,
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Cap scan pages at `max_page_size` records (minimum 1)
    pub fn with_page_size(max_page_size: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            max_page_size: max_page_size.max(1),
            pending_failures: Arc::new(AtomicUsize::new(0)),
            scan_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make the next `n` store calls fail with [`StoreError::Backend`]
    pub fn fail_next(&self, n: usize) {
        self.pending_failures.store(n, Ordering::SeqCst);
    }

    /// Number of `scan` calls served so far (including failed ones)
    pub fn scan_calls(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_fault(&self) -> StoreResult<()> {
        let injected = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StoreError::Backend(
                "injected failure: service unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn get(&self, key: OrderKey) -> StoreResult<Option<Order>> {
        self.check_fault()?;
        Ok(self.inner.lock().orders.get(&key).cloned())
    }

    async fn put(&self, order: &Order) -> StoreResult<()> {
        self.check_fault()?;
        self.inner.lock().orders.insert(order.key(), order.clone());
        Ok(())
    }

    async fn insert(&self, order: &Order) -> StoreResult<()> {
        self.check_fault()?;
        let mut inner = self.inner.lock();
        let key = order.key();
        if inner.orders.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key));
        }
        inner.orders.insert(key, order.clone());
        Ok(())
    }

    async fn delete(&self, key: OrderKey) -> StoreResult<Option<Order>> {
        self.check_fault()?;
        Ok(self.inner.lock().orders.remove(&key))
    }

    async fn query_date(
        &self,
        date: OrderDate,
        descending: bool,
        limit: usize,
    ) -> StoreResult<Vec<Order>> {
        self.check_fault()?;
        let inner = self.inner.lock();
        let range = inner
            .orders
            .range(OrderKey::new(date, 0)..=OrderKey::new(date, u32::MAX))
            .map(|(_, order)| order.clone());

        let orders = if descending {
            range.rev().take(limit).collect()
        } else {
            range.take(limit).collect()
        };
        Ok(orders)
    }

    async fn query_credit(
        &self,
        status: CreditStatus,
        ascending: bool,
    ) -> StoreResult<Vec<Order>> {
        self.check_fault()?;
        let inner = self.inner.lock();
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| o.credit_status == status)
            .cloned()
            .collect();

        if !ascending {
            orders.reverse();
        }
        Ok(orders)
    }

    async fn scan(
        &self,
        filter: &ScanFilter,
        start_after: Option<OrderKey>,
        page_size: usize,
    ) -> StoreResult<ScanPage> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fault()?;

        let mut page = ScanPage::default();
        if filter.date_from > filter.date_to {
            return Ok(page);
        }

        let page_size = page_size.clamp(1, self.max_page_size);
        let lower = OrderKey::new(filter.date_from, 0);
        let upper = OrderKey::new(filter.date_to, u32::MAX);

        let inner = self.inner.lock();
        let mut entries = inner
            .orders
            .range(lower..=upper)
            .filter(|(key, _)| start_after.is_none_or(|after| **key > after));

        let mut examined = 0;
        let mut last_examined = None;
        for (key, order) in entries.by_ref() {
            if filter.matches(order) {
                page.orders.push(order.clone());
            }
            examined += 1;
            last_examined = Some(*key);
            if examined >= page_size {
                break;
            }
        }

        if examined >= page_size && entries.next().is_some() {
            page.last_key = last_examined;
        }

        Ok(page)
    }

    async fn settle_credit(&self, key: OrderKey) -> StoreResult<Option<Order>> {
        self.check_fault()?;
        let mut inner = self.inner.lock();
        Ok(inner.orders.get_mut(&key).map(|order| {
            order.credit_status = CreditStatus::Settled;
            order.clone()
        }))
    }

    async fn read_counter(&self, date: OrderDate) -> StoreResult<Option<u32>> {
        self.check_fault()?;
        Ok(self.inner.lock().counters.get(&date).copied())
    }

    async fn compare_and_swap_counter(
        &self,
        date: OrderDate,
        expected: Option<u32>,
        new: u32,
    ) -> StoreResult<bool> {
        self.check_fault()?;
        let mut inner = self.inner.lock();
        if inner.counters.get(&date).copied() != expected {
            return Ok(false);
        }
        inner.counters.insert(date, new);
        Ok(true)
    }
}
