//! Order number allocation
//!
//! Order numbers are scoped to a business date: the first order of a day is
//! `1` and each new order takes the next integer. The store has no
//! auto-increment, so [`OrderNumberAllocator::allocate`] reserves numbers
//! through a compare-and-swap on the per-date counter record.
//!
//! The reservation is seeded from the highest stored `orderNum` as well as
//! the counter, so dates written before the counter existed (or with
//! client-supplied numbers) continue from their last order.
//!
//! A reserved number whose order is never written leaves a gap.

use std::sync::Arc;

use shared::OrderDate;
use thiserror::Error;

use crate::store::{OrderStore, StoreError};

/// CAS attempts before [`AllocatorError::Contention`]
pub const MAX_ALLOCATION_ATTEMPTS: usize = 16;

#[derive(Debug, Error)]
pub enum AllocatorError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Order number allocation for {date} lost {attempts} consecutive races")]
    Contention { date: OrderDate, attempts: usize },
}

pub type AllocatorResult<T> = Result<T, AllocatorError>;

/// Day-scoped order number allocator
#[derive(Clone)]
pub struct OrderNumberAllocator {
    store: Arc<dyn OrderStore>,
}

impl OrderNumberAllocator {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Next number that [`allocate`](Self::allocate) would hand out, without reserving it
    pub async fn next_order_number(&self, date: OrderDate) -> AllocatorResult<u32> {
        let counter = self.store.read_counter(date).await?;
        let last = self.last_stored(date).await?;
        Ok(next_after(counter, last))
    }

    /// Reserve the next order number for `date`
    pub async fn allocate(&self, date: OrderDate) -> AllocatorResult<u32> {
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let counter = self.store.read_counter(date).await?;
            let last = self.last_stored(date).await?;
            let candidate = next_after(counter, last);

            if self
                .store
                .compare_and_swap_counter(date, counter, candidate)
                .await?
            {
                tracing::debug!(%date, order_num = candidate, attempt, "Order number reserved");
                return Ok(candidate);
            }

            tracing::debug!(%date, candidate, attempt, "Order number race lost, retrying");
            tokio::task::yield_now().await;
        }

        tracing::warn!(
            %date,
            attempts = MAX_ALLOCATION_ATTEMPTS,
            "Order number allocation gave up"
        );
        Err(AllocatorError::Contention {
            date,
            attempts: MAX_ALLOCATION_ATTEMPTS,
        })
    }

    async fn last_stored(&self, date: OrderDate) -> Result<Option<u32>, StoreError> {
        let latest = self.store.query_date(date, true, 1).await?;
        Ok(latest.first().map(|o| o.order_num))
    }
}

fn next_after(counter: Option<u32>, last: Option<u32>) -> u32 {
    counter.max(last).unwrap_or(0).saturating_add(1)
}
