//! Order domain services
//!
//! - [`OrderNumberAllocator`] - day-scoped order numbers
//! - [`ReportAggregator`] - sales reports over settled orders
//!
//! Both take the store through their constructor.

pub mod allocator;
pub mod report;

pub use allocator::{AllocatorError, MAX_ALLOCATION_ATTEMPTS, OrderNumberAllocator};
pub use report::{ReportAggregator, ReportError};
