//! Sales report aggregation
//!
//! Builds a [`SalesReport`] over an inclusive date range from settled orders
//! only. The store is scanned page by page until exhausted; any failed page
//! fails the whole report, so partial aggregates are never returned.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rust_decimal::Decimal;
use shared::{CreditStatus, GRAND_TOTAL_KEY, MenuSale, Order, OrderDate, SalesReport};
use thiserror::Error;

use crate::store::{OrderStore, ScanFilter, StoreError};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{0}")]
    InvalidRange(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Sales total for {field} '{key}' overflowed")]
    Overflow { field: &'static str, key: String },
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Aggregates settled orders into sales reports
#[derive(Clone)]
pub struct ReportAggregator {
    store: Arc<dyn OrderStore>,
    page_size: usize,
}

impl ReportAggregator {
    pub fn new(store: Arc<dyn OrderStore>, page_size: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
        }
    }

    /// Parse both bounds and build the report
    ///
    /// Fails with [`ReportError::InvalidRange`] before touching the store
    /// when either bound is malformed or `start > end`.
    pub async fn build_report_from_str(&self, start: &str, end: &str) -> ReportResult<SalesReport> {
        let start = OrderDate::parse(start)
            .map_err(|_| ReportError::InvalidRange(format!("Invalid start date '{start}'")))?;
        let end = OrderDate::parse(end)
            .map_err(|_| ReportError::InvalidRange(format!("Invalid end date '{end}'")))?;
        self.build_report(start, end).await
    }

    pub async fn build_report(
        &self,
        start: OrderDate,
        end: OrderDate,
    ) -> ReportResult<SalesReport> {
        if start > end {
            return Err(ReportError::InvalidRange(format!(
                "Start date {start} must not be after end date {end}"
            )));
        }

        let filter = ScanFilter::date_range(start, end).with_credit_status(CreditStatus::Settled);
        let mut acc = Accumulator::default();
        let mut start_after = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .store
                .scan(&filter, start_after, self.page_size)
                .await?;
            pages += 1;

            // The store filter is not trusted to be exact
            for order in page.orders.iter().filter(|o| filter.matches(o)) {
                acc.add(order)?;
            }

            match page.last_key {
                Some(key) => start_after = Some(key),
                None => break,
            }
        }

        tracing::debug!(%start, %end, pages, orders = acc.orders, "Sales report aggregated");
        Ok(acc.finish())
    }
}

#[derive(Default)]
struct Accumulator {
    orders: usize,
    /// First-seen order of item names
    menu_sales: Vec<(String, MenuSale)>,
    menu_index: HashMap<String, usize>,
    payment_method_sales: BTreeMap<String, Decimal>,
    grand_total: Decimal,
}

impl Accumulator {
    fn add(&mut self, order: &Order) -> ReportResult<()> {
        self.orders += 1;

        for item in order.order_items.iter().filter(|i| i.is_well_formed()) {
            let idx = match self.menu_index.get(&item.item_name) {
                Some(&idx) => idx,
                None => {
                    self.menu_sales
                        .push((item.item_name.clone(), MenuSale::default()));
                    let idx = self.menu_sales.len() - 1;
                    self.menu_index.insert(item.item_name.clone(), idx);
                    idx
                }
            };

            let sale = &mut self.menu_sales[idx].1;
            sale.quantity_sold = sale.quantity_sold.saturating_add(u64::from(item.quantity));
            sale.total_sales =
                checked_sum(sale.total_sales, item.subtotal, "item", &item.item_name)?;
        }

        for payment in order.payment_methods.iter().filter(|p| p.is_well_formed()) {
            let method_total = self
                .payment_method_sales
                .entry(payment.method.clone())
                .or_default();
            *method_total =
                checked_sum(*method_total, payment.amount, "payment", &payment.method)?;
            self.grand_total =
                checked_sum(self.grand_total, payment.amount, "payment", GRAND_TOTAL_KEY)?;
        }

        Ok(())
    }

    fn finish(mut self) -> SalesReport {
        // Stable: equal quantities keep first-seen order
        self.menu_sales
            .sort_by(|a, b| b.1.quantity_sold.cmp(&a.1.quantity_sold));

        SalesReport {
            menu_sales: self.menu_sales,
            payment_method_sales: self.payment_method_sales,
            grand_total: self.grand_total,
        }
    }
}

fn checked_sum(
    total: Decimal,
    amount: Decimal,
    field: &'static str,
    key: &str,
) -> ReportResult<Decimal> {
    total.checked_add(amount).ok_or_else(|| ReportError::Overflow {
        field,
        key: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryOrderStore;
    use shared::{OrderItem, PaymentMethod};

    fn date(s: &str) -> OrderDate {
        OrderDate::parse(s).unwrap()
    }

    fn item(name: &str, quantity: u32, subtotal: i64) -> OrderItem {
        OrderItem {
            item_name: name.to_string(),
            quantity,
            subtotal: Decimal::from(subtotal),
            unit_price: Decimal::ZERO,
        }
    }

    fn pay(method: &str, amount: i64) -> PaymentMethod {
        PaymentMethod {
            method: method.to_string(),
            amount: Decimal::from(amount),
        }
    }

    fn order(
        day: &str,
        num: u32,
        status: CreditStatus,
        items: Vec<OrderItem>,
        payments: Vec<PaymentMethod>,
    ) -> Order {
        let total = payments.iter().map(|p| p.amount).sum();
        Order {
            order_date: date(day),
            order_num: num,
            total_amount: total,
            customer_name: None,
            credit_status: status,
            order_items: items,
            payment_methods: payments,
        }
    }

    fn settled(day: &str, name: &str, amount: i64) -> Order {
        order(
            day,
            1,
            CreditStatus::Settled,
            vec![item(name, 1, amount)],
            vec![pay("cash", amount)],
        )
    }

    async fn seeded(orders: Vec<Order>, page_size: usize) -> Arc<MemoryOrderStore> {
        let store = Arc::new(MemoryOrderStore::with_page_size(page_size));
        for o in &orders {
            store.put(o).await.unwrap();
        }
        store
    }

    fn latte_tea_orders() -> Vec<Order> {
        vec![
            order(
                "2025-06-01",
                1,
                CreditStatus::Settled,
                vec![item("latte", 2, 8000)],
                vec![pay("card", 8000)],
            ),
            order(
                "2025-06-01",
                2,
                CreditStatus::Settled,
                vec![item("latte", 1, 4000), item("tea", 1, 3000)],
                vec![pay("cash", 7000)],
            ),
        ]
    }

    #[tokio::test]
    async fn test_two_order_example() {
        let store = seeded(latte_tea_orders(), 100).await;
        let aggregator = ReportAggregator::new(store, 100);

        let report = aggregator
            .build_report(date("2025-06-01"), date("2025-06-01"))
            .await
            .unwrap();

        let names: Vec<&str> = report.menu_sales.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["latte", "tea"]);
        let latte = report.menu_sale("latte").unwrap();
        assert_eq!(latte.quantity_sold, 3);
        assert_eq!(latte.total_sales, Decimal::from(12000));
        assert_eq!(report.menu_sale("tea").unwrap().total_sales, Decimal::from(3000));

        assert_eq!(report.payment_total("card"), Some(Decimal::from(8000)));
        assert_eq!(report.payment_total("cash"), Some(Decimal::from(7000)));
        assert_eq!(report.grand_total, Decimal::from(15000));
    }

    #[tokio::test]
    async fn test_start_after_end_rejected_without_store_call() {
        let store = Arc::new(MemoryOrderStore::new());
        let aggregator = ReportAggregator::new(store.clone(), 100);

        let err = aggregator
            .build_report(date("2025-06-10"), date("2025-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidRange(_)));

        let err = aggregator
            .build_report_from_str("2025-13-01", "2025-06-01")
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidRange(_)));
        assert_eq!(store.scan_calls(), 0);
    }

    #[tokio::test]
    async fn test_credit_orders_excluded() {
        let mut orders = latte_tea_orders();
        orders.push(order(
            "2025-06-01",
            3,
            CreditStatus::Outstanding,
            vec![item("latte", 50, 200000), item("cake", 1, 6000)],
            vec![pay("card", 206000)],
        ));
        let aggregator = ReportAggregator::new(seeded(orders, 100).await, 100);

        let report = aggregator
            .build_report(date("2025-06-01"), date("2025-06-01"))
            .await
            .unwrap();

        assert_eq!(report.menu_sale("latte").unwrap().quantity_sold, 3);
        assert!(report.menu_sale("cake").is_none());
        assert_eq!(report.grand_total, Decimal::from(15000));
    }

    #[tokio::test]
    async fn test_range_bounds_are_inclusive() {
        let orders = vec![
            settled("2025-05-31", "a", 100),
            settled("2025-06-01", "b", 200),
            settled("2025-06-03", "c", 300),
            settled("2025-06-04", "d", 400),
        ];
        let aggregator = ReportAggregator::new(seeded(orders, 100).await, 100);

        let report = aggregator
            .build_report(date("2025-06-01"), date("2025-06-03"))
            .await
            .unwrap();
        let names: Vec<&str> = report.menu_sales.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
        assert_eq!(report.grand_total, Decimal::from(500));
    }

    #[tokio::test]
    async fn test_all_pages_consumed() {
        let orders: Vec<Order> = (1..=25)
            .map(|n| {
                order(
                    "2025-06-01",
                    n,
                    CreditStatus::Settled,
                    vec![item("americano", 1, 2500)],
                    vec![pay("card", 2500)],
                )
            })
            .collect();
        let store = seeded(orders, 4).await;
        let aggregator = ReportAggregator::new(store.clone(), 100);

        let report = aggregator
            .build_report(date("2025-06-01"), date("2025-06-01"))
            .await
            .unwrap();
        assert_eq!(report.menu_sale("americano").unwrap().quantity_sold, 25);
        assert_eq!(report.grand_total, Decimal::from(62500));
        assert!(store.scan_calls() >= 7);
    }

    #[tokio::test]
    async fn test_failed_page_fails_report() {
        let orders: Vec<Order> = (1..=10)
            .map(|n| order("2025-06-01", n, CreditStatus::Settled, vec![], vec![pay("card", 1)]))
            .collect();
        let store = seeded(orders, 3).await;
        let aggregator = ReportAggregator::new(store.clone(), 3);

        store.fail_next(1);
        let err = aggregator
            .build_report(date("2025-06-01"), date("2025-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Store(_)));
    }

    #[tokio::test]
    async fn test_ties_keep_first_seen_order() {
        let orders = vec![
            order(
                "2025-06-01",
                1,
                CreditStatus::Settled,
                vec![item("scone", 1, 3000), item("mocha", 2, 9000)],
                vec![pay("card", 12000)],
            ),
            order(
                "2025-06-01",
                2,
                CreditStatus::Settled,
                vec![item("bagel", 1, 3500), item("juice", 2, 10000)],
                vec![pay("card", 13500)],
            ),
        ];
        let aggregator = ReportAggregator::new(seeded(orders, 100).await, 100);

        let first = aggregator
            .build_report(date("2025-06-01"), date("2025-06-01"))
            .await
            .unwrap();
        let names: Vec<&str> = first.menu_sales.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["mocha", "juice", "scone", "bagel"]);

        let second = aggregator
            .build_report(date("2025-06-01"), date("2025-06-01"))
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_grand_total_is_sum_of_methods() {
        let orders = vec![
            order(
                "2025-06-01",
                1,
                CreditStatus::Settled,
                vec![item("latte", 1, 4500)],
                vec![pay("card", 2000), pay("cash", 2500)],
            ),
            order(
                "2025-06-02",
                1,
                CreditStatus::Settled,
                vec![item("latte", 1, 4500)],
                vec![pay("transfer", 4500)],
            ),
        ];
        let aggregator = ReportAggregator::new(seeded(orders, 100).await, 100);

        let report = aggregator
            .build_report(date("2025-06-01"), date("2025-06-02"))
            .await
            .unwrap();
        let sum: Decimal = report.payment_method_sales.values().copied().sum();
        assert_eq!(sum, report.grand_total);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["paymentMethodSales"][GRAND_TOTAL_KEY], serde_json::json!(9000.0));
        assert_eq!(json["grandTotal"], serde_json::json!(9000.0));
    }

    #[tokio::test]
    async fn test_overflowing_totals_fail_instead_of_panicking() {
        let huge = Decimal::MAX - Decimal::from(10);
        let orders: Vec<Order> = (1..=2)
            .map(|n| {
                let mut o = order("2025-06-01", n, CreditStatus::Settled, vec![], vec![]);
                o.payment_methods.push(PaymentMethod {
                    method: "card".to_string(),
                    amount: huge,
                });
                o
            })
            .collect();
        let aggregator = ReportAggregator::new(seeded(orders, 100).await, 100);

        let err = aggregator
            .build_report(date("2025-06-01"), date("2025-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Overflow { field: "payment", .. }));
    }

    #[tokio::test]
    async fn test_decimal_amounts_do_not_drift() {
        let orders: Vec<Order> = (1..=1000)
            .map(|n| {
                let mut o = order("2025-06-01", n, CreditStatus::Settled, vec![], vec![]);
                o.payment_methods.push(PaymentMethod {
                    method: "cash".to_string(),
                    amount: Decimal::new(1, 1),
                });
                o
            })
            .collect();
        let aggregator = ReportAggregator::new(seeded(orders, 1000).await, 1000);

        let report = aggregator
            .build_report(date("2025-06-01"), date("2025-06-01"))
            .await
            .unwrap();
        assert_eq!(report.grand_total, Decimal::from(100));
    }
}
