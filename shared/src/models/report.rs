//! Sales Report Model
//!
//! Ephemeral: recomputed per request, never persisted.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use super::order::GRAND_TOTAL_KEY;

/// Aggregated sales of one menu item
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSale {
    pub quantity_sold: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_sales: Decimal,
}

/// Sales summary over an inclusive date range
///
/// Serialized as:
///
/// ```json
/// {
///   "menuSales": { "latte": { "quantitySold": 3, "totalSales": 12000.0 } },
///   "paymentMethodSales": { "card": 8000.0, "cash": 7000.0, "총합": 15000.0 },
///   "grandTotal": 15000.0
/// }
/// ```
///
/// `menuSales` keeps the descending `quantitySold` order, `paymentMethodSales`
/// lists real tags lexicographically and the synthetic total last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesReport {
    pub menu_sales: Vec<(String, MenuSale)>,
    pub payment_method_sales: BTreeMap<String, Decimal>,
    pub grand_total: Decimal,
}

impl SalesReport {
    pub fn menu_sale(&self, item_name: &str) -> Option<&MenuSale> {
        self.menu_sales
            .iter()
            .find(|(name, _)| name == item_name)
            .map(|(_, sale)| sale)
    }

    pub fn payment_total(&self, method: &str) -> Option<Decimal> {
        self.payment_method_sales.get(method).copied()
    }
}

struct Amount(Decimal);

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

struct MenuSalesMap<'a>(&'a [(String, MenuSale)]);

impl Serialize for MenuSalesMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, sale) in self.0 {
            map.serialize_entry(name, sale)?;
        }
        map.end()
    }
}

struct PaymentSalesMap<'a> {
    sales: &'a BTreeMap<String, Decimal>,
    grand_total: Decimal,
}

impl Serialize for PaymentSalesMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sales.len() + 1))?;
        for (method, amount) in self.sales {
            map.serialize_entry(method, &Amount(*amount))?;
        }
        map.serialize_entry(GRAND_TOTAL_KEY, &Amount(self.grand_total))?;
        map.end()
    }
}

impl Serialize for SalesReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut report = serializer.serialize_struct("SalesReport", 3)?;
        report.serialize_field("menuSales", &MenuSalesMap(&self.menu_sales))?;
        report.serialize_field(
            "paymentMethodSales",
            &PaymentSalesMap {
                sales: &self.payment_method_sales,
                grand_total: self.grand_total,
            },
        )?;
        report.serialize_field("grandTotal", &Amount(self.grand_total))?;
        report.end()
    }
}
