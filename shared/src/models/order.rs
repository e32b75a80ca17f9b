//! Order Model

use std::fmt;
use std::str::FromStr;

use chrono::{FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Synthetic key carrying the grand total inside `paymentMethodSales`.
///
/// Never accepted as a real payment-method tag.
pub const GRAND_TOTAL_KEY: &str = "총합";

/// Display name for an order that carries no payment method
pub const UNKNOWN_ORDER_METHOD: &str = "Unknown";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid date '{0}', expected YYYY-MM-DD")]
pub struct InvalidDate(pub String);

/// Business date (`YYYY-MM-DD`), the partition key of the order table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderDate(NaiveDate);

impl OrderDate {
    /// Parse the strict `YYYY-MM-DD` form (zero padded, 10 chars)
    pub fn parse(value: &str) -> Result<Self, InvalidDate> {
        if value.len() != 10 {
            return Err(InvalidDate(value.to_string()));
        }
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Self)
            .map_err(|_| InvalidDate(value.to_string()))
    }

    /// Current business date at the given UTC offset
    pub fn today(offset: FixedOffset) -> Self {
        Self(Utc::now().with_timezone(&offset).date_naive())
    }
}

impl fmt::Display for OrderDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for OrderDate {
    type Err = InvalidDate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for OrderDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OrderDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}

/// Primary key: partition `orderDate`, sort `orderNum`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderKey {
    pub order_date: OrderDate,
    pub order_num: u32,
}

impl OrderKey {
    pub fn new(order_date: OrderDate, order_num: u32) -> Self {
        Self {
            order_date,
            order_num,
        }
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.order_date, self.order_num)
    }
}

/// Credit flag: `0` settled/paid, `1` outstanding credit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CreditStatus {
    #[default]
    Settled,
    Outstanding,
}

impl CreditStatus {
    pub fn as_flag(self) -> u8 {
        match self {
            CreditStatus::Settled => 0,
            CreditStatus::Outstanding => 1,
        }
    }

    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(CreditStatus::Settled),
            1 => Some(CreditStatus::Outstanding),
            _ => None,
        }
    }
}

impl Serialize for CreditStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_flag())
    }
}

impl<'de> Deserialize<'de> for CreditStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let flag = u8::deserialize(deserializer)?;
        Self::from_flag(flag)
            .ok_or_else(|| {
                de::Error::custom(format!("invalid creditStatus {flag}, expected 0 or 1"))
            })
    }
}

/// One line of an order
///
/// `subtotal` is supplied by the POS and never recomputed from
/// `quantity * unitPrice`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub item_name: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
}

impl OrderItem {
    pub fn is_well_formed(&self) -> bool {
        !self.item_name.trim().is_empty()
    }
}

/// One tender of a (possibly split) payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub method: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl PaymentMethod {
    pub fn is_well_formed(&self) -> bool {
        !self.method.trim().is_empty() && self.method != GRAND_TOTAL_KEY
    }
}

/// Order record as stored in the order table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_date: OrderDate,
    pub order_num: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub credit_status: CreditStatus,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub order_items: Vec<OrderItem>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub payment_methods: Vec<PaymentMethod>,
}

impl Order {
    pub fn key(&self) -> OrderKey {
        OrderKey::new(self.order_date, self.order_num)
    }

    /// Payment tags joined in sequence order (`card+cash`)
    pub fn order_method(&self) -> String {
        if self.payment_methods.is_empty() {
            return UNKNOWN_ORDER_METHOD.to_string();
        }
        self.payment_methods
            .iter()
            .map(|p| p.method.as_str())
            .collect::<Vec<_>>()
            .join("+")
    }
}

trait WellFormed {
    fn well_formed(&self) -> bool;
}

impl WellFormed for OrderItem {
    fn well_formed(&self) -> bool {
        self.is_well_formed()
    }
}

impl WellFormed for PaymentMethod {
    fn well_formed(&self) -> bool {
        self.is_well_formed()
    }
}

/// Decode each element on its own; malformed elements are dropped
/// instead of failing the whole record.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + WellFormed,
{
    let elements = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(elements) => elements,
        serde_json::Value::Null => return Ok(Vec::new()),
        other => {
            tracing::debug!(value = %other, "Ignoring non-array order sequence");
            return Ok(Vec::new());
        }
    };

    let mut decoded = Vec::with_capacity(elements.len());
    for element in elements {
        match serde_json::from_value::<T>(element.clone()) {
            Ok(value) if value.well_formed() => decoded.push(value),
            Ok(_) => tracing::debug!(element = %element, "Skipping malformed order element"),
            Err(e) => {
                tracing::debug!(
                    element = %element,
                    error = %e,
                    "Skipping undecodable order element"
                )
            }
        }
    }
    Ok(decoded)
}
