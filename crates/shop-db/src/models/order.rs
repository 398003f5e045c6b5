use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    catalog::Product,
    types::{null_as_default, PaginateReq, SortReq},
};
use crate::schema::{orders, products_orders};

/// Order lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Waiting,
    Shipping,
    Completed,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Waiting => "waiting",
            OrderStatus::Shipping => "shipping",
            OrderStatus::Completed => "completed",
            OrderStatus::Canceled => "canceled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "waiting" => Some(OrderStatus::Waiting),
            "shipping" => Some(OrderStatus::Shipping),
            "completed" => Some(OrderStatus::Completed),
            "canceled" => Some(OrderStatus::Canceled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferSlip {
    #[serde(default)]
    pub id: String,
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub created_at: String,
}

/// Line item. `product` is the catalog snapshot taken when the order was placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductsOrder {
    pub id: i32,
    pub qty: i32,
    pub product: Product,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub transfer_slip: Option<TransferSlip>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub products: Vec<ProductsOrder>,
    pub address: String,
    pub contact: String,
    pub status: String,
    pub total_paid: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    #[serde(default)]
    pub id: Option<String>,
    /// Matched against user id, address and contact.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// `YYYY-MM-DD`; only used together with `end_date`.
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(flatten)]
    pub paginate: PaginateReq,
    #[serde(flatten)]
    pub sort: SortReq,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: String,
    pub qty: i32,
}

/// Create request for an order.
///
/// `total_paid` is accepted for wire compatibility and ignored: the persisted
/// total is recomputed from catalog prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: String,
    pub contact: String,
    pub address: String,
    #[serde(default)]
    pub transfer_slip: Option<TransferSlip>,
    #[serde(default)]
    pub total_paid: f64,
    pub products: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrderReq {
    pub order_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub transfer_slip: Option<TransferSlip>,
}

#[derive(Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow<'a> {
    pub user_id: &'a str,
    pub contact: &'a str,
    pub address: &'a str,
    pub transfer_slip: Option<Value>,
    pub status: &'a str,
    pub total_paid: f64,
}

#[derive(AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderChangeset<'a> {
    pub status: Option<&'a str>,
    pub transfer_slip: Option<Value>,
    pub updated_at: String,
}

#[derive(Insertable)]
#[diesel(table_name = products_orders)]
pub struct NewProductsOrderRow<'a> {
    pub order_id: &'a str,
    pub qty: i32,
    pub product: Value,
}
