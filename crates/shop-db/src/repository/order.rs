//! Order reads and composite writes (order + line items).

use diesel::prelude::*;
use serde_json::Value;
use tracing::{debug, info};

use super::{find_one, find_page, ProductRepository};
use crate::{
    deadline::Deadline,
    error::{DbError, Result},
    models::{
        order::{
            NewOrder, NewOrderRow, NewProductsOrderRow, Order, OrderChangeset, OrderFilter,
            OrderStatus, UpdateOrderReq,
        },
        types::{non_blank, timestamp_now, Page},
    },
    query::{source, PredicateFragment, ORDERS},
    schema::{orders, products_orders},
    traits::Expression,
    write::{WriteStep, WriteTx},
};

/// Repository for orders.
pub struct OrderRepository;

/// Rounds to whole cents.
fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

impl OrderRepository {
    /// Lists orders matching the filter. Never fails; see the module docs.
    pub fn find_many(
        conn: &mut SqliteConnection,
        filter: &OrderFilter,
        deadline: Deadline,
    ) -> Page<Order> {
        find_page(conn, &ORDERS, filter, deadline)
    }

    /// Finds an order by id, with its line items.
    pub fn find_one(conn: &mut SqliteConnection, id: &str, deadline: Deadline) -> Result<Order> {
        find_one(
            conn,
            &ORDERS,
            PredicateFragment::new(source::orders::ID.eq(id)),
            deadline,
        )
    }

    /// Places an order.
    ///
    /// The submitted `total_paid` is ignored. Each line item's product is
    /// re-read inside the transaction; its price times quantity is summed
    /// into the stored total, and the product as read is stored on the line
    /// item as a snapshot.
    pub fn insert(conn: &mut SqliteConnection, req: &NewOrder, deadline: Deadline) -> Result<Order> {
        if req.products.is_empty() {
            return Err(DbError::InvalidInput("order has no products".to_string()));
        }
        if let Some(item) = req.products.iter().find(|item| item.qty <= 0) {
            return Err(DbError::InvalidInput(format!(
                "quantity of product {} must be positive",
                item.product_id
            )));
        }
        let transfer_slip = req
            .transfer_slip
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        let mut tx = WriteTx::begin(conn, deadline, "insert order")?;

        let mut total = 0.0;
        let mut snapshots: Vec<(i32, Value)> = Vec::with_capacity(req.products.len());
        for item in &req.products {
            let product = tx.read(|c, d| {
                ProductRepository::find_one(c, &item.product_id, d).map_err(|err| {
                    match err {
                        DbError::NotFound(_) => {
                            DbError::InvalidInput(format!(
                                "product {} does not exist",
                                item.product_id
                            ))
                        }
                        other => other,
                    }
                })
            })?;
            total += product.price * f64::from(item.qty);
            let snapshot = match serde_json::to_value(&product) {
                Ok(snapshot) => snapshot,
                Err(err) => return tx.abort(err.into()),
            };
            snapshots.push((item.qty, snapshot));
        }
        let total = round_money(total);

        let order_id: String = tx.step(WriteStep::InsertParent, |c| {
            diesel::insert_into(orders::table)
                .values(NewOrderRow {
                    user_id: &req.user_id,
                    contact: &req.contact,
                    address: &req.address,
                    transfer_slip,
                    status: OrderStatus::Waiting.as_str(),
                    total_paid: total,
                })
                .returning(orders::id)
                .get_result(c)
        })?;

        let rows: Vec<NewProductsOrderRow> = snapshots
            .into_iter()
            .map(|(qty, product)| {
                NewProductsOrderRow {
                    order_id: &order_id,
                    qty,
                    product,
                }
            })
            .collect();
        tx.step(WriteStep::InsertChildren, |c| {
            diesel::insert_into(products_orders::table)
                .values(&rows)
                .execute(c)
        })?;

        tx.commit()?;
        info!(order_id = %order_id, total_paid = total, items = rows.len(), "order placed");

        Self::find_one(conn, &order_id, deadline)
    }

    /// Updates an order's status and/or transfer slip.
    pub fn update(
        conn: &mut SqliteConnection,
        req: &UpdateOrderReq,
        deadline: Deadline,
    ) -> Result<Order> {
        let status = match non_blank(&req.status) {
            Some(value) => {
                Some(OrderStatus::parse(value).ok_or_else(|| {
                    DbError::InvalidInput(format!("unknown order status '{value}'"))
                })?)
            }
            None => None,
        };
        let transfer_slip = req
            .transfer_slip
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        if status.is_none() && transfer_slip.is_none() {
            return Self::find_one(conn, &req.order_id, deadline);
        }

        let mut tx = WriteTx::begin(conn, deadline, "update order")?;
        let changeset = OrderChangeset {
            status: status.map(OrderStatus::as_str),
            transfer_slip,
            updated_at: timestamp_now(),
        };
        let updated = tx.step(WriteStep::UpdateParent, |c| {
            diesel::update(orders::table.find(req.order_id.as_str()))
                .set(&changeset)
                .execute(c)
        })?;
        if updated == 0 {
            return tx.abort(DbError::NotFound("Order".to_string()));
        }
        tx.commit()?;
        debug!(order_id = %req.order_id, status = ?status, "order updated");

        Self::find_one(conn, &req.order_id, deadline)
    }
}
