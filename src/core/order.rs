//! Order business logic - Creation from a cart snapshot and status changes.
//!
//! An order is written once with status `new`; its items and total are never modified
//! afterwards. The only mutation is a status change, which must follow the order state
//! machine (`new -> completed | cancelled`, both terminal).

use crate::{
    core::money,
    entities::{CustomerDetails, Order, OrderItem, OrderStatus, order},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// Checkout snapshot submitted for a new order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// Cart lines, stored verbatim
    pub items: Vec<OrderItem>,
    /// Delivery contact
    pub customer: CustomerDetails,
    /// Client-computed total
    pub total: f64,
}

/// Rejects missing customer fields, an empty cart and malformed lines or amounts.
fn validate_new_order(new_order: &NewOrder) -> Result<()> {
    if new_order.items.is_empty() {
        return Err(Error::validation("Cart is empty"));
    }

    let customer = &new_order.customer;
    for (field, value) in [
        ("firstName", &customer.first_name),
        ("lastName", &customer.last_name),
        ("phone", &customer.phone),
        ("address", &customer.address),
    ] {
        if value.trim().is_empty() {
            return Err(Error::validation(format!("Missing order data: {field}")));
        }
    }

    for item in &new_order.items {
        if item.quantity == 0 {
            return Err(Error::validation(format!(
                "Quantity for '{}' must be at least 1",
                item.name
            )));
        }
        if !money::is_valid_amount(item.price) {
            return Err(Error::InvalidAmount { amount: item.price });
        }
    }

    if !money::is_valid_amount(new_order.total) {
        return Err(Error::InvalidAmount {
            amount: new_order.total,
        });
    }
    Ok(())
}

/// Creates an order with status `new` from a checkout snapshot.
///
/// Items and total are stored exactly as submitted. When `verify_totals` is set, the
/// total is first recomputed from price x quantity and a difference above one cent is
/// rejected.
///
/// # Errors
/// Returns an error if:
/// - The cart is empty or a customer field is missing
/// - An item has zero quantity, or a price/total is negative, not finite or above
///   [`money::MAX_AMOUNT`]
/// - `verify_totals` is on and the total does not match the items
/// - The database insert fails
#[instrument(skip(db, new_order), fields(items = new_order.items.len(), total = new_order.total))]
pub async fn create_order(
    db: &DatabaseConnection,
    new_order: NewOrder,
    verify_totals: bool,
) -> Result<order::Model> {
    validate_new_order(&new_order)?;

    if verify_totals {
        let computed = money::items_total(&new_order.items)?;
        if !money::amounts_match(computed, money::to_decimal(new_order.total)) {
            warn!("Rejected order with mismatching total");
            return Err(Error::TotalMismatch {
                submitted: new_order.total,
                computed: money::to_f64(computed),
            });
        }
    }

    let order = order::ActiveModel {
        customer_details: Set(new_order.customer),
        order_items: Set(new_order.items.into()),
        total_amount: Set(new_order.total),
        order_status: Set(OrderStatus::New),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = order.insert(db).await?;
    info!(
        "Created order {} with {} line(s), total {:.2}",
        created.id,
        created.order_items.len(),
        created.total_amount
    );
    Ok(created)
}

/// Retrieves all orders, newest first.
pub async fn list_orders(db: &DatabaseConnection) -> Result<Vec<order::Model>> {
    Order::find()
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific order by its unique ID.
pub async fn get_order_by_id(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id).one(db).await.map_err(Into::into)
}

/// Moves an order to a new status.
///
/// The read and the write happen in one database transaction; concurrent updates to the
/// same order resolve as last-write-wins at the store.
///
/// # Errors
/// Returns an error if:
/// - The order does not exist (`OrderNotFound`, nothing is written)
/// - The state machine forbids the transition (`InvalidStatusTransition`)
/// - The database update fails
#[instrument(skip(db))]
pub async fn update_order_status(
    db: &DatabaseConnection,
    order_id: i64,
    new_status: OrderStatus,
) -> Result<order::Model> {
    let txn = db.begin().await?;

    let existing = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    let current = existing.order_status;
    if !current.can_transition_to(new_status) {
        return Err(Error::InvalidStatusTransition {
            from: current,
            to: new_status,
        });
    }

    let mut active_model: order::ActiveModel = existing.into();
    active_model.order_status = Set(new_status);
    let updated = active_model.update(&txn).await?;

    txn.commit().await?;
    info!("Order {} status changed: {} -> {}", order_id, current, new_status);
    Ok(updated)
}

/// Parses a status string and applies it with [`update_order_status`].
pub async fn update_order_status_str(
    db: &DatabaseConnection,
    order_id: i64,
    new_status: &str,
) -> Result<order::Model> {
    let status: OrderStatus = new_status.parse()?;
    update_order_status(db, order_id, status).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_order_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        // Empty cart
        let result = create_order(
            &db,
            NewOrder {
                items: vec![],
                ..test_new_order()
            },
            false,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Each required customer field
        for blank in 0..4 {
            let mut order = test_new_order();
            match blank {
                0 => order.customer.first_name = String::new(),
                1 => order.customer.last_name = "  ".to_string(),
                2 => order.customer.phone = String::new(),
                _ => order.customer.address = String::new(),
            }
            let result = create_order(&db, order, false).await;
            assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        }

        // Zero quantity
        let mut order = test_new_order();
        order.items[0].quantity = 0;
        let result = create_order(&db, order, false).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Negative price
        let mut order = test_new_order();
        order.items[0].price = -5.0;
        let result = create_order(&db, order, false).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: -5.0 }
        ));

        // NaN total
        let result = create_order(
            &db,
            NewOrder {
                total: f64::NAN,
                ..test_new_order()
            },
            false,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_huge_amounts_are_rejected() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_order(
            &db,
            NewOrder {
                items: vec![test_item(1, "Gold", 1e28, 10)],
                total: 1e29,
                ..test_new_order()
            },
            true,
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount } if amount == 1e28
        ));

        let result = create_order(
            &db,
            NewOrder {
                total: 1e15,
                ..test_new_order()
            },
            false,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        assert!(list_orders(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_order_creates_no_record() -> Result<()> {
        let db = setup_test_db().await?;
        let mut order = test_new_order();
        order.customer.phone = String::new();

        assert!(create_order(&db, order, false).await.is_err());
        assert!(list_orders(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_stores_snapshot_verbatim() -> Result<()> {
        let db = setup_test_db().await?;
        let submitted = test_new_order();

        let created = create_order(&db, submitted.clone(), false).await?;

        assert_eq!(created.order_status, OrderStatus::New);
        assert_eq!(created.order_items.0, submitted.items);
        assert_eq!(created.total_amount, submitted.total);
        assert_eq!(created.customer_details, submitted.customer);

        let stored = get_order_by_id(&db, created.id).await?.unwrap();
        assert_eq!(stored.order_items.0, submitted.items);
        assert_eq!(stored.customer_details, submitted.customer);
        Ok(())
    }

    #[tokio::test]
    async fn test_client_total_is_trusted_by_default() -> Result<()> {
        let db = setup_test_db().await?;
        let order = NewOrder {
            total: 1.0,
            ..test_new_order()
        };

        let created = create_order(&db, order, false).await?;
        assert_eq!(created.total_amount, 1.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_verify_totals_rejects_mismatch() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_order(
            &db,
            NewOrder {
                total: 4000.0,
                ..test_new_order()
            },
            true,
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::TotalMismatch {
                submitted: 4000.0,
                computed: 5000.0
            }
        ));

        // Exact total passes
        create_order(&db, test_new_order(), true).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_test_order(&db).await?;
        let second = create_test_order(&db).await?;

        let orders = list_orders(&db).await?;
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, second.id);
        assert_eq!(orders[1].id, first.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_order() -> Result<()> {
        let db = setup_test_db().await?;
        let order = create_test_order(&db).await?;

        let updated = update_order_status(&db, order.id, OrderStatus::Completed).await?;
        assert_eq!(updated.order_status, OrderStatus::Completed);

        // Visible to the next read
        let stored = get_order_by_id(&db, order.id).await?.unwrap();
        assert_eq!(stored.order_status, OrderStatus::Completed);
        assert_eq!(stored.created_at, order.created_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_terminal_status_cannot_change() -> Result<()> {
        let db = setup_test_db().await?;
        let order = create_test_order(&db).await?;
        update_order_status(&db, order.id, OrderStatus::Cancelled).await?;

        for next in [OrderStatus::New, OrderStatus::Completed, OrderStatus::Cancelled] {
            let result = update_order_status(&db, order.id, next).await;
            assert!(matches!(
                result.unwrap_err(),
                Error::InvalidStatusTransition {
                    from: OrderStatus::Cancelled,
                    ..
                }
            ));
        }

        let stored = get_order_by_id(&db, order.id).await?.unwrap();
        assert_eq!(stored.order_status, OrderStatus::Cancelled);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_order_leaves_store_unchanged() -> Result<()> {
        let db = setup_test_db().await?;
        let order = create_test_order(&db).await?;

        let result = update_order_status(&db, order.id + 100, OrderStatus::Completed).await;
        assert!(matches!(result.unwrap_err(), Error::OrderNotFound { .. }));

        let orders = list_orders(&db).await?;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0], order);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_status_from_string() -> Result<()> {
        let db = setup_test_db().await?;
        let order = create_test_order(&db).await?;

        let result = update_order_status_str(&db, order.id, "delivered").await;
        assert!(matches!(result.unwrap_err(), Error::InvalidStatus { .. }));

        let updated = update_order_status_str(&db, order.id, "completed").await?;
        assert_eq!(updated.order_status, OrderStatus::Completed);
        Ok(())
    }
}
