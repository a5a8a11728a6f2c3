//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        catalog::{self, DishInput},
        category::{self, CategoryInput},
        order::{self, NewOrder},
    },
    entities::{self, CustomerDetails, Order, OrderItem, OrderStatus},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test menu.
pub async fn create_test_menu(db: &DatabaseConnection, name: &str) -> Result<entities::menu::Model> {
    catalog::create_menu(db, name.to_string()).await
}

/// Creates a test category at position 0.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
    slug: &str,
    menu_id: i64,
) -> Result<entities::category::Model> {
    category::create_category(
        db,
        CategoryInput {
            name: name.to_string(),
            slug: slug.to_string(),
            position: None,
            menu_id,
        },
    )
    .await
}

/// Creates a dish in the given category (and that category's menu).
pub async fn create_test_dish(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
    category: &entities::category::Model,
) -> Result<entities::dish::Model> {
    catalog::create_dish(
        db,
        DishInput {
            name: name.to_string(),
            description: None,
            price,
            menu_id: category.menu_id,
            category_id: category.id,
            image_url: None,
            model_url: None,
        },
    )
    .await
}

/// Sets up a database with a "Main" menu holding a "Pizza" category.
/// Returns (db, menu, category).
pub async fn setup_with_category() -> Result<(
    DatabaseConnection,
    entities::menu::Model,
    entities::category::Model,
)> {
    let db = setup_test_db().await?;
    let menu = create_test_menu(&db, "Main").await?;
    let category = create_test_category(&db, "Pizza", "pizza", menu.id).await?;
    Ok((db, menu, category))
}

/// Customer with every field filled in.
pub fn test_customer() -> CustomerDetails {
    CustomerDetails {
        first_name: "Aigerim".to_string(),
        last_name: "Sadykova".to_string(),
        phone: "+7 701 123 4567".to_string(),
        address: "Abay Ave 10, apt 5".to_string(),
    }
}

/// Builds an order line.
pub fn test_item(id: i64, name: &str, price: f64, quantity: u32) -> OrderItem {
    OrderItem {
        id,
        name: name.to_string(),
        quantity,
        price,
        image_url: None,
    }
}

/// Two pizzas at 2500, total 5000.
pub fn test_new_order() -> NewOrder {
    NewOrder {
        items: vec![test_item(1, "Pizza", 2500.0, 2)],
        customer: test_customer(),
        total: 5000.0,
    }
}

/// Creates a `new` order from [`test_new_order`].
pub async fn create_test_order(db: &DatabaseConnection) -> Result<entities::order::Model> {
    order::create_order(db, test_new_order(), false).await
}

/// Creates an order for the given items with a matching total and moves it to `status`.
pub async fn create_order_with_status(
    db: &DatabaseConnection,
    items: Vec<OrderItem>,
    status: OrderStatus,
) -> Result<entities::order::Model> {
    let total = crate::core::money::to_f64(crate::core::money::items_total(&items)?);
    let created = order::create_order(
        db,
        NewOrder {
            items,
            customer: test_customer(),
            total,
        },
        true,
    )
    .await?;

    if status == OrderStatus::New {
        return Ok(created);
    }
    order::update_order_status(db, created.id, status).await
}

/// Creates a completed order placed at a fixed instant.
pub async fn create_completed_order_at(
    db: &DatabaseConnection,
    items: Vec<OrderItem>,
    created_at: DateTime<Utc>,
) -> Result<entities::order::Model> {
    let order = create_order_with_status(db, items, OrderStatus::Completed).await?;
    set_order_created_at(db, order.id, created_at).await
}

/// Inserts a completed order directly, skipping order validation.
/// Stands in for rows written by older versions or other tools.
pub async fn insert_completed_order_unchecked(
    db: &DatabaseConnection,
    items: Vec<OrderItem>,
    total: f64,
) -> Result<entities::order::Model> {
    let order = entities::order::ActiveModel {
        customer_details: Set(test_customer()),
        order_items: Set(items.into()),
        total_amount: Set(total),
        order_status: Set(OrderStatus::Completed),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    order.insert(db).await.map_err(Into::into)
}

/// Rewrites an order's creation time. Test-only backdating.
pub async fn set_order_created_at(
    db: &DatabaseConnection,
    order_id: i64,
    created_at: DateTime<Utc>,
) -> Result<entities::order::Model> {
    let existing = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(crate::errors::Error::OrderNotFound { id: order_id })?;
    let mut active_model: entities::order::ActiveModel = existing.into();
    active_model.created_at = Set(created_at);
    active_model.update(db).await.map_err(Into::into)
}
