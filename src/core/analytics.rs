//! Sales analytics - Revenue and quantity rollups over completed orders.
//!
//! Only orders whose status is exactly `completed` count. The embedded item arrays are
//! decoded here and aggregated in memory, then joined to the catalog by dish id for the
//! category and menu views. Items whose dish has since been deleted cannot be attributed
//! to a category or menu and are left out of those two views.

use crate::{
    core::money,
    entities::{Category, Dish, Menu, Order, OrderStatus, order},
    errors::Result,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, prelude::*, sea_query::Expr};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Inclusive lower bound
    pub start: DateTime<Utc>,
    /// Exclusive upper bound
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Whether `instant` falls inside the interval.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Dashboard headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    /// Sum of `total_amount` over completed orders
    pub total_revenue: f64,
    /// Number of completed orders
    pub total_completed_orders: u64,
    /// Number of orders still in `new`
    pub new_orders_count: u64,
}

/// What the sales rows are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesDimension {
    /// Per dish (id and name as recorded on the order)
    Dish,
    /// Per owning category of the dish
    Category,
    /// Per owning menu of the dish
    Menu,
}

impl SalesDimension {
    /// Prefix used for the id/name keys in JSON output (`dish_id`, `category_name`, ...).
    #[must_use]
    pub const fn key_prefix(self) -> &'static str {
        match self {
            Self::Dish => "dish",
            Self::Category => "category",
            Self::Menu => "menu",
        }
    }
}

/// One aggregated row.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRow {
    /// Dish, category or menu id
    pub id: i64,
    /// Dish, category or menu name
    pub name: String,
    /// Sum of price x quantity
    pub total_revenue: f64,
    /// Sum of quantity
    pub total_quantity_sold: u64,
}

#[derive(Debug, Default)]
struct Tally {
    revenue: Decimal,
    quantity: u64,
}

impl Tally {
    fn add(&mut self, price: f64, quantity: u32) -> Result<()> {
        self.revenue = money::checked_add(self.revenue, money::line_total(price, quantity)?)?;
        self.quantity = self.quantity.saturating_add(u64::from(quantity));
        Ok(())
    }
}

/// Converts tallies into rows sorted by revenue (descending), then id and name.
fn into_sorted_rows(tallies: HashMap<(i64, String), Tally>) -> Vec<SalesRow> {
    let mut rows: Vec<(Decimal, SalesRow)> = tallies
        .into_iter()
        .map(|((id, name), tally)| {
            (
                tally.revenue,
                SalesRow {
                    id,
                    name,
                    total_revenue: money::to_f64(tally.revenue),
                    total_quantity_sold: tally.quantity,
                },
            )
        })
        .collect();

    rows.sort_by(|(rev_a, a), (rev_b, b)| {
        rev_b
            .cmp(rev_a)
            .then_with(|| a.id.cmp(&b.id))
            .then_with(|| a.name.cmp(&b.name))
    });
    rows.into_iter().map(|(_, row)| row).collect()
}

/// Groups all lines of `orders` by the dish id and name recorded on each line.
///
/// # Errors
/// Returns `InvalidAmount` if a revenue sum does not fit in a `Decimal`.
pub fn aggregate_by_dish(orders: &[order::Model]) -> Result<Vec<SalesRow>> {
    let mut tallies: HashMap<(i64, String), Tally> = HashMap::new();
    for item in orders.iter().flat_map(|o| o.order_items.iter()) {
        tallies
            .entry((item.id, item.name.clone()))
            .or_default()
            .add(item.price, item.quantity)?;
    }
    Ok(into_sorted_rows(tallies))
}

/// Groups all lines of `orders` by an owner resolved from the dish id.
///
/// `owner_of` maps dish id to owner id; `owner_names` maps owner id to its display name.
/// Lines whose dish or owner is unknown are skipped.
pub fn aggregate_by_owner(
    orders: &[order::Model],
    owner_of: &HashMap<i64, i64>,
    owner_names: &HashMap<i64, String>,
) -> Result<Vec<SalesRow>> {
    let mut tallies: HashMap<(i64, String), Tally> = HashMap::new();
    let mut skipped = 0usize;
    for item in orders.iter().flat_map(|o| o.order_items.iter()) {
        let Some((owner_id, owner_name)) = owner_of
            .get(&item.id)
            .and_then(|owner_id| owner_names.get(owner_id).map(|name| (*owner_id, name)))
        else {
            skipped += 1;
            continue;
        };
        tallies
            .entry((owner_id, owner_name.clone()))
            .or_default()
            .add(item.price, item.quantity)?;
    }
    if skipped > 0 {
        debug!("Skipped {} order line(s) with no catalog match", skipped);
    }
    Ok(into_sorted_rows(tallies))
}

/// Completed orders, newest first, optionally restricted to a date range.
pub async fn completed_orders(
    db: &DatabaseConnection,
    range: Option<DateRange>,
) -> Result<Vec<order::Model>> {
    let mut query = Order::find().filter(order::Column::OrderStatus.eq(OrderStatus::Completed));
    if let Some(range) = range {
        query = query
            .filter(order::Column::CreatedAt.gte(range.start))
            .filter(order::Column::CreatedAt.lt(range.end));
    }
    query
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Computes the dashboard summary with aggregate queries; item arrays are not loaded.
#[instrument(skip(db))]
pub async fn sales_summary(db: &DatabaseConnection) -> Result<SalesSummary> {
    let completed = || Order::find().filter(order::Column::OrderStatus.eq(OrderStatus::Completed));

    let revenue: Option<f64> = completed()
        .select_only()
        .column_as(Expr::col(order::Column::TotalAmount).sum(), "total_revenue")
        .into_tuple::<Option<f64>>()
        .one(db)
        .await?
        .flatten();
    let total_completed_orders = completed().count(db).await?;

    let new_orders_count = Order::find()
        .filter(order::Column::OrderStatus.eq(OrderStatus::New))
        .count(db)
        .await?;

    Ok(SalesSummary {
        total_revenue: money::to_f64(money::to_decimal(revenue.unwrap_or_default())),
        total_completed_orders,
        new_orders_count,
    })
}

/// Aggregates completed orders along `dimension`, optionally within `range`.
#[instrument(skip(db))]
pub async fn sales_by(
    db: &DatabaseConnection,
    dimension: SalesDimension,
    range: Option<DateRange>,
) -> Result<Vec<SalesRow>> {
    let orders = completed_orders(db, range).await?;
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    match dimension {
        SalesDimension::Dish => aggregate_by_dish(&orders),
        SalesDimension::Category => {
            let owner_of: HashMap<i64, i64> = Dish::find()
                .all(db)
                .await?
                .into_iter()
                .map(|d| (d.id, d.category_id))
                .collect();
            let names: HashMap<i64, String> = Category::find()
                .all(db)
                .await?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect();
            aggregate_by_owner(&orders, &owner_of, &names)
        }
        SalesDimension::Menu => {
            let owner_of: HashMap<i64, i64> = Dish::find()
                .all(db)
                .await?
                .into_iter()
                .map(|d| (d.id, d.menu_id))
                .collect();
            let names: HashMap<i64, String> = Menu::find()
                .all(db)
                .await?
                .into_iter()
                .map(|m| (m.id, m.name))
                .collect();
            aggregate_by_owner(&orders, &owner_of, &names)
        }
    }
}
