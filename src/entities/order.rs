//! Order entity - An immutable record of a checkout.
//!
//! Customer details and the item list are embedded JSON documents, frozen at creation.
//! After creation only `order_status` ever changes, and only along the transitions
//! allowed by [`OrderStatus::can_transition_to`].

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Delivery contact, embedded rather than referenced
    #[sea_orm(column_type = "Json")]
    pub customer_details: CustomerDetails,
    /// Denormalized copies of the cart lines at checkout time
    #[sea_orm(column_type = "Json")]
    pub order_items: OrderItems,
    /// Total as submitted at checkout
    pub total_amount: f64,
    /// Current lifecycle state
    pub order_status: OrderStatus,
    /// When the order was placed
    pub created_at: DateTimeUtc,
}

/// Orders have no foreign keys; items reference dishes by value only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Delivery contact captured at checkout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    /// Customer first name
    pub first_name: String,
    /// Customer last name
    pub last_name: String,
    /// Contact phone
    pub phone: String,
    /// Delivery address
    pub address: String,
}

/// One cart line frozen into an order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Dish id at the time of checkout
    pub id: i64,
    /// Dish name at the time of checkout
    pub name: String,
    /// Number of units
    pub quantity: u32,
    /// Unit price at the time of checkout
    pub price: f64,
    /// Dish photo reference
    #[serde(default)]
    pub image_url: Option<String>,
}

/// The embedded item array, stored as a JSON list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct OrderItems(pub Vec<OrderItem>);

impl OrderItems {
    /// Iterates over the order lines.
    pub fn iter(&self) -> std::slice::Iter<'_, OrderItem> {
        self.0.iter()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the order has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<OrderItem>> for OrderItems {
    fn from(items: Vec<OrderItem>) -> Self {
        Self(items)
    }
}

/// Lifecycle state of an order.
///
/// `New` is the initial state; `Completed` and `Cancelled` are terminal.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, awaiting staff action
    #[sea_orm(string_value = "new")]
    New,
    /// Delivered; counted toward revenue
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Abandoned by staff or customer
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// Wire/database spelling of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further transitions are allowed out of this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::New, Self::Completed) | (Self::New, Self::Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "new" => Ok(Self::New),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(crate::errors::Error::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_status_transitions_from_new() {
        assert!(OrderStatus::New.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::New.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::New.can_transition_to(OrderStatus::New));
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for terminal in [OrderStatus::Completed, OrderStatus::Cancelled] {
            assert!(terminal.is_terminal());
            for next in [
                OrderStatus::New,
                OrderStatus::Completed,
                OrderStatus::Cancelled,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
        assert!(!OrderStatus::New.is_terminal());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("new".parse::<OrderStatus>().unwrap(), OrderStatus::New);
        assert_eq!(
            " completed ".parse::<OrderStatus>().unwrap(),
            OrderStatus::Completed
        );
        assert!(matches!(
            "shipped".parse::<OrderStatus>(),
            Err(crate::errors::Error::InvalidStatus { .. })
        ));
    }

    #[test]
    fn test_customer_details_use_camel_case() {
        let details = CustomerDetails {
            first_name: "Aigerim".to_string(),
            last_name: "Sadykova".to_string(),
            phone: "+7 701 000 0000".to_string(),
            address: "Abay 10".to_string(),
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["firstName"], "Aigerim");
        assert_eq!(json["lastName"], "Sadykova");
    }

    #[test]
    fn test_order_items_serialize_as_plain_array() {
        let items = OrderItems(vec![OrderItem {
            id: 1,
            name: "Pizza".to_string(),
            quantity: 2,
            price: 2500.0,
            image_url: None,
        }]);
        let json = serde_json::to_value(&items).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["quantity"], 2);
    }
}
