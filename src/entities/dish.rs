//! Dish entity - A purchasable menu item.
//!
//! Each dish has a price and belongs to exactly one menu and one category.
//! Image and 3D model references are opaque strings served elsewhere.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Dish database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dishes")]
pub struct Model {
    /// Unique identifier for the dish
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name shown on the menu
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Unit price
    pub price: f64,
    /// Owning menu
    pub menu_id: i64,
    /// Owning category
    pub category_id: i64,
    /// Reference to the dish photo
    pub image_url: Option<String>,
    /// Reference to the dish 3D model
    pub model_url: Option<String>,
}

/// Defines relationships between Dish and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each dish belongs to one menu
    #[sea_orm(
        belongs_to = "super::menu::Entity",
        from = "Column::MenuId",
        to = "super::menu::Column::Id"
    )]
    Menu,
    /// Each dish belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Menu.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
