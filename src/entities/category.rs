//! Category entity - Groups dishes inside a menu.
//!
//! The slug is unique per menu (enforced by `idx_categories_menu_slug`) and
//! `position` controls display order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Pizza", "Drinks")
    pub name: String,
    /// URL-friendly identifier, unique within the owning menu
    pub slug: String,
    /// Sort order, ascending
    pub position: i32,
    /// Owning menu
    pub menu_id: i64,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each category belongs to one menu
    #[sea_orm(
        belongs_to = "super::menu::Entity",
        from = "Column::MenuId",
        to = "super::menu::Column::Id"
    )]
    Menu,
    /// One category has many dishes
    #[sea_orm(has_many = "super::dish::Entity")]
    Dishes,
}

impl Related<super::menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Menu.def()
    }
}

impl Related<super::dish::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dishes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
