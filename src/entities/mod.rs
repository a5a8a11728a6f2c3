//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod dish;
pub mod menu;
pub mod order;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use dish::{Column as DishColumn, Entity as Dish, Model as DishModel};
pub use menu::{Column as MenuColumn, Entity as Menu, Model as MenuModel};
pub use order::{
    Column as OrderColumn, CustomerDetails, Entity as Order, Model as OrderModel, OrderItem,
    OrderItems, OrderStatus,
};
