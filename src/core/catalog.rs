//! Catalog business logic - Menus and dishes.
//!
//! Provides functions for creating, retrieving, updating, and deleting menus and dishes.
//! Categories live in [`crate::core::category`] because of their extra integrity rules.

use crate::{
    config::settings::MenuSeed,
    core::money,
    entities::{Category, Dish, Menu, dish, menu},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Retrieves all menus ordered by id.
pub async fn list_menus(db: &DatabaseConnection) -> Result<Vec<menu::Model>> {
    Menu::find()
        .order_by_asc(menu::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a menu by id, returning None if it does not exist.
pub async fn get_menu_by_id(db: &DatabaseConnection, menu_id: i64) -> Result<Option<menu::Model>> {
    Menu::find_by_id(menu_id).one(db).await.map_err(Into::into)
}

/// Creates a menu after trimming and validating its name.
pub async fn create_menu(db: &DatabaseConnection, name: String) -> Result<menu::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("Menu name cannot be empty"));
    }

    let menu = menu::ActiveModel {
        name: Set(name.trim().to_string()),
        ..Default::default()
    };
    menu.insert(db).await.map_err(Into::into)
}

/// Inserts the configured menus when the menus table is empty.
///
/// Returns the number of menus created; an already populated catalog is left alone.
#[instrument(skip(db, seeds))]
pub async fn seed_menus(db: &DatabaseConnection, seeds: &[MenuSeed]) -> Result<usize> {
    if seeds.is_empty() || Menu::find().count(db).await? > 0 {
        return Ok(0);
    }

    for seed in seeds {
        create_menu(db, seed.name.clone()).await?;
    }
    info!("Seeded {} menu(s) from configuration", seeds.len());
    Ok(seeds.len())
}

/// Filter for [`list_dishes`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DishFilter {
    /// Only dishes of this menu
    pub menu_id: Option<i64>,
    /// Only dishes of this category
    pub category_id: Option<i64>,
}

/// Retrieves dishes matching the filter, ordered alphabetically by name.
pub async fn list_dishes(db: &DatabaseConnection, filter: DishFilter) -> Result<Vec<dish::Model>> {
    let mut query = Dish::find();
    if let Some(menu_id) = filter.menu_id {
        query = query.filter(dish::Column::MenuId.eq(menu_id));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(dish::Column::CategoryId.eq(category_id));
    }
    query
        .order_by_asc(dish::Column::Name)
        .order_by_asc(dish::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a dish by id, returning None if it does not exist.
pub async fn get_dish_by_id(db: &DatabaseConnection, dish_id: i64) -> Result<Option<dish::Model>> {
    Dish::find_by_id(dish_id).one(db).await.map_err(Into::into)
}

/// Fields of a dish as submitted by staff.
#[derive(Debug, Clone)]
pub struct DishInput {
    /// Dish name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Unit price
    pub price: f64,
    /// Owning menu
    pub menu_id: i64,
    /// Owning category, which must belong to `menu_id`
    pub category_id: i64,
    /// Photo reference
    pub image_url: Option<String>,
    /// 3D model reference
    pub model_url: Option<String>,
}

/// Checks field values and that the menu/category pair exists and is consistent.
async fn validate_dish_input(db: &DatabaseConnection, input: &DishInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("Dish name cannot be empty"));
    }
    if !money::is_valid_amount(input.price) {
        return Err(Error::InvalidAmount {
            amount: input.price,
        });
    }

    Menu::find_by_id(input.menu_id)
        .one(db)
        .await?
        .ok_or(Error::MenuNotFound { id: input.menu_id })?;
    let category = Category::find_by_id(input.category_id)
        .one(db)
        .await?
        .ok_or(Error::CategoryNotFound {
            id: input.category_id,
        })?;

    if category.menu_id != input.menu_id {
        return Err(Error::validation(format!(
            "Category {} does not belong to menu {}",
            input.category_id, input.menu_id
        )));
    }
    Ok(())
}

/// Creates a dish after validating its fields and references.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or the price is negative, not finite or above [`money::MAX_AMOUNT`]
/// - The menu or category does not exist, or the category belongs to another menu
/// - The database insert fails
#[instrument(skip(db))]
pub async fn create_dish(db: &DatabaseConnection, input: DishInput) -> Result<dish::Model> {
    validate_dish_input(db, &input).await?;

    let dish = dish::ActiveModel {
        name: Set(input.name.trim().to_string()),
        description: Set(input.description),
        price: Set(input.price),
        menu_id: Set(input.menu_id),
        category_id: Set(input.category_id),
        image_url: Set(input.image_url),
        model_url: Set(input.model_url),
        ..Default::default()
    };
    let created = dish.insert(db).await?;
    info!("Created dish {} '{}'", created.id, created.name);
    Ok(created)
}

/// Replaces every field of an existing dish.
///
/// Past orders are unaffected: they hold their own copies of name and price.
#[instrument(skip(db))]
pub async fn update_dish(
    db: &DatabaseConnection,
    dish_id: i64,
    input: DishInput,
) -> Result<dish::Model> {
    let mut dish: dish::ActiveModel = Dish::find_by_id(dish_id)
        .one(db)
        .await?
        .ok_or(Error::DishNotFound { id: dish_id })?
        .into();

    validate_dish_input(db, &input).await?;

    dish.name = Set(input.name.trim().to_string());
    dish.description = Set(input.description);
    dish.price = Set(input.price);
    dish.menu_id = Set(input.menu_id);
    dish.category_id = Set(input.category_id);
    dish.image_url = Set(input.image_url);
    dish.model_url = Set(input.model_url);

    dish.update(db).await.map_err(Into::into)
}

/// Deletes a dish permanently.
#[instrument(skip(db))]
pub async fn delete_dish(db: &DatabaseConnection, dish_id: i64) -> Result<()> {
    let result = Dish::delete_by_id(dish_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::DishNotFound { id: dish_id });
    }
    info!("Deleted dish {}", dish_id);
    Ok(())
}
