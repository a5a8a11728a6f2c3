//! Category business logic.
//!
//! Categories carry two integrity rules on top of plain CRUD: a slug is unique within its
//! menu, and a category cannot be deleted while dishes still reference it.

use crate::{
    entities::{Category, Dish, Menu, category, dish},
    errors::{Error, Result},
};
use sea_orm::{
    PaginatorTrait, QueryOrder, Set, SqlErr, TransactionTrait, prelude::*, sea_query::Expr,
};
use tracing::{info, instrument, warn};

/// Lists categories ordered by position then name, optionally restricted to one menu.
///
/// Without a filter, categories of all menus are returned grouped by menu id.
pub async fn list_categories(
    db: &DatabaseConnection,
    menu_id: Option<i64>,
) -> Result<Vec<category::Model>> {
    let mut query = Category::find();
    if let Some(menu_id) = menu_id {
        query = query.filter(category::Column::MenuId.eq(menu_id));
    } else {
        query = query.order_by_asc(category::Column::MenuId);
    }
    query
        .order_by_asc(category::Column::Position)
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by id, returning None if it does not exist.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Fields of a category as submitted by staff.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    /// Display name
    pub name: String,
    /// Slug, unique per menu
    pub slug: String,
    /// Sort position; `None` means 0
    pub position: Option<i32>,
    /// Owning menu
    pub menu_id: i64,
}

fn validate_category_input(input: &CategoryInput) -> Result<()> {
    if input.name.trim().is_empty() || input.slug.trim().is_empty() {
        return Err(Error::validation("Name, slug, and menu_id are required"));
    }
    Ok(())
}

/// Fails with `DuplicateSlug` if another category of the menu already uses the slug.
async fn ensure_slug_free<C>(db: &C, input: &CategoryInput, exclude_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Category::find()
        .filter(category::Column::MenuId.eq(input.menu_id))
        .filter(category::Column::Slug.eq(input.slug.trim()));
    if let Some(id) = exclude_id {
        query = query.filter(category::Column::Id.ne(id));
    }

    if query.one(db).await?.is_some() {
        return Err(Error::DuplicateSlug {
            slug: input.slug.trim().to_string(),
            menu_id: input.menu_id,
        });
    }
    Ok(())
}

/// Maps a unique-index violation raised by the store to `DuplicateSlug`.
fn map_unique_violation(err: DbErr, input: &CategoryInput) -> Error {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        warn!("Unique constraint violated on category slug: {}", detail);
        return Error::DuplicateSlug {
            slug: input.slug.trim().to_string(),
            menu_id: input.menu_id,
        };
    }
    err.into()
}

/// Creates a category in an existing menu.
///
/// # Errors
/// Returns an error if:
/// - The name or slug is empty
/// - The menu does not exist
/// - Another category of the same menu already uses the slug
#[instrument(skip(db))]
pub async fn create_category(
    db: &DatabaseConnection,
    input: CategoryInput,
) -> Result<category::Model> {
    validate_category_input(&input)?;

    let txn = db.begin().await?;

    Menu::find_by_id(input.menu_id)
        .one(&txn)
        .await?
        .ok_or(Error::MenuNotFound { id: input.menu_id })?;
    ensure_slug_free(&txn, &input, None).await?;

    let category = category::ActiveModel {
        name: Set(input.name.trim().to_string()),
        slug: Set(input.slug.trim().to_string()),
        position: Set(input.position.unwrap_or(0)),
        menu_id: Set(input.menu_id),
        ..Default::default()
    };
    let created = category
        .insert(&txn)
        .await
        .map_err(|e| map_unique_violation(e, &input))?;

    txn.commit().await?;
    info!("Created category {} '{}'", created.id, created.slug);
    Ok(created)
}

/// Replaces every field of an existing category.
///
/// Moving the category to another menu moves its dishes along with it, so a dish's
/// category always belongs to the dish's menu.
#[instrument(skip(db))]
pub async fn update_category(
    db: &DatabaseConnection,
    category_id: i64,
    input: CategoryInput,
) -> Result<category::Model> {
    validate_category_input(&input)?;

    let txn = db.begin().await?;

    let existing = Category::find_by_id(category_id)
        .one(&txn)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;
    let previous_menu_id = existing.menu_id;
    let mut category: category::ActiveModel = existing.into();

    Menu::find_by_id(input.menu_id)
        .one(&txn)
        .await?
        .ok_or(Error::MenuNotFound { id: input.menu_id })?;
    ensure_slug_free(&txn, &input, Some(category_id)).await?;

    category.name = Set(input.name.trim().to_string());
    category.slug = Set(input.slug.trim().to_string());
    category.position = Set(input.position.unwrap_or(0));
    category.menu_id = Set(input.menu_id);

    let updated = category
        .update(&txn)
        .await
        .map_err(|e| map_unique_violation(e, &input))?;

    if previous_menu_id != input.menu_id {
        let moved = Dish::update_many()
            .col_expr(dish::Column::MenuId, Expr::value(input.menu_id))
            .filter(dish::Column::CategoryId.eq(category_id))
            .exec(&txn)
            .await?;
        info!(
            "Category {} moved from menu {} to {} with {} dish(es)",
            category_id, previous_menu_id, input.menu_id, moved.rows_affected
        );
    }

    txn.commit().await?;
    Ok(updated)
}

/// Deletes a category that no dish references.
///
/// # Errors
/// Returns `CategoryInUse` if at least one dish belongs to the category, and
/// `CategoryNotFound` if it does not exist.
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let dish_count = Dish::find()
        .filter(dish::Column::CategoryId.eq(category_id))
        .count(&txn)
        .await?;
    if dish_count > 0 {
        return Err(Error::CategoryInUse {
            id: category_id,
            dish_count,
        });
    }

    let result = Category::delete_by_id(category_id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(Error::CategoryNotFound { id: category_id });
    }

    txn.commit().await?;
    info!("Deleted category {}", category_id);
    Ok(())
}
