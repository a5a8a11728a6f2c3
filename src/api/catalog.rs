//! Catalog API handlers: menus, categories and dishes.

use crate::{
    api::AppState,
    core::{
        catalog::{self, DishFilter, DishInput},
        category::{self, CategoryInput},
    },
    entities::{CategoryModel, DishModel, MenuModel},
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::{Value, json};

type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

/// Catalog routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/menus", get(list_menus).post(create_menu))
        .route("/api/menus/{id}", get(get_menu))
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/api/dishes", get(list_dishes).post(create_dish))
        .route(
            "/api/dishes/{id}",
            get(get_dish).put(update_dish).delete(delete_dish),
        )
}

/// Menu creation body.
#[derive(Debug, Default, Deserialize)]
pub struct MenuBody {
    #[allow(missing_docs)]
    pub name: Option<String>,
}

/// Category create/update body.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryBody {
    #[allow(missing_docs)]
    pub name: Option<String>,
    #[allow(missing_docs)]
    pub slug: Option<String>,
    #[allow(missing_docs)]
    pub position: Option<i32>,
    #[allow(missing_docs)]
    pub menu_id: Option<i64>,
}

impl TryFrom<CategoryBody> for CategoryInput {
    type Error = Error;

    fn try_from(body: CategoryBody) -> Result<Self> {
        let (Some(name), Some(slug), Some(menu_id)) = (body.name, body.slug, body.menu_id) else {
            return Err(Error::validation("Name, slug, and menu_id are required"));
        };
        Ok(Self {
            name,
            slug,
            position: body.position,
            menu_id,
        })
    }
}

/// Dish create/update body.
#[derive(Debug, Default, Deserialize)]
pub struct DishBody {
    #[allow(missing_docs)]
    pub name: Option<String>,
    #[allow(missing_docs)]
    pub description: Option<String>,
    #[allow(missing_docs)]
    pub price: Option<f64>,
    #[allow(missing_docs)]
    pub menu_id: Option<i64>,
    #[allow(missing_docs)]
    pub category_id: Option<i64>,
    #[allow(missing_docs)]
    pub image_url: Option<String>,
    #[allow(missing_docs)]
    pub model_url: Option<String>,
}

impl TryFrom<DishBody> for DishInput {
    type Error = Error;

    fn try_from(body: DishBody) -> Result<Self> {
        let (Some(name), Some(price), Some(menu_id), Some(category_id)) =
            (body.name, body.price, body.menu_id, body.category_id)
        else {
            return Err(Error::validation(
                "Name, price, menu_id, and category_id are required",
            ));
        };
        Ok(Self {
            name,
            description: body.description.filter(|d| !d.trim().is_empty()),
            price,
            menu_id,
            category_id,
            image_url: body.image_url.filter(|u| !u.trim().is_empty()),
            model_url: body.model_url.filter(|u| !u.trim().is_empty()),
        })
    }
}

/// `?menu_id=` filter.
#[derive(Debug, Default, Deserialize)]
pub struct MenuFilterQuery {
    #[allow(missing_docs)]
    pub menu_id: Option<i64>,
}

/// `?menu_id=&category_id=` filter.
#[derive(Debug, Default, Deserialize)]
pub struct DishFilterQuery {
    #[allow(missing_docs)]
    pub menu_id: Option<i64>,
    #[allow(missing_docs)]
    pub category_id: Option<i64>,
}

async fn list_menus(State(state): State<AppState>) -> Result<Json<Vec<MenuModel>>> {
    Ok(Json(catalog::list_menus(&state.database).await?))
}

async fn get_menu(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<MenuModel>> {
    catalog::get_menu_by_id(&state.database, id)
        .await?
        .map(Json)
        .ok_or(Error::MenuNotFound { id })
}

async fn create_menu(
    State(state): State<AppState>,
    payload: JsonBody<MenuBody>,
) -> Result<(StatusCode, Json<MenuModel>)> {
    let Json(body) = payload?;
    let menu = catalog::create_menu(&state.database, body.name.unwrap_or_default()).await?;
    Ok((StatusCode::CREATED, Json(menu)))
}

async fn list_categories(
    State(state): State<AppState>,
    query: std::result::Result<Query<MenuFilterQuery>, QueryRejection>,
) -> Result<Json<Vec<CategoryModel>>> {
    let Query(query) = query?;
    Ok(Json(
        category::list_categories(&state.database, query.menu_id).await?,
    ))
}

async fn create_category(
    State(state): State<AppState>,
    payload: JsonBody<CategoryBody>,
) -> Result<(StatusCode, Json<CategoryModel>)> {
    let Json(body) = payload?;
    let created = category::create_category(&state.database, body.try_into()?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: JsonBody<CategoryBody>,
) -> Result<Json<CategoryModel>> {
    let Json(body) = payload?;
    let updated = category::update_category(&state.database, id, body.try_into()?).await?;
    Ok(Json(updated))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    category::delete_category(&state.database, id).await?;
    Ok(Json(json!({ "message": "Category deleted successfully" })))
}

async fn list_dishes(
    State(state): State<AppState>,
    query: std::result::Result<Query<DishFilterQuery>, QueryRejection>,
) -> Result<Json<Vec<DishModel>>> {
    let Query(query) = query?;
    let filter = DishFilter {
        menu_id: query.menu_id,
        category_id: query.category_id,
    };
    Ok(Json(catalog::list_dishes(&state.database, filter).await?))
}

async fn get_dish(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<DishModel>> {
    catalog::get_dish_by_id(&state.database, id)
        .await?
        .map(Json)
        .ok_or(Error::DishNotFound { id })
}

async fn create_dish(
    State(state): State<AppState>,
    payload: JsonBody<DishBody>,
) -> Result<(StatusCode, Json<DishModel>)> {
    let Json(body) = payload?;
    let created = catalog::create_dish(&state.database, body.try_into()?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_dish(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: JsonBody<DishBody>,
) -> Result<Json<DishModel>> {
    let Json(body) = payload?;
    let updated = catalog::update_dish(&state.database, id, body.try_into()?).await?;
    Ok(Json(updated))
}

async fn delete_dish(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    catalog::delete_dish(&state.database, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
