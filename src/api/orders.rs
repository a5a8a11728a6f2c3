//! Order API handlers.

use crate::{
    api::AppState,
    core::order::{self, NewOrder},
    entities::{CustomerDetails, OrderItem, order::Model as Order},
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;

/// Order routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list).post(create))
        .route("/api/orders/{id}", get(get_by_id))
        .route("/api/orders/{id}/status", put(update_status))
}

/// Checkout body. Fields are optional so that a missing one is a 400, not a decode failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody {
    /// Cart lines
    pub cart: Option<Vec<OrderItem>>,
    /// Customer contact
    pub order_details: Option<OrderDetailsBody>,
    /// Client-computed total
    pub total: Option<f64>,
}

/// Customer contact as submitted; blank and absent fields are both rejected later.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailsBody {
    #[allow(missing_docs)]
    pub first_name: Option<String>,
    #[allow(missing_docs)]
    pub last_name: Option<String>,
    #[allow(missing_docs)]
    pub phone: Option<String>,
    #[allow(missing_docs)]
    pub address: Option<String>,
}

impl From<OrderDetailsBody> for CustomerDetails {
    fn from(body: OrderDetailsBody) -> Self {
        Self {
            first_name: body.first_name.unwrap_or_default(),
            last_name: body.last_name.unwrap_or_default(),
            phone: body.phone.unwrap_or_default(),
            address: body.address.unwrap_or_default(),
        }
    }
}

/// Status change body.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusBody {
    /// Target status
    pub status: Option<String>,
}

/// POST /api/orders
async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateOrderBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>)> {
    let Json(body) = payload?;
    let (Some(items), Some(details), Some(total)) = (body.cart, body.order_details, body.total)
    else {
        return Err(Error::validation("Missing order data"));
    };

    let new_order = NewOrder {
        items,
        customer: details.into(),
        total,
    };
    let created = order::create_order(
        &state.database,
        new_order,
        state.settings.orders.verify_totals,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/orders
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    Ok(Json(order::list_orders(&state.database).await?))
}

/// GET /api/orders/{id}
async fn get_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Order>> {
    order::get_order_by_id(&state.database, id)
        .await?
        .map(Json)
        .ok_or(Error::OrderNotFound { id })
}

/// PUT /api/orders/{id}/status
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: std::result::Result<Json<UpdateStatusBody>, JsonRejection>,
) -> Result<Json<Order>> {
    let Json(body) = payload?;
    let status = body
        .status
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::validation("Missing order status"))?;
    let updated = order::update_order_status_str(&state.database, id, &status).await?;
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use crate::api::test_support::*;
    use crate::errors::Result;
    use crate::test_utils::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    fn pizza_order() -> serde_json::Value {
        json!({
            "cart": [{ "id": 1, "name": "Pizza", "price": 2500, "quantity": 2 }],
            "orderDetails": {
                "firstName": "Aigerim",
                "lastName": "Sadykova",
                "phone": "+7 701 123 4567",
                "address": "Abay Ave 10"
            },
            "total": 5000
        })
    }

    #[tokio::test]
    async fn test_create_and_fetch_order() -> Result<()> {
        let app = test_app(setup_test_db().await?);

        let (status, created) = send_json(&app, Method::POST, "/api/orders", Some(pizza_order())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["order_status"], "new");
        assert_eq!(created["total_amount"], 5000.0);
        assert_eq!(created["order_items"][0]["quantity"], 2);
        assert_eq!(created["customer_details"]["firstName"], "Aigerim");

        let id = created["id"].as_i64().unwrap();
        let (status, fetched) = send_json(&app, Method::GET, &format!("/api/orders/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, all) = send_json(&app, Method::GET, "/api/orders", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_missing_data() -> Result<()> {
        let db = setup_test_db().await?;
        let app = test_app(db.clone());

        let mut body = pizza_order();
        body.as_object_mut().unwrap().remove("total");
        let (status, error) = send_json(&app, Method::POST, "/api/orders", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "Missing order data");

        let mut body = pizza_order();
        body["orderDetails"].as_object_mut().unwrap().remove("phone");
        let (status, error) = send_json(&app, Method::POST, "/api/orders", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "Missing order data: phone");

        let mut body = pizza_order();
        body["cart"] = json!([]);
        let (status, _) = send_json(&app, Method::POST, "/api/orders", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(crate::core::order::list_orders(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() -> Result<()> {
        let app = test_app(setup_test_db().await?);
        let (status, _, _) = send(
            &app,
            Method::POST,
            "/api/orders",
            Some(json!({ "cart": "not a list" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_order() -> Result<()> {
        let app = test_app(setup_test_db().await?);
        let (status, error) = send_json(&app, Method::GET, "/api/orders/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error["error"], "Order not found: 42");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_status_flow() -> Result<()> {
        let db = setup_test_db().await?;
        let order = create_test_order(&db).await?;
        let app = test_app(db);
        let uri = format!("/api/orders/{}/status", order.id);

        let (status, _) = send_json(&app, Method::PUT, &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send_json(&app, Method::PUT, &uri, Some(json!({ "status": "shipped" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, updated) =
            send_json(&app, Method::PUT, &uri, Some(json!({ "status": "completed" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["order_status"], "completed");

        // Terminal
        let (status, _) =
            send_json(&app, Method::PUT, &uri, Some(json!({ "status": "cancelled" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send_json(
            &app,
            Method::PUT,
            "/api/orders/9999/status",
            Some(json!({ "status": "completed" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }
}
