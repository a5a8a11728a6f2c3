//! Analytics API handlers: dashboard numbers, per-dimension sales and the xlsx report.

use crate::{
    api::AppState,
    core::{
        analytics::{self, SalesDimension, SalesRow, SalesSummary},
        export,
        report::{self, ReportKind, ReportPeriod, ReportRequest},
    },
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::info;

/// Analytics routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/analytics/summary", get(summary))
        .route("/api/analytics/by-dish", get(by_dish))
        .route("/api/analytics/by-category", get(by_category))
        .route("/api/analytics/by-menu", get(by_menu))
        .route("/api/analytics/sales-report", get(sales_report))
}

/// Query string of the report download.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    /// `orders` (default), `dishes`, `categories` or `menus`
    pub report_type: Option<String>,
    /// `day`, `week`, `month` or `year`
    pub period: Option<String>,
    /// Anchor date; today when absent or unparseable
    pub specific_date: Option<String>,
}

/// Serialises a row with dimension-prefixed keys, e.g. `dish_id` and `dish_name`.
fn sales_row_json(dimension: SalesDimension, row: SalesRow) -> Value {
    let prefix = dimension.key_prefix();
    let mut object = Map::new();
    object.insert(format!("{prefix}_id"), json!(row.id));
    object.insert(format!("{prefix}_name"), json!(row.name));
    object.insert("total_revenue".to_string(), json!(row.total_revenue));
    object.insert(
        "total_quantity_sold".to_string(),
        json!(row.total_quantity_sold),
    );
    Value::Object(object)
}

async fn sales_json(state: &AppState, dimension: SalesDimension) -> Result<Json<Vec<Value>>> {
    let rows = analytics::sales_by(&state.database, dimension, None).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| sales_row_json(dimension, row))
            .collect(),
    ))
}

/// GET /api/analytics/summary
async fn summary(State(state): State<AppState>) -> Result<Json<SalesSummary>> {
    Ok(Json(analytics::sales_summary(&state.database).await?))
}

/// GET /api/analytics/by-dish
async fn by_dish(State(state): State<AppState>) -> Result<Json<Vec<Value>>> {
    sales_json(&state, SalesDimension::Dish).await
}

/// GET /api/analytics/by-category
async fn by_category(State(state): State<AppState>) -> Result<Json<Vec<Value>>> {
    sales_json(&state, SalesDimension::Category).await
}

/// GET /api/analytics/by-menu
async fn by_menu(State(state): State<AppState>) -> Result<Json<Vec<Value>>> {
    sales_json(&state, SalesDimension::Menu).await
}

/// GET /api/analytics/sales-report?reportType&period&specificDate
async fn sales_report(
    State(state): State<AppState>,
    query: std::result::Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query?;

    let period: ReportPeriod = query
        .period
        .as_deref()
        .ok_or_else(|| Error::validation("Invalid report period specified."))?
        .parse()?;
    let kind = match query.report_type.as_deref() {
        Some(raw) => raw.parse()?,
        None => ReportKind::default(),
    };

    let offset = state.settings.reports.offset()?;
    let anchor = report::resolve_anchor(
        query.specific_date.as_deref(),
        report::today_at(offset),
        offset,
    );

    let report = report::build_report(
        &state.database,
        ReportRequest {
            kind,
            period,
            anchor,
        },
        &state.settings.reports,
    )
    .await?;
    let bytes = export::render_xlsx(&report.table)?;
    let file_name = report.file_name();
    info!("Serving {} ({} bytes)", file_name, bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, export::XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
