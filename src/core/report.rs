//! Sales report generation.
//!
//! This module resolves a report period around an anchor date into a half-open UTC range,
//! gathers the matching completed orders, and lays them out as a [`ReportTable`] ready for
//! export. Day boundaries are local midnights at the restaurant's configured UTC offset.
//! Column headers and sheet titles are in Russian, the locale the restaurant operates in.

use crate::{
    config::settings::ReportSettings,
    core::{
        analytics::{self, DateRange, SalesDimension, SalesRow},
        money,
    },
    entities::order,
    errors::{Error, Result},
};
use chrono::{
    DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc,
};
use sea_orm::DatabaseConnection;
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument};

/// What a report contains. Each kind has its own row builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportKind {
    /// One row per completed order
    #[default]
    Orders,
    /// Sales grouped by dish
    Dishes,
    /// Sales grouped by category
    Categories,
    /// Sales grouped by menu
    Menus,
}

impl ReportKind {
    /// Query-string spelling, also used in the file name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Dishes => "dishes",
            Self::Categories => "categories",
            Self::Menus => "menus",
        }
    }

    /// Worksheet title.
    #[must_use]
    pub const fn sheet_name(self) -> &'static str {
        match self {
            Self::Orders => "Детализация по заказам",
            Self::Dishes => "Продажи по блюдам",
            Self::Categories => "Продажи по категориям",
            Self::Menus => "Продажи по меню",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "orders" => Ok(Self::Orders),
            "dishes" => Ok(Self::Dishes),
            "categories" => Ok(Self::Categories),
            "menus" => Ok(Self::Menus),
            _ => Err(Error::validation("Invalid report type specified.")),
        }
    }
}

/// Length of the reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    /// The anchor day
    Day,
    /// Seven days ending with the anchor day
    Week,
    /// The anchor's calendar month
    Month,
    /// The anchor's calendar year
    Year,
}

impl ReportPeriod {
    /// Query-string spelling, also used in the file name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// First day in the window and first day after it.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the window runs past chrono's supported dates.
    pub fn date_bounds(self, anchor: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let out_of_range = || Error::validation("Report date out of range");
        let next_day = anchor.checked_add_days(Days::new(1)).ok_or_else(out_of_range)?;

        let bounds = match self {
            Self::Day => (anchor, next_day),
            Self::Week => (
                anchor
                    .checked_sub_days(Days::new(6))
                    .ok_or_else(out_of_range)?,
                next_day,
            ),
            Self::Month => {
                let start = anchor.with_day(1).ok_or_else(out_of_range)?;
                let (year, month) = if anchor.month() == 12 {
                    (anchor.year() + 1, 1)
                } else {
                    (anchor.year(), anchor.month() + 1)
                };
                let end = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)?;
                (start, end)
            }
            Self::Year => (
                NaiveDate::from_ymd_opt(anchor.year(), 1, 1).ok_or_else(out_of_range)?,
                NaiveDate::from_ymd_opt(anchor.year() + 1, 1, 1).ok_or_else(out_of_range)?,
            ),
        };
        Ok(bounds)
    }

    /// The window as a UTC range whose ends are local midnights at `offset`.
    pub fn utc_range(self, anchor: NaiveDate, offset: FixedOffset) -> Result<DateRange> {
        let (start, end) = self.date_bounds(anchor)?;
        Ok(DateRange {
            start: local_midnight(start, offset)?,
            end: local_midnight(end, offset)?,
        })
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(Error::validation("Invalid report period specified.")),
        }
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> Result<DateTime<Utc>> {
    offset
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| Error::validation("Report date out of range"))
}

/// Today's calendar date at `offset`.
#[must_use]
pub fn today_at(offset: FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(&offset).date_naive()
}

/// Interprets the requested anchor date, falling back to `today`.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (taken at `offset`); anything else,
/// including an absent value, means `today`.
#[must_use]
pub fn resolve_anchor(raw: Option<&str>, today: NaiveDate, offset: FixedOffset) -> NaiveDate {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return today;
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&offset).date_naive())
        })
        .unwrap_or(today)
}

/// A single worksheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Plain text
    Text(String),
    /// Whole number
    Integer(i64),
    /// Monetary amount, shown with two decimals
    Money(f64),
}

/// One sheet of tabular data.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    /// Worksheet title
    pub sheet_name: String,
    /// Column headers
    pub headers: Vec<String>,
    /// Data rows, each as long as `headers`
    pub rows: Vec<Vec<Cell>>,
}

/// Parameters of a report request after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRequest {
    /// What to report
    pub kind: ReportKind,
    /// Window length
    pub period: ReportPeriod,
    /// Day the window is anchored to
    pub anchor: NaiveDate,
}

/// A generated report, ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesReport {
    /// The request this report answers
    pub request: ReportRequest,
    /// Covered UTC range
    pub range: DateRange,
    /// Tabular content
    pub table: ReportTable,
}

impl SalesReport {
    /// Download file name, e.g. `report_dishes_week_2024-06-10.xlsx`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!(
            "report_{}_{}_{}.xlsx",
            self.request.kind,
            self.request.period,
            self.request.anchor.format("%Y-%m-%d")
        )
    }
}

/// Formats one order line, e.g. `Pizza (x2) - 5000₸`.
pub fn format_order_line(item: &crate::entities::OrderItem, currency: &str) -> Result<String> {
    let line_total = money::to_f64(money::line_total(item.price, item.quantity)?);
    Ok(format!(
        "{} (x{}) - {line_total}{currency}",
        item.name, item.quantity
    ))
}

/// Formats an order timestamp in local time as `dd.mm.yyyy, HH:MM`.
#[must_use]
pub fn format_order_date(created_at: DateTime<Utc>, offset: FixedOffset) -> String {
    created_at
        .with_timezone(&offset)
        .format("%d.%m.%Y, %H:%M")
        .to_string()
}

fn order_rows(
    orders: &[order::Model],
    settings: &ReportSettings,
    offset: FixedOffset,
) -> Result<Vec<Vec<Cell>>> {
    orders
        .iter()
        .map(|o| {
            let items = o
                .order_items
                .iter()
                .map(|item| format_order_line(item, &settings.currency_symbol))
                .collect::<Result<Vec<_>>>()?
                .join("\n");
            Ok(vec![
                Cell::Integer(o.id),
                Cell::Text(o.customer_details.first_name.clone()),
                Cell::Text(o.customer_details.last_name.clone()),
                Cell::Text(o.customer_details.phone.clone()),
                Cell::Text(o.customer_details.address.clone()),
                Cell::Text(items),
                Cell::Text(money::format_amount(o.total_amount)),
                Cell::Text(o.order_status.to_string()),
                Cell::Text(format_order_date(o.created_at, offset)),
            ])
        })
        .collect()
}

fn sales_rows(rows: Vec<SalesRow>) -> Vec<Vec<Cell>> {
    rows.into_iter()
        .map(|row| {
            vec![
                Cell::Text(row.name),
                Cell::Integer(i64::try_from(row.total_quantity_sold).unwrap_or(i64::MAX)),
                Cell::Money(row.total_revenue),
            ]
        })
        .collect()
}

fn sales_headers(first: &str, currency: &str) -> Vec<String> {
    vec![
        first.to_string(),
        "Продано (шт)".to_string(),
        format!("Выручка ({currency})"),
    ]
}

/// Builds the report table for a request.
///
/// # Errors
/// Returns `NoReportData` if no completed order falls in the window, so callers can tell
/// "nothing sold" apart from a failure.
#[instrument(skip(db, settings))]
pub async fn build_report(
    db: &DatabaseConnection,
    request: ReportRequest,
    settings: &ReportSettings,
) -> Result<SalesReport> {
    let offset = settings.offset()?;
    let range = request.period.utc_range(request.anchor, offset)?;
    let currency = settings.currency_symbol.as_str();

    let (headers, rows) = match request.kind {
        ReportKind::Orders => {
            let orders = analytics::completed_orders(db, Some(range)).await?;
            let headers = [
                "ID Заказа",
                "Клиент Имя",
                "Клиент Фамилия",
                "Телефон",
                "Адрес",
                "Товары",
            ]
            .into_iter()
            .map(String::from)
            .chain([
                format!("Сумма ({currency})"),
                "Статус".to_string(),
                "Дата Заказа".to_string(),
            ])
            .collect();
            (headers, order_rows(&orders, settings, offset)?)
        }
        ReportKind::Dishes => {
            let rows = analytics::sales_by(db, SalesDimension::Dish, Some(range)).await?;
            (sales_headers("Название блюда", currency), sales_rows(rows))
        }
        ReportKind::Categories => {
            let rows = analytics::sales_by(db, SalesDimension::Category, Some(range)).await?;
            (sales_headers("Категория", currency), sales_rows(rows))
        }
        ReportKind::Menus => {
            let rows = analytics::sales_by(db, SalesDimension::Menu, Some(range)).await?;
            (sales_headers("Меню", currency), sales_rows(rows))
        }
    };

    if rows.is_empty() {
        return Err(Error::NoReportData {
            sheet: request.kind.sheet_name().to_string(),
        });
    }

    info!(
        "Built {} report for {} {} with {} row(s)",
        request.kind,
        request.period,
        request.anchor,
        rows.len()
    );
    Ok(SalesReport {
        request,
        range,
        table: ReportTable {
            sheet_name: request.kind.sheet_name().to_string(),
            headers,
            rows,
        },
    })
}
