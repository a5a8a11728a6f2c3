//! Unified error type for the ordering core.
//!
//! Every fallible operation in the crate returns [`Result`]. The HTTP layer maps each
//! variant onto a status code in [`crate::api::error`].

use crate::entities::order::OrderStatus;
use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Underlying store failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Required input is missing or malformed
    #[error("{message}")]
    Validation {
        /// Human-readable reason, surfaced to the client verbatim
        message: String,
    },

    /// A price or total is negative or not a finite number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected value
        amount: f64,
    },

    /// Client total disagrees with the sum of its items
    #[error("Order total {submitted:.2} does not match item sum {computed:.2}")]
    TotalMismatch {
        /// Total sent by the client
        submitted: f64,
        /// Total recomputed from price x quantity
        computed: f64,
    },

    /// Status string is not one of `new`, `completed`, `cancelled`
    #[error("Invalid order status: '{value}'")]
    InvalidStatus {
        /// The rejected status string
        value: String,
    },

    /// Status change not allowed by the order state machine
    #[error("Cannot change order status from '{from}' to '{to}'")]
    InvalidStatusTransition {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    #[error("Order not found: {id}")]
    #[allow(missing_docs)]
    OrderNotFound { id: i64 },

    #[error("Menu not found: {id}")]
    #[allow(missing_docs)]
    MenuNotFound { id: i64 },

    #[error("Category not found: {id}")]
    #[allow(missing_docs)]
    CategoryNotFound { id: i64 },

    #[error("Dish not found: {id}")]
    #[allow(missing_docs)]
    DishNotFound { id: i64 },

    /// Another category of the same menu already uses this slug
    #[error("Slug already exists for this menu.")]
    DuplicateSlug {
        /// The conflicting slug
        slug: String,
        /// Menu the slug is scoped to
        menu_id: i64,
    },

    /// Category still referenced by dishes
    #[error(
        "Cannot delete category. It is associated with {dish_count} existing dish(es). Please reassign or delete those dishes first."
    )]
    CategoryInUse {
        /// Category that was to be deleted
        id: i64,
        /// Number of dishes referencing it
        dish_count: u64,
    },

    /// The requested report range has no rows
    #[error("Нет данных для отчета '{sheet}' за выбранный период.")]
    NoReportData {
        /// Sheet title of the empty report
        sheet: String,
    },

    /// Workbook generation failed
    #[error("Report export error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    /// I/O failure (config file, socket binding)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable could not be read
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
