/// Sales rollups over completed orders
pub mod analytics;

/// In-memory shopping cart
pub mod cart;

/// Menus and dishes
pub mod catalog;

/// Menu categories with per-menu slugs
pub mod category;

/// Spreadsheet rendering of report tables
pub mod export;

/// Decimal money arithmetic over stored floats
pub mod money;

/// Order creation and status lifecycle
pub mod order;

/// Period-based sales reports
pub mod report;
