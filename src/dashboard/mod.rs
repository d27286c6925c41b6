//! Dashboard module
//!
//! Provides the landing page that shows the income, maaser given and maaser
//! owed for the current Gregorian or Hebrew fiscal year.

mod aggregation;
mod cards;
mod handlers;
mod period;

pub use aggregation::MaaserSummary;
pub use handlers::get_dashboard_page;
pub use period::FiscalPeriod;
