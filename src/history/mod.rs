//! The transactional history view.
//!
//! This module contains everything related to the history:
//! - The transaction record model and its validation
//! - Aggregation of records into years, months and categories
//! - Totals, balances and percentages
//! - Expansion state and the view session of each page visit
//! - Ordering and formatting for display
//! - The HTML views and route handlers for the history page

pub mod aggregation;
pub mod expansion;
pub mod format;
mod page;
pub mod projection;
pub mod record;
pub mod session;
pub mod summary;
mod view;

pub use aggregation::{AggregatedHistory, aggregate, aggregate_dtos};
pub use expansion::{ExpansionState, YearMonth};
pub use format::NumberLocale;
pub(crate) use page::{
    get_history_content, get_history_page, get_history_snapshot, is_valid_user_id,
    toggle_month_endpoint, toggle_year_endpoint,
};
pub use projection::project;
pub use record::{DataShapeError, TransactionDto, TransactionRecord, TransactionType};
pub use session::{HistorySession, SessionStore, ViewId, ViewSessions};
