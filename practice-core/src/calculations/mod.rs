//! Derived figures computed from a [`Database`](crate::models::Database)
//! snapshot. Everything here is a pure function of its inputs and is
//! recomputed on every read.

pub mod common;
pub mod dashboard;
pub mod year_end;

pub use common::{MethodBreakdown, format_money, round_half_up};
pub use dashboard::{DashboardStats, compute_dashboard_stats};
pub use year_end::{YearEndReport, compute_year_end_report};
