//! Periods group invoices and their attachment directories.

mod core;
mod endpoint;

pub use core::{
    NewPeriod, Period, PeriodInsert, create_period, create_period_table, delete_period,
    get_all_periods, list_periods, parse_period_name, period_exists,
};
pub use endpoint::period_endpoint;
