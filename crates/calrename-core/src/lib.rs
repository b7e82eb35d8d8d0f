//! Core types: rename rules, date windows, tracing setup

pub mod rename;
pub mod time;
pub mod tracing;

pub use rename::{RenameRule, Renamed, RuleError};
pub use time::{TimeWindow, TimeWindowError, default_start_date, parse_date};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
