//! Per-zone statistics collection from `zonestat(1)`.
//!
//! The collector runs the statistics tool for one sampling interval and
//! turns its parsable output into an [`crate::model::AggregateStat`]:
//!
//! ```text
//! zonestat -p ──▶ ZonestatSource ──▶ tokenize_line ──▶ zone_name
//!                  (trait)                              extract_metric
//!                                                          │
//!                                             two-pass merge (collect)
//!                                                          │
//!                                                    AggregateStat
//! ```
//!
//! The `ZonestatSource` trait is the test seam: production uses
//! [`ZonestatCommand`], tests use [`mock::MockZonestat`] with canned
//! reports.

pub mod collect;
pub mod mock;
pub mod parser;
pub mod source;

pub use collect::{CollectError, ZoneCollector, aggregate};
pub use parser::{MetricFragment, ParseError, extract_metric, tokenize_line, zone_name};
pub use source::{DEFAULT_ZONESTAT_PATH, SourceError, ZonestatCommand, ZonestatSource};
