//! zonemon - Solaris zones resource monitoring library.
//!
//! Gathers per-zone memory and CPU usage by parsing `zonestat(1)` parsable
//! output, aggregates host-wide totals, and renders them as reports or an
//! InfluxDB line-protocol payload.

pub mod collector;
pub mod influx;
pub mod model;
pub mod report;
pub mod totals;
