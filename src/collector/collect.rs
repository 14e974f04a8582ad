//! Aggregation of raw zonestat reports into the per-zone model.
//!
//! The report spreads one zone across several unrelated line kinds, so
//! aggregation is a two-pass merge: discover every zone name first, then
//! scan the lines once per zone and merge the extracted fragments into
//! that zone's record. CPU rows cannot discover zones (their zone field
//! shifts position between pool layouts) and may precede the memory row
//! that does, which is why a single insert-on-first-sight pass would lose
//! data. O(zones x lines) is fine at the report sizes involved.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::collector::parser::{
    MetricFragment, ParseError, extract_metric, tokenize_line, zone_name,
};
use crate::collector::source::{SourceError, ZonestatSource};
use crate::model::{AggregateStat, HOST_NAME, ZoneRecord};

/// Error type for one gather cycle.
#[derive(Debug)]
pub enum CollectError {
    /// The statistics source failed to produce a report.
    Source(SourceError),
    /// A report line violated the expected shape.
    Parse(ParseError),
    /// The report named no host entry; every downstream calculation
    /// depends on it.
    MissingHost,
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Source(e) => write!(f, "{}", e),
            CollectError::Parse(e) => write!(f, "{}", e),
            CollectError::MissingHost => {
                write!(f, "statistics report contains no host (resource) entry")
            }
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Source(e) => Some(e),
            CollectError::Parse(e) => Some(e),
            CollectError::MissingHost => None,
        }
    }
}

impl From<SourceError> for CollectError {
    fn from(e: SourceError) -> Self {
        CollectError::Source(e)
    }
}

impl From<ParseError> for CollectError {
    fn from(e: ParseError) -> Self {
        CollectError::Parse(e)
    }
}

/// Drives one statistics source through a full gather cycle.
pub struct ZoneCollector<S: ZonestatSource> {
    source: S,
}

impl<S: ZonestatSource> ZoneCollector<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Runs one sampling cycle and aggregates the report.
    pub fn collect(&self) -> Result<AggregateStat, CollectError> {
        let report = self.source.sample()?;
        let stat = aggregate(&report)?;
        debug!(
            zones = stat.zone_count(),
            host_mem_kib = stat.host_mem,
            "gather cycle complete"
        );
        Ok(stat)
    }
}

/// Builds the consolidated per-zone model from one raw report.
pub fn aggregate(report: &str) -> Result<AggregateStat, CollectError> {
    let lines: Vec<Vec<&str>> = report.lines().filter_map(tokenize_line).collect();

    // Pass 1: zone discovery. Duplicates collapse; order is irrelevant.
    let mut names: HashSet<&str> = HashSet::new();
    for fields in &lines {
        if let Some(name) = zone_name(fields) {
            names.insert(name);
        }
    }

    let mut zones: HashMap<String, ZoneRecord> = names
        .iter()
        .filter(|&&name| name != HOST_NAME)
        .map(|&name| (name.to_string(), ZoneRecord::default()))
        .collect();

    // Pass 2: metric attribution. Later fragments for the same kind
    // overwrite earlier ones.
    let mut host_mem: Option<u64> = None;
    for name in &names {
        for fields in &lines {
            match extract_metric(fields, name)? {
                None => {}
                Some(MetricFragment::HostMemory(v)) => host_mem = Some(v),
                Some(MetricFragment::Memory(kind, values)) => {
                    if let Some(record) = zones.get_mut(*name) {
                        record.set_memory(kind, values);
                    }
                }
                Some(MetricFragment::Cpu(values)) => {
                    if let Some(record) = zones.get_mut(*name) {
                        record.processor_set = Some(values);
                    }
                }
            }
        }
    }

    let host_mem = host_mem.ok_or(CollectError::MissingHost)?;
    Ok(AggregateStat { host_mem, zones })
}
