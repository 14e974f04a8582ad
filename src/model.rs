//! Data model for one gather cycle.
//!
//! These structures hold the consolidated per-zone statistics parsed from
//! one zonestat report. They are built incrementally by the collector
//! (one metric kind arrives per report line) and are immutable once the
//! cycle completes.

use std::collections::HashMap;

use serde::Serialize;

/// Pseudo-zone name under which the host itself is reported.
pub const HOST_NAME: &str = "resource";

/// Memory metric kinds reported per zone.
///
/// Source: `field[1]` of a zonestat memory row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryKind {
    PhysicalMemory,
    VirtualMemory,
    LockedMemory,
}

impl MemoryKind {
    /// All kinds, in report and payload order.
    pub const ALL: [MemoryKind; 3] = [
        MemoryKind::PhysicalMemory,
        MemoryKind::VirtualMemory,
        MemoryKind::LockedMemory,
    ];

    /// The kind name as it appears in the report.
    pub fn as_str(self) -> &'static str {
        match self {
            MemoryKind::PhysicalMemory => "physical-memory",
            MemoryKind::VirtualMemory => "virtual-memory",
            MemoryKind::LockedMemory => "locked-memory",
        }
    }

    /// Maps a report field back to a kind.
    pub fn from_field(field: &str) -> Option<Self> {
        match field {
            "physical-memory" => Some(MemoryKind::PhysicalMemory),
            "virtual-memory" => Some(MemoryKind::VirtualMemory),
            "locked-memory" => Some(MemoryKind::LockedMemory),
            _ => None,
        }
    }
}

/// Sub-values of one memory metric kind, in kibibytes.
///
/// Source: fields 4 (`used`) and 6 (`capped`) of a zonestat memory row,
/// `K` suffix stripped. Uncapped zones report `-`, which parses as 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MemValues {
    pub used: u64,
    pub capped: u64,
}

/// Processor-set usage for one zone.
///
/// Both values are kept as reported: `used` is a fractional CPU count,
/// `pused` a percentage that may carry its `%` suffix. Numeric parsing is
/// deferred to the sort/format stage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CpuValues {
    pub used: String,
    pub pused: String,
}

impl CpuValues {
    /// The percentage as a number, `%` suffix stripped. Non-numeric → 0.
    pub fn pused_percent(&self) -> f64 {
        self.pused.trim_end_matches('%').parse().unwrap_or(0.0)
    }
}

/// All metrics gathered for one zone, merged across report lines.
///
/// Each kind arrives on its own line; a kind the report never mentions for
/// this zone stays `None`. Later lines for the same kind overwrite earlier
/// ones.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ZoneRecord {
    pub physical_memory: Option<MemValues>,
    pub virtual_memory: Option<MemValues>,
    pub locked_memory: Option<MemValues>,
    pub processor_set: Option<CpuValues>,
}

impl ZoneRecord {
    pub fn memory(&self, kind: MemoryKind) -> Option<MemValues> {
        match kind {
            MemoryKind::PhysicalMemory => self.physical_memory,
            MemoryKind::VirtualMemory => self.virtual_memory,
            MemoryKind::LockedMemory => self.locked_memory,
        }
    }

    pub fn set_memory(&mut self, kind: MemoryKind, values: MemValues) {
        match kind {
            MemoryKind::PhysicalMemory => self.physical_memory = Some(values),
            MemoryKind::VirtualMemory => self.virtual_memory = Some(values),
            MemoryKind::LockedMemory => self.locked_memory = Some(values),
        }
    }
}

/// Consolidated statistics for one gather cycle.
///
/// Invariant: exactly one host entry (`host_mem`); `zones` holds only
/// currently-running non-global zones and never the host pseudo-zone.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregateStat {
    /// Total physical memory installed on the host, in kibibytes.
    pub host_mem: u64,
    /// Per-zone records, keyed by zone name.
    pub zones: HashMap<String, ZoneRecord>,
}

impl AggregateStat {
    /// Number of running zones, the host excluded.
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }
}
