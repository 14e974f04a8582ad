//! Host-wide totals derived from one gather cycle.
//!
//! Totals are computed once per cycle and are read-only afterwards. Every
//! entry is typed at construction: scalar values (zone count, host memory)
//! and per-submetric memory sums are distinct fields, so formatting never
//! inspects value shapes at run time.

use serde::Serialize;

use crate::model::{AggregateStat, MemoryKind};

/// Output units for memory magnitudes. Values are stored in kibibytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    Kibi,
    Mebi,
    Gibi,
}

impl Unit {
    /// Converts a kibibyte magnitude, truncating toward zero.
    ///
    /// Truncation is load-bearing: existing dashboards expect exact
    /// integer division (2,097,152 K is "2G", and so is 2,097,153 K).
    pub fn convert(self, kib: u64) -> u64 {
        match self {
            Unit::Kibi => kib,
            Unit::Mebi => kib / 1024,
            Unit::Gibi => kib / (1024 * 1024),
        }
    }

    /// Formats a kibibyte magnitude in this unit. Kibibytes print as the
    /// bare number; larger units append their suffix.
    pub fn format(self, kib: u64) -> String {
        match self {
            Unit::Kibi => self.convert(kib).to_string(),
            Unit::Mebi => format!("{}M", self.convert(kib)),
            Unit::Gibi => format!("{}G", self.convert(kib)),
        }
    }
}

/// Summed usage for one memory metric kind across all zones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MemTotal {
    pub used: u64,
    pub capped: u64,
}

/// Host-wide totals for one gather cycle.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Totals {
    /// Number of running zones, the host excluded.
    pub zone_count: usize,
    /// Total physical memory installed on the host, in kibibytes.
    pub host_mem: u64,
    pub physical_memory: MemTotal,
    pub virtual_memory: MemTotal,
    pub locked_memory: MemTotal,
}

impl Totals {
    /// Reduces the per-zone record set into summed totals.
    pub fn from_stat(stat: &AggregateStat) -> Self {
        Self {
            zone_count: stat.zone_count(),
            host_mem: stat.host_mem,
            physical_memory: sum_kind(stat, MemoryKind::PhysicalMemory),
            virtual_memory: sum_kind(stat, MemoryKind::VirtualMemory),
            locked_memory: sum_kind(stat, MemoryKind::LockedMemory),
        }
    }

    pub fn memory(&self, kind: MemoryKind) -> MemTotal {
        match kind {
            MemoryKind::PhysicalMemory => self.physical_memory,
            MemoryKind::VirtualMemory => self.virtual_memory,
            MemoryKind::LockedMemory => self.locked_memory,
        }
    }
}

/// Sums one memory kind across all zones.
///
/// Any zone record lacking the kind zeroes the entire total: a partial
/// report must not pass for a smaller host, and callers cross-check a zero
/// against `zone_count` to tell an empty host from incomplete data.
fn sum_kind(stat: &AggregateStat, kind: MemoryKind) -> MemTotal {
    let mut total = MemTotal::default();
    for record in stat.zones.values() {
        match record.memory(kind) {
            Some(values) => {
                total.used += values.used;
                total.capped += values.capped;
            }
            None => return MemTotal::default(),
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemValues, ZoneRecord};

    fn zone(phys: Option<(u64, u64)>, virt: Option<(u64, u64)>) -> ZoneRecord {
        ZoneRecord {
            physical_memory: phys.map(|(used, capped)| MemValues { used, capped }),
            virtual_memory: virt.map(|(used, capped)| MemValues { used, capped }),
            locked_memory: None,
            processor_set: None,
        }
    }

    fn stat(zones: Vec<(&str, ZoneRecord)>) -> AggregateStat {
        AggregateStat {
            host_mem: 4194304,
            zones: zones
                .into_iter()
                .map(|(name, record)| (name.to_string(), record))
                .collect(),
        }
    }

    #[test]
    fn unit_conversion_is_exact_integer_division() {
        assert_eq!(Unit::Gibi.format(2_097_152), "2G");
        assert_eq!(Unit::Gibi.format(4_194_304), "4G");
        assert_eq!(Unit::Mebi.format(2_097_152), "2048M");
        assert_eq!(Unit::Kibi.format(2_097_152), "2097152");
    }

    #[test]
    fn unit_conversion_truncates_toward_zero() {
        // 1.5 GiB worth of kibibytes truncates to 1G.
        assert_eq!(Unit::Gibi.format(1_572_864), "1G");
        assert_eq!(Unit::Gibi.format(1_048_575), "0G");
        assert_eq!(Unit::Mebi.format(1023), "0M");
    }

    #[test]
    fn sums_across_zones() {
        let stat = stat(vec![
            ("a", zone(Some((1_048_576, 2_097_152)), Some((100, 200)))),
            ("b", zone(Some((1_048_576, 2_097_152)), Some((300, 400)))),
        ]);
        let totals = Totals::from_stat(&stat);

        assert_eq!(totals.zone_count, 2);
        assert_eq!(totals.host_mem, 4194304);
        assert_eq!(
            totals.physical_memory,
            MemTotal {
                used: 2_097_152,
                capped: 4_194_304
            }
        );
        assert_eq!(
            totals.virtual_memory,
            MemTotal {
                used: 400,
                capped: 600
            }
        );
        // No zone reported locked memory: total is legitimately zero.
        assert_eq!(totals.locked_memory, MemTotal::default());
    }

    #[test]
    fn missing_kind_in_any_zone_zeroes_that_total() {
        let stat = stat(vec![
            ("a", zone(Some((1_048_576, 2_097_152)), Some((100, 200)))),
            ("b", zone(Some((1_048_576, 2_097_152)), None)),
        ]);
        let totals = Totals::from_stat(&stat);

        // Virtual memory is incomplete and collapses to zero; physical
        // memory is unaffected.
        assert_eq!(totals.virtual_memory, MemTotal::default());
        assert_eq!(
            totals.physical_memory,
            MemTotal {
                used: 2_097_152,
                capped: 4_194_304
            }
        );
    }

    #[test]
    fn empty_host_yields_zero_totals() {
        let stat = stat(vec![]);
        let totals = Totals::from_stat(&stat);

        assert_eq!(totals.zone_count, 0);
        assert_eq!(totals.physical_memory, MemTotal::default());
        assert_eq!(totals.virtual_memory, MemTotal::default());
        assert_eq!(totals.locked_memory, MemTotal::default());
    }

    #[test]
    fn end_to_end_example_totals() {
        let report = "\
x:physical-memory:x:resource:4194304K:x:x
x:physical-memory:x:zoneA:1048576K:x:2097152K
x:virtual-memory:x:zoneA:3145728K:x:6291456K
x:locked-memory:x:zoneA:0K:x:-
";
        let stat = crate::collector::aggregate(report).unwrap();
        let totals = Totals::from_stat(&stat);

        assert_eq!(totals.zone_count, 1);
        assert_eq!(Unit::Gibi.format(totals.physical_memory.used), "1G");
        assert_eq!(Unit::Gibi.format(totals.physical_memory.capped), "2G");
        assert_eq!(Unit::Gibi.format(totals.host_mem), "4G");
    }
}
