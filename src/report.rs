//! Human-readable reports over one gather cycle.
//!
//! Sorting and `%` stripping happen here, at the view stage; the model
//! keeps CPU percentages exactly as reported.

use chrono::{DateTime, Utc};
use clap::ValueEnum;

use crate::model::{AggregateStat, MemValues};
use crate::totals::{Totals, Unit};

/// Sort order for the per-zone report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    /// Descending by physical memory used.
    Mem,
    /// Descending by CPU percentage.
    Cpu,
}

/// Renders the zones summary, host-wide totals in gibibytes.
pub fn totals_report(totals: &Totals, timestamp: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Zones summary at {}:\n",
        timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str("---------------------------------------\n");
    out.push_str(&format!("Zones running:             {}\n", totals.zone_count));
    out.push_str(&format!(
        "Total phys memory used:    {}\n",
        Unit::Gibi.format(totals.physical_memory.used)
    ));
    out.push_str(&format!(
        "Total phys memory capped:  {}\n",
        Unit::Gibi.format(totals.physical_memory.capped)
    ));
    out.push_str(&format!(
        "Total virt memory used:    {}\n",
        Unit::Gibi.format(totals.virtual_memory.used)
    ));
    out.push_str(&format!(
        "Total phys memory locked:  {}\n",
        Unit::Gibi.format(totals.locked_memory.used)
    ));
    out.push_str(&format!(
        "Host physical memory:      {}\n",
        Unit::Gibi.format(totals.host_mem)
    ));
    out
}

/// Renders the per-zone table.
///
/// Without a sort key, rows are ordered by zone name; with one, descending
/// by the chosen usage value (name as tie-break). Memory columns are in
/// mebibytes; missing metrics print `-`.
pub fn zones_report(stat: &AggregateStat, sort: Option<SortKey>) -> String {
    let mut names: Vec<&String> = stat.zones.keys().collect();
    names.sort();

    match sort {
        None => {}
        Some(SortKey::Mem) => {
            names.sort_by(|a, b| {
                let used = |n: &String| {
                    stat.zones[n]
                        .physical_memory
                        .map_or(0, |values| values.used)
                };
                used(b).cmp(&used(a)).then_with(|| a.cmp(b))
            });
        }
        Some(SortKey::Cpu) => {
            names.sort_by(|a, b| {
                let pused = |n: &String| {
                    stat.zones[n]
                        .processor_set
                        .as_ref()
                        .map_or(0.0, |cpu| cpu.pused_percent())
                };
                pused(b).total_cmp(&pused(a)).then_with(|| a.cmp(b))
            });
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<16} {:>10} {:>10} {:>10} {:>10} {:>8} {:>8}\n",
        "ZONE", "PMEM", "PCAP", "VMEM", "LOCKED", "CPU", "%CPU"
    ));
    for name in names {
        let record = &stat.zones[name];
        let mem = |values: Option<MemValues>, pick: fn(MemValues) -> u64| {
            values.map_or_else(|| "-".to_string(), |v| Unit::Mebi.format(pick(v)))
        };
        let (cpu_used, cpu_pused) = match &record.processor_set {
            Some(cpu) => (cpu.used.clone(), cpu.pused.trim_end_matches('%').to_string()),
            None => ("-".to_string(), "-".to_string()),
        };
        out.push_str(&format!(
            "{:<16} {:>10} {:>10} {:>10} {:>10} {:>8} {:>8}\n",
            name,
            mem(record.physical_memory, |v| v.used),
            mem(record.physical_memory, |v| v.capped),
            mem(record.virtual_memory, |v| v.used),
            mem(record.locked_memory, |v| v.used),
            cpu_used,
            cpu_pused,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::aggregate;
    use crate::collector::mock::MockZonestat;
    use crate::collector::source::ZonestatSource;
    use chrono::TimeZone;

    fn typical_stat() -> AggregateStat {
        let report = MockZonestat::typical_host().sample().unwrap();
        aggregate(&report).unwrap()
    }

    #[test]
    fn totals_report_prints_gibibytes() {
        let totals = Totals::from_stat(&typical_stat());
        let ts = Utc.with_ymd_and_hms(2026, 8, 8, 12, 0, 0).unwrap();
        let report = totals_report(&totals, ts);

        assert!(report.contains("Zones summary at 2026-08-08 12:00:00 UTC:"));
        assert!(report.contains("Zones running:             2"));
        assert!(report.contains("Total phys memory used:    3G"));
        assert!(report.contains("Total phys memory capped:  6G"));
        assert!(report.contains("Total virt memory used:    7G"));
        assert!(report.contains("Total phys memory locked:  1G"));
        assert!(report.contains("Host physical memory:      16G"));
    }

    #[test]
    fn zones_report_defaults_to_name_order() {
        let report = zones_report(&typical_stat(), None);
        let lines: Vec<&str> = report.lines().collect();
        assert!(lines[0].starts_with("ZONE"));
        assert!(lines[1].starts_with("db01"));
        assert!(lines[2].starts_with("web01"));
    }

    #[test]
    fn zones_report_sorts_by_memory() {
        // db01 uses 2 GiB physical to web01's 1 GiB.
        let report = zones_report(&typical_stat(), Some(SortKey::Mem));
        let lines: Vec<&str> = report.lines().collect();
        assert!(lines[1].starts_with("db01"));
        assert!(lines[2].starts_with("web01"));
    }

    #[test]
    fn zones_report_sorts_by_cpu_with_percent_stripped() {
        // db01 runs at 60.0% to web01's 3.62%.
        let report = zones_report(&typical_stat(), Some(SortKey::Cpu));
        let lines: Vec<&str> = report.lines().collect();
        assert!(lines[1].starts_with("db01"));
        assert!(lines[1].contains("60.0"));
        assert!(!lines[1].contains('%'));
        assert!(lines[2].starts_with("web01"));
    }

    #[test]
    fn zones_report_renders_mebibytes() {
        let report = zones_report(&typical_stat(), None);
        // web01: 1048576 K used = 1024M; locked 0K = 0M.
        let web = report.lines().find(|l| l.starts_with("web01")).unwrap();
        assert!(web.contains("1024M"));
        assert!(web.contains("0M"));
    }

    #[test]
    fn zones_report_dashes_for_missing_metrics() {
        let report = "\
x:physical-memory:x:resource:4194304K:x:x
x:physical-memory:x:zoneA:1024K:x:2048K
";
        let stat = aggregate(report).unwrap();
        let out = zones_report(&stat, None);
        // zoneA never reported virtual/locked memory or CPU.
        let row = out.lines().find(|l| l.starts_with("zoneA")).unwrap();
        assert!(row.contains("1M"));
        assert!(row.contains('-'));
    }
}
