//! Parsers for the parsable (`-p`) output of `zonestat(1)`.
//!
//! These are pure functions over single report lines, designed to be
//! testable with string inputs. A report line is colon-delimited; bracketed
//! fields (`[name]`) are unwrapped during tokenization. The same zone is
//! spread across several unrelated line kinds (one per metric), so callers
//! first collect zone names with [`zone_name`] and then attribute metric
//! fragments with [`extract_metric`].

use crate::model::{CpuValues, HOST_NAME, MemValues, MemoryKind};

/// Error type for a report line that violates the expected field shape.
///
/// This is fatal for the whole gather cycle: a shape change means the
/// zonestat output format moved and partial data would be misleading.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed statistics line: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Names that appear in the zone-name field but never denote a real zone.
const SKIP_NAMES: [&str; 3] = ["total", "system", "global"];

/// Splits one raw report line into cleaned fields.
///
/// Returns `None` for empty lines, lines with fewer than two fields, and
/// the `header`/`footer` formatting lines. Surrounding brackets are
/// stripped from every field. Never fails on short input.
pub fn tokenize_line(line: &str) -> Option<Vec<&str>> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() < 2 {
        return None;
    }
    if fields[1] == "header" || fields[1] == "footer" {
        return None;
    }
    Some(
        fields
            .into_iter()
            .map(|f| f.trim_matches(|c| c == '[' || c == ']'))
            .collect(),
    )
}

/// Determines which zone a tokenized line belongs to, if any.
///
/// CPU (`processor-set`) rows never name new zones: their zone field
/// shifts position between pool layouts, so they only contribute metric
/// data once the zone is known from a memory row. The aggregate rows
/// `total`, `system` and `global` are never zones. `resource` names the
/// host pseudo-zone and is a valid result.
pub fn zone_name<'a>(fields: &[&'a str]) -> Option<&'a str> {
    if fields[1] == "processor-set" {
        return None;
    }
    let name = *fields.get(3)?;
    if SKIP_NAMES.contains(&name) {
        return None;
    }
    Some(name)
}

/// A single metric fragment extracted from one report line.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricFragment {
    /// Total physical memory installed on the host, in kibibytes.
    HostMemory(u64),
    /// One memory metric kind for a zone.
    Memory(MemoryKind, MemValues),
    /// Processor-set usage for a zone.
    Cpu(CpuValues),
}

/// Extracts the metric fragment a tokenized line carries for `zone`.
///
/// Returns `Ok(None)` when the line does not pertain to that zone. A field
/// index required by a matching rule but absent from the line is a fatal
/// [`ParseError`].
///
/// The host (`resource`) only ever yields its total physical memory, from
/// the report's host physical-memory row. For real zones, memory rows
/// carry `used`/`capped` at fields 4/6; `processor-set` rows come in two
/// layouts (dedicated-CPU zones shift the fields by one), disambiguated by
/// whether field 5 repeats the zone name.
pub fn extract_metric(
    fields: &[&str],
    zone: &str,
) -> Result<Option<MetricFragment>, ParseError> {
    if zone == HOST_NAME {
        if fields.get(3).copied() == Some(HOST_NAME) && fields[1] == "physical-memory" {
            let raw = field(fields, 4)?;
            return Ok(Some(MetricFragment::HostMemory(parse_kib(raw))));
        }
        return Ok(None);
    }

    if !fields.contains(&zone) {
        return Ok(None);
    }

    if let Some(kind) = MemoryKind::from_field(fields[1]) {
        let used = parse_kib(field(fields, 4)?);
        let capped = parse_kib(field(fields, 6)?);
        return Ok(Some(MetricFragment::Memory(
            kind,
            MemValues { used, capped },
        )));
    }

    if fields[1] == "processor-set" {
        // Dedicated-CPU zones repeat the zone name at field 5 and shift
        // used/pused to fields 6/7; shared-pool zones keep them at 5/6.
        let (used_idx, pused_idx) = if fields.get(5).copied() == Some(zone) {
            (6, 7)
        } else {
            (5, 6)
        };
        let used = field(fields, used_idx)?.to_string();
        let pused = field(fields, pused_idx)?.to_string();
        return Ok(Some(MetricFragment::Cpu(CpuValues { used, pused })));
    }

    Ok(None)
}

fn field<'a>(fields: &[&'a str], idx: usize) -> Result<&'a str, ParseError> {
    fields.get(idx).copied().ok_or_else(|| {
        ParseError::new(format!(
            "missing field {} in {} row",
            idx,
            fields.get(1).copied().unwrap_or("?")
        ))
    })
}

/// Parses a kibibyte magnitude, `K` suffix stripped.
///
/// Uncapped zones report `-`; any non-numeric magnitude parses as 0.
fn parse_kib(raw: &str) -> u64 {
    raw.trim_end_matches('K').parse().unwrap_or(0)
}
