//! Canned zonestat reports for tests.
//!
//! `MockZonestat` plays the role of the real subprocess, returning a fixed
//! report string, so collector tests run anywhere without Solaris.

use crate::collector::source::{SourceError, ZonestatSource};

/// In-memory source returning one fixed report.
#[derive(Debug, Clone)]
pub struct MockZonestat {
    report: String,
}

impl MockZonestat {
    pub fn new(report: impl Into<String>) -> Self {
        Self {
            report: report.into(),
        }
    }

    /// A realistic host with two running zones.
    ///
    /// `web01` lives in the shared pool; `db01` has dedicated CPUs (its
    /// processor-set row uses the shifted field layout). Header/footer
    /// lines and the `total`/`system`/`global` aggregate rows are present
    /// and must all be ignored by the parser.
    pub fn typical_host() -> Self {
        Self::new(
            "\
1:header:20260808T120000Z:interval:1
1:physical-memory:[resource]:[resource]:16777216K:100%:16777216K
1:physical-memory:[resource]:[total]:3145728K:18%:16777216K
1:physical-memory:[resource]:[system]:524288K:3%:16777216K
1:physical-memory:[mem_default]:[global]:1048576K:6%:-
1:physical-memory:[mem_default]:[web01]:1048576K:6%:2097152K
1:physical-memory:[mem_default]:[db01]:2097152K:12%:4194304K
1:virtual-memory:[vm_default]:[web01]:3145728K:4%:6291456K
1:virtual-memory:[vm_default]:[db01]:4194304K:5%:8388608K
1:locked-memory:[mem_default]:[web01]:0K:0%:-
1:locked-memory:[mem_default]:[db01]:1048576K:6%:2097152K
1:processor-set:[pool_default]:[web01]:16:0.58:3.62%
1:processor-set:[dedicated-cpu]:[SUNWtmp_db01]:2:[db01]:1.20:60.0%
1:footer:20260808T120001Z
",
        )
    }

    /// A host with no running zones; only the host rows remain.
    pub fn idle_host() -> Self {
        Self::new(
            "\
1:header:20260808T120000Z:interval:1
1:physical-memory:[resource]:[resource]:8388608K:100%:8388608K
1:physical-memory:[resource]:[total]:524288K:6%:8388608K
1:physical-memory:[resource]:[system]:524288K:6%:8388608K
1:footer:20260808T120001Z
",
        )
    }
}

impl ZonestatSource for MockZonestat {
    fn sample(&self) -> Result<String, SourceError> {
        Ok(self.report.clone())
    }
}

/// Source that always fails, for exercising the fatal path.
#[derive(Debug, Clone)]
pub struct FailingZonestat;

impl ZonestatSource for FailingZonestat {
    fn sample(&self) -> Result<String, SourceError> {
        Err(SourceError::Failed {
            code: Some(1),
            output: "zonestat: unable to open statistics stream\n".to_string(),
        })
    }
}
