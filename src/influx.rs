//! InfluxDB client and line-protocol encoding.
//!
//! One blocking request per action with a fixed timeout and no retries: a
//! skipped cron cycle is preferable to corrupted metrics, so every failure
//! is fatal to the invocation.

use std::time::Duration;

use tracing::debug;

use crate::model::MemoryKind;
use crate::totals::Totals;

/// Per-request timeout on every database call.
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for the metrics database.
///
/// Passed explicitly into [`InfluxClient::new`]; there is no module-wide
/// configuration state.
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    /// Server base URL, e.g. `http://influxdb.local:8086`. A trailing
    /// slash is tolerated.
    pub base_url: String,
    /// Database samples are written into.
    pub database: String,
}

impl InfluxConfig {
    pub fn new(base_url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            database: database.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Error type for metrics-database calls.
#[derive(Debug)]
pub enum InfluxError {
    /// Connection failure, invalid URL, timeout, or body decode failure.
    Http(reqwest::Error),
    /// The server answered with a non-success status.
    Status { status: u16, body: String },
}

impl std::fmt::Display for InfluxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfluxError::Http(e) => write!(f, "metrics database request failed: {}", e),
            InfluxError::Status { status, body } => {
                write!(f, "metrics database returned HTTP {}: {}", status, body.trim())
            }
        }
    }
}

impl std::error::Error for InfluxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InfluxError::Http(e) => Some(e),
            InfluxError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for InfluxError {
    fn from(e: reqwest::Error) -> Self {
        InfluxError::Http(e)
    }
}

/// Blocking client for the metrics database.
pub struct InfluxClient {
    config: InfluxConfig,
    http: reqwest::blocking::Client,
}

impl InfluxClient {
    pub fn new(config: InfluxConfig) -> Result<Self, InfluxError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self { config, http })
    }

    /// Writes a line-protocol payload. Success is HTTP 200 or 204.
    pub fn write(&self, payload: &str) -> Result<(), InfluxError> {
        let url = self.config.endpoint("write");
        debug!(%url, db = %self.config.database, bytes = payload.len(), "writing samples");
        let resp = self
            .http
            .post(url)
            .query(&[("db", self.config.database.as_str())])
            .header("Content-Type", "application/octet-stream")
            .body(payload.to_string())
            .send()?;
        check(resp).map(|_| ())
    }

    /// Lists databases on the server (`SHOW DATABASES`).
    pub fn show_databases(&self) -> Result<serde_json::Value, InfluxError> {
        let resp = self
            .http
            .get(self.config.endpoint("query"))
            .query(&[("q", "SHOW DATABASES")])
            .send()?;
        let resp = check(resp)?;
        Ok(resp.json()?)
    }

    /// Liveness check. The server answers `/ping` with 204 when healthy.
    pub fn ping(&self) -> Result<(), InfluxError> {
        let resp = self.http.get(self.config.endpoint("ping")).send()?;
        let status = resp.status().as_u16();
        if status == 204 {
            Ok(())
        } else {
            Err(InfluxError::Status {
                status,
                body: resp.text().unwrap_or_default(),
            })
        }
    }
}

fn check(resp: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, InfluxError> {
    let status = resp.status().as_u16();
    if status == 200 || status == 204 {
        debug!(status, "metrics database accepted request");
        Ok(resp)
    } else {
        Err(InfluxError::Status {
            status,
            body: resp.text().unwrap_or_default(),
        })
    }
}

/// Encodes totals as newline-delimited line-protocol records.
///
/// Record order is fixed so payloads are deterministic:
/// `zcount` and `hostmem` scalars first, then used/capped per memory kind,
/// all in kibibytes.
pub fn encode_totals(totals: &Totals, host: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("zcount,host={} value={}\n", host, totals.zone_count));
    out.push_str(&format!("hostmem,host={} value={}\n", host, totals.host_mem));
    for kind in MemoryKind::ALL {
        let total = totals.memory(kind);
        out.push_str(&format!(
            "{},host={},type=used value={}\n",
            kind.as_str(),
            host,
            total.used
        ));
        out.push_str(&format!(
            "{},host={},type=capped value={}\n",
            kind.as_str(),
            host,
            total.capped
        ));
    }
    out
}
