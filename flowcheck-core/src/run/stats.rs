use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::flow::Role;

/// Megabytes (10^6) per second.
pub fn mbps(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    bytes as f64 / 1_000_000.0 / secs
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Throughput {
    pub output_bytes: u64,
    /// File read + codec call + artifact write.
    pub e2e: Duration,
    /// Codec call only.
    pub kernel: Duration,
}

/// One file through one stage.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageRecord {
    pub role: Role,
    pub source: PathBuf,
    pub artifact: PathBuf,
    pub input_bytes: u64,
    pub result: Result<Throughput, String>,
}

impl StageRecord {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn failure(&self) -> Option<&str> {
        self.result.as_ref().err().map(String::as_str)
    }

    pub fn output_bytes(&self) -> Option<u64> {
        self.result.as_ref().ok().map(|t| t.output_bytes)
    }

    /// Size of the uncompressed side, which throughput is measured against.
    pub fn payload_bytes(&self) -> u64 {
        match (self.role, &self.result) {
            (Role::Compress, _) => self.input_bytes,
            (Role::Decompress, Ok(t)) => t.output_bytes,
            (Role::Decompress, Err(_)) => 0,
        }
    }

    /// Uncompressed over compressed size.
    pub fn ratio(&self) -> Option<f64> {
        let t = self.result.as_ref().ok()?;
        let (raw, packed) = match self.role {
            Role::Compress => (self.input_bytes, t.output_bytes),
            Role::Decompress => (t.output_bytes, self.input_bytes),
        };
        (packed > 0).then(|| raw as f64 / packed as f64)
    }

    pub fn e2e_mbps(&self) -> Option<f64> {
        let t = self.result.as_ref().ok()?;
        Some(mbps(self.payload_bytes(), t.e2e))
    }

    pub fn kernel_mbps(&self) -> Option<f64> {
        let t = self.result.as_ref().ok()?;
        Some(mbps(self.payload_bytes(), t.kernel))
    }
}

/// Aggregate over all records of a stage.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StageSummary {
    pub files: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub payload_bytes: u64,
    pub e2e: Duration,
    pub kernel: Duration,
}

impl StageSummary {
    pub fn from_records(records: &[StageRecord]) -> Self {
        let mut s = StageSummary {
            files: records.len(),
            ..Default::default()
        };
        for r in records {
            match &r.result {
                Ok(t) => {
                    s.succeeded += 1;
                    s.input_bytes += r.input_bytes;
                    s.output_bytes += t.output_bytes;
                    s.payload_bytes += r.payload_bytes();
                    s.e2e += t.e2e;
                    s.kernel += t.kernel;
                }
                Err(_) => s.failed += 1,
            }
        }
        s
    }

    pub fn e2e_mbps(&self) -> f64 {
        mbps(self.payload_bytes, self.e2e)
    }

    pub fn kernel_mbps(&self) -> f64 {
        mbps(self.payload_bytes, self.kernel)
    }
}
