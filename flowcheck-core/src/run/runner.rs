use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::codec::CodecContext;
use crate::config::{CodecParams, RunConfig};
use crate::error::{FlowError, Result};
use crate::flow::Role;
use crate::run::stats::{StageRecord, Throughput};

/// One file for one stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Set when an earlier stage already failed for this file.
    pub skip: Option<String>,
}

impl Job {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            skip: None,
        }
    }

    pub fn skipped(mut self, reason: impl Into<String>) -> Self {
        self.skip = Some(reason.into());
        self
    }
}

/// Drives one context over an ordered job list.
///
/// A source that cannot be read or an artifact that cannot be written is
/// fatal for the whole batch. Codec failures are recorded against the file
/// and the batch moves on.
pub struct BatchRunner {
    params: CodecParams,
    pool: Option<rayon::ThreadPool>,
}

impl BatchRunner {
    pub fn new(config: &RunConfig) -> Result<Self> {
        let pool = if config.jobs > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(config.jobs)
                    .thread_name(|i| format!("batch-{i}"))
                    .build()?,
            )
        } else {
            None
        };
        Ok(Self {
            params: config.codec_params(),
            pool,
        })
    }

    /// Records come back in job order whether or not files ran in parallel.
    pub fn run(
        &self,
        ctx: &dyn CodecContext,
        role: Role,
        jobs: &[Job],
    ) -> Result<Vec<StageRecord>> {
        match &self.pool {
            Some(pool) if jobs.len() > 1 => pool.install(|| {
                jobs.par_iter()
                    .map(|job| self.run_one(ctx, role, job))
                    .collect()
            }),
            _ => jobs.iter().map(|job| self.run_one(ctx, role, job)).collect(),
        }
    }

    fn run_one(&self, ctx: &dyn CodecContext, role: Role, job: &Job) -> Result<StageRecord> {
        if let Some(reason) = &job.skip {
            remove_stale(&job.output)?;
            return Ok(StageRecord {
                role,
                source: job.source.clone(),
                artifact: job.output.clone(),
                input_bytes: 0,
                result: Err(reason.clone()),
            });
        }

        let start = Instant::now();
        let input = fs::read(&job.source).map_err(|e| FlowError::open(&job.source, e))?;

        let kernel_start = Instant::now();
        let out = match role {
            Role::Compress => ctx.compress(&input, &self.params),
            Role::Decompress => ctx.decompress(&input),
        };
        let kernel = kernel_start.elapsed();

        let result = match out {
            Ok(bytes) => {
                fs::write(&job.output, &bytes).map_err(|e| FlowError::write(&job.output, e))?;
                let e2e = start.elapsed();
                debug!(
                    %role,
                    file = %job.source.display(),
                    input = input.len(),
                    output = bytes.len(),
                    "stage done"
                );
                Ok(Throughput {
                    output_bytes: bytes.len() as u64,
                    e2e,
                    kernel,
                })
            }
            Err(e) => {
                remove_stale(&job.output)?;
                warn!(%role, file = %job.source.display(), "codec failure: {e}");
                Err(format!("{role} of '{}' failed: {e}", job.source.display()))
            }
        };

        Ok(StageRecord {
            role,
            source: job.source.clone(),
            artifact: job.output.clone(),
            input_bytes: input.len() as u64,
            result,
        })
    }
}

/// A leftover artifact from an earlier run must not be validated as if this
/// run had produced it.
fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FlowError::write(path, e)),
    }
}
