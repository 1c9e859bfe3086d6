use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::codec::Runtime;
use crate::config::RunConfig;
use crate::error::{FlowError, Result};
use crate::file_list::FileList;
use crate::flow::{FlowSelector, Role, Scheme, Variant};
use crate::naming::{artifact_paths, restored_path};
use crate::report::{FlowReport, PairingReport, ReportSink, StageReport, Tally};
use crate::run::runner::{BatchRunner, Job};
use crate::session::Session;
use crate::validate::Validator;

/// Runs pairings of compressor and decompressor variants over a file list
/// and validates the round trips.
pub struct FlowOrchestrator<'a> {
    runtime: &'a dyn Runtime,
    config: RunConfig,
    runner: BatchRunner,
    validator: Validator,
}

impl<'a> FlowOrchestrator<'a> {
    pub fn new(runtime: &'a dyn Runtime, config: RunConfig) -> Result<Self> {
        config.validate()?;
        let runner = BatchRunner::new(&config)?;
        Ok(Self {
            runtime,
            config,
            runner,
            validator: Validator::default(),
        })
    }

    /// Resolve a raw `--flow` value and run it. An invalid selector is a
    /// usage error raised before any file is touched.
    pub fn run_index(
        &self,
        selector: i64,
        files: &FileList,
        sink: &mut dyn ReportSink,
    ) -> Result<FlowReport> {
        let selector = FlowSelector::from_index(selector)?;
        self.run(selector, files, sink)
    }

    /// Every selected pairing runs, in table order, whatever the earlier
    /// ones reported. Only fatal errors stop the run.
    pub fn run(
        &self,
        selector: FlowSelector,
        files: &FileList,
        sink: &mut dyn ReportSink,
    ) -> Result<FlowReport> {
        let schemes: Vec<Scheme> = selector.pairings().iter().map(|p| p.scheme()).collect();
        preflight(&schemes, files)?;
        let mut report = FlowReport::default();
        for scheme in &schemes {
            report.pairings.push(self.run_scheme(scheme, files, sink)?);
        }
        Ok(report)
    }

    /// Compress every file, then decompress every compressed artifact, then
    /// validate. One context per stage, held for the whole list.
    fn run_scheme(
        &self,
        scheme: &Scheme,
        files: &FileList,
        sink: &mut dyn ReportSink,
    ) -> Result<PairingReport> {
        info!(flow = scheme.title, files = files.len(), "starting pairing");
        sink.pairing_started(scheme);

        let paths: Vec<_> = files.iter().map(|f| artifact_paths(scheme, f)).collect();
        let mut session = Session::new(self.runtime, &self.config.acquisition);

        let compress_jobs: Vec<Job> = paths
            .iter()
            .map(|p| Job::new(&p.original, &p.compressed))
            .collect();
        let compress = self.stage(&mut session, Role::Compress, scheme.compress, &compress_jobs)?;
        sink.stage_finished(&compress);

        let decompress_jobs: Vec<Job> = paths
            .iter()
            .zip(&compress.records)
            .map(|(p, rec)| {
                let job = Job::new(&p.compressed, &p.decompressed);
                if rec.is_ok() {
                    job
                } else {
                    job.skipped(format!(
                        "no compressed artifact for '{}'",
                        p.original.display()
                    ))
                }
            })
            .collect();
        let decompress = self.stage(
            &mut session,
            Role::Decompress,
            scheme.decompress,
            &decompress_jobs,
        )?;
        sink.stage_finished(&decompress);
        session.finish()?;

        let validation = self.validator.validate_all(
            paths
                .iter()
                .map(|p| (p.original.as_path(), p.decompressed.as_path())),
        );
        sink.validated(scheme, &validation);

        let tally = Tally::of(&validation);
        info!(
            flow = scheme.title,
            passed = tally.passed,
            failed = tally.failed,
            errors = tally.errors,
            "pairing validated"
        );

        Ok(PairingReport {
            scheme: *scheme,
            compress,
            decompress,
            validation,
        })
    }

    /// `--compress`: one file to `<file>.snappy`.
    pub fn compress_file(&self, path: &Path, sink: &mut dyn ReportSink) -> Result<StageReport> {
        let scheme = Scheme::SINGLE_FILE;
        preflight(&[scheme], &FileList::single(path))?;
        let job = Job::new(path, artifact_paths(&scheme, path).compressed);
        self.single_stage(Role::Compress, scheme.compress, job, sink)
    }

    /// `--decompress`: one compressed file to `<file>.orig`.
    pub fn decompress_file(&self, path: &Path, sink: &mut dyn ReportSink) -> Result<StageReport> {
        FileList::single(path).preflight()?;
        let scheme = Scheme::SINGLE_FILE;
        let job = Job::new(path, restored_path(scheme.decompress, path));
        self.single_stage(Role::Decompress, scheme.decompress, job, sink)
    }

    /// `--compress_decompress`: the single-file scheme over a one-element list.
    pub fn round_trip_file(
        &self,
        path: &Path,
        sink: &mut dyn ReportSink,
    ) -> Result<PairingReport> {
        let files = FileList::single(path);
        preflight(&[Scheme::SINGLE_FILE], &files)?;
        self.run_scheme(&Scheme::SINGLE_FILE, &files, sink)
    }

    fn single_stage(
        &self,
        role: Role,
        variant: Variant,
        job: Job,
        sink: &mut dyn ReportSink,
    ) -> Result<StageReport> {
        let mut session = Session::new(self.runtime, &self.config.acquisition);
        let report = self.stage(&mut session, role, variant, std::slice::from_ref(&job))?;
        session.finish()?;
        sink.stage_finished(&report);
        Ok(report)
    }

    fn stage(
        &self,
        session: &mut Session<'_>,
        role: Role,
        variant: Variant,
        jobs: &[Job],
    ) -> Result<StageReport> {
        let ctx = session.acquire(role, variant)?;
        let binding = ctx.binding().map(|b| b.to_string());
        let records = self.runner.run(ctx, role, jobs)?;
        Ok(StageReport::new(role, variant, binding, records))
    }
}

/// Inputs must be readable and non-empty, and no artifact of the selected
/// schemes may land on an input. Runs before any context is opened.
fn preflight(schemes: &[Scheme], files: &FileList) -> Result<()> {
    files.preflight()?;
    let inputs: HashSet<&Path> = files.iter().map(PathBuf::as_path).collect();
    for scheme in schemes {
        for original in files {
            let paths = artifact_paths(scheme, original);
            for artifact in [&paths.compressed, &paths.decompressed] {
                if inputs.contains(artifact.as_path()) {
                    return Err(FlowError::Usage(format!(
                        "input '{}' would be overwritten by the {} artifact of '{}'",
                        artifact.display(),
                        scheme.tag,
                        original.display()
                    )));
                }
            }
        }
    }
    Ok(())
}
