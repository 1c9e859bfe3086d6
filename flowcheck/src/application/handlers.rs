use std::path::Path;

use clap::CommandFactory;
use tracing::info;

use flowcheck_core::report::{NullSink, StageReport};
use flowcheck_core::{
    Acquisition, Binding, BlockSize, FileList, FlowError, FlowOrchestrator, FlowReport,
    FlowSelector, NativeRuntime, ReportSink, Result, RunConfig,
};

use crate::presentation::cli::Cli;
use crate::presentation::report::TextReport;

fn acquisition_from(cli: &Cli) -> Acquisition {
    match &cli.single_xclbin {
        Some(single) => Acquisition::Shared(Binding::new(single.as_str())),
        None => Acquisition::PerRole {
            compress: Binding::new(cli.compress_xclbin.as_str()),
            decompress: Binding::new(cli.decompress_xclbin.as_str()),
        },
    }
}

/// Build the run configuration. An unknown block size prints the help text
/// before the usage error is returned.
pub fn config_from(cli: &Cli) -> Result<RunConfig> {
    let block_size = BlockSize::from_selector(cli.block_size).inspect_err(|_| {
        let _ = Cli::command().print_help();
    })?;
    let config = RunConfig {
        block_size,
        level: cli.level,
        jobs: cli.jobs,
        acquisition: acquisition_from(cli),
    };
    config.validate()?;
    Ok(config)
}

/// Run every requested mode in the order compress, decompress,
/// compress-decompress, file list. Selectors and the block size are checked
/// before any mode starts.
pub fn dispatch(cli: &Cli) -> Result<FlowReport> {
    if !cli.has_mode() {
        let _ = Cli::command().print_help();
        return Err(FlowError::Usage(
            "no mode selected; pass --compress, --decompress, --compress_decompress or --file_list"
                .into(),
        ));
    }
    let config = config_from(cli)?;
    let selector = cli
        .file_list
        .as_ref()
        .map(|_| FlowSelector::from_index(cli.flow))
        .transpose()?;

    info!(
        block_size = %config.block_size,
        jobs = config.jobs,
        shared = config.acquisition.is_shared(),
        "configuration ready"
    );

    if selector.is_some_and(FlowSelector::uses_reference) {
        info!("selected flows include the reference engine");
    }

    let runtime = NativeRuntime::new(cli.kernel_threads);
    let orchestrator = FlowOrchestrator::new(&runtime, config)?;

    let mut text = TextReport::stdout();
    let mut null = NullSink;
    let sink: &mut dyn ReportSink = if cli.json { &mut null } else { &mut text };

    let mut report = FlowReport::default();
    if let Some(path) = &cli.compress {
        report.stages.push(compress(&orchestrator, path, sink)?);
    }
    if let Some(path) = &cli.decompress {
        report.stages.push(orchestrator.decompress_file(path, sink)?);
    }
    if let Some(path) = &cli.compress_decompress {
        report.pairings.push(orchestrator.round_trip_file(path, sink)?);
    }
    if let (Some(list), Some(selector)) = (&cli.file_list, selector) {
        let files = FileList::load(list)?;
        report.merge(orchestrator.run(selector, &files, sink)?);
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::other)?;
        println!("{json}");
    } else {
        text.summary(&report);
    }
    Ok(report)
}

fn compress(
    orchestrator: &FlowOrchestrator<'_>,
    path: &Path,
    sink: &mut dyn ReportSink,
) -> Result<StageReport> {
    let stage = orchestrator.compress_file(path, sink)?;
    if let Some(rec) = stage.records.first().filter(|r| r.is_ok()) {
        info!(artifact = %rec.artifact.display(), "compressed");
    }
    Ok(stage)
}
