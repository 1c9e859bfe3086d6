use std::io::Write;

use flowcheck_core::report::{FlowReport, StageReport};
use flowcheck_core::{Outcome, ReportSink, Role, Scheme, ValidationRecord};

const RULE: &str = "----------------------------------------------------------------";
const MB: f64 = 1_000_000.0;

/// Prints progress tables as stages finish.
pub struct TextReport<W: Write> {
    out: W,
}

impl TextReport<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    // A closed stdout must not abort the run; output is best effort.
    fn line(&mut self, text: impl AsRef<str>) {
        let _ = writeln!(self.out, "{}", text.as_ref());
    }

    fn banner(&mut self, title: &str) {
        self.line("");
        self.line(RULE);
        self.line(format!("                     {title}"));
        self.line(RULE);
    }

    /// Closing line for the whole invocation.
    pub fn summary(&mut self, report: &FlowReport) {
        let t = report.tally();
        if report.pairings.is_empty() {
            return;
        }
        self.line("");
        self.line(format!(
            "Summary: {} passed, {} failed, {} errors",
            t.passed, t.failed, t.errors
        ));
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn pairing_started(&mut self, scheme: &Scheme) {
        self.banner(scheme.title);
    }

    fn stage_finished(&mut self, stage: &StageReport) {
        self.line("");
        match &stage.binding {
            Some(b) => self.line(format!("{} {} [{b}]", stage.variant, stage.role)),
            None => self.line(format!("{} {}", stage.variant, stage.role)),
        }
        self.line("");
        let ratio_col = match stage.role {
            Role::Compress => "CR",
            Role::Decompress => "DR",
        };
        self.line(format!(
            "E2E(MBps)\tKT(MBps)\t{ratio_col}\tFile Size(MB)\tFile Name"
        ));
        self.line("");
        for rec in &stage.records {
            match rec.failure() {
                Some(msg) => self.line(format!("FAILED\t\t{msg}")),
                None => self.line(format!(
                    "{:.2}\t\t{:.2}\t\t{:.2}\t{:.3}\t\t{}",
                    rec.e2e_mbps().unwrap_or_default(),
                    rec.kernel_mbps().unwrap_or_default(),
                    rec.ratio().unwrap_or_default(),
                    rec.payload_bytes() as f64 / MB,
                    rec.source.display()
                )),
            }
        }
        let s = &stage.summary;
        self.line("");
        self.line(format!(
            "Total: {} of {} files, {:.3} MB, E2E {:.2} MBps, KT {:.2} MBps",
            s.succeeded,
            s.files,
            s.payload_bytes as f64 / MB,
            s.e2e_mbps(),
            s.kernel_mbps()
        ));
    }

    fn validated(&mut self, scheme: &Scheme, records: &[ValidationRecord]) {
        self.line("");
        self.line(format!("Validate: {}", scheme.title));
        self.line("");
        self.line("Status\t\tFile Name");
        self.line("");
        for rec in records {
            match (&rec.outcome, &rec.detail) {
                (Outcome::Pass, _) | (_, None) => {
                    self.line(format!("{}\t\t{}", rec.outcome, rec.original.display()))
                }
                (_, Some(detail)) => self.line(format!(
                    "{}\t\t{} ({detail})",
                    rec.outcome,
                    rec.artifact.display()
                )),
            }
        }
    }
}
