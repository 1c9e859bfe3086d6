use serde::Serialize;

use crate::flow::{Role, Scheme, Variant};
use crate::run::stats::{StageRecord, StageSummary};
use crate::validate::{Outcome, ValidationRecord};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageReport {
    pub role: Role,
    pub variant: Variant,
    pub binding: Option<String>,
    pub records: Vec<StageRecord>,
    pub summary: StageSummary,
}

impl StageReport {
    pub fn new(
        role: Role,
        variant: Variant,
        binding: Option<String>,
        records: Vec<StageRecord>,
    ) -> Self {
        let summary = StageSummary::from_records(&records);
        Self {
            role,
            variant,
            binding,
            records,
            summary,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PairingReport {
    pub scheme: Scheme,
    pub compress: StageReport,
    pub decompress: StageReport,
    pub validation: Vec<ValidationRecord>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
}

impl Tally {
    pub fn of<'r>(records: impl IntoIterator<Item = &'r ValidationRecord>) -> Self {
        let mut t = Tally::default();
        for r in records {
            match r.outcome {
                Outcome::Pass => t.passed += 1,
                Outcome::Fail => t.failed += 1,
                Outcome::Error => t.errors += 1,
            }
        }
        t
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

/// Everything one invocation produced, in execution order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FlowReport {
    pub pairings: Vec<PairingReport>,
    /// Stages run outside a pairing (single-file compress or decompress).
    pub stages: Vec<StageReport>,
}

impl FlowReport {
    pub fn validations(&self) -> impl Iterator<Item = &ValidationRecord> {
        self.pairings.iter().flat_map(|p| p.validation.iter())
    }

    pub fn tally(&self) -> Tally {
        Tally::of(self.validations())
    }

    /// True when every validation passed and no stage recorded a failure.
    pub fn clean(&self) -> bool {
        let stage_failures = self
            .pairings
            .iter()
            .flat_map(|p| [&p.compress, &p.decompress])
            .chain(self.stages.iter())
            .any(|s| s.summary.failed > 0);
        self.tally().all_passed() && !stage_failures
    }

    pub fn merge(&mut self, other: FlowReport) {
        self.pairings.extend(other.pairings);
        self.stages.extend(other.stages);
    }
}

/// Receives progress while a flow runs. Printing is the sink's business.
pub trait ReportSink {
    fn pairing_started(&mut self, _scheme: &Scheme) {}

    fn stage_finished(&mut self, _stage: &StageReport) {}

    fn validated(&mut self, _scheme: &Scheme, _records: &[ValidationRecord]) {}
}

/// Discards everything.
pub struct NullSink;

impl ReportSink for NullSink {}
