#![forbid(unsafe_code)]

pub mod error;

pub mod config;
pub mod file_list;
pub mod flow;
pub mod naming;

pub mod codec;

pub mod engine {
    pub mod accelerated;
    pub mod reference;
}

pub mod session;

pub mod run {
    pub mod runner;
    pub mod stats;
}

pub mod validate;

pub mod orchestrator;
pub mod report;

// Re-exports: stable API surface
pub use codec::{CodecContext, CodecError, NativeRuntime, Runtime};
pub use config::{Acquisition, Binding, BlockSize, RunConfig};
pub use error::{FlowError, Result};
pub use file_list::FileList;
pub use flow::{FlowSelector, Pairing, Role, Scheme, Variant};
pub use orchestrator::FlowOrchestrator;
pub use report::{FlowReport, PairingReport, ReportSink};
pub use validate::{Outcome, ValidationRecord, Validator};
