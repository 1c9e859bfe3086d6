use thiserror::Error;

use crate::config::{Binding, CodecParams};
use crate::engine::accelerated::AcceleratedContext;
use crate::engine::reference::ReferenceContext;
use crate::error::{FlowError, Result};
use crate::flow::Variant;

/// Failure inside a codec call. Reported per file, never fatal to a batch.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("codec I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt stream: {0}")]
    Corrupt(String),
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// A loaded codec runtime bound to one variant.
///
/// Implementations must be reentrant: with `jobs > 1` the runner calls
/// `compress`/`decompress` from several worker threads at once.
pub trait CodecContext: Send + Sync {
    fn variant(&self) -> Variant;

    /// Binding the context was loaded from; `None` for software contexts.
    fn binding(&self) -> Option<&Binding>;

    fn compress(&self, input: &[u8], params: &CodecParams) -> CodecResult<Vec<u8>>;

    fn decompress(&self, input: &[u8]) -> CodecResult<Vec<u8>>;

    fn release(self: Box<Self>) -> Result<()>;
}

/// Opens contexts. The seam tests use to observe context lifetimes.
pub trait Runtime: Send + Sync {
    fn open(&self, variant: Variant, binding: &Binding) -> Result<Box<dyn CodecContext>>;
}

/// Built-in engines.
#[derive(Clone, Debug, Default)]
pub struct NativeRuntime {
    /// Worker threads per accelerated context; 0 lets rayon decide.
    pub kernel_threads: usize,
}

impl NativeRuntime {
    pub fn new(kernel_threads: usize) -> Self {
        Self { kernel_threads }
    }
}

impl Runtime for NativeRuntime {
    fn open(&self, variant: Variant, binding: &Binding) -> Result<Box<dyn CodecContext>> {
        match variant {
            Variant::Accelerated => {
                if binding.as_str().trim().is_empty() {
                    return Err(FlowError::Context(
                        "accelerated context needs a non-empty binding".into(),
                    ));
                }
                Ok(Box::new(AcceleratedContext::init(
                    binding.clone(),
                    self.kernel_threads,
                )?))
            }
            Variant::Reference => Ok(Box::new(ReferenceContext::new())),
        }
    }
}
