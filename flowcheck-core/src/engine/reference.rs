use std::io::Write;

use tracing::debug;

use crate::codec::{CodecContext, CodecResult};
use crate::config::{Binding, CodecParams};
use crate::error::Result;
use crate::flow::Variant;

/// Single-stream software codec. Ignores the block size, like the standard
/// command line tool it stands in for.
#[derive(Debug, Default)]
pub struct ReferenceContext;

impl ReferenceContext {
    pub fn new() -> Self {
        ReferenceContext
    }
}

impl CodecContext for ReferenceContext {
    fn variant(&self) -> Variant {
        Variant::Reference
    }

    fn binding(&self) -> Option<&Binding> {
        None
    }

    fn compress(&self, input: &[u8], params: &CodecParams) -> CodecResult<Vec<u8>> {
        let sink = Vec::with_capacity(input.len() / 2);
        let mut enc = zstd::stream::Encoder::new(sink, params.level)?;
        enc.write_all(input)?;
        Ok(enc.finish()?)
    }

    fn decompress(&self, input: &[u8]) -> CodecResult<Vec<u8>> {
        let mut dec = zstd::stream::read::Decoder::with_buffer(input)?;
        let mut out = Vec::with_capacity(input.len() * 2);
        std::io::copy(&mut dec, &mut out)?;
        Ok(out)
    }

    fn release(self: Box<Self>) -> Result<()> {
        debug!("reference context released");
        Ok(())
    }
}
