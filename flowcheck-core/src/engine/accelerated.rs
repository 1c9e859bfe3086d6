//! Block-parallel engine.
//!
//! The input is cut into blocks of the configured size and every block is
//! compressed into its own frame on the context's worker pool. The frames are
//! concatenated in block order, which keeps the stream readable by the
//! single-stream reference decoder. Decompression walks the frame headers to
//! find block boundaries and decodes the frames in parallel.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::codec::{CodecContext, CodecError, CodecResult};
use crate::config::{Binding, CodecParams};
use crate::error::Result;
use crate::flow::Variant;

pub struct AcceleratedContext {
    binding: Binding,
    pool: rayon::ThreadPool,
}

impl AcceleratedContext {
    /// Load the context. This is the expensive step the runner amortises
    /// over a whole file list.
    pub fn init(binding: Binding, threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("accel-kernel-{i}"))
            .build()?;
        info!(
            binding = %binding,
            kernels = pool.current_num_threads(),
            "accelerated context initialised"
        );
        Ok(Self { binding, pool })
    }

    pub fn kernels(&self) -> usize {
        self.pool.current_num_threads()
    }
}

/// Byte ranges of the frames in a concatenated stream.
fn split_frames(input: &[u8]) -> CodecResult<Vec<&[u8]>> {
    let mut frames = Vec::new();
    let mut rest = input;
    while !rest.is_empty() {
        let at = input.len() - rest.len();
        let n = zstd::zstd_safe::find_frame_compressed_size(rest).map_err(|code| {
            CodecError::Corrupt(format!(
                "bad frame at byte {at}: {}",
                zstd::zstd_safe::get_error_name(code)
            ))
        })?;
        if n == 0 || n > rest.len() {
            return Err(CodecError::Corrupt(format!("truncated frame at byte {at}")));
        }
        let (frame, tail) = rest.split_at(n);
        frames.push(frame);
        rest = tail;
    }
    if frames.is_empty() {
        return Err(CodecError::Corrupt("empty stream".into()));
    }
    Ok(frames)
}

fn concat(parts: Vec<Vec<u8>>) -> Vec<u8> {
    let total = parts.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(total);
    for p in parts {
        out.extend_from_slice(&p);
    }
    out
}

impl CodecContext for AcceleratedContext {
    fn variant(&self) -> Variant {
        Variant::Accelerated
    }

    fn binding(&self) -> Option<&Binding> {
        Some(&self.binding)
    }

    fn compress(&self, input: &[u8], params: &CodecParams) -> CodecResult<Vec<u8>> {
        let level = params.level;
        if input.is_empty() {
            return Ok(zstd::bulk::compress(input, level)?);
        }
        let block = params.block_size.bytes();
        let frames = self.pool.install(|| {
            input
                .par_chunks(block)
                .map(|b| zstd::bulk::compress(b, level))
                .collect::<std::io::Result<Vec<_>>>()
        })?;
        debug!(blocks = frames.len(), block_kib = params.block_size.kib(), "compressed");
        Ok(concat(frames))
    }

    fn decompress(&self, input: &[u8]) -> CodecResult<Vec<u8>> {
        let frames = split_frames(input)?;
        let parts = self.pool.install(|| {
            frames
                .par_iter()
                .map(|f| zstd::stream::decode_all(*f))
                .collect::<std::io::Result<Vec<_>>>()
        })?;
        Ok(concat(parts))
    }

    fn release(self: Box<Self>) -> Result<()> {
        info!(binding = %self.binding, "accelerated context released");
        drop(self.pool);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlockSize;
    use crate::engine::reference::ReferenceContext;

    fn params(block_size: BlockSize) -> CodecParams {
        CodecParams {
            block_size,
            level: 3,
        }
    }

    #[test]
    fn one_frame_per_block() {
        let ctx = AcceleratedContext::init(Binding::new("k.bin"), 2).unwrap();
        let data: Vec<u8> = (0..300 * 1024).map(|i| (i % 251) as u8).collect();

        let packed = ctx.compress(&data, &params(BlockSize::Kib64)).unwrap();
        assert_eq!(split_frames(&packed).unwrap().len(), 5);

        let packed = ctx.compress(&data, &params(BlockSize::Kib1024)).unwrap();
        assert_eq!(split_frames(&packed).unwrap().len(), 1);
        assert_eq!(ctx.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn multi_frame_stream_is_readable_by_reference() {
        let ctx = AcceleratedContext::init(Binding::new("k.bin"), 2).unwrap();
        let reference = ReferenceContext::new();
        let data: Vec<u8> = b"abcdefgh".repeat(40_000);
        let packed = ctx.compress(&data, &params(BlockSize::Kib64)).unwrap();
        assert!(split_frames(&packed).unwrap().len() > 1);
        assert_eq!(reference.decompress(&packed).unwrap(), data);

        let single = reference.compress(&data, &params(BlockSize::Kib64)).unwrap();
        assert_eq!(ctx.decompress(&single).unwrap(), data);
    }

    #[test]
    fn level_reaches_the_codec_unchanged() {
        let ctx = AcceleratedContext::init(Binding::new("k.bin"), 1).unwrap();
        let data = b"level check level check ".repeat(500);
        for level in [-5, 0, 7] {
            let p = CodecParams {
                block_size: BlockSize::Kib1024,
                level,
            };
            let packed = ctx.compress(&data, &p).unwrap();
            assert_eq!(packed, zstd::bulk::compress(&data, level).unwrap());
            assert_eq!(ctx.decompress(&packed).unwrap(), data);
        }
    }

    #[test]
    fn truncated_stream_is_corrupt() {
        let ctx = AcceleratedContext::init(Binding::new("k.bin"), 1).unwrap();
        let packed = ctx
            .compress(&b"0123456789".repeat(1000), &params(BlockSize::Kib64))
            .unwrap();
        let cut = &packed[..packed.len() - 3];
        assert!(ctx.decompress(cut).is_err());
        assert!(matches!(ctx.decompress(&[]), Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn empty_input_round_trips() {
        let ctx = AcceleratedContext::init(Binding::new("k.bin"), 1).unwrap();
        let packed = ctx.compress(&[], &params(BlockSize::Kib64)).unwrap();
        assert!(!packed.is_empty());
        assert!(ctx.decompress(&packed).unwrap().is_empty());
        assert!(ctx.kernels() >= 1);
        Box::new(ctx).release().unwrap();
    }
}
