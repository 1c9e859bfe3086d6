use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "flowcheck: cross-validate accelerated and reference codec variants",
    long_about = None
)]
pub struct Cli {
    /// Compress one file to <FILE>.snappy
    #[arg(short = 'c', long = "compress", value_name = "FILE")]
    pub compress: Option<PathBuf>,

    /// Decompress one file to <FILE>.orig
    #[arg(short = 'd', long = "decompress", value_name = "FILE")]
    pub decompress: Option<PathBuf>,

    /// Compress, decompress and validate one file
    #[arg(short = 'v', long = "compress_decompress", value_name = "FILE")]
    pub compress_decompress: Option<PathBuf>,

    /// List of input files, one path per line
    #[arg(short = 'l', long = "file_list", value_name = "FILE")]
    pub file_list: Option<PathBuf>,

    /// Validation flow [0-All: 1-XcXd: 2-XcSd: 3-ScXd]
    #[arg(
        short = 'x',
        long = "flow",
        default_value_t = 1,
        allow_negative_numbers = true
    )]
    pub flow: i64,

    /// Compress block size [0-64: 1-256: 2-1024: 3-4096] KiB
    #[arg(short = 'B', long = "block_size", default_value_t = 0)]
    pub block_size: u32,

    /// Binding loaded by the accelerated compressor
    #[arg(long = "compress_xclbin", default_value = "compress")]
    pub compress_xclbin: String,

    /// Binding loaded by the accelerated decompressor
    #[arg(long = "decompress_xclbin", default_value = "decompress")]
    pub decompress_xclbin: String,

    /// One binding for both roles (single-binary mode)
    #[arg(long = "single_xclbin")]
    pub single_xclbin: Option<String>,

    /// Files processed in parallel within a stage
    #[arg(short = 'j', long, default_value_t = 1)]
    pub jobs: usize,

    /// Codec level handed to both engines
    #[arg(long, default_value_t = 3)]
    pub level: i32,

    /// Worker threads per accelerated context (0 = one per core)
    #[arg(long = "kernel_threads", default_value_t = 0)]
    pub kernel_threads: usize,

    /// Print the collected report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn has_mode(&self) -> bool {
        self.compress.is_some()
            || self.decompress.is_some()
            || self.compress_decompress.is_some()
            || self.file_list.is_some()
    }
}
