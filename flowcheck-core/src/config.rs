use std::fmt;

use serde::Serialize;

use crate::error::{FlowError, Result};
use crate::flow::Role;

/// Block size used by the accelerated engine to split its input.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum BlockSize {
    #[default]
    Kib64,
    Kib256,
    Kib1024,
    Kib4096,
}

impl BlockSize {
    pub const ALL: [BlockSize; 4] = [
        BlockSize::Kib64,
        BlockSize::Kib256,
        BlockSize::Kib1024,
        BlockSize::Kib4096,
    ];

    /// Map the command line selector (0..=3) onto a block size.
    pub fn from_selector(sel: u32) -> Result<Self> {
        Self::ALL.get(sel as usize).copied().ok_or_else(|| {
            FlowError::Usage(format!(
                "invalid block size selector {sel}; expected 0 (64 KiB), 1 (256 KiB), 2 (1024 KiB) or 3 (4096 KiB)"
            ))
        })
    }

    pub fn kib(self) -> usize {
        match self {
            BlockSize::Kib64 => 64,
            BlockSize::Kib256 => 256,
            BlockSize::Kib1024 => 1024,
            BlockSize::Kib4096 => 4096,
        }
    }

    pub fn bytes(self) -> usize {
        self.kib() * 1024
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} KiB", self.kib())
    }
}

/// Identifier of the device binary an accelerated context is loaded from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Binding(String);

impl Binding {
    pub fn new(name: impl Into<String>) -> Self {
        Binding(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How accelerated contexts are bound to roles. Chosen once at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Acquisition {
    /// Single-binary mode: one context serves both compress and decompress.
    Shared(Binding),
    /// A separately loaded context per role.
    PerRole {
        compress: Binding,
        decompress: Binding,
    },
}

impl Acquisition {
    pub fn binding_for(&self, role: Role) -> &Binding {
        match (self, role) {
            (Acquisition::Shared(b), _) => b,
            (Acquisition::PerRole { compress, .. }, Role::Compress) => compress,
            (Acquisition::PerRole { decompress, .. }, Role::Decompress) => decompress,
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, Acquisition::Shared(_))
    }
}

impl Default for Acquisition {
    fn default() -> Self {
        Acquisition::PerRole {
            compress: Binding::new("compress"),
            decompress: Binding::new("decompress"),
        }
    }
}

/// Parameters handed to every codec call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CodecParams {
    pub block_size: BlockSize,
    pub level: i32,
}

/// Immutable run configuration, built once and passed into every operation.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub block_size: BlockSize,
    /// Codec level handed to both engines.
    pub level: i32,
    /// Files processed concurrently within one stage; 1 means sequential.
    pub jobs: usize,
    pub acquisition: Acquisition,
}

impl RunConfig {
    /// Levels outside the codec's range and a zero job count are usage
    /// errors. Level 0 selects the codec default; negative levels are the
    /// fast modes.
    pub fn validate(&self) -> Result<()> {
        let levels = zstd::compression_level_range();
        if !levels.contains(&self.level) {
            return Err(FlowError::Usage(format!(
                "level {} is outside {}..={}",
                self.level,
                levels.start(),
                levels.end()
            )));
        }
        if self.jobs == 0 {
            return Err(FlowError::Usage("jobs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn codec_params(&self) -> CodecParams {
        CodecParams {
            block_size: self.block_size,
            level: self.level,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            block_size: BlockSize::default(),
            level: 3,
            jobs: 1,
            acquisition: Acquisition::default(),
        }
    }
}
