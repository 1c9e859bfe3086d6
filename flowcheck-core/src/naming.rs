//! Artifact naming.
//!
//! Artifacts live next to the original and are named `<original><suffix>`.
//! The suffixes follow from how each variant names its outputs:
//!
//! * the accelerated engine writes the compressed artifact exactly at
//!   `<original><tag>` and its decompressed output at `<input>.orig`;
//! * the reference engine behaves like the standard command line tool: its
//!   compressed output is always `<original>.std.snappy` and decompression
//!   strips the trailing `.snappy`.
//!
//! Everything here is pure string manipulation, no I/O.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::flow::{Scheme, Variant};

const STD_COMPRESSED: &str = ".std.snappy";
const SNAPPY_EXT: &str = ".snappy";
const ROUND_TRIP_EXT: &str = ".orig";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    pub original: PathBuf,
    pub compressed: PathBuf,
    pub decompressed: PathBuf,
}

/// Suffix a variant appends to the original path for its compressed output.
pub fn compressed_suffix(variant: Variant, tag: &str) -> String {
    match variant {
        Variant::Accelerated => tag.to_string(),
        Variant::Reference => STD_COMPRESSED.to_string(),
    }
}

/// Suffix of the decompressed output, given the suffix of its input.
pub fn restored_suffix(variant: Variant, compressed: &str) -> String {
    match variant {
        Variant::Accelerated => format!("{compressed}{ROUND_TRIP_EXT}"),
        Variant::Reference => match compressed.strip_suffix(SNAPPY_EXT) {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => format!("{compressed}.out"),
        },
    }
}

/// (compressed suffix, decompressed suffix) of a scheme.
pub fn suffixes(scheme: &Scheme) -> (String, String) {
    let c = compressed_suffix(scheme.compress, scheme.tag);
    let d = restored_suffix(scheme.decompress, &c);
    (c, d)
}

pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

pub fn artifact_paths(scheme: &Scheme, original: &Path) -> ArtifactPaths {
    let (c, d) = suffixes(scheme);
    ArtifactPaths {
        original: original.to_path_buf(),
        compressed: with_suffix(original, &c),
        decompressed: with_suffix(original, &d),
    }
}

/// Output path when `variant` decompresses an arbitrary file.
pub fn restored_path(variant: Variant, compressed: &Path) -> PathBuf {
    match variant {
        Variant::Accelerated => with_suffix(compressed, ROUND_TRIP_EXT),
        Variant::Reference => {
            let s = compressed.to_string_lossy();
            match s.strip_suffix(SNAPPY_EXT) {
                Some(stem) if !stem.is_empty() => PathBuf::from(stem),
                _ => with_suffix(compressed, ".out"),
            }
        }
    }
}

/// Recover the original path from either artifact of `scheme`.
pub fn original_of(scheme: &Scheme, artifact: &Path) -> Option<PathBuf> {
    let s = artifact.to_str()?;
    let (c, d) = suffixes(scheme);
    // longest match first
    let (first, second) = if d.len() >= c.len() { (d, c) } else { (c, d) };
    s.strip_suffix(first.as_str())
        .or_else(|| s.strip_suffix(second.as_str()))
        .filter(|stem| !stem.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::Pairing;
    use std::collections::HashSet;

    #[test]
    fn pairing_table() {
        let f = Path::new("/data/corpus/alice29.txt");
        let expect = [
            (
                Pairing::AccelToAccel,
                "/data/corpus/alice29.txt.xe2xd.snappy",
                "/data/corpus/alice29.txt.xe2xd.snappy.orig",
            ),
            (
                Pairing::AccelToReference,
                "/data/corpus/alice29.txt.xe2sd.snappy",
                "/data/corpus/alice29.txt.xe2sd",
            ),
            (
                Pairing::ReferenceToAccel,
                "/data/corpus/alice29.txt.std.snappy",
                "/data/corpus/alice29.txt.std.snappy.orig",
            ),
        ];
        for (pairing, c, d) in expect {
            let paths = artifact_paths(&pairing.scheme(), f);
            assert_eq!(paths.original, f);
            assert_eq!(paths.compressed, Path::new(c), "{pairing}");
            assert_eq!(paths.decompressed, Path::new(d), "{pairing}");
        }
    }

    #[test]
    fn single_file_names() {
        let paths = artifact_paths(&Scheme::SINGLE_FILE, Path::new("in.bin"));
        assert_eq!(paths.compressed, Path::new("in.bin.snappy"));
        assert_eq!(paths.decompressed, Path::new("in.bin.snappy.orig"));
        assert_eq!(
            restored_path(Variant::Accelerated, Path::new("x.snappy")),
            Path::new("x.snappy.orig")
        );
        assert_eq!(
            restored_path(Variant::Reference, Path::new("x.snappy")),
            Path::new("x")
        );
        assert_eq!(
            restored_path(Variant::Reference, Path::new("x.bin")),
            Path::new("x.bin.out")
        );
    }

    #[test]
    fn names_are_deterministic_and_never_collide() {
        let f = Path::new("file.dat");
        let mut seen = HashSet::new();
        for p in Pairing::ALL {
            let a = artifact_paths(&p.scheme(), f);
            assert_eq!(a, artifact_paths(&p.scheme(), f));
            assert!(seen.insert(a.compressed.clone()), "{p}");
            assert!(seen.insert(a.decompressed.clone()), "{p}");
            assert_ne!(a.compressed, a.original);
            assert_ne!(a.decompressed, a.original);
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn original_is_recoverable() {
        let f = Path::new("dir/nested.file.txt");
        for scheme in Pairing::ALL
            .iter()
            .map(|p| p.scheme())
            .chain([Scheme::SINGLE_FILE])
        {
            let a = artifact_paths(&scheme, f);
            assert_eq!(original_of(&scheme, &a.compressed).as_deref(), Some(f));
            assert_eq!(original_of(&scheme, &a.decompressed).as_deref(), Some(f));
        }
        assert_eq!(
            original_of(&Pairing::AccelToAccel.scheme(), Path::new("plain.txt")),
            None
        );
    }
}
