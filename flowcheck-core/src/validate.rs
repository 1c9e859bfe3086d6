use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    /// Byte-identical.
    Pass,
    /// Compared, bytes differ.
    Fail,
    /// Comparison could not run.
    Error,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => f.write_str("PASSED"),
            Outcome::Fail => f.write_str("FAILED"),
            Outcome::Error => f.write_str("ERROR"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationRecord {
    pub original: PathBuf,
    pub artifact: PathBuf,
    pub outcome: Outcome,
    pub detail: Option<String>,
}

impl ValidationRecord {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }
}

/// Compares two byte sequences.
pub trait ByteComparer: Send + Sync {
    /// `None` when both sequences are identical, otherwise the offset of the
    /// first differing byte (or the length of the shorter sequence).
    fn first_difference(
        &self,
        expected: &mut dyn Read,
        actual: &mut dyn Read,
    ) -> io::Result<Option<u64>>;
}

/// Chunked in-process comparison, the `cmp` of this crate.
#[derive(Clone, Debug)]
pub struct StreamComparer {
    chunk: usize,
}

impl StreamComparer {
    pub fn with_chunk(chunk: usize) -> Self {
        Self {
            chunk: chunk.max(1),
        }
    }
}

impl Default for StreamComparer {
    fn default() -> Self {
        Self::with_chunk(256 * 1024)
    }
}

/// Read until `buf` is full or the reader is exhausted.
fn fill(r: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut n = 0;
    while n < buf.len() {
        match r.read(&mut buf[n..]) {
            Ok(0) => break,
            Ok(k) => n += k,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(n)
}

impl ByteComparer for StreamComparer {
    fn first_difference(
        &self,
        expected: &mut dyn Read,
        actual: &mut dyn Read,
    ) -> io::Result<Option<u64>> {
        let mut a = vec![0u8; self.chunk];
        let mut b = vec![0u8; self.chunk];
        let mut offset = 0u64;
        loop {
            let na = fill(expected, &mut a)?;
            let nb = fill(actual, &mut b)?;
            let common = na.min(nb);
            if let Some(i) = a[..common].iter().zip(&b[..common]).position(|(x, y)| x != y) {
                return Ok(Some(offset + i as u64));
            }
            if na != nb {
                return Ok(Some(offset + common as u64));
            }
            if na == 0 {
                return Ok(None);
            }
            offset += na as u64;
        }
    }
}

/// Byte-exact validation of decompressed artifacts against their originals.
/// Never fails: every problem becomes a FAIL or ERROR record.
pub struct Validator {
    comparer: Box<dyn ByteComparer>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Box::new(StreamComparer::default()))
    }
}

impl Validator {
    pub fn new(comparer: Box<dyn ByteComparer>) -> Self {
        Self { comparer }
    }

    pub fn validate(&self, original: &Path, artifact: &Path) -> ValidationRecord {
        let record = |outcome, detail: Option<String>| ValidationRecord {
            original: original.to_path_buf(),
            artifact: artifact.to_path_buf(),
            outcome,
            detail,
        };

        let open = |p: &Path| File::open(p).map(BufReader::new);
        let (mut expected, mut actual) = match (open(original), open(artifact)) {
            (Ok(e), Ok(a)) => (e, a),
            (Err(e), _) => {
                return record(
                    Outcome::Error,
                    Some(format!("cannot read original '{}': {e}", original.display())),
                );
            }
            (_, Err(e)) => {
                warn!(artifact = %artifact.display(), "validation could not run: {e}");
                return record(
                    Outcome::Error,
                    Some(format!("cannot read artifact '{}': {e}", artifact.display())),
                );
            }
        };

        match self.comparer.first_difference(&mut expected, &mut actual) {
            Ok(None) => record(Outcome::Pass, None),
            Ok(Some(at)) => {
                warn!(artifact = %artifact.display(), offset = at, "validation mismatch");
                record(Outcome::Fail, Some(format!("differs at byte {at}")))
            }
            Err(e) => record(Outcome::Error, Some(format!("comparison aborted: {e}"))),
        }
    }

    /// One record per pair, in the given order.
    pub fn validate_all<'p, I>(&self, pairs: I) -> Vec<ValidationRecord>
    where
        I: IntoIterator<Item = (&'p Path, &'p Path)>,
    {
        pairs
            .into_iter()
            .map(|(original, artifact)| self.validate(original, artifact))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(a: &[u8], b: &[u8], chunk: usize) -> Option<u64> {
        StreamComparer::with_chunk(chunk)
            .first_difference(&mut &a[..], &mut &b[..])
            .unwrap()
    }

    #[test]
    fn comparer_finds_first_difference() {
        assert_eq!(diff(b"abcdef", b"abcdef", 2), None);
        assert_eq!(diff(b"", b"", 4), None);
        assert_eq!(diff(b"abcdef", b"abcXef", 2), Some(3));
        assert_eq!(diff(b"abcdef", b"abc", 4), Some(3));
        assert_eq!(diff(b"ab", b"abcdef", 1), Some(2));
    }

    #[test]
    fn outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let orig = dir.path().join("o.bin");
        let same = dir.path().join("same.bin");
        let other = dir.path().join("other.bin");
        std::fs::write(&orig, b"the quick brown fox").unwrap();
        std::fs::write(&same, b"the quick brown fox").unwrap();
        std::fs::write(&other, b"the quick brown cat").unwrap();

        let v = Validator::default();
        assert_eq!(v.validate(&orig, &same).outcome, Outcome::Pass);

        let fail = v.validate(&orig, &other);
        assert_eq!(fail.outcome, Outcome::Fail);
        assert_eq!(fail.detail.as_deref(), Some("differs at byte 16"));

        let err = v.validate(&orig, &dir.path().join("missing.bin"));
        assert_eq!(err.outcome, Outcome::Error);
        assert!(err.detail.unwrap().contains("missing.bin"));
    }

    #[test]
    fn validate_all_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::write(&a, b"1").unwrap();
        std::fs::write(&b, b"2").unwrap();
        let v = Validator::default();
        let recs = v.validate_all([(b.as_path(), b.as_path()), (a.as_path(), b.as_path())]);
        assert_eq!(recs[0].original, b);
        assert_eq!(recs[0].outcome, Outcome::Pass);
        assert_eq!(recs[1].original, a);
        assert_eq!(recs[1].outcome, Outcome::Fail);
    }
}
