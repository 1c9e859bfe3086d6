use std::path::{Path, PathBuf};

use crate::error::{FlowError, Result};

/// Ordered list of input files, one per manifest line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileList {
    entries: Vec<PathBuf>,
}

impl FileList {
    pub fn load(manifest: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(manifest).map_err(|e| FlowError::open(manifest, e))?;
        let list = Self::parse(&text);
        if list.is_empty() {
            return Err(FlowError::Usage(format!(
                "file list '{}' has no entries",
                manifest.display()
            )));
        }
        Ok(list)
    }

    /// Blank lines are skipped; a trailing `\r` is dropped.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .filter(|l| !l.trim().is_empty())
            .map(PathBuf::from)
            .collect();
        Self { entries }
    }

    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            entries: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self {
            entries: vec![path.into()],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Every entry must be openable and non-empty.
    pub fn preflight(&self) -> Result<()> {
        for path in &self.entries {
            let md = std::fs::metadata(path).map_err(|e| FlowError::open(path, e))?;
            if !md.is_file() {
                return Err(FlowError::open(
                    path,
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
                ));
            }
            if md.len() == 0 {
                return Err(FlowError::EmptyInput(path.clone()));
            }
            std::fs::File::open(path).map_err(|e| FlowError::open(path, e))?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a FileList {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
