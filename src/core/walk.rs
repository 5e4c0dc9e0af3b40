use std::fs;
use std::path::PathBuf;

use crate::{KvseedError, Result};

/// Lazy depth-first walk over the files below a root directory.
///
/// Entries are yielded in the order the file system enumerates them.
/// Symbolic links to files are yielded, symbolic links to directories are
/// not descended into. The walk ends after the first error.
///
/// Uses blocking `std::fs` calls; async callers step it on the blocking pool.
pub struct Walk {
    root: Option<PathBuf>,
    stack: Vec<(PathBuf, fs::ReadDir)>,
    failed: bool,
}

impl Walk {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            stack: Vec::new(),
            failed: false,
        }
    }

    fn push_dir(&mut self, dir: PathBuf) -> Result<()> {
        match fs::read_dir(&dir) {
            Ok(entries) => {
                self.stack.push((dir, entries));
                Ok(())
            }
            Err(err) => Err(KvseedError::import(dir, err.into())),
        }
    }

    fn advance(&mut self) -> Option<Result<PathBuf>> {
        if let Some(root) = self.root.take() {
            if let Err(err) = self.push_dir(root) {
                return Some(Err(err));
            }
        }

        loop {
            let (dir, entries) = self.stack.last_mut()?;
            let entry = match entries.next() {
                Some(Ok(entry)) => entry,
                Some(Err(err)) => return Some(Err(KvseedError::import(dir.clone(), err.into()))),
                None => {
                    self.stack.pop();
                    continue;
                }
            };

            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => return Some(Err(KvseedError::import(path, err.into()))),
            };

            if file_type.is_dir() {
                if let Err(err) = self.push_dir(path) {
                    return Some(Err(err));
                }
            } else if file_type.is_file() {
                return Some(Ok(path));
            } else if file_type.is_symlink() {
                // Dangling links and links to directories are skipped.
                if fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false) {
                    return Some(Ok(path));
                }
            }
        }
    }
}

impl Iterator for Walk {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let next = self.advance();
        if let Some(Err(_)) = next {
            self.failed = true;
        }
        next
    }
}
