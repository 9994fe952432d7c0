// crates/cmdpp-macros/src/preprocessor/include.rs

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Locates and opens the targets of `#include`.
pub trait IncludeResolver {
    /// Maps the name written in the directive to a path.
    fn resolve(&self, target: &str) -> PathBuf;

    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead>>;
}

/// Resolves include targets against a list of directories.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    roots: Vec<PathBuf>,
}

impl DirectoryResolver {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl IncludeResolver for DirectoryResolver {
    /// The first root holding `target` wins. When none does, the path under the first root is
    /// returned so the caller can report it.
    fn resolve(&self, target: &str) -> PathBuf {
        self.roots
            .iter()
            .map(|root| root.join(target))
            .find(|candidate| candidate.is_file())
            .or_else(|| self.roots.first().map(|root| root.join(target)))
            .unwrap_or_else(|| PathBuf::from(target))
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead>> {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

/// Strips the `"..."` or `<...>` around an include target.
pub fn include_target(rest: &str) -> &str {
    let rest = rest.trim();
    rest.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .or_else(|| {
            rest.strip_prefix('<')
                .and_then(|inner| inner.strip_suffix('>'))
        })
        .unwrap_or(rest)
        .trim()
}
