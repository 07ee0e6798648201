// Source file discovery

use crate::error::Result;
use crate::parser::SourceFile;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Whether an exclusion pattern should be matched as a glob
pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

enum Exclusion {
    Substring(String),
    Glob(glob::Pattern),
}

/// Finds candidate source files under a root
pub struct SourceLocator {
    extension: String,
    exclusions: Vec<Exclusion>,
}

impl SourceLocator {
    /// Create a locator for files with `extension`, skipping paths that match
    /// any of `exclude` (substrings, or globs relative to the root)
    pub fn new(extension: &str, exclude: &[String]) -> Result<Self> {
        let exclusions = exclude
            .iter()
            .map(|pattern| {
                if is_glob(pattern) {
                    Ok(Exclusion::Glob(glob::Pattern::new(pattern)?))
                } else {
                    Ok(Exclusion::Substring(pattern.clone()))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            extension: extension.to_string(),
            exclusions,
        })
    }

    /// Discover all matching files under `root`, in file-name-sorted walk order
    pub fn discover(&self, root: &Path) -> Result<Vec<SourceFile>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !entry.file_type().is_file() {
                continue;
            }

            if path.extension().map_or(true, |ext| ext != self.extension.as_str()) {
                continue;
            }

            if self.should_exclude(path, root) {
                debug!(path = %path.display(), "excluded");
                continue;
            }

            files.push(source_file(path, root));
        }

        Ok(files)
    }

    /// Check if a path should be excluded
    pub fn should_exclude(&self, path: &Path, root: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        let relative_str = relative.to_string_lossy();

        self.exclusions.iter().any(|exclusion| match exclusion {
            Exclusion::Substring(s) => relative_str.contains(s.as_str()),
            Exclusion::Glob(pattern) => pattern.matches_path(relative),
        })
    }
}

/// Describe a file found under `root`; its module is the dotted path
/// relative to the root
pub fn source_file(path: &Path, root: &Path) -> SourceFile {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let (module, is_package) = path_to_module_name(relative);
    SourceFile::new(path.to_path_buf(), module, is_package)
}

/// Describe a file given directly on the command line
pub fn single_source_file(path: &Path) -> SourceFile {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy().to_string();
    if stem == "__init__" {
        let package = path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or(stem);
        SourceFile::new(path.to_path_buf(), package, true)
    } else {
        SourceFile::new(path.to_path_buf(), stem, false)
    }
}

/// Convert a relative file path to a dotted module name
fn path_to_module_name(relative: &Path) -> (String, bool) {
    let mut parts: Vec<String> = relative
        .iter()
        .map(|s| s.to_string_lossy().to_string())
        .collect();

    if let Some(last) = parts.last_mut() {
        if let Some(stem) = Path::new(last.as_str()).file_stem() {
            *last = stem.to_string_lossy().to_string();
        }
    }

    let is_package = parts.last().is_some_and(|p| p == "__init__");
    if is_package {
        parts.pop();
    }

    (parts.join("."), is_package)
}
