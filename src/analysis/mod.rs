// Analysis module: from a source root to normalized entity structures

pub mod locator;
pub mod model;
pub mod mro;
pub mod normalize;

pub use locator::*;
pub use model::*;
pub use mro::*;
pub use normalize::*;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::parser::{EntityResolver, ParsedModule, PythonResolver, SourceFile};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info_span, warn};

/// Shared flag that aborts a run between files
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A file whose entities could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub module: String,
    pub path: PathBuf,
    pub message: String,
}

/// Result of loading one file
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(ParsedModule),
    Failed(LoadFailure),
}

/// Result of extracting a source tree
#[derive(Debug, Default)]
pub struct Extraction {
    /// Normalized entities in file order, then declaration order
    pub structures: Vec<EntityStructure>,
    /// Files skipped because they failed to load
    pub failures: Vec<LoadFailure>,
    pub files_scanned: usize,
}

impl Extraction {
    pub fn entity(&self, name: &str) -> Option<&EntityStructure> {
        self.structures.iter().find(|s| s.name == name)
    }
}

/// Load one file. Only cancellation escapes as an error; every other
/// failure is reported as [`LoadOutcome::Failed`].
pub fn load_module<R: EntityResolver>(
    resolver: &mut R,
    file: &SourceFile,
    cancel: &CancelFlag,
) -> Result<LoadOutcome> {
    if cancel.is_cancelled() {
        return Err(Error::Interrupted);
    }

    match resolver.resolve(file) {
        Ok(module) => {
            debug!(module = %file.module, classes = module.classes.len(), "loaded module");
            Ok(LoadOutcome::Loaded(module))
        }
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!(module = %file.module, error = %e, "failed to load module");
            Ok(LoadOutcome::Failed(LoadFailure {
                module: file.module.clone(),
                path: file.path.clone(),
                message: e.to_string(),
            }))
        }
    }
}

/// Pipeline that turns a source root into entity structures
pub struct Extractor {
    config: Config,
    verbose: bool,
    cancel: CancelFlag,
}

impl Extractor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            verbose: false,
            cancel: CancelFlag::new(),
        }
    }

    /// Show a progress bar while loading files
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Abort between files once `cancel` is set
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Extract every Python entity under `root`.
    ///
    /// Entity order follows file enumeration order, which depends on the
    /// filesystem and is not guaranteed to match across platforms.
    pub fn extract(&self, root: &Path) -> Result<Extraction> {
        self.extract_with(root, PythonResolver::new)
    }

    /// Extract with resolvers built by `make_resolver`, one per worker
    pub fn extract_with<R, F>(&self, root: &Path, make_resolver: F) -> Result<Extraction>
    where
        R: EntityResolver,
        F: Fn() -> Result<R> + Sync + Send,
    {
        if !root.exists() {
            return Err(Error::PathNotFound(root.to_path_buf()));
        }

        let span = info_span!("extract", root = %root.display());
        let _enter = span.enter();

        let mut resolver = make_resolver()?;
        let files = if root.is_dir() {
            SourceLocator::new(resolver.extension(), &self.config.source.exclude)?.discover(root)?
        } else if root.extension().is_some_and(|ext| ext == resolver.extension()) {
            vec![single_source_file(root)]
        } else {
            return Err(Error::UnsupportedSource {
                path: root.to_path_buf(),
                extension: resolver.extension(),
            });
        };
        debug!(files = files.len(), "discovered source files");

        let progress = self.progress_bar(files.len());
        let outcomes: Vec<Result<LoadOutcome>> = if self.config.source.parallel && files.len() > 1 {
            files
                .par_iter()
                .map_init(
                    || make_resolver().ok(),
                    |resolver, file| {
                        let outcome = match resolver {
                            Some(resolver) => load_module(resolver, file, &self.cancel),
                            None => Err(Error::parser("Failed to create resolver")),
                        };
                        progress.inc(1);
                        outcome
                    },
                )
                .collect()
        } else {
            files
                .iter()
                .map(|file| {
                    let outcome = load_module(&mut resolver, file, &self.cancel);
                    progress.inc(1);
                    outcome
                })
                .collect()
        };
        progress.finish_and_clear();

        let mut modules = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome? {
                LoadOutcome::Loaded(module) => modules.push(module),
                LoadOutcome::Failed(failure) => failures.push(failure),
            }
        }

        let index = ClassIndex::new(modules.iter().flat_map(|m| &m.classes));
        let structures = modules
            .iter()
            .flat_map(|m| &m.classes)
            .map(|class| normalize(class, &index))
            .collect::<Result<Vec<_>>>()?;

        Ok(Extraction {
            structures,
            failures,
            files_scanned: files.len(),
        })
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.verbose {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("loading modules");
        pb
    }
}
