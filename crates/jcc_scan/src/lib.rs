// jcc_scan - staleness scanning for grammar source trees
mod glob;

pub use glob::{path_segments, GlobPattern};

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jcc_grammar::{GrammarError, GrammarInfo};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to walk source tree at {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

/// Inputs for one scan pass.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Root of the grammar source tree.
    pub source_root: PathBuf,
    /// Root the generated artifacts land under. When absent every matched
    /// grammar is reported unconditionally (documentation-style use).
    pub output_root: Option<PathBuf>,
    /// Include patterns over source-root-relative paths.
    pub includes: Vec<String>,
    /// Exclude patterns, applied after includes.
    pub excludes: Vec<String>,
    /// Staleness granularity: a target must be older than the source by
    /// more than this many milliseconds to count as stale.
    pub stale_millis: u64,
    /// Package override directory forwarded to grammar construction.
    pub package_override: Option<PathBuf>,
}

impl ScanConfig {
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            output_root: None,
            includes: default_includes(),
            excludes: Vec::new(),
            stale_millis: 0,
            package_override: None,
        }
    }
}

/// Default include set: the grammar extensions in both case variants.
pub fn default_includes() -> Vec<String> {
    ["**/*.jj", "**/*.JJ", "**/*.jjt", "**/*.JJT"]
        .iter()
        .map(|pattern| pattern.to_string())
        .collect()
}

/// Result of a scan over an existing source root: ordered, de-duplicated
/// by source path, first-seen-wins. Order is deterministic because the
/// underlying walk is sorted by file name.
#[derive(Debug, Default)]
pub struct ScanResult {
    grammars: Vec<GrammarInfo>,
    seen: HashSet<PathBuf>,
}

impl ScanResult {
    fn push(&mut self, info: GrammarInfo) {
        if self.seen.insert(info.grammar_file().to_path_buf()) {
            self.grammars.push(info);
        }
    }

    pub fn grammars(&self) -> &[GrammarInfo] {
        &self.grammars
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }

    pub fn into_grammars(self) -> Vec<GrammarInfo> {
        self.grammars
    }
}

/// Outcome of a scan request.
#[derive(Debug)]
pub enum ScanOutcome {
    /// The source root does not exist or is not a directory. Distinct from
    /// an empty result so callers can log and skip without aborting.
    NoSourceRoot,
    Grammars(ScanResult),
}

impl ScanOutcome {
    pub fn grammars(&self) -> &[GrammarInfo] {
        match self {
            ScanOutcome::NoSourceRoot => &[],
            ScanOutcome::Grammars(result) => result.grammars(),
        }
    }
}

pub struct StalenessScanner {
    config: ScanConfig,
    includes: Vec<GlobPattern>,
    excludes: Vec<GlobPattern>,
}

impl StalenessScanner {
    pub fn new(config: ScanConfig) -> Self {
        let includes = config
            .includes
            .iter()
            .map(|pattern| GlobPattern::new(pattern))
            .collect();
        let excludes = config
            .excludes
            .iter()
            .map(|pattern| GlobPattern::new(pattern))
            .collect();
        Self {
            config,
            includes,
            excludes,
        }
    }

    /// Walk the source root and collect the grammars that need processing.
    pub fn scan(&self) -> Result<ScanOutcome, ScanError> {
        let root = &self.config.source_root;
        if !root.is_dir() {
            tracing::debug!(root = %root.display(), "source root missing, nothing to scan");
            return Ok(ScanOutcome::NoSourceRoot);
        }

        let mut result = ScanResult::default();
        for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|source| ScanError::Walk {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.clone()),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(path);
            let segments = path_segments(relative);

            if !self.includes.iter().any(|p| p.matches_segments(&segments)) {
                continue;
            }
            if self.excludes.iter().any(|p| p.matches_segments(&segments)) {
                continue;
            }

            let info = GrammarInfo::parse(path, self.config.package_override.as_deref())?;
            if self.needs_processing(&info)? {
                result.push(info);
            }
        }

        tracing::debug!(
            root = %root.display(),
            count = result.len(),
            "scan complete"
        );
        Ok(ScanOutcome::Grammars(result))
    }

    fn needs_processing(&self, info: &GrammarInfo) -> Result<bool, ScanError> {
        let Some(output_root) = &self.config.output_root else {
            return Ok(true);
        };

        let target = output_root.join(info.target_file());
        let Ok(target_meta) = fs::metadata(&target) else {
            // Missing target is always stale, whatever the timestamps say.
            return Ok(true);
        };

        let source_mtime = modified(info.grammar_file())?;
        let target_mtime = target_meta.modified().map_err(|source| ScanError::Stat {
            path: target.clone(),
            source,
        })?;

        let tolerance = Duration::from_millis(self.config.stale_millis);
        let stale = match target_mtime.checked_add(tolerance) {
            Some(adjusted) => adjusted < source_mtime,
            None => false,
        };
        Ok(stale)
    }
}

fn modified(path: &Path) -> Result<std::time::SystemTime, ScanError> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|source| ScanError::Stat {
            path: path.to_path_buf(),
            source,
        })
}
