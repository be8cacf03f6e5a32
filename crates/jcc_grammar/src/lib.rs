// jcc_grammar - grammar metadata extraction and package resolution
mod metadata;
mod package;

pub use metadata::{extract_package, extract_parser_name};
pub use package::{package_to_directory, resolve_package};

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Errors raised while deriving metadata for a single grammar file.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("failed to read grammar {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Pipeline shape a grammar requires, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarKind {
    /// Plain parser grammar (`.jj`), compiled by the generator alone.
    JavaCc,
    /// Tree-decorated grammar (`.jjt`), run through the tree preprocessor
    /// before the generator.
    JjTree,
}

impl GrammarKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jjt") => GrammarKind::JjTree,
            _ => GrammarKind::JavaCc,
        }
    }
}

/// Placement metadata for one grammar source file.
///
/// Constructed once per scan pass by reading the grammar text; read-only
/// afterwards. The declared package and the generated parser name are
/// recovered with a tolerant raw-text scan (see [`extract_package`]), so a
/// `package` statement inside a comment is honored on purpose.
#[derive(Debug, Clone)]
pub struct GrammarInfo {
    grammar_file: PathBuf,
    kind: GrammarKind,
    package_name: String,
    package_directory: PathBuf,
    symbol_name: String,
    target_file: PathBuf,
}

impl GrammarInfo {
    /// Read `grammar_file` and derive its placement metadata.
    ///
    /// `package_override` is a directory relative to the output root; when
    /// given it takes precedence over any package declared in the grammar
    /// text. An absolute override is rejected.
    pub fn parse(
        grammar_file: &Path,
        package_override: Option<&Path>,
    ) -> Result<Self, GrammarError> {
        let grammar_file = absolute(grammar_file)?;
        let text = fs::read_to_string(&grammar_file).map_err(|source| GrammarError::Read {
            path: grammar_file.clone(),
            source,
        })?;

        let package_name = match package_override {
            Some(dir) => directory_to_package(dir)?,
            None => extract_package(&text).unwrap_or_default(),
        };

        let symbol_name = extract_parser_name(&text).unwrap_or_else(|| {
            grammar_file
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        let package_directory = package_to_directory(&package_name);
        let target_file = package_directory.join(format!("{}.java", symbol_name));

        tracing::debug!(
            grammar = %grammar_file.display(),
            package = %package_name,
            symbol = %symbol_name,
            "derived grammar metadata"
        );

        Ok(Self {
            kind: GrammarKind::from_path(&grammar_file),
            grammar_file,
            package_name,
            package_directory,
            symbol_name,
            target_file,
        })
    }

    /// Absolute path of the grammar source file.
    pub fn grammar_file(&self) -> &Path {
        &self.grammar_file
    }

    pub fn kind(&self) -> GrammarKind {
        self.kind
    }

    /// Declared (or overridden) package, dot-separated; empty when the
    /// grammar lives in the default package.
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// `package_name` with dots replaced by path separators; empty for the
    /// default package.
    pub fn package_directory(&self) -> &Path {
        &self.package_directory
    }

    /// Generated top-level type name, from the `PARSER_BEGIN(..)` marker or
    /// the file's base name when the marker is absent.
    pub fn symbol_name(&self) -> &str {
        &self.symbol_name
    }

    /// Canonical generated artifact path, always relative so it composes
    /// with any output root. Used for staleness comparison.
    pub fn target_file(&self) -> &Path {
        &self.target_file
    }
}

// The scanner forwards paths as the walk yields them, so a relative source
// root would otherwise leak into every derived placement.
fn absolute(path: &Path) -> Result<PathBuf, GrammarError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|source| GrammarError::Read {
            path: path.to_path_buf(),
            source,
        })
}

fn directory_to_package(dir: &Path) -> Result<String, GrammarError> {
    if dir.is_absolute() {
        return Err(GrammarError::InvalidConfiguration(format!(
            "package override directory must be relative to the source root, got {}",
            dir.display()
        )));
    }

    let segments: Vec<String> = dir
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    Ok(segments.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_grammar(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn derives_package_and_symbol_from_text() {
        let dir = tempdir().unwrap();
        let path = write_grammar(
            dir.path(),
            "Calc.jj",
            "options { STATIC = false; }\npackage org.demo;\nPARSER_BEGIN(CalcParser)\n",
        );

        let info = GrammarInfo::parse(&path, None).unwrap();
        assert_eq!(info.package_name(), "org.demo");
        assert_eq!(info.package_directory(), Path::new("org/demo"));
        assert_eq!(info.symbol_name(), "CalcParser");
        assert_eq!(info.target_file(), Path::new("org/demo/CalcParser.java"));
        assert_eq!(info.kind(), GrammarKind::JavaCc);
    }

    #[test]
    fn symbol_falls_back_to_file_stem() {
        let dir = tempdir().unwrap();
        let path = write_grammar(dir.path(), "Foo.jj", "// no marker here\n");

        let info = GrammarInfo::parse(&path, None).unwrap();
        assert_eq!(info.symbol_name(), "Foo");
        assert_eq!(info.target_file(), Path::new("Foo.java"));
    }

    #[test]
    fn package_override_wins_over_declared_package() {
        let dir = tempdir().unwrap();
        let path = write_grammar(dir.path(), "Foo.jj", "package org.ignored;\n");

        let info = GrammarInfo::parse(&path, Some(Path::new("com/example"))).unwrap();
        assert_eq!(info.package_name(), "com.example");
        assert_eq!(info.package_directory(), Path::new("com/example"));
    }

    #[test]
    fn absolute_package_override_is_rejected() {
        let dir = tempdir().unwrap();
        let path = write_grammar(dir.path(), "Foo.jj", "");

        let error = GrammarInfo::parse(&path, Some(Path::new("/abs/pkg")))
            .expect_err("absolute override must fail");
        assert!(matches!(error, GrammarError::InvalidConfiguration(_)));
    }

    #[test]
    fn unreadable_grammar_fails_construction() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("Missing.jj");

        let error = GrammarInfo::parse(&missing, None).expect_err("missing file must fail");
        assert!(matches!(error, GrammarError::Read { .. }));
    }

    #[test]
    fn relative_grammar_path_is_absolutized() {
        let dir = tempdir().unwrap();
        write_grammar(dir.path(), "Rel.jj", "PARSER_BEGIN(RelParser)");

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        let info = GrammarInfo::parse(Path::new("Rel.jj"), None);
        std::env::set_current_dir(original_dir).unwrap();

        let info = info.unwrap();
        assert!(info.grammar_file().is_absolute());
        assert!(info.grammar_file().ends_with("Rel.jj"));
        // The target stays relative so it composes with any output root.
        assert!(info.target_file().is_relative());
    }

    #[test]
    fn jjt_extension_selects_two_stage_kind() {
        let dir = tempdir().unwrap();
        let lower = write_grammar(dir.path(), "Tree.jjt", "");
        let upper = write_grammar(dir.path(), "Loud.JJT", "");

        assert_eq!(
            GrammarInfo::parse(&lower, None).unwrap().kind(),
            GrammarKind::JjTree
        );
        assert_eq!(
            GrammarInfo::parse(&upper, None).unwrap().kind(),
            GrammarKind::JjTree
        );
    }
}
