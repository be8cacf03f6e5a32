use std::path::{Path, PathBuf};

use jcc_grammar::{package_to_directory, GrammarInfo, GrammarKind};
use jcc_scan::GlobPattern;

use crate::options::{PipelineOptions, TreeOptions};
use crate::relocate::{copy_matching, list_matching, under_any};
use crate::tool::{JavaCcFacade, JjTreeFacade, ToolRunner};
use crate::BuildError;

/// Per-invocation pipeline configuration. There is no process-global
/// state: two contexts with disjoint output and interim roots can coexist
/// in one process.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Root the final package-qualified artifacts land under.
    pub output_root: PathBuf,
    /// Scratch root for the two-stage pipeline's interim output.
    pub interim_root: PathBuf,
    /// Source roots whose files are compiled in place; hand-written files
    /// next to a grammar under one of these are not copied to the output.
    pub compile_source_roots: Vec<PathBuf>,
    pub options: PipelineOptions,
    pub tree: TreeOptions,
    pub javacc: JavaCcFacade,
    pub jjtree: JjTreeFacade,
}

/// Per-grammar progress through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarState {
    Pending,
    Preprocessing,
    Preprocessed,
    Generating,
    Generated,
    Relocating,
    Done,
    Failed,
}

/// What one fully processed grammar produced.
#[derive(Debug)]
pub struct GrammarOutcome {
    pub grammar: PathBuf,
    pub symbol: String,
    pub output_dir: PathBuf,
    /// Generated files in the final directory matching the symbol name.
    pub generated: Vec<PathBuf>,
    /// Files relocated out of the scratch tree (two-stage) or copied from
    /// beside the grammar (single-stage).
    pub relocated: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub outcomes: Vec<GrammarOutcome>,
}

/// Runs the stale set strictly one grammar at a time, completing
/// relocation before the next grammar starts. A tool failure is terminal
/// for the whole run; grammars already relocated keep their artifacts.
pub struct PipelineOrchestrator<'r> {
    runner: &'r dyn ToolRunner,
    context: BuildContext,
}

impl<'r> PipelineOrchestrator<'r> {
    pub fn new(runner: &'r dyn ToolRunner, context: BuildContext) -> Self {
        Self { runner, context }
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    pub fn run(&self, grammars: &[GrammarInfo]) -> Result<BuildReport, BuildError> {
        let mut report = BuildReport::default();
        for info in grammars {
            let outcome = self.process(info)?;
            report.outcomes.push(outcome);
        }
        Ok(report)
    }

    fn process(&self, info: &GrammarInfo) -> Result<GrammarOutcome, BuildError> {
        match info.kind() {
            GrammarKind::JavaCc => self.single_stage(info),
            GrammarKind::JjTree => self.two_stage(info),
        }
    }

    fn single_stage(&self, info: &GrammarInfo) -> Result<GrammarOutcome, BuildError> {
        let mut run = GrammarRun::new(info);
        let final_dir = self.context.output_root.join(info.package_directory());

        run.advance(GrammarState::Generating);
        if let Err(error) = self.context.javacc.generate(
            self.runner,
            &self.context.options,
            info.grammar_file(),
            &final_dir,
        ) {
            run.fail(&error);
            return Err(error);
        }
        run.advance(GrammarState::Generated);

        run.advance(GrammarState::Relocating);
        let relocated = self.copy_adjacent_sources(info, &final_dir)?;
        run.advance(GrammarState::Done);

        Ok(outcome(info, final_dir, relocated))
    }

    fn two_stage(&self, info: &GrammarInfo) -> Result<GrammarOutcome, BuildError> {
        let mut run = GrammarRun::new(info);
        let interim_dir = self.context.interim_root.join(info.package_directory());
        let final_dir = self.context.output_root.join(info.package_directory());

        let node_package = self.context.tree.effective_node_package(info.package_name());
        let mut tree = self.context.tree.clone();
        tree.node_package = if node_package.is_empty() {
            None
        } else {
            Some(node_package.clone())
        };

        // A leftover aux file from a previous invocation would otherwise be
        // resurrected by the catch-all relocation below.
        clear_directory(&interim_dir)?;

        run.advance(GrammarState::Preprocessing);
        if let Err(error) = self.context.jjtree.preprocess(
            self.runner,
            &self.context.options,
            &tree,
            info.grammar_file(),
            &interim_dir,
        ) {
            run.fail(&error);
            return Err(error);
        }
        run.advance(GrammarState::Preprocessed);

        let decorated = decorated_grammar(info, &interim_dir);

        run.advance(GrammarState::Generating);
        if let Err(error) = self.context.javacc.generate(
            self.runner,
            &self.context.options,
            &decorated,
            &final_dir,
        ) {
            run.fail(&error);
            return Err(error);
        }
        run.advance(GrammarState::Generated);

        // Auxiliary node/visitor files reach the final tree only after both
        // stages succeeded.
        run.advance(GrammarState::Relocating);
        let node_dir = self
            .context
            .output_root
            .join(package_to_directory(&node_package));
        let relocated = copy_matching(&interim_dir, &node_dir, &GlobPattern::new("*.java"))?;
        run.advance(GrammarState::Done);

        Ok(outcome(info, final_dir, relocated))
    }

    /// Hand-written override sources living next to the grammar are carried
    /// into the final directory, unless the grammar already sits inside a
    /// compiled source root (those files are compiled in place).
    fn copy_adjacent_sources(
        &self,
        info: &GrammarInfo,
        final_dir: &Path,
    ) -> Result<Vec<PathBuf>, BuildError> {
        let Some(grammar_dir) = info.grammar_file().parent() else {
            return Ok(Vec::new());
        };
        if under_any(grammar_dir, &self.context.compile_source_roots) {
            tracing::debug!(
                grammar = %info.grammar_file().display(),
                "grammar inside a compiled source root, skipping adjacent copy"
            );
            return Ok(Vec::new());
        }
        copy_matching(grammar_dir, final_dir, &GlobPattern::new("*.java"))
    }
}

fn outcome(info: &GrammarInfo, final_dir: PathBuf, relocated: Vec<PathBuf>) -> GrammarOutcome {
    let symbol_pattern = GlobPattern::new(&format!("{}*.java", info.symbol_name()));
    let generated = list_matching(&final_dir, &symbol_pattern);
    GrammarOutcome {
        grammar: info.grammar_file().to_path_buf(),
        symbol: info.symbol_name().to_string(),
        output_dir: final_dir,
        generated,
        relocated,
    }
}

fn clear_directory(dir: &Path) -> Result<(), BuildError> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|source| BuildError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn decorated_grammar(info: &GrammarInfo, interim_dir: &Path) -> PathBuf {
    let stem = info
        .grammar_file()
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    interim_dir.join(format!("{}.jj", stem))
}

struct GrammarRun<'a> {
    grammar: &'a Path,
    state: GrammarState,
}

impl<'a> GrammarRun<'a> {
    fn new(info: &'a GrammarInfo) -> Self {
        let run = Self {
            grammar: info.grammar_file(),
            state: GrammarState::Pending,
        };
        tracing::debug!(grammar = %run.grammar.display(), state = ?run.state, "pipeline state");
        run
    }

    fn advance(&mut self, next: GrammarState) {
        self.state = next;
        tracing::debug!(grammar = %self.grammar.display(), state = ?next, "pipeline state");
    }

    fn fail(&mut self, error: &BuildError) {
        self.state = GrammarState::Failed;
        tracing::warn!(grammar = %self.grammar.display(), %error, "pipeline stage failed");
    }
}
