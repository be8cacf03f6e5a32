// jcc_cli - CLI surface (library interface for testing)
use std::path::PathBuf;

use clap::{Args, Parser};

use jcc_build::{
    BuildContext, JavaCcFacade, JjTreeFacade, PipelineOptions, ToolRequirement, TreeOptions,
};
use jcc_scan::ScanConfig;

#[derive(Parser)]
#[command(name = "jcc")]
#[command(about = "Incremental build orchestrator for JavaCC/JJTree grammars")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Regenerate parsers for stale grammars
    Build(BuildArgs),
    /// List the grammars a build would process, without invoking any tool
    Scan(ScanArgs),
    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Grammar source directory
    #[arg(long, default_value = "src")]
    pub source_dir: PathBuf,

    /// Root directory for generated sources
    #[arg(short, long, default_value = "generated")]
    pub output_dir: PathBuf,

    /// Scratch directory for the tree preprocessor's interim output
    #[arg(long, default_value = "interim")]
    pub interim_dir: PathBuf,

    /// Include pattern over source-relative paths (repeatable); defaults to
    /// the grammar extensions in both case variants
    #[arg(long = "include")]
    pub includes: Vec<String>,

    /// Exclude pattern, applied after includes (repeatable)
    #[arg(long = "exclude")]
    pub excludes: Vec<String>,

    /// Staleness tolerance in milliseconds
    #[arg(long, default_value_t = 0)]
    pub stale_millis: u64,

    /// Package override directory, relative, dots derived from separators;
    /// takes precedence over the package declared in the grammar text
    #[arg(long)]
    pub packages: Option<PathBuf>,

    /// Source root compiled in place; hand-written files next to grammars
    /// under it are not copied to the output (repeatable)
    #[arg(long = "compile-source-root")]
    pub compile_source_roots: Vec<PathBuf>,

    /// Explicit path to the javacc executable
    #[arg(long)]
    pub javacc_path: Option<PathBuf>,

    /// Explicit path to the jjtree executable
    #[arg(long)]
    pub jjtree_path: Option<PathBuf>,

    #[command(flatten)]
    pub generator: GeneratorArgs,

    #[command(flatten)]
    pub tree: TreeArgs,
}

/// Generator knobs. Every flag is tri-state: leaving it off the command
/// line omits the option entirely, so tool defaults and grammar-file
/// directives stay in effect.
#[derive(Args, Debug, Clone, Default)]
pub struct GeneratorArgs {
    #[arg(long)]
    pub jdk_version: Option<String>,
    #[arg(long = "static")]
    pub static_parser: Option<bool>,
    #[arg(long)]
    pub lookahead: Option<u32>,
    #[arg(long)]
    pub choice_ambiguity_check: Option<u32>,
    #[arg(long)]
    pub other_ambiguity_check: Option<u32>,
    #[arg(long)]
    pub debug_parser: Option<bool>,
    #[arg(long)]
    pub debug_lookahead: Option<bool>,
    #[arg(long)]
    pub debug_token_manager: Option<bool>,
    #[arg(long)]
    pub error_reporting: Option<bool>,
    #[arg(long)]
    pub java_unicode_escape: Option<bool>,
    #[arg(long)]
    pub unicode_input: Option<bool>,
    #[arg(long)]
    pub ignore_case: Option<bool>,
    #[arg(long)]
    pub common_token_action: Option<bool>,
    #[arg(long)]
    pub user_token_manager: Option<bool>,
    #[arg(long)]
    pub user_char_stream: Option<bool>,
    #[arg(long)]
    pub build_parser: Option<bool>,
    #[arg(long)]
    pub build_token_manager: Option<bool>,
    #[arg(long)]
    pub token_manager_uses_parser: Option<bool>,
    #[arg(long)]
    pub sanity_check: Option<bool>,
    #[arg(long)]
    pub force_la_check: Option<bool>,
    #[arg(long)]
    pub cache_tokens: Option<bool>,
    #[arg(long)]
    pub keep_line_column: Option<bool>,
}

/// Tree-preprocessor knobs, same tri-state rule as [`GeneratorArgs`].
#[derive(Args, Debug, Clone, Default)]
pub struct TreeArgs {
    #[arg(long)]
    pub build_node_files: Option<bool>,
    #[arg(long)]
    pub multi: Option<bool>,
    #[arg(long)]
    pub node_default_void: Option<bool>,
    #[arg(long)]
    pub node_factory: Option<bool>,
    /// Package for generated node files; a leading '*' is replaced by the
    /// grammar's declared package (default "*.node")
    #[arg(long)]
    pub node_package: Option<String>,
    #[arg(long)]
    pub node_prefix: Option<String>,
    #[arg(long)]
    pub node_scope_hook: Option<bool>,
    #[arg(long)]
    pub node_uses_parser: Option<bool>,
    #[arg(long)]
    pub visitor: Option<bool>,
    #[arg(long)]
    pub visitor_exception: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Grammar source directory
    #[arg(long, default_value = "src")]
    pub source_dir: PathBuf,

    /// Root directory the generated sources land under
    #[arg(short, long, default_value = "generated")]
    pub output_dir: PathBuf,

    #[arg(long = "include")]
    pub includes: Vec<String>,

    #[arg(long = "exclude")]
    pub excludes: Vec<String>,

    #[arg(long, default_value_t = 0)]
    pub stale_millis: u64,

    #[arg(long)]
    pub packages: Option<PathBuf>,

    /// List every matched grammar instead of only the stale ones
    #[arg(long)]
    pub all: bool,
}

impl BuildArgs {
    pub fn scan_config(&self) -> ScanConfig {
        let mut config = ScanConfig::new(&self.source_dir);
        config.output_root = Some(self.output_dir.clone());
        if !self.includes.is_empty() {
            config.includes = self.includes.clone();
        }
        config.excludes = self.excludes.clone();
        config.stale_millis = self.stale_millis;
        config.package_override = self.packages.clone();
        config
    }

    pub fn build_context(&self, javacc: PathBuf, jjtree: PathBuf) -> BuildContext {
        BuildContext {
            output_root: self.output_dir.clone(),
            interim_root: self.interim_dir.clone(),
            compile_source_roots: self.compile_source_roots.clone(),
            options: self.generator.to_options(),
            tree: self.tree.to_options(),
            javacc: JavaCcFacade::new(javacc),
            jjtree: JjTreeFacade::new(jjtree),
        }
    }

    pub fn javacc_requirement(&self) -> ToolRequirement {
        let mut requirement = ToolRequirement::new("javacc")
            .with_hint("install JavaCC or pass --javacc-path");
        if let Some(path) = &self.javacc_path {
            requirement = requirement.with_override_path(path.clone());
        }
        requirement
    }

    pub fn jjtree_requirement(&self) -> ToolRequirement {
        let mut requirement = ToolRequirement::new("jjtree")
            .with_hint("install JJTree or pass --jjtree-path");
        if let Some(path) = &self.jjtree_path {
            requirement = requirement.with_override_path(path.clone());
        }
        requirement
    }
}

impl GeneratorArgs {
    pub fn to_options(&self) -> PipelineOptions {
        PipelineOptions {
            jdk_version: self.jdk_version.clone(),
            static_parser: self.static_parser,
            lookahead: self.lookahead,
            choice_ambiguity_check: self.choice_ambiguity_check,
            other_ambiguity_check: self.other_ambiguity_check,
            debug_parser: self.debug_parser,
            debug_lookahead: self.debug_lookahead,
            debug_token_manager: self.debug_token_manager,
            error_reporting: self.error_reporting,
            java_unicode_escape: self.java_unicode_escape,
            unicode_input: self.unicode_input,
            ignore_case: self.ignore_case,
            common_token_action: self.common_token_action,
            user_token_manager: self.user_token_manager,
            user_char_stream: self.user_char_stream,
            build_parser: self.build_parser,
            build_token_manager: self.build_token_manager,
            token_manager_uses_parser: self.token_manager_uses_parser,
            sanity_check: self.sanity_check,
            force_la_check: self.force_la_check,
            cache_tokens: self.cache_tokens,
            keep_line_column: self.keep_line_column,
        }
    }
}

impl TreeArgs {
    pub fn to_options(&self) -> TreeOptions {
        TreeOptions {
            build_node_files: self.build_node_files,
            multi: self.multi,
            node_default_void: self.node_default_void,
            node_factory: self.node_factory,
            node_package: self.node_package.clone(),
            node_prefix: self.node_prefix.clone(),
            node_scope_hook: self.node_scope_hook,
            node_uses_parser: self.node_uses_parser,
            visitor: self.visitor,
            visitor_exception: self.visitor_exception.clone(),
        }
    }
}

impl ScanArgs {
    pub fn scan_config(&self) -> ScanConfig {
        let mut config = ScanConfig::new(&self.source_dir);
        config.output_root = if self.all {
            None
        } else {
            Some(self.output_dir.clone())
        };
        if !self.includes.is_empty() {
            config.includes = self.includes.clone();
        }
        config.excludes = self.excludes.clone();
        config.stale_millis = self.stale_millis;
        config.package_override = self.packages.clone();
        config
    }
}

pub fn get_version() -> String {
    format!("jcc {}", env!("CARGO_PKG_VERSION"))
}
