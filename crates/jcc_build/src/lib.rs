// jcc_build - pipeline orchestration over the JavaCC/JJTree generators
mod options;
mod pipeline;
mod relocate;
mod tool;

pub use options::{PipelineOptions, TreeOptions, DEFAULT_NODE_PACKAGE};
pub use pipeline::{
    BuildContext, BuildReport, GrammarOutcome, GrammarState, PipelineOrchestrator,
};
pub use relocate::copy_matching;
pub use tool::{
    JavaCcFacade, JjTreeFacade, ProcessRunner, ToolOutput, ToolRequirement, ToolRunner,
};

use std::io;
use std::path::PathBuf;

use jcc_grammar::GrammarError;
use jcc_scan::ScanError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("tool '{tool}' is not available{hint}")]
    ToolMissing { tool: String, hint: String },
    #[error("failed to spawn {tool} ({executable}): {source}")]
    ToolSpawn {
        tool: &'static str,
        executable: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{tool} failed on {grammar} (exit code {exit_code}): {stderr}")]
    ToolFailure {
        tool: &'static str,
        grammar: PathBuf,
        exit_code: i32,
        stderr: String,
    },
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
