use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::options::{PipelineOptions, TreeOptions};
use crate::BuildError;

/// Result of one external tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub exit_code: i32,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Process seam for the wrapped generators. Production code spawns real
/// processes; tests substitute an in-memory implementation.
pub trait ToolRunner {
    fn run(&self, executable: &Path, args: &[String]) -> io::Result<ToolOutput>;
}

/// Spawns the tool as a blocking subprocess with piped stdio.
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, executable: &Path, args: &[String]) -> io::Result<ToolOutput> {
        let output = Command::new(executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        Ok(ToolOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Describes an external tool the pipeline depends on.
#[derive(Debug, Clone)]
pub struct ToolRequirement {
    pub command: String,
    pub override_path: Option<PathBuf>,
    pub hint: Option<String>,
}

impl ToolRequirement {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            override_path: None,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_override_path(mut self, path: PathBuf) -> Self {
        self.override_path = Some(path);
        self
    }

    /// Resolve the executable path, honoring any override and ensuring it
    /// exists before the pipeline starts.
    pub fn resolve(&self) -> Result<PathBuf, BuildError> {
        if let Some(path) = &self.override_path {
            return match fs::metadata(path) {
                Ok(meta) if meta.is_file() => Ok(path.clone()),
                _ => Err(BuildError::ToolMissing {
                    tool: self.command.clone(),
                    hint: format!(" (override path {} is not a file)", path.display()),
                }),
            };
        }

        which::which(&self.command).map_err(|_| BuildError::ToolMissing {
            tool: self.command.clone(),
            hint: self
                .hint
                .as_ref()
                .map(|value| format!(" ({value})"))
                .unwrap_or_default(),
        })
    }
}

/// Facade over the parser generator: translates a typed option set into
/// the flat `-NAME=value` argument vector the tool expects and interprets
/// its exit code. Unset options are omitted so grammar-file directives and
/// tool defaults stay in effect.
#[derive(Debug, Clone)]
pub struct JavaCcFacade {
    executable: PathBuf,
}

impl JavaCcFacade {
    pub const TOOL: &'static str = "javacc";

    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn arguments(
        &self,
        options: &PipelineOptions,
        input: &Path,
        output_dir: &Path,
    ) -> Result<Vec<String>, BuildError> {
        let mut args = Vec::new();
        options.push_shared_args(&mut args);
        options.push_parser_args(&mut args);
        finish_arguments(&mut args, input, output_dir)?;
        Ok(args)
    }

    pub fn generate(
        &self,
        runner: &dyn ToolRunner,
        options: &PipelineOptions,
        input: &Path,
        output_dir: &Path,
    ) -> Result<(), BuildError> {
        let args = self.arguments(options, input, output_dir)?;
        invoke(runner, Self::TOOL, &self.executable, &args, input, output_dir)
    }
}

/// Facade over the tree-decorator preprocessor. Shares the `JDK_VERSION`
/// and `STATIC` knobs with the generator but carries its own node option
/// set.
#[derive(Debug, Clone)]
pub struct JjTreeFacade {
    executable: PathBuf,
}

impl JjTreeFacade {
    pub const TOOL: &'static str = "jjtree";

    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn arguments(
        &self,
        options: &PipelineOptions,
        tree: &TreeOptions,
        input: &Path,
        output_dir: &Path,
    ) -> Result<Vec<String>, BuildError> {
        let mut args = Vec::new();
        options.push_shared_args(&mut args);
        tree.push_args(&mut args);
        finish_arguments(&mut args, input, output_dir)?;
        Ok(args)
    }

    pub fn preprocess(
        &self,
        runner: &dyn ToolRunner,
        options: &PipelineOptions,
        tree: &TreeOptions,
        input: &Path,
        output_dir: &Path,
    ) -> Result<(), BuildError> {
        let args = self.arguments(options, tree, input, output_dir)?;
        invoke(runner, Self::TOOL, &self.executable, &args, input, output_dir)
    }
}

fn finish_arguments(
    args: &mut Vec<String>,
    input: &Path,
    output_dir: &Path,
) -> Result<(), BuildError> {
    let output_dir = absolute(output_dir)?;
    let input = absolute(input)?;
    args.push(format!("-OUTPUT_DIRECTORY:{}", output_dir.display()));
    args.push(input.display().to_string());
    Ok(())
}

fn invoke(
    runner: &dyn ToolRunner,
    tool: &'static str,
    executable: &Path,
    args: &[String],
    input: &Path,
    output_dir: &Path,
) -> Result<(), BuildError> {
    fs::create_dir_all(output_dir).map_err(|source| BuildError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    tracing::debug!(tool, input = %input.display(), "invoking generator");
    let output = runner
        .run(executable, args)
        .map_err(|source| BuildError::ToolSpawn {
            tool,
            executable: executable.to_path_buf(),
            source,
        })?;

    if !output.success() {
        return Err(BuildError::ToolFailure {
            tool,
            grammar: input.to_path_buf(),
            exit_code: output.exit_code,
            stderr: output.stderr,
        });
    }
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf, BuildError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        })
}
