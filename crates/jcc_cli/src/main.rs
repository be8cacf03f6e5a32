// jcc CLI entry point
use anyhow::{Context, Result};
use clap::Parser;

use jcc_build::{PipelineOrchestrator, ProcessRunner};
use jcc_cli::{BuildArgs, Cli, Commands, ScanArgs};
use jcc_grammar::GrammarKind;
use jcc_scan::{ScanOutcome, StalenessScanner};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Build(args) => run_build(&args),
        Commands::Scan(args) => run_scan(&args),
        Commands::Version => {
            println!("{}", jcc_cli::get_version());
            Ok(())
        }
    }
}

fn run_build(args: &BuildArgs) -> Result<()> {
    let scanner = StalenessScanner::new(args.scan_config());
    let outcome = scanner
        .scan()
        .with_context(|| format!("failed to scan {}", args.source_dir.display()))?;

    let result = match outcome {
        ScanOutcome::NoSourceRoot => {
            println!(
                "Source directory {} does not exist, nothing to process.",
                args.source_dir.display()
            );
            return Ok(());
        }
        ScanOutcome::Grammars(result) => result,
    };

    if result.is_empty() {
        println!("All grammars are up to date.");
        return Ok(());
    }

    let javacc = args.javacc_requirement().resolve()?;
    let needs_jjtree = result
        .grammars()
        .iter()
        .any(|info| info.kind() == GrammarKind::JjTree);
    let jjtree = if needs_jjtree {
        args.jjtree_requirement().resolve()?
    } else {
        // Never invoked for a pure single-stage set.
        args.jjtree_path.clone().unwrap_or_else(|| "jjtree".into())
    };

    println!(
        "Processing {} stale grammar(s) into {}",
        result.len(),
        args.output_dir.display()
    );

    let runner = ProcessRunner;
    let orchestrator = PipelineOrchestrator::new(&runner, args.build_context(javacc, jjtree));
    let report = orchestrator.run(result.grammars())?;

    for outcome in &report.outcomes {
        println!(
            "Processed {} -> {}",
            outcome.grammar.display(),
            outcome.output_dir.display()
        );
        for file in &outcome.generated {
            println!("Generated: {}", file.display());
        }
        for file in &outcome.relocated {
            println!("Relocated: {}", file.display());
        }
    }
    println!("{} grammar(s) processed.", report.outcomes.len());
    Ok(())
}

fn run_scan(args: &ScanArgs) -> Result<()> {
    let scanner = StalenessScanner::new(args.scan_config());
    let outcome = scanner
        .scan()
        .with_context(|| format!("failed to scan {}", args.source_dir.display()))?;

    match outcome {
        ScanOutcome::NoSourceRoot => {
            println!(
                "Source directory {} does not exist, nothing to process.",
                args.source_dir.display()
            );
        }
        ScanOutcome::Grammars(result) if result.is_empty() => {
            println!("All grammars are up to date.");
        }
        ScanOutcome::Grammars(result) => {
            for info in result.grammars() {
                println!(
                    "{} -> {}",
                    info.grammar_file().display(),
                    info.target_file().display()
                );
            }
            println!("{} grammar(s) to process.", result.len());
        }
    }
    Ok(())
}
