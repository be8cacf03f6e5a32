// End-to-end pipeline tests against an in-memory tool runner that mimics
// the generators' observable file behavior.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use jcc_build::{
    BuildContext, BuildError, JavaCcFacade, JjTreeFacade, PipelineOptions, PipelineOrchestrator,
    ToolOutput, ToolRunner, TreeOptions,
};
use jcc_grammar::{extract_parser_name, GrammarInfo};
use jcc_scan::{ScanConfig, ScanOutcome, StalenessScanner};
use tempfile::{tempdir, TempDir};

/// Mimics jjtree (decorated grammar + node files) and javacc (parser
/// sources named after the PARSER_BEGIN marker), recording invocations.
#[derive(Default)]
struct FakeTools {
    invocations: Mutex<Vec<String>>,
    fail_tool: Option<&'static str>,
}

impl FakeTools {
    fn failing(tool: &'static str) -> Self {
        Self {
            invocations: Mutex::new(Vec::new()),
            fail_tool: Some(tool),
        }
    }

    fn invoked_tools(&self) -> Vec<String> {
        self.invocations.lock().unwrap().clone()
    }
}

fn output_dir_from(args: &[String]) -> PathBuf {
    let token = args
        .iter()
        .find(|arg| arg.starts_with("-OUTPUT_DIRECTORY:"))
        .expect("output directory token");
    PathBuf::from(token.trim_start_matches("-OUTPUT_DIRECTORY:"))
}

impl ToolRunner for FakeTools {
    fn run(&self, executable: &Path, args: &[String]) -> io::Result<ToolOutput> {
        let tool = executable
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.invocations.lock().unwrap().push(tool.clone());

        if self.fail_tool == Some(tool.as_str()) {
            return Ok(ToolOutput {
                exit_code: 1,
                stderr: "simulated failure".to_string(),
            });
        }

        let input = PathBuf::from(args.last().expect("input argument"));
        let text = fs::read_to_string(&input)?;
        let output_dir = output_dir_from(args);

        match tool.as_str() {
            "jjtree" => {
                let stem = input.file_stem().unwrap().to_string_lossy().into_owned();
                fs::write(output_dir.join(format!("{stem}.jj")), &text)?;
                fs::write(output_dir.join("Node.java"), "// node")?;
                fs::write(output_dir.join("SimpleNode.java"), "// node")?;
            }
            "javacc" => {
                let parser = extract_parser_name(&text).unwrap_or_else(|| "Parser".to_string());
                fs::write(output_dir.join(format!("{parser}.java")), "// parser")?;
                fs::write(output_dir.join(format!("{parser}TokenManager.java")), "// tm")?;
                fs::write(output_dir.join("Token.java"), "// token")?;
            }
            other => panic!("unexpected tool {other}"),
        }

        Ok(ToolOutput {
            exit_code: 0,
            stderr: String::new(),
        })
    }
}

struct Workspace {
    _dir: TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let root = dir.path().to_path_buf();
        Self { _dir: dir, root }
    }

    fn write(&self, relative: &str, text: &str) -> PathBuf {
        let path = self.root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, text).unwrap();
        path
    }

    fn context(&self) -> BuildContext {
        BuildContext {
            output_root: self.root.join("out"),
            interim_root: self.root.join("interim"),
            compile_source_roots: Vec::new(),
            options: PipelineOptions::default(),
            tree: TreeOptions::default(),
            javacc: JavaCcFacade::new("javacc"),
            jjtree: JjTreeFacade::new("jjtree"),
        }
    }
}

const CALC_JJT: &str = "package org.demo;\nPARSER_BEGIN(CalcParser)\n// grammar body\n";

#[test]
fn two_stage_pipeline_places_parser_and_node_files() {
    let ws = Workspace::new();
    let grammar = ws.write("src/main/jjtree/org/demo/Calc.jjt", CALC_JJT);

    let info = GrammarInfo::parse(&grammar, None).unwrap();
    let tools = FakeTools::default();
    let orchestrator = PipelineOrchestrator::new(&tools, ws.context());

    let report = orchestrator.run(std::slice::from_ref(&info)).unwrap();

    // Acceptance placement: parser under the declared package, node files
    // under the default `*.node` sub-package.
    assert!(ws.root.join("out/org/demo/CalcParser.java").exists());
    assert!(ws.root.join("out/org/demo/node/Node.java").exists());
    assert!(ws.root.join("out/org/demo/node/SimpleNode.java").exists());

    // The decorated grammar stays in the scratch tree.
    assert!(ws.root.join("interim/org/demo/Calc.jj").exists());
    assert!(!ws.root.join("out/org/demo/node/Calc.jj").exists());

    assert_eq!(tools.invoked_tools(), vec!["jjtree", "javacc"]);

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.symbol, "CalcParser");
    assert!(outcome
        .generated
        .iter()
        .any(|path| path.ends_with("CalcParser.java")));
    assert_eq!(outcome.relocated.len(), 2); // Calc.jj excluded, *.java moved
}

#[test]
fn decorated_grammar_is_the_generator_input() {
    let ws = Workspace::new();
    let grammar = ws.write("src/Calc.jjt", CALC_JJT);

    let info = GrammarInfo::parse(&grammar, None).unwrap();
    let tools = FakeTools::default();
    PipelineOrchestrator::new(&tools, ws.context())
        .run(std::slice::from_ref(&info))
        .unwrap();

    // The fake generator derives the parser name from whatever input it was
    // handed; getting CalcParser.java proves it read the decorated copy.
    assert!(ws.root.join("out/org/demo/CalcParser.java").exists());
}

#[test]
fn generator_failure_leaves_no_node_files_in_final_tree() {
    let ws = Workspace::new();
    let grammar = ws.write("src/org/demo/Calc.jjt", CALC_JJT);

    let info = GrammarInfo::parse(&grammar, None).unwrap();
    let tools = FakeTools::failing("javacc");
    let error = PipelineOrchestrator::new(&tools, ws.context())
        .run(std::slice::from_ref(&info))
        .expect_err("generator failure must abort");

    assert!(matches!(
        error,
        BuildError::ToolFailure {
            tool: "javacc",
            exit_code: 1,
            ..
        }
    ));
    // The preprocessor ran, but its aux files never reached the final tree.
    assert!(ws.root.join("interim/org/demo/Node.java").exists());
    assert!(!ws.root.join("out/org/demo/node").exists());
}

#[test]
fn failure_aborts_remaining_grammars() {
    let ws = Workspace::new();
    let first = ws.write("src/A.jjt", "PARSER_BEGIN(AParser)\n");
    let second = ws.write("src/B.jjt", "PARSER_BEGIN(BParser)\n");

    let grammars = vec![
        GrammarInfo::parse(&first, None).unwrap(),
        GrammarInfo::parse(&second, None).unwrap(),
    ];
    let tools = FakeTools::failing("jjtree");
    let result = PipelineOrchestrator::new(&tools, ws.context()).run(&grammars);

    assert!(result.is_err());
    // Fail-fast: the second grammar's preprocessor never ran.
    assert_eq!(tools.invoked_tools(), vec!["jjtree"]);
}

#[test]
fn single_stage_copies_adjacent_hand_written_sources() {
    let ws = Workspace::new();
    let grammar = ws.write("src/org/demo/Calc.jj", CALC_JJT);
    ws.write("src/org/demo/CustomToken.java", "// hand-written");

    let info = GrammarInfo::parse(&grammar, None).unwrap();
    let tools = FakeTools::default();
    PipelineOrchestrator::new(&tools, ws.context())
        .run(std::slice::from_ref(&info))
        .unwrap();

    assert!(ws.root.join("out/org/demo/CalcParser.java").exists());
    assert!(ws.root.join("out/org/demo/CustomToken.java").exists());
    assert_eq!(tools.invoked_tools(), vec!["javacc"]);
}

#[test]
fn adjacent_copy_skipped_inside_compiled_source_roots() {
    let ws = Workspace::new();
    let grammar = ws.write("src/org/demo/Calc.jj", CALC_JJT);
    ws.write("src/org/demo/CustomToken.java", "// compiled in place");

    let info = GrammarInfo::parse(&grammar, None).unwrap();
    let mut context = ws.context();
    context.compile_source_roots = vec![ws.root.join("src")];

    let tools = FakeTools::default();
    PipelineOrchestrator::new(&tools, context)
        .run(std::slice::from_ref(&info))
        .unwrap();

    assert!(ws.root.join("out/org/demo/CalcParser.java").exists());
    assert!(!ws.root.join("out/org/demo/CustomToken.java").exists());
}

#[test]
fn node_package_override_with_wildcard_substitution() {
    let ws = Workspace::new();
    let grammar = ws.write("src/org/demo/Calc.jjt", CALC_JJT);

    let info = GrammarInfo::parse(&grammar, None).unwrap();
    let mut context = ws.context();
    context.tree.node_package = Some("*.ast".to_string());

    let tools = FakeTools::default();
    PipelineOrchestrator::new(&tools, context)
        .run(std::slice::from_ref(&info))
        .unwrap();

    assert!(ws.root.join("out/org/demo/ast/Node.java").exists());
    assert!(!ws.root.join("out/org/demo/node").exists());
}

#[test]
fn stale_interim_artifacts_do_not_reach_the_final_tree() {
    let ws = Workspace::new();
    let grammar = ws.write("src/org/demo/Calc.jjt", CALC_JJT);

    // Leftover from an earlier invocation of a grammar that no longer
    // declares this node.
    ws.write("interim/org/demo/ObsoleteNode.java", "// obsolete");

    let info = GrammarInfo::parse(&grammar, None).unwrap();
    let tools = FakeTools::default();
    PipelineOrchestrator::new(&tools, ws.context())
        .run(std::slice::from_ref(&info))
        .unwrap();

    assert!(ws.root.join("out/org/demo/node/Node.java").exists());
    assert!(!ws.root.join("out/org/demo/node/ObsoleteNode.java").exists());
    assert!(!ws.root.join("interim/org/demo/ObsoleteNode.java").exists());
}

#[test]
fn scan_then_generate_then_rescan_is_idempotent() {
    let ws = Workspace::new();
    ws.write("src/main/jjtree/org/demo/Calc.jjt", CALC_JJT);

    let mut scan_config = ScanConfig::new(ws.root.join("src/main/jjtree"));
    scan_config.output_root = Some(ws.root.join("out"));

    let outcome = StalenessScanner::new(scan_config.clone()).scan().unwrap();
    let ScanOutcome::Grammars(result) = outcome else {
        panic!("source root exists");
    };
    assert_eq!(result.len(), 1);

    let tools = FakeTools::default();
    PipelineOrchestrator::new(&tools, ws.context())
        .run(result.grammars())
        .unwrap();
    assert!(ws.root.join("out/org/demo/CalcParser.java").exists());

    let second = StalenessScanner::new(scan_config).scan().unwrap();
    assert!(second.grammars().is_empty());
}
